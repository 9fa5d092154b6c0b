//! Fixed-capacity table of pool slots, indexed by a small integer handle.
//!
//! Grounded in `mp.c`'s static `mp_info[MP_MAXID]` array and the linear scan
//! in `mp_newpool`. The scan and the default pool's lazy first-touch are the
//! only operations that take the registry's mutex; allocation into an
//! already-selected tail block does not.

use std::thread::ThreadId;

use parking_lot::Mutex;

use crate::config::{DEFAULT_POOL, DEFAULT_POOL_LABEL, MAX_POOLS, NO_POOL};
use crate::error::{AllocResult, ErrorKind};
use crate::pool::Pool;

/// The pool-slot table.
pub struct Registry {
    slots: Mutex<Vec<Pool>>,
}

impl Registry {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_POOLS);
        slots.resize_with(MAX_POOLS, Pool::empty);
        Registry {
            slots: Mutex::new(slots),
        }
    }

    /// Maps a handle to a slot index, or `MPID` if out of range.
    ///
    /// `NO_POOL` is always out of range; it is a sentinel, never a slot.
    pub fn validate_handle(handle: i32) -> AllocResult<usize> {
        if handle == NO_POOL || handle < 0 || handle as usize >= MAX_POOLS {
            Err(ErrorKind::Mpid)
        } else {
            Ok(handle as usize)
        }
    }

    /// Checks precondition 3 of `get_chunk`: non-default handles must already
    /// be initialized. The default pool is always considered ready here; its
    /// lazy first-touch happens in [`Self::touch_and_check_owner`].
    pub fn check_initialized(&self, idx: usize) -> AllocResult<()> {
        if idx as i32 == DEFAULT_POOL {
            return Ok(());
        }
        if self.slots.lock()[idx].is_initialized() {
            Ok(())
        } else {
            Err(ErrorKind::Noin)
        }
    }

    /// Checks precondition 5 (`THRD`), lazily initializing the default pool
    /// on its first touch by any thread.
    pub fn touch_and_check_owner(&self, idx: usize, thread: ThreadId) -> AllocResult<()> {
        let mut slots = self.slots.lock();
        if idx as i32 == DEFAULT_POOL && !slots[idx].is_initialized() {
            slots[idx].initialize(DEFAULT_POOL_LABEL, thread);
            return Ok(());
        }
        if slots[idx].is_owned_by(thread) {
            Ok(())
        } else {
            Err(ErrorKind::Thrd)
        }
    }

    /// Runs `f` against the slot at `handle` under the registry lock.
    pub fn with_pool_mut<R>(&self, handle: i32, f: impl FnOnce(&mut Pool) -> R) -> AllocResult<R> {
        let idx = Self::validate_handle(handle)?;
        let mut slots = self.slots.lock();
        Ok(f(&mut slots[idx]))
    }

    /// Read-only counterpart of [`Self::with_pool_mut`], used by the
    /// reporter and dump writer.
    pub fn with_pool<R>(&self, handle: i32, f: impl FnOnce(&Pool) -> R) -> AllocResult<R> {
        let idx = Self::validate_handle(handle)?;
        let slots = self.slots.lock();
        Ok(f(&slots[idx]))
    }

    /// Runs `f` once per initialized slot, in handle order, for the reporter.
    pub fn for_each_initialized(&self, mut f: impl FnMut(i32, &Pool)) {
        let slots = self.slots.lock();
        for (i, pool) in slots.iter().enumerate() {
            if pool.is_initialized() {
                f(i as i32, pool);
            }
        }
    }

    /// Scans for the lowest free non-default slot and initializes it.
    pub fn new_pool(&self, label: &str, thread: ThreadId) -> AllocResult<i32> {
        let mut slots = self.slots.lock();
        for i in 1..slots.len() {
            if !slots[i].is_initialized() {
                slots[i].initialize(label, thread);
                return Ok(i as i32);
            }
        }
        Err(ErrorKind::Exmp)
    }

    /// Validates `handle` for `set`/`push`: in range, and if not the default,
    /// initialized and owned by `thread`.
    pub fn validate_for_select(&self, handle: i32, thread: ThreadId) -> AllocResult<()> {
        let idx = Self::validate_handle(handle)?;
        if idx as i32 == DEFAULT_POOL {
            return Ok(());
        }
        let slots = self.slots.lock();
        if !slots[idx].is_initialized() {
            return Err(ErrorKind::Noin);
        }
        if !slots[idx].is_owned_by(thread) {
            return Err(ErrorKind::Thrd);
        }
        Ok(())
    }

    /// Resets every block's `used` to zero for `handle`, owned by `thread`.
    pub fn clear(&self, handle: i32, thread: ThreadId) -> AllocResult<()> {
        let idx = Self::validate_handle(handle)?;
        let mut slots = self.slots.lock();
        if !slots[idx].is_owned_by(thread) {
            return Err(ErrorKind::Thrd);
        }
        slots[idx].clear_blocks();
        Ok(())
    }

    /// Tears down `handle`, owned by `thread`, returning the raw capacity
    /// freed so the caller can refund the budget.
    pub fn delete(&self, handle: i32, thread: ThreadId) -> AllocResult<usize> {
        let idx = Self::validate_handle(handle)?;
        let mut slots = self.slots.lock();
        if !slots[idx].is_owned_by(thread) {
            return Err(ErrorKind::Thrd);
        }
        let freed = slots[idx].total_capacity();
        slots[idx].take();
        Ok(freed)
    }

    /// Tears down every initialized slot unconditionally, ignoring thread
    /// ownership, returning the total raw capacity freed.
    pub fn delete_all(&self) -> usize {
        let mut slots = self.slots.lock();
        let mut freed = 0usize;
        for pool in slots.iter_mut() {
            if pool.is_initialized() {
                freed += pool.total_capacity();
                pool.take();
            }
        }
        freed
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
