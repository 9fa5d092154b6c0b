//! Process-wide memory budget accounting.
//!
//! Grounded in `mp.c`'s `mp_chkmx`/`mp_addmx` pair: a single mutex-protected
//! counter of live bytes checked against a ceiling before every block growth.
//! `memory_limit` and `default_block_size` are split out as independent
//! atomics since the original keeps them as plain globals read far more often
//! than written.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::config::{self, DEFAULT_BLOCK_SIZE};
use crate::error::{AllocResult, ErrorKind};

/// Direction of a budget adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Charge `delta_bytes` against the live total.
    Grow,
    /// Return `delta_bytes` to the live total.
    Shrink,
}

/// The `(total_live_bytes, memory_limit)` pair plus the block-size knob.
pub struct Budget {
    total_live_bytes: Mutex<usize>,
    memory_limit: AtomicUsize,
    default_block_size: AtomicUsize,
}

impl Budget {
    pub const fn new() -> Self {
        Self {
            total_live_bytes: Mutex::new(0),
            memory_limit: AtomicUsize::new(0),
            default_block_size: AtomicUsize::new(DEFAULT_BLOCK_SIZE),
        }
    }

    /// Applies a signed delta to the live-byte total.
    ///
    /// On growth, fails with [`ErrorKind::Exmm`] without mutating state if the
    /// new total would exceed the configured limit. The limit is materialized
    /// to the platform default the first time it is observed to be unset.
    pub fn adjust_total(&self, delta_bytes: usize, sign: Sign) -> AllocResult<()> {
        let limit = self.memory_limit_or_default();
        let mut total = self.total_live_bytes.lock();
        match sign {
            Sign::Grow => {
                let next = total.checked_add(delta_bytes).ok_or(ErrorKind::Exmm)?;
                if next > limit {
                    return Err(ErrorKind::Exmm);
                }
                *total = next;
            }
            Sign::Shrink => {
                *total = total.saturating_sub(delta_bytes);
            }
        }
        Ok(())
    }

    /// Returns the current live-byte total.
    pub fn total_live_bytes(&self) -> usize {
        *self.total_live_bytes.lock()
    }

    /// Resets the live-byte total to zero, as part of `delete_all()`.
    pub fn reset(&self) {
        *self.total_live_bytes.lock() = 0;
    }

    /// Returns the configured limit, materializing the platform default on
    /// first read if it has never been set.
    pub fn memory_limit_or_default(&self) -> usize {
        let current = self.memory_limit.load(Ordering::Relaxed);
        if current != 0 {
            return current;
        }
        let default = config::default_memory_limit();
        // Best-effort: if another thread raced us here, whichever value lands
        // is an acceptable default, the next read will be consistent.
        self.memory_limit
            .compare_exchange(0, default, Ordering::Relaxed, Ordering::Relaxed)
            .unwrap_or(default);
        default
    }

    /// Returns the limit as last set by [`Self::set_memory_limit`], `0` if
    /// never set (distinct from [`Self::memory_limit_or_default`]).
    pub fn memory_limit_raw(&self) -> usize {
        self.memory_limit.load(Ordering::Relaxed)
    }

    pub fn set_memory_limit(&self, bytes: usize) {
        self.memory_limit.store(bytes, Ordering::Relaxed);
    }

    pub fn default_block_size(&self) -> usize {
        self.default_block_size.load(Ordering::Relaxed)
    }

    pub fn set_default_block_size(&self, bytes: usize) {
        self.default_block_size.store(bytes, Ordering::Relaxed);
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_and_shrinks() {
        let budget = Budget::new();
        budget.set_memory_limit(100);
        budget.adjust_total(40, Sign::Grow).unwrap();
        budget.adjust_total(40, Sign::Grow).unwrap();
        assert_eq!(budget.total_live_bytes(), 80);
        budget.adjust_total(30, Sign::Shrink).unwrap();
        assert_eq!(budget.total_live_bytes(), 50);
    }

    #[test]
    fn rejects_over_limit_without_mutating() {
        let budget = Budget::new();
        budget.set_memory_limit(100);
        budget.adjust_total(90, Sign::Grow).unwrap();
        let err = budget.adjust_total(20, Sign::Grow).unwrap_err();
        assert_eq!(err, ErrorKind::Exmm);
        assert_eq!(budget.total_live_bytes(), 90);
    }

    #[test]
    fn lazily_applies_platform_default() {
        let budget = Budget::new();
        assert_eq!(budget.memory_limit_raw(), 0);
        let observed = budget.memory_limit_or_default();
        assert_eq!(observed, config::default_memory_limit());
        assert_eq!(budget.memory_limit_raw(), observed);
    }

    #[test]
    fn reset_zeroes_total() {
        let budget = Budget::new();
        budget.set_memory_limit(100);
        budget.adjust_total(50, Sign::Grow).unwrap();
        budget.reset();
        assert_eq!(budget.total_live_bytes(), 0);
    }
}
