//! Error taxonomy for the arena allocator.
//!
//! Mirrors the `mperrno`/`mpstrerror()` pair from the original C pool
//! allocator: every fallible operation sets a thread-local indicator in
//! addition to returning `Err`, so malloc-compatible callers that only check
//! for a null pointer can still recover the reason afterwards.

use std::cell::Cell;

/// Stable error taxonomy, one variant per `MP_ERRNO_*` code.
///
/// Discriminants are not part of the public contract (callers should match on
/// the variant, not cast to an integer), but each variant's `Display` is a
/// single, fixed, newline-free sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// No error.
    #[error("success")]
    Success,
    /// Handle out of range.
    #[error("Memory pool ID out of range")]
    Mpid,
    /// Negative size (only reachable with signed sizes).
    #[error("Negative size")]
    Szng,
    /// Out of memory (reserved).
    #[error("Out of memory")]
    Nomm,
    /// Would exceed the configured memory ceiling.
    #[error("Memory limit exceeded")]
    Exmm,
    /// Underlying host allocator returned null.
    #[error("Error allocating memory")]
    Allo,
    /// Alignment not a power of two, or below pointer size.
    #[error("Alignment is not bigger than void* or not multiple of 2")]
    Exal,
    /// Pool handle is not the default and is not initialized.
    #[error("Memory pool is not the default (0) and it is not initialized: use new_pool() first")]
    Noin,
    /// Pool registry exhausted.
    #[error("Limit of number of Memory Pools exceeded")]
    Exmp,
    /// Nothing on the one-slot pool-stack.
    #[error("Nothing to pop, use push() first")]
    Nopp,
    /// Trace sink reported a display error.
    #[error("Error displaying a message")]
    Disp,
    /// Required parameter was null.
    #[error("Error on parameter passed to the function")]
    Parm,
    /// Operation attempted from a thread that does not own the pool.
    #[error("Expected different thread ID")]
    Thrd,
    /// Underlying OS error; the human message comes from the OS.
    #[error("System error")]
    Syse,
}

/// Result alias used throughout the crate.
pub type AllocResult<T> = Result<T, ErrorKind>;

thread_local! {
    static LAST_ERROR: Cell<ErrorKind> = const { Cell::new(ErrorKind::Success) };
}

/// Records `kind` as this thread's last error.
///
/// Called internally by every fallible operation; callers normally don't
/// need this directly.
pub fn set_last_error(kind: ErrorKind) {
    LAST_ERROR.with(|e| e.set(kind));
}

/// Returns this thread's last recorded error kind.
pub fn last_error() -> ErrorKind {
    LAST_ERROR.with(|e| e.get())
}

/// Returns the fixed, human-readable sentence for this thread's last error.
pub fn last_error_string() -> String {
    last_error().to_string()
}

/// Runs `f`, recording `Err` results as the thread's last error and
/// collapsing them to `None` for a malloc-style nullable return.
pub(crate) fn track<T>(result: AllocResult<T>) -> Option<T> {
    match result {
        Ok(v) => {
            set_last_error(ErrorKind::Success);
            Some(v)
        }
        Err(kind) => {
            set_last_error(kind);
            None
        }
    }
}
