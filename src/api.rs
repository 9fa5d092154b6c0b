//! The malloc-compatible free-function surface: `alloc`, `zalloc`,
//! `aligned_alloc`, `realloc`, `dup_string`, `format_alloc`, `free`, plus the
//! pool-lifecycle and current-pool operations, all backed by
//! [`Arena::global`].
//!
//! Grounded in `mp.c`'s public entry points (`mpmalloc`, `mpcalloc`,
//! `mprealloc`, `mpstrdup`, `mpasprintf`, `mpfree`, `mpnewpool`, `mpsetpool`,
//! `mpgetpool`, `mppush`, `mppop`, `mpclear`, `mpdelete`, `mpdeleteall`).
//! Sizes are accepted as `i64` (mirroring the source's signed `ssize_t`) so
//! that a caller passing a negative size observes [`ErrorKind::Szng`] rather
//! than a silent cast.

use std::ffi::CStr;
use std::io::Write;
use std::ptr::NonNull;

use crate::arena::Arena;
use crate::config::DEFAULT_ALIGN;
use crate::current;
use crate::error::{track, AllocResult, ErrorKind};

fn current_thread() -> std::thread::ThreadId {
    std::thread::current().id()
}

fn nonnegative(size: i64) -> AllocResult<usize> {
    if size < 0 {
        Err(ErrorKind::Szng)
    } else {
        Ok(size as usize)
    }
}

/// Allocates `size` bytes from the calling thread's current pool.
pub fn alloc(size: i64) -> Option<NonNull<u8>> {
    alloc_in(size, current::get())
}

/// Allocates `size` bytes from pool `handle`.
pub fn alloc_in(size: i64, handle: i32) -> Option<NonNull<u8>> {
    track(alloc_result(size, handle, DEFAULT_ALIGN))
}

fn alloc_result(size: i64, handle: i32, align: usize) -> AllocResult<NonNull<u8>> {
    let size = nonnegative(size)?;
    Arena::global().get_chunk(size, handle, align, current_thread())
}

/// Allocates `count * size` bytes from the current pool and zeroes them.
pub fn zalloc(count: i64, size: i64) -> Option<NonNull<u8>> {
    zalloc_in(count, size, current::get())
}

/// Allocates `count * size` bytes from pool `handle` and zeroes them.
pub fn zalloc_in(count: i64, size: i64, handle: i32) -> Option<NonNull<u8>> {
    track(zalloc_result(count, size, handle))
}

fn zalloc_result(count: i64, size: i64, handle: i32) -> AllocResult<NonNull<u8>> {
    let count = nonnegative(count)?;
    let size = nonnegative(size)?;
    let total = count.checked_mul(size).ok_or(ErrorKind::Exmm)?;
    let chunk = Arena::global().get_chunk(total, handle, DEFAULT_ALIGN, current_thread())?;
    // SAFETY: `get_chunk` returns a chunk of at least `total` bytes, freshly
    // carved and not yet aliased by any other live reference.
    unsafe {
        std::ptr::write_bytes(chunk.as_ptr(), 0, total.max(1));
    }
    Ok(chunk)
}

/// Allocates `size` bytes aligned to `align` from the current pool.
pub fn aligned_alloc(align: usize, size: i64) -> Option<NonNull<u8>> {
    aligned_alloc_in(align, size, current::get())
}

/// Allocates `size` bytes aligned to `align` from pool `handle`.
pub fn aligned_alloc_in(align: usize, size: i64, handle: i32) -> Option<NonNull<u8>> {
    track(alloc_result(size, handle, align))
}

/// Allocates a fresh `new_size`-byte chunk and copies a best-effort prefix of
/// `ptr`'s content into it. The old chunk is not reclaimed.
///
/// Preserves the source's fragile copy-length rule verbatim (see
/// DESIGN.md): when `ptr` is non-null, the number of bytes copied is
/// `min(new_size, |new_addr - old_addr|)`, not the old chunk's true size
/// (which this allocator never tracks). This can under-copy when the new
/// chunk lands far from the old one and over-copy is never attempted.
pub fn realloc(ptr: Option<NonNull<u8>>, new_size: i64) -> Option<NonNull<u8>> {
    realloc_in(ptr, new_size, current::get())
}

/// Explicit-pool counterpart of [`realloc`].
pub fn realloc_in(ptr: Option<NonNull<u8>>, new_size: i64, handle: i32) -> Option<NonNull<u8>> {
    track(realloc_result(ptr, new_size, handle))
}

fn realloc_result(ptr: Option<NonNull<u8>>, new_size: i64, handle: i32) -> AllocResult<NonNull<u8>> {
    let new_size = nonnegative(new_size)?;
    let new_chunk = Arena::global().get_chunk(new_size, handle, DEFAULT_ALIGN, current_thread())?;
    if let Some(old) = ptr {
        let old_addr = old.as_ptr() as usize;
        let new_addr = new_chunk.as_ptr() as usize;
        let distance = old_addr.abs_diff(new_addr);
        let copy_len = new_size.min(distance);
        if copy_len > 0 {
            // SAFETY: both `old` and `new_chunk` point into pool-owned,
            // non-overlapping-by-construction storage for at least
            // `copy_len` bytes; the source's own contract never tracks the
            // old chunk's true size, so `copy_len` is this allocator's
            // best-effort bound, not a verified one.
            unsafe {
                std::ptr::copy_nonoverlapping(old.as_ptr(), new_chunk.as_ptr(), copy_len);
            }
        }
    }
    Ok(new_chunk)
}

/// Duplicates a NUL-terminated string into a fresh chunk in the current pool.
pub fn dup_string(s: Option<&CStr>) -> Option<NonNull<u8>> {
    dup_string_in(s, current::get())
}

/// Explicit-pool counterpart of [`dup_string`].
pub fn dup_string_in(s: Option<&CStr>, handle: i32) -> Option<NonNull<u8>> {
    track(dup_string_result(s, handle))
}

fn dup_string_result(s: Option<&CStr>, handle: i32) -> AllocResult<NonNull<u8>> {
    let s = s.ok_or(ErrorKind::Parm)?;
    let bytes = s.to_bytes_with_nul();
    let chunk = Arena::global().get_chunk(bytes.len(), handle, DEFAULT_ALIGN, current_thread())?;
    // SAFETY: `chunk` was just carved with capacity `bytes.len()`.
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), chunk.as_ptr(), bytes.len());
    }
    Ok(chunk)
}

/// Two-pass formatted allocation: measures the formatted length, allocates
/// exactly that many bytes plus a terminator, then writes the text in.
/// Returns the byte count written (excluding the terminator) and the fresh
/// chunk, or `-1` and `None` if the underlying allocation fails, with the
/// error indicator set to whatever [`get_chunk`](crate::engine::get_chunk)
/// reported (out-of-budget, alignment, thread ownership, and so on).
pub fn format_alloc(args: std::fmt::Arguments<'_>) -> (Option<NonNull<u8>>, i64) {
    format_alloc_in(args, current::get())
}

/// Explicit-pool counterpart of [`format_alloc`].
pub fn format_alloc_in(args: std::fmt::Arguments<'_>, handle: i32) -> (Option<NonNull<u8>>, i64) {
    match format_alloc_result(args, handle) {
        Ok((chunk, len)) => (Some(chunk), len as i64),
        Err(err) => {
            crate::error::set_last_error(err);
            (None, -1)
        }
    }
}

fn format_alloc_result(args: std::fmt::Arguments<'_>, handle: i32) -> AllocResult<(NonNull<u8>, usize)> {
    let text = std::fmt::format(args);
    let len = text.len();
    let chunk = Arena::global().get_chunk(len + 1, handle, DEFAULT_ALIGN, current_thread())?;
    // SAFETY: `chunk` was carved with capacity `len + 1`.
    unsafe {
        let dest = std::slice::from_raw_parts_mut(chunk.as_ptr(), len + 1);
        dest[..len].copy_from_slice(text.as_bytes());
        dest[len] = 0;
    }
    Ok((chunk, len))
}

/// No-op, present only so code written against a standard allocator
/// interface compiles unchanged.
pub fn free(_ptr: Option<NonNull<u8>>) {}

/// No-op counterpart of [`free`] taking an explicit pool handle.
pub fn free_in(_ptr: Option<NonNull<u8>>, _handle: i32) {}

/// Creates a new pool labeled `label`, owned by the calling thread.
pub fn new_pool(label: &str) -> Option<i32> {
    track(Arena::global().new_pool(label, current_thread()))
}

/// Sets the calling thread's current pool.
pub fn set(handle: i32) -> Option<()> {
    track(set_result(handle))
}

fn set_result(handle: i32) -> AllocResult<()> {
    Arena::global()
        .registry()
        .validate_for_select(handle, current_thread())?;
    current::set(handle);
    Ok(())
}

/// Returns the calling thread's current pool.
pub fn get() -> i32 {
    current::get()
}

/// Saves the current pool and selects `handle`. A second `push` before a
/// matching `pop` silently overwrites the first saved pool.
pub fn push(handle: i32) -> Option<()> {
    track(push_result(handle))
}

fn push_result(handle: i32) -> AllocResult<()> {
    Arena::global()
        .registry()
        .validate_for_select(handle, current_thread())?;
    current::push(handle);
    Ok(())
}

/// Restores the pool saved by the last `push`.
pub fn pop() -> Option<()> {
    track(current::pop())
}

/// Resets every block's `used` to zero in pool `handle`, retaining capacity.
pub fn clear(handle: i32) -> Option<()> {
    track(Arena::global().clear(handle, current_thread()))
}

/// Tears down pool `handle`, returning its memory to the budget.
pub fn delete(handle: i32) -> Option<()> {
    track(Arena::global().delete(handle, current_thread()))
}

/// Tears down every pool unconditionally, regardless of owning thread.
pub fn delete_all() {
    Arena::global().delete_all();
}

/// Sets the process-wide memory ceiling.
pub fn set_memory_limit(bytes: usize) {
    Arena::global().set_memory_limit(bytes);
}

/// Returns the process-wide memory ceiling.
pub fn get_memory_limit() -> usize {
    Arena::global().memory_limit()
}

/// Sets the default block size used when a pool grows.
pub fn set_block_size(bytes: usize) {
    Arena::global().set_block_size(bytes);
}

/// Returns the default block size used when a pool grows.
pub fn get_block_size() -> usize {
    Arena::global().block_size()
}

/// Replaces the process-wide trace sink used by the reporter and dumper.
pub fn install_trace_sink(f: impl Fn(&mut dyn Write, &str) -> std::io::Result<()> + Send + Sync + 'static) {
    Arena::global().trace().install(f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Shares the registry/budget singleton with lib.rs's integration tests;
    // `#[serial]` (no key) synchronizes against all of them process-wide.

    #[test]
    #[serial]
    fn alloc_zero_returns_non_null() {
        let got = alloc(0);
        assert!(got.is_some());
    }

    #[test]
    #[serial]
    fn alloc_negative_size_is_szng() {
        assert!(alloc(-1).is_none());
        assert_eq!(crate::error::last_error(), ErrorKind::Szng);
    }

    #[test]
    #[serial]
    fn dup_string_copies_including_terminator() {
        let s = CStr::from_bytes_with_nul(b"hello\0").unwrap();
        let chunk = dup_string(Some(s)).unwrap();
        // SAFETY: `chunk` was just written by `dup_string` with `s`'s bytes.
        let copied = unsafe { CStr::from_ptr(chunk.as_ptr() as *const i8) };
        assert_eq!(copied.to_bytes(), s.to_bytes());
    }

    #[test]
    #[serial]
    fn dup_string_none_is_parm() {
        assert!(dup_string(None).is_none());
        assert_eq!(crate::error::last_error(), ErrorKind::Parm);
    }

    #[test]
    #[serial]
    fn format_alloc_matches_formatted_text() {
        let (chunk, len) = format_alloc(format_args!("{}-{}", 2, "x"));
        let chunk = chunk.unwrap();
        assert_eq!(len, 3);
        // SAFETY: `chunk` was carved with `len + 1` bytes by `format_alloc`.
        let text = unsafe { CStr::from_ptr(chunk.as_ptr() as *const i8) };
        assert_eq!(text.to_str().unwrap(), "2-x");
    }
}
