//! Process-wide configuration constants and knobs.
//!
//! Grounded in the original pool allocator's `mp.h` `#define` block: a
//! handful of compile-time constants plus two runtime knobs
//! (`memory_limit`, `default_block_size`) that are independently settable
//! and readable.

/// Maximum number of pool slots in the registry.
pub const MAX_POOLS: usize = 100;

/// Handle of the implicit default pool.
pub const DEFAULT_POOL: i32 = 0;

/// Sentinel handle meaning "no pool".
pub const NO_POOL: i32 = -2;

/// Minimum alignment applied to every allocation.
pub const DEFAULT_ALIGN: usize = 8;

/// Default block capacity, 250 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 250 * 1024;

/// Maximum bytes (including the terminator) kept for a pool's label.
pub const MAX_LABEL_LEN: usize = 128;

/// Label used for the lazily-initialized default pool.
pub const DEFAULT_POOL_LABEL: &str = "Default";

/// Default budget ceiling on 64-bit targets: 5 GiB.
pub const DEFAULT_LIMIT_64: usize = 5 * 1024 * 1024 * 1024;

/// Default budget ceiling on 32-bit targets: 3 GiB.
pub const DEFAULT_LIMIT_32: usize = 3 * 1024 * 1024 * 1024;

/// Returns the platform-appropriate default budget ceiling.
///
/// 5 GiB on 64-bit targets, 3 GiB on 32-bit targets, applied lazily the
/// first time the limit is observed to be unset.
pub fn default_memory_limit() -> usize {
    cfg_if::cfg_if! {
        if #[cfg(target_pointer_width = "32")] {
            DEFAULT_LIMIT_32
        } else {
            DEFAULT_LIMIT_64
        }
    }
}
