//! # nebula-arena
//!
//! A region-based (arena) memory allocator: a malloc-compatible API whose
//! unit of reclamation is a whole pool rather than an individual object.
//! Pools are addressed by small integer handles, may be selected explicitly
//! per call or through a thread-local current pool with a one-slot
//! save/restore stack, and are each pinned to the thread that created them.
//!
//! Individual chunks are never freed; `free`/`free_in` are no-ops kept only
//! so code written against a standard allocator compiles unchanged. Memory
//! is reclaimed in bulk by [`clear`], [`delete`], or [`delete_all`].
//!
//! ```
//! use nebula_arena::{alloc_in, new_pool, delete};
//!
//! let handle = new_pool("scratch").unwrap();
//! let chunk = alloc_in(64, handle).unwrap();
//! assert_eq!((chunk.as_ptr() as usize) % 8, 0);
//! delete(handle).unwrap();
//! ```

pub mod api;
pub mod arena;
pub mod block;
pub mod budget;
pub mod config;
pub mod current;
pub mod dump;
pub mod engine;
pub mod error;
pub mod pool;
pub mod registry;
pub mod report;
pub mod trace;
pub mod utils;

pub use api::{
    alloc, alloc_in, aligned_alloc, aligned_alloc_in, clear, delete, delete_all, dup_string,
    dup_string_in, format_alloc, format_alloc_in, free, free_in, get, get_block_size,
    get_memory_limit, install_trace_sink, new_pool, pop, push, realloc, realloc_in, set,
    set_block_size, set_memory_limit, zalloc, zalloc_in,
};
pub use error::{last_error, last_error_string, ErrorKind};
