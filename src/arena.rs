//! Process-wide facade composing the registry, the budget, and the trace
//! sink into the single allocator value the malloc-compatible surface talks
//! to.
//!
//! Grounded in `allocator::manager::GlobalAllocatorManager`'s singleton
//! shape, adapted to this crate's lazy-initialization contract: nothing here
//! requires an explicit `init()` call, since the default pool and the budget
//! ceiling are both defined to materialize themselves on first use.

use std::ptr::NonNull;
use std::sync::OnceLock;
use std::thread::ThreadId;

use crate::budget::{Budget, Sign};
use crate::config::DEFAULT_ALIGN;
use crate::engine;
use crate::error::{AllocResult, ErrorKind};
use crate::registry::Registry;
use crate::trace::TraceSink;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// The process-wide allocator state: pool registry, budget, trace sink.
pub struct Arena {
    registry: Registry,
    budget: Budget,
    trace: TraceSink,
}

impl Arena {
    /// Builds a standalone `Arena`, independent of the process-wide
    /// singleton returned by [`Self::global`]. Useful for tests and
    /// benchmarks that want an isolated registry and budget.
    pub fn new() -> Self {
        Arena {
            registry: Registry::new(),
            budget: Budget::new(),
            trace: TraceSink::new(),
        }
    }

    /// The single process-wide instance, created on first access.
    pub fn global() -> &'static Arena {
        static GLOBAL: OnceLock<Arena> = OnceLock::new();
        GLOBAL.get_or_init(Arena::new)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn trace(&self) -> &TraceSink {
        &self.trace
    }

    /// Carves `size` bytes aligned to `align` out of `handle`.
    pub fn get_chunk(&self, size: usize, handle: i32, align: usize, thread: ThreadId) -> AllocResult<NonNull<u8>> {
        let result = engine::get_chunk(&self.registry, &self.budget, size, handle, align, thread);
        #[cfg(feature = "logging")]
        if let Err(err) = &result {
            warn!(handle, size, align, error = %err, "allocation failed");
        }
        result
    }

    pub fn new_pool(&self, label: &str, thread: ThreadId) -> AllocResult<i32> {
        let result = self.registry.new_pool(label, thread);
        #[cfg(feature = "logging")]
        match &result {
            Ok(handle) => debug!(handle, label, "pool created"),
            Err(err) => warn!(label, error = %err, "pool creation failed"),
        }
        result
    }

    pub fn clear(&self, handle: i32, thread: ThreadId) -> AllocResult<()> {
        self.registry.clear(handle, thread)
    }

    pub fn delete(&self, handle: i32, thread: ThreadId) -> AllocResult<()> {
        let freed = self.registry.delete(handle, thread)?;
        let _ = self.budget.adjust_total(freed, Sign::Shrink);
        #[cfg(feature = "logging")]
        debug!(handle, freed, "pool deleted");
        Ok(())
    }

    pub fn delete_all(&self) {
        let freed = self.registry.delete_all();
        let _ = freed;
        self.budget.reset();
        #[cfg(feature = "logging")]
        debug!("all pools deleted");
    }

    pub fn set_memory_limit(&self, bytes: usize) {
        self.budget.set_memory_limit(bytes);
    }

    pub fn memory_limit(&self) -> usize {
        self.budget.memory_limit_or_default()
    }

    pub fn set_block_size(&self, bytes: usize) {
        self.budget.set_default_block_size(bytes);
    }

    pub fn block_size(&self) -> usize {
        self.budget.default_block_size()
    }
}
