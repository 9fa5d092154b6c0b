//! Integration tests for pool creation, growth, clear, and delete.
//!
//! Each test builds its own `Arena` so pools never spill across tests; the
//! process-wide singleton is exercised separately in `lib.rs`'s doc test and
//! unit tests.

use nebula_arena::arena::Arena;
use nebula_arena::config::DEFAULT_ALIGN;
use nebula_arena::ErrorKind;

fn thread() -> std::thread::ThreadId {
    std::thread::current().id()
}

#[test]
fn allocations_stay_aligned_across_growth() {
    let arena = Arena::new();
    arena.set_block_size(64);
    let t = thread();
    let handle = arena.new_pool("growth", t).unwrap();

    for _ in 0..50 {
        let chunk = arena.get_chunk(24, handle, DEFAULT_ALIGN, t).unwrap();
        assert_eq!((chunk.as_ptr() as usize) % DEFAULT_ALIGN, 0);
    }
}

#[test]
fn clear_resets_usage_but_keeps_blocks() {
    let arena = Arena::new();
    let t = thread();
    let handle = arena.new_pool("clearable", t).unwrap();
    arena.get_chunk(128, handle, DEFAULT_ALIGN, t).unwrap();

    arena.clear(handle, t).unwrap();

    // A pool that was cleared still accepts new allocations immediately.
    let chunk = arena.get_chunk(32, handle, DEFAULT_ALIGN, t).unwrap();
    assert_eq!((chunk.as_ptr() as usize) % DEFAULT_ALIGN, 0);
}

#[test]
fn delete_refunds_the_budget() {
    let arena = Arena::new();
    let t = thread();
    let handle = arena.new_pool("throwaway", t).unwrap();
    arena.get_chunk(4096, handle, DEFAULT_ALIGN, t).unwrap();
    assert!(arena.budget().total_live_bytes() > 0);

    arena.delete(handle, t).unwrap();
    assert_eq!(arena.budget().total_live_bytes(), 0);
}

#[test]
fn delete_all_tears_down_every_pool() {
    let arena = Arena::new();
    let t = thread();
    for i in 0..5 {
        let handle = arena.new_pool(&format!("p{i}"), t).unwrap();
        arena.get_chunk(64, handle, DEFAULT_ALIGN, t).unwrap();
    }

    arena.delete_all();
    assert_eq!(arena.budget().total_live_bytes(), 0);
}

#[test]
fn registry_exhausts_then_reuses_freed_slot() {
    let arena = Arena::new();
    let t = thread();
    let mut last = 0;
    for i in 1..nebula_arena::config::MAX_POOLS {
        last = arena.new_pool(&format!("p{i}"), t).unwrap();
    }
    let err = arena.new_pool("overflow", t).unwrap_err();
    assert_eq!(err, ErrorKind::Exmp);

    arena.delete(last, t).unwrap();
    let reused = arena.new_pool("reused", t).unwrap();
    assert_eq!(reused, last);
}

#[test]
fn default_pool_auto_initializes_on_first_touch() {
    let arena = Arena::new();
    let t = thread();
    let chunk = arena.get_chunk(8, nebula_arena::config::DEFAULT_POOL, DEFAULT_ALIGN, t);
    assert!(chunk.is_ok());
}
