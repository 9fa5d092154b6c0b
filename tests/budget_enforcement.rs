//! The process-wide budget ceiling rejects growth that would exceed it,
//! without mutating any state, and independently tracks `memory_limit` and
//! `default_block_size`.

use nebula_arena::arena::Arena;
use nebula_arena::config::DEFAULT_ALIGN;
use nebula_arena::ErrorKind;

#[test]
fn allocation_past_the_limit_fails_with_exmm() {
    let arena = Arena::new();
    let t = std::thread::current().id();
    arena.set_memory_limit(5 * 1024 * 1024);

    let err = arena
        .get_chunk(6 * 1024 * 1024, nebula_arena::config::DEFAULT_POOL, DEFAULT_ALIGN, t)
        .unwrap_err();
    assert_eq!(err, ErrorKind::Exmm);
    assert_eq!(arena.budget().total_live_bytes(), 0);
}

#[test]
fn budget_is_refunded_on_pool_deletion_and_reset_on_delete_all() {
    let arena = Arena::new();
    let t = std::thread::current().id();
    let handle = arena.new_pool("sized", t).unwrap();
    arena.get_chunk(1024, handle, DEFAULT_ALIGN, t).unwrap();
    let charged = arena.budget().total_live_bytes();
    assert!(charged > 0);

    arena.delete(handle, t).unwrap();
    assert_eq!(arena.budget().total_live_bytes(), 0);

    let handle = arena.new_pool("sized-again", t).unwrap();
    arena.get_chunk(1024, handle, DEFAULT_ALIGN, t).unwrap();
    arena.delete_all();
    assert_eq!(arena.budget().total_live_bytes(), 0);
}

#[test]
fn block_size_and_memory_limit_are_independent_knobs() {
    let arena = Arena::new();
    arena.set_block_size(4096);
    arena.set_memory_limit(1024 * 1024);

    assert_eq!(arena.block_size(), 4096);
    assert_eq!(arena.memory_limit(), 1024 * 1024);

    arena.set_block_size(8192);
    assert_eq!(arena.memory_limit(), 1024 * 1024);
    assert_eq!(arena.block_size(), 8192);
}

#[test]
fn unset_limit_lazily_materializes_the_platform_default() {
    let arena = Arena::new();
    let expected = nebula_arena::config::default_memory_limit();
    assert_eq!(arena.memory_limit(), expected);
}
