//! The allocation engine: `get_chunk`, the one path every public allocator
//! entry point funnels through.
//!
//! Grounded in `mp.c`'s `get_chunk()`, preserving its precondition order
//! exactly: size, handle range, initialization, alignment, then thread
//! ownership, in that order, first violation wins.

use std::mem::size_of;
use std::ptr::NonNull;
use std::thread::ThreadId;

use crate::budget::{Budget, Sign};
use crate::config::DEFAULT_ALIGN;
use crate::error::{AllocResult, ErrorKind};
use crate::pool::Pool;
use crate::registry::Registry;
use crate::utils::is_power_of_two;

/// Carves `size` bytes aligned to `align` out of the pool named by `handle`,
/// growing it if necessary.
///
/// `size` and `align` are assumed already non-negative; callers accepting a
/// signed size (the malloc-compatible surface) must reject negative values
/// with [`ErrorKind::Szng`] before reaching here.
pub fn get_chunk(
    registry: &Registry,
    budget: &Budget,
    size: usize,
    handle: i32,
    align: usize,
    thread: ThreadId,
) -> AllocResult<NonNull<u8>> {
    let idx = Registry::validate_handle(handle)?;
    registry.check_initialized(idx)?;

    let pointer_size = size_of::<usize>();
    if !is_power_of_two(align) || align < pointer_size {
        return Err(ErrorKind::Exal);
    }

    registry.touch_and_check_owner(idx, thread)?;

    let align = align.max(DEFAULT_ALIGN);
    let size = if size == 0 { 1 } else { size };

    registry.with_pool_mut(handle, |pool| bump_or_grow(pool, budget, size, align))?
}

fn bump_or_grow(pool: &mut Pool, budget: &Budget, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
    if let Some(tail) = pool.tail_mut() {
        if let Some(chunk) = tail.try_bump(size, align) {
            return Ok(chunk);
        }
    }
    grow(pool, budget, size, align)
}

fn grow(pool: &mut Pool, budget: &Budget, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
    let intended_capacity = size.max(budget.default_block_size());
    let raw_delta = intended_capacity.checked_add(align - 1).ok_or(ErrorKind::Exmm)?;

    budget.adjust_total(raw_delta, Sign::Grow)?;

    let mut block = match crate::block::Block::new(intended_capacity, align) {
        Ok(block) => block,
        Err(err) => {
            let _ = budget.adjust_total(raw_delta, Sign::Shrink);
            return Err(err);
        }
    };

    let chunk = block
        .try_bump(size, align)
        .expect("a block sized for this allocation must have room for it");
    pool.push_block(block);
    Ok(chunk)
}
