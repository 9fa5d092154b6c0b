//! A single arena: an ordered chain of [`Block`]s sharing one owning thread.
//!
//! The source keeps this chain as an intrusive linked list of block headers;
//! per the redesign note in the original specification, a `Vec<Block>` gives
//! the same append-only, head-to-tail-iterable sequence without hand-rolled
//! pointer links.

use std::thread::ThreadId;

use heapless::String as BoundedString;

use crate::block::Block;
use crate::config::MAX_LABEL_LEN;

/// Bounded label storage, one byte short of [`MAX_LABEL_LEN`] to leave room
/// for the C-string terminator the original reserves.
pub type Label = BoundedString<{ MAX_LABEL_LEN - 1 }>;

/// One arena: a label, an owning thread, and its chain of blocks.
pub struct Pool {
    initialized: bool,
    label: Label,
    owner_thread: Option<ThreadId>,
    blocks: Vec<Block>,
}

impl Pool {
    /// An empty, uninitialized slot, as held by unused registry entries.
    pub const fn empty() -> Pool {
        Pool {
            initialized: false,
            label: Label::new(),
            owner_thread: None,
            blocks: Vec::new(),
        }
    }

    /// Marks this slot initialized under `label`, owned by `thread`.
    ///
    /// `label` is truncated to fit; `none`/empty is replaced with `"-"`, as
    /// the pool registry's `new_pool` does.
    pub fn initialize(&mut self, label: &str, thread: ThreadId) {
        let effective = if label.is_empty() { "-" } else { label };
        let mut bounded = Label::new();
        for ch in effective.chars() {
            if bounded.push(ch).is_err() {
                break;
            }
        }
        self.label = bounded;
        self.owner_thread = Some(thread);
        self.initialized = true;
        self.blocks.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn owner_thread(&self) -> Option<ThreadId> {
        self.owner_thread
    }

    pub fn is_owned_by(&self, thread: ThreadId) -> bool {
        self.owner_thread == Some(thread)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn tail_mut(&mut self) -> Option<&mut Block> {
        self.blocks.last_mut()
    }

    /// Appends a freshly grown block, making it the new tail.
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Sum of every block's raw reserved capacity, for `delete`'s budget
    /// refund and the reporter's `Size` column.
    pub fn total_capacity(&self) -> usize {
        self.blocks.iter().map(Block::capacity).sum()
    }

    /// Sum of every block's `used`, for the reporter's `Used` column.
    pub fn total_used(&self) -> usize {
        self.blocks.iter().map(Block::used).sum()
    }

    /// Resets every block's `used` to zero, retaining the chain. Used by
    /// `clear(handle)`.
    pub fn clear_blocks(&mut self) {
        for block in &mut self.blocks {
            block.reset();
        }
    }

    /// Tears down this slot, returning the freed blocks' raw capacities so
    /// the caller can refund the budget, and resetting the slot to empty.
    pub fn take(&mut self) -> Vec<Block> {
        self.initialized = false;
        self.label = Label::new();
        self.owner_thread = None;
        std::mem::take(&mut self.blocks)
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::empty()
    }
}
