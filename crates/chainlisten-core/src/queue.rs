//! Height-indexed reordering queue.
//!
//! A fixed-capacity circular buffer whose slots are addressed by absolute
//! block height rather than insertion order. Concurrent fetchers insert
//! blocks in whatever order they arrive; the drain side removes them in
//! strict height order, with heights that never arrived reported as gaps.
//!
//! The buffer represents the height window
//! `[block_number, block_number + max_size - 1]`. Inserts below the window
//! are dropped, inserts beyond it slide the window forward by evicting the
//! front, and re-delivery of a height already buffered overwrites the slot
//! (last write wins). None of these are errors: the structure favors bounded
//! memory and forward progress over alerting on every discard.

use std::fmt;
use std::sync::Mutex;

use crate::types::Block;

/// Outcome of a [`BlockQueue::dequeue`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    /// No slot in the buffer is occupied; the base height did not advance.
    Empty,
    /// The front slot held no block; the window advanced past the gap.
    Gap {
        /// The height that was skipped.
        number: u64,
    },
    /// A buffered block, removed from the front of the window.
    Block(Block),
}

struct QueueInner {
    slots: Vec<Option<Block>>,
    /// Physical index of the logical front slot.
    start: usize,
    /// Count of occupied slots.
    size: usize,
    /// Height represented by `slots[start]`; 0 until the first insert (or
    /// an explicit [`BlockQueue::set_block_number`]).
    block_number: u64,
}

impl QueueInner {
    fn insert_at(&mut self, block: Block, offset: usize) {
        let max_size = self.slots.len();
        let idx = (self.start + offset) % max_size;
        if self.slots[idx].replace(block).is_none() {
            self.size += 1;
        }
    }

    fn dequeue(&mut self) -> Dequeued {
        if self.size == 0 {
            return Dequeued::Empty;
        }
        let number = self.block_number;
        let taken = self.slots[self.start].take();
        self.start = (self.start + 1) % self.slots.len();
        self.block_number += 1;
        match taken {
            Some(block) => {
                self.size -= 1;
                Dequeued::Block(block)
            }
            None => Dequeued::Gap { number },
        }
    }
}

/// Reordering ring buffer shared between fetch tasks and the drain loop.
///
/// Every public operation takes the internal lock for its full duration;
/// no operation blocks on anything but that lock.
pub struct BlockQueue {
    max_size: usize,
    inner: Mutex<QueueInner>,
}

impl BlockQueue {
    /// Create an empty queue holding at most `max_size` blocks.
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is zero.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size >= 1, "invalid max size, should be at least 1");
        Self {
            max_size,
            inner: Mutex::new(QueueInner {
                slots: vec![None; max_size],
                start: 0,
                size: 0,
                block_number: 0,
            }),
        }
    }

    /// Insert `block` at the slot for its height, relative to the current
    /// base height.
    ///
    /// The first insert ever fixes the base height. Blocks below the base
    /// are silently discarded; blocks beyond the window evict the front
    /// until they fit; a block at an already-buffered height overwrites it.
    pub fn insert(&self, block: Block) {
        let mut q = self.inner.lock().unwrap();

        if q.block_number == 0 {
            q.block_number = block.number;
            q.insert_at(block, 0);
            return;
        }

        if block.number < q.block_number {
            return; // stale or duplicate delivery below the window
        }

        if q.size == self.max_size {
            q.dequeue();
            if block.number < q.block_number {
                return; // the evicted front slot was this height's
            }
        }

        while block.number - q.block_number >= self.max_size as u64 {
            if q.size == 0 {
                // Nothing left to evict; jump the window to the target.
                q.block_number = block.number;
                break;
            }
            q.dequeue();
        }

        let offset = (block.number - q.block_number) as usize;
        q.insert_at(block, offset);
    }

    /// Remove and return the front of the window.
    ///
    /// Advances the base height by one whether or not the front slot held a
    /// block, so a draining consumer can slide past known gaps. Only a fully
    /// unoccupied buffer leaves the base height untouched.
    pub fn dequeue(&self) -> Dequeued {
        self.inner.lock().unwrap().dequeue()
    }

    /// The block at the front of the window, without advancing.
    ///
    /// `None` when the buffer is empty or the front slot is an unfilled gap.
    pub fn peek(&self) -> Option<Block> {
        let q = self.inner.lock().unwrap();
        if q.size == 0 {
            return None;
        }
        q.slots[q.start].clone()
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().size == 0
    }

    /// Returns `true` if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.inner.lock().unwrap().size == self.max_size
    }

    /// Number of occupied slots (not the width of the logical window).
    pub fn size(&self) -> usize {
        self.inner.lock().unwrap().size
    }

    /// Empty all slots and reset the front to physical index 0.
    ///
    /// The base height is preserved; call [`BlockQueue::set_block_number`]
    /// to resynchronize after a restart or resubscription.
    pub fn clear(&self) {
        let mut q = self.inner.lock().unwrap();
        for slot in q.slots.iter_mut() {
            *slot = None;
        }
        q.start = 0;
        q.size = 0;
    }

    /// Snapshot of the buffered blocks in ascending height order, gaps
    /// skipped.
    pub fn values(&self) -> Vec<Block> {
        let q = self.inner.lock().unwrap();
        let mut values = Vec::with_capacity(q.size);
        for i in 0..self.max_size {
            if let Some(block) = &q.slots[(q.start + i) % self.max_size] {
                values.push(block.clone());
            }
        }
        values
    }

    /// Current base height of the window.
    pub fn block_number(&self) -> u64 {
        self.inner.lock().unwrap().block_number
    }

    /// Overwrite the base height, e.g. when the consumer already knows the
    /// next expected height after a resubscription.
    pub fn set_block_number(&self, number: u64) {
        self.inner.lock().unwrap().block_number = number;
    }
}

impl fmt::Display for BlockQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heights: Vec<String> = self
            .values()
            .iter()
            .map(|b| b.number.to_string())
            .collect();
        write!(f, "BlockQueue[{}]", heights.join(", "))
    }
}
