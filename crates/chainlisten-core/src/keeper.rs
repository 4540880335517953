//! Block keeper — a bounded, hash-indexed history of recently confirmed
//! blocks, used to detect chain reorganizations against the tracked head.
//!
//! The keeper never reconciles forks itself: it flags a candidate block as a
//! reorg, and the listen loop walks the tracked history (via [`Keeper::get`]
//! and [`Keeper::get_recent_blocks`]) to find the fork point.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::ListenerError;
use crate::types::Block;

/// Capability set the listen loop consumes.
///
/// `BaseBlockKeeper` is the in-memory implementation; a persistent-backed
/// keeper can be substituted without changing callers. Lookup operations are
/// fallible at the trait level so such backends can surface their own errors;
/// the base implementation only fails where the contract says so.
pub trait Keeper: Send + Sync {
    /// Reset the keeper to its empty state.
    fn init(&self) -> Result<(), ListenerError>;

    /// Track a new block. Fails with [`ListenerError::AlreadyExists`] if a
    /// block with the same hash is already tracked; evicts the oldest entry
    /// when the keeper is at capacity.
    fn add(&self, block: Block) -> Result<(), ListenerError>;

    /// Number of blocks currently tracked.
    fn len(&self) -> usize;

    /// Returns `true` if no blocks are tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed capacity set at construction.
    fn cap(&self) -> usize;

    /// Returns `true` if a block with `hash` is currently tracked.
    fn exists(&self, hash: &str) -> Result<bool, ListenerError>;

    /// Look up a tracked block by hash.
    fn get(&self, hash: &str) -> Result<Block, ListenerError>;

    /// The most recently added block.
    fn head(&self) -> Result<Block, ListenerError>;

    /// Whether `candidate` contradicts the tracked chain.
    ///
    /// True when the candidate repeats an already-confirmed height, or when
    /// it extends the chain by exactly one height without descending from
    /// the current head. Fails with [`ListenerError::NotFound`] while the
    /// keeper is empty. Forward jumps of more than one height are not this
    /// predicate's concern; the reordering queue prevents them from reaching
    /// the keeper out of order.
    fn is_reorg(&self, candidate: &Block) -> Result<bool, ListenerError>;

    /// Up to `n` most recent blocks, newest first, clamped to [`Keeper::len`].
    /// Fails with [`ListenerError::InvalidArgument`] if `n` is zero.
    fn get_recent_blocks(&self, n: usize) -> Result<Vec<Block>, ListenerError>;
}

struct KeeperInner {
    /// Tracked blocks, oldest first.
    history: VecDeque<Block>,
    /// Hash → absolute sequence number of the block in `history`.
    index: HashMap<String, u64>,
    /// Sequence number of the current front of `history`.
    front_seq: u64,
}

impl KeeperInner {
    fn position(&self, seq: u64) -> usize {
        (seq - self.front_seq) as usize
    }
}

/// In-memory [`Keeper`] with FIFO eviction.
///
/// Every public operation takes the internal lock for its full duration, so
/// a shared `Arc<BaseBlockKeeper>` is safe under concurrent producers.
pub struct BaseBlockKeeper {
    capacity: usize,
    inner: Mutex<KeeperInner>,
}

impl BaseBlockKeeper {
    /// Create an empty keeper holding at most `capacity` blocks.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; a keeper that cannot hold a head is a
    /// configuration mistake, not a runtime condition.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "invalid capacity, should be at least 1");
        Self {
            capacity,
            inner: Mutex::new(KeeperInner {
                history: VecDeque::with_capacity(capacity),
                index: HashMap::with_capacity(capacity),
                front_seq: 0,
            }),
        }
    }
}

impl Keeper for BaseBlockKeeper {
    fn init(&self) -> Result<(), ListenerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.history.clear();
        inner.index.clear();
        inner.front_seq = 0;
        Ok(())
    }

    fn add(&self, block: Block) -> Result<(), ListenerError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.index.contains_key(&block.hash) {
            return Err(ListenerError::AlreadyExists);
        }

        if inner.history.len() == self.capacity {
            if let Some(oldest) = inner.history.pop_front() {
                inner.index.remove(&oldest.hash);
                inner.front_seq += 1;
            }
        }

        let seq = inner.front_seq + inner.history.len() as u64;
        inner.index.insert(block.hash.clone(), seq);
        inner.history.push_back(block);
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap().history.len()
    }

    fn cap(&self) -> usize {
        self.capacity
    }

    fn exists(&self, hash: &str) -> Result<bool, ListenerError> {
        Ok(self.inner.lock().unwrap().index.contains_key(hash))
    }

    fn get(&self, hash: &str) -> Result<Block, ListenerError> {
        let inner = self.inner.lock().unwrap();
        let seq = *inner.index.get(hash).ok_or(ListenerError::NotFound)?;
        inner
            .history
            .get(inner.position(seq))
            .cloned()
            .ok_or(ListenerError::NotFound)
    }

    fn head(&self) -> Result<Block, ListenerError> {
        self.inner
            .lock()
            .unwrap()
            .history
            .back()
            .cloned()
            .ok_or(ListenerError::NotFound)
    }

    fn is_reorg(&self, candidate: &Block) -> Result<bool, ListenerError> {
        let inner = self.inner.lock().unwrap();
        let head = inner.history.back().ok_or(ListenerError::NotFound)?;

        if candidate.number <= head.number {
            // The candidate would replace an already-confirmed height.
            return Ok(true);
        }
        if candidate.number == head.number + 1 && candidate.parent_hash != head.hash {
            // Extends the chain but does not descend from the head.
            return Ok(true);
        }
        Ok(false)
    }

    fn get_recent_blocks(&self, n: usize) -> Result<Vec<Block>, ListenerError> {
        if n == 0 {
            return Err(ListenerError::InvalidArgument(
                "number of blocks must be positive".into(),
            ));
        }
        let inner = self.inner.lock().unwrap();
        Ok(inner.history.iter().rev().take(n).cloned().collect())
    }
}
