//! Shared types for the listening pipeline.

use serde::{Deserialize, Serialize};

// ─── Block ────────────────────────────────────────────────────────────────────

/// A block header as delivered by the ingestion layer.
///
/// Immutable once constructed; the keeper and the queue may both hold a copy
/// of the same block without coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block number (height).
    pub number: u64,
    /// Block hash (`0x…`). Unique per canonical block, but competing forks
    /// can carry different hashes at the same height.
    pub hash: String,
    /// Hash the block at `number - 1` is expected to have.
    pub parent_hash: String,
    /// Hash of a block this one superseded, if the node reported one.
    pub reorged_hash: Option<String>,
    /// Unix timestamp of the block (seconds since epoch).
    pub timestamp: i64,
}

impl Block {
    /// Returns `true` if `parent` is the direct parent of `self`.
    pub fn extends(&self, parent: &Block) -> bool {
        self.number == parent.number + 1 && self.parent_hash == parent.hash
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
