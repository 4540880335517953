//! EVM block header fetching.
//!
//! Wraps JSON-RPC `eth_blockNumber` and `eth_getBlockByNumber` behind a
//! provider trait, with range batching for catch-up fetches after a long
//! poll gap or a resubscription.

use async_trait::async_trait;
use serde_json::Value;

use chainlisten_core::error::ListenerError;
use chainlisten_core::types::Block;

/// Trait for fetching EVM block headers from a JSON-RPC provider.
#[async_trait]
pub trait EvmRpcClient: Send + Sync {
    /// Current chain head number (`eth_blockNumber`).
    async fn get_block_number(&self) -> Result<u64, ListenerError>;

    /// Header at `number`, or `None` if the node does not have it yet.
    async fn get_block(&self, number: u64) -> Result<Option<Block>, ListenerError>;

    /// Headers for `[from, to]` inclusive, missing heights skipped.
    ///
    /// The default implementation issues one `get_block` per height;
    /// providers with a batch endpoint should override it.
    async fn get_blocks(&self, from: u64, to: u64) -> Result<Vec<Block>, ListenerError> {
        let mut blocks = Vec::new();
        for number in from..=to {
            if let Some(block) = self.get_block(number).await? {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }
}

/// Block fetcher that wraps an `EvmRpcClient` and adds batching logic.
pub struct BlockFetcher<C> {
    client: C,
}

impl<C: EvmRpcClient> BlockFetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetch the current chain head block number.
    pub async fn head_block_number(&self) -> Result<u64, ListenerError> {
        self.client.get_block_number().await
    }

    /// Fetch a single header by number.
    pub async fn block(&self, number: u64) -> Result<Option<Block>, ListenerError> {
        self.client.get_block(number).await
    }

    /// Fetch all headers in `[from, to]`, splitting the range so that no
    /// single request spans more than `max_range` heights.
    pub async fn blocks(
        &self,
        from: u64,
        to: u64,
        max_range: u64,
    ) -> Result<Vec<Block>, ListenerError> {
        if to < from {
            return Ok(vec![]);
        }
        if to - from <= max_range {
            return self.client.get_blocks(from, to).await;
        }
        // Split into chunks
        let mut all_blocks = Vec::new();
        let mut start = from;
        while start <= to {
            let end = (start + max_range).min(to);
            let chunk = self.client.get_blocks(start, end).await?;
            all_blocks.extend(chunk);
            start = end + 1;
        }
        Ok(all_blocks)
    }
}

/// Parse a hex-encoded string (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> u64 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).unwrap_or(0)
}

/// Returns `true` for an absent or all-zero hash field.
fn is_zero_hash(s: &str) -> bool {
    let s = s.strip_prefix("0x").unwrap_or(s);
    s.is_empty() || s.bytes().all(|b| b == b'0')
}

/// Convert a JSON block header response to a `Block`.
///
/// Nodes report a superseded hash either as a missing field or as the
/// all-zero hash; both map to `None`.
pub fn block_from_json(v: &Value) -> Option<Block> {
    let reorged_hash = v["reorgedHash"]
        .as_str()
        .filter(|h| !is_zero_hash(h))
        .map(str::to_string);
    Some(Block {
        number: parse_hex_u64(v["number"].as_str()?),
        hash: v["hash"].as_str()?.to_string(),
        parent_hash: v["parentHash"].as_str()?.to_string(),
        reorged_hash,
        timestamp: parse_hex_u64(v["timestamp"].as_str()?) as i64,
    })
}
