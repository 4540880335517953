//! The main listen loop — fetches new heads, reorders them, and forwards
//! them to registered handlers in strict height order.
//!
//! On each poll tick:
//!   - Fetch headers for every height above the last fetched head
//!   - Insert them into the reordering queue (out-of-order tolerant)
//!   - Drain the queue front: skip known gaps, run the reorg predicate,
//!     dispatch handlers, and record the forwarded block in the keeper

use std::sync::Arc;
use std::time::Duration;

use chainlisten_core::config::{ListenerConfig, ListenerState};
use chainlisten_core::error::ListenerError;
use chainlisten_core::handler::{HandlerRegistry, ListenContext};
use chainlisten_core::keeper::{BaseBlockKeeper, Keeper};
use chainlisten_core::queue::{BlockQueue, Dequeued};
use chainlisten_core::types::Block;

use crate::client::{BlockFetcher, EvmRpcClient};

/// The core listener implementation.
pub struct BlockListener<C: EvmRpcClient> {
    config: ListenerConfig,
    fetcher: BlockFetcher<C>,
    keeper: Arc<BaseBlockKeeper>,
    queue: Arc<BlockQueue>,
    handlers: HandlerRegistry,
    state: ListenerState,
}

impl<C: EvmRpcClient> BlockListener<C> {
    pub fn new(config: ListenerConfig, client: C, handlers: HandlerRegistry) -> Self {
        Self {
            fetcher: BlockFetcher::new(client),
            keeper: Arc::new(BaseBlockKeeper::new(config.keeper_capacity)),
            queue: Arc::new(BlockQueue::new(config.queue_size)),
            handlers,
            state: ListenerState::Idle,
            config,
        }
    }

    /// Shared handle to the reordering queue, for external producers that
    /// push blocks from their own subscription.
    pub fn queue(&self) -> Arc<BlockQueue> {
        self.queue.clone()
    }

    /// Shared handle to the block keeper.
    pub fn keeper(&self) -> Arc<BaseBlockKeeper> {
        self.keeper.clone()
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Run the listen loop until the configured stop block or an error.
    pub async fn run(&mut self) -> Result<(), ListenerError> {
        let head = self.fetcher.head_block_number().await?;
        let start = self.config.start_block.unwrap_or(head);
        self.queue.set_block_number(start);
        self.state = ListenerState::Live;

        tracing::info!(
            chain = %self.config.chain,
            start,
            head,
            "Listener starting"
        );

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut next = start;

        loop {
            let head = self.fetcher.head_block_number().await?;
            if next <= head {
                let blocks = self
                    .fetcher
                    .blocks(next, head, self.config.batch_size)
                    .await?;
                tracing::debug!(from = next, to = head, fetched = blocks.len(), "New heads");
                for block in blocks {
                    self.queue.insert(block);
                }
                next = head + 1;
            }

            self.drain().await?;

            if let Some(stop_at) = self.config.stop_at {
                if self.queue.block_number() > stop_at {
                    self.state = ListenerState::Stopped;
                    tracing::info!(at = stop_at, "Listener reached stop block");
                    return Ok(());
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Forward everything contiguous at the front of the queue.
    async fn drain(&mut self) -> Result<(), ListenerError> {
        loop {
            match self.queue.dequeue() {
                Dequeued::Empty => return Ok(()),
                Dequeued::Gap { number } => {
                    tracing::debug!(number, "No block delivered for height, sliding past");
                }
                Dequeued::Block(block) => self.forward(block).await?,
            }
        }
    }

    async fn forward(&mut self, block: Block) -> Result<(), ListenerError> {
        let ctx = ListenContext {
            block: block.clone(),
            chain: self.config.chain.clone(),
        };

        let reorg = match self.keeper.is_reorg(&block) {
            Ok(reorg) => reorg,
            // First block ever seen: nothing to contradict.
            Err(ListenerError::NotFound) => false,
            Err(err) => return Err(err),
        };

        if reorg {
            self.state = ListenerState::ReorgRecovery;
            tracing::warn!(
                number = block.number,
                hash = %block.hash,
                "Reorg detected"
            );
            let recent = self.keeper.get_recent_blocks(self.keeper.cap())?;
            self.handlers.dispatch_reorg(&recent, &ctx).await?;
        }

        self.handlers.dispatch_block(&block, &ctx).await?;

        match self.keeper.add(block) {
            Ok(()) => {}
            Err(err) if err.is_duplicate() => {
                tracing::debug!("Duplicate delivery of a tracked block ignored");
            }
            Err(err) => return Err(err),
        }

        self.state = ListenerState::Live;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chainlisten_core::handler::{BlockHandler, ReorgHandler};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn block(number: u64, hash: &str, parent: &str) -> Block {
        Block {
            number,
            hash: hash.into(),
            parent_hash: parent.into(),
            reorged_hash: None,
            timestamp: (number * 12) as i64,
        }
    }

    /// Serves a fixed set of headers; heights absent from the map are gaps.
    struct MockClient {
        head: u64,
        blocks: HashMap<u64, Block>,
    }

    impl MockClient {
        fn chain(heights: impl IntoIterator<Item = u64>) -> Self {
            let mut blocks = HashMap::new();
            let mut head = 0;
            for n in heights {
                blocks.insert(n, block(n, &format!("0x{n:x}"), &format!("0x{:x}", n - 1)));
                head = head.max(n);
            }
            Self { head, blocks }
        }
    }

    #[async_trait]
    impl EvmRpcClient for MockClient {
        async fn get_block_number(&self) -> Result<u64, ListenerError> {
            Ok(self.head)
        }

        async fn get_block(&self, number: u64) -> Result<Option<Block>, ListenerError> {
            Ok(self.blocks.get(&number).cloned())
        }
    }

    #[derive(Default)]
    struct Recorder {
        forwarded: Mutex<Vec<u64>>,
        reorgs: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl BlockHandler for Recorder {
        async fn handle_block(&self, b: &Block, _c: &ListenContext) -> Result<(), ListenerError> {
            self.forwarded.lock().unwrap().push(b.number);
            Ok(())
        }
    }

    #[async_trait]
    impl ReorgHandler for Recorder {
        async fn on_reorg(&self, _r: &[Block], c: &ListenContext) -> Result<(), ListenerError> {
            self.reorgs.lock().unwrap().push(c.block.number);
            Ok(())
        }
    }

    fn config(start: u64, stop: u64) -> ListenerConfig {
        ListenerConfig {
            start_block: Some(start),
            stop_at: Some(stop),
            poll_interval_ms: 1,
            queue_size: 8,
            keeper_capacity: 16,
            ..ListenerConfig::default()
        }
    }

    #[tokio::test]
    async fn forwards_blocks_in_order() {
        let recorder = Arc::new(Recorder::default());
        let mut handlers = HandlerRegistry::new();
        handlers.on_block(recorder.clone());

        let client = MockClient::chain(100..=105);
        let mut listener = BlockListener::new(config(100, 105), client, handlers);
        listener.run().await.unwrap();

        assert_eq!(*recorder.forwarded.lock().unwrap(), vec![100, 101, 102, 103, 104, 105]);
        assert_eq!(listener.state(), ListenerState::Stopped);
        assert_eq!(listener.keeper().head().unwrap().number, 105);
    }

    #[tokio::test]
    async fn slides_past_missing_heights() {
        let recorder = Arc::new(Recorder::default());
        let mut handlers = HandlerRegistry::new();
        handlers.on_block(recorder.clone());

        // Height 102 never shows up.
        let client = MockClient::chain([100, 101, 103, 104]);
        let mut listener = BlockListener::new(config(100, 104), client, handlers);
        listener.run().await.unwrap();

        assert_eq!(*recorder.forwarded.lock().unwrap(), vec![100, 101, 103, 104]);
    }

    #[tokio::test]
    async fn fires_reorg_handlers_on_fork() {
        let recorder = Arc::new(Recorder::default());
        let mut handlers = HandlerRegistry::new();
        handlers.on_block(recorder.clone());
        handlers.on_reorg(recorder.clone());

        let mut client = MockClient::chain(100..=103);
        // Block 102 does not descend from 101's hash; 103 follows the fork.
        client.blocks.insert(102, block(102, "0x66b", "0x65f"));
        client.blocks.insert(103, block(103, "0x67", "0x66b"));
        let mut listener = BlockListener::new(config(100, 103), client, handlers);
        listener.run().await.unwrap();

        // All blocks still forwarded, with a reorg flagged at 102.
        assert_eq!(*recorder.forwarded.lock().unwrap(), vec![100, 101, 102, 103]);
        assert_eq!(*recorder.reorgs.lock().unwrap(), vec![102]);
    }

    #[tokio::test]
    async fn starts_from_chain_head_without_start_block() {
        let recorder = Arc::new(Recorder::default());
        let mut handlers = HandlerRegistry::new();
        handlers.on_block(recorder.clone());

        let client = MockClient::chain(200..=204);
        let cfg = ListenerConfig {
            start_block: None,
            stop_at: Some(204),
            poll_interval_ms: 1,
            ..ListenerConfig::default()
        };
        let mut listener = BlockListener::new(cfg, client, handlers);
        listener.run().await.unwrap();

        // Only the head at startup, nothing historical.
        assert_eq!(*recorder.forwarded.lock().unwrap(), vec![204]);
    }
}
