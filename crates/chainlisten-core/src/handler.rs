//! Block and reorg handler traits + registry.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ListenerError;
use crate::types::Block;

/// Context passed to handlers during dispatch.
#[derive(Debug, Clone)]
pub struct ListenContext {
    /// The block being forwarded.
    pub block: Block,
    /// The listener's chain slug (e.g. `"ethereum"`).
    pub chain: String,
}

/// Trait for consumers of in-order blocks.
///
/// Called once per forwarded block, in strictly increasing height order.
#[async_trait]
pub trait BlockHandler: Send + Sync {
    async fn handle_block(&self, block: &Block, ctx: &ListenContext) -> Result<(), ListenerError>;
}

/// Trait for reorg consumers.
///
/// Called when a forwarded block contradicts the tracked chain. `recent` is
/// the keeper's history, newest first, so the consumer can walk back to the
/// fork point.
#[async_trait]
pub trait ReorgHandler: Send + Sync {
    async fn on_reorg(&self, recent: &[Block], ctx: &ListenContext) -> Result<(), ListenerError>;
}

/// Registry of block + reorg handlers.
pub struct HandlerRegistry {
    block_handlers: Vec<Arc<dyn BlockHandler>>,
    reorg_handlers: Vec<Arc<dyn ReorgHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            block_handlers: vec![],
            reorg_handlers: vec![],
        }
    }

    /// Register a block handler (called for every forwarded block).
    pub fn on_block(&mut self, handler: Arc<dyn BlockHandler>) {
        self.block_handlers.push(handler);
    }

    /// Register a reorg handler.
    pub fn on_reorg(&mut self, handler: Arc<dyn ReorgHandler>) {
        self.reorg_handlers.push(handler);
    }

    /// Dispatch a block to all block handlers.
    pub async fn dispatch_block(
        &self,
        block: &Block,
        ctx: &ListenContext,
    ) -> Result<(), ListenerError> {
        for handler in &self.block_handlers {
            handler.handle_block(block, ctx).await?;
        }
        Ok(())
    }

    /// Dispatch a detected reorg to all reorg handlers.
    pub async fn dispatch_reorg(
        &self,
        recent: &[Block],
        ctx: &ListenContext,
    ) -> Result<(), ListenerError> {
        for handler in &self.reorg_handlers {
            handler.on_reorg(recent, ctx).await?;
        }
        Ok(())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counter(Arc<AtomicU32>);

    #[async_trait]
    impl BlockHandler for Counter {
        async fn handle_block(&self, _b: &Block, _c: &ListenContext) -> Result<(), ListenerError> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[async_trait]
    impl ReorgHandler for Counter {
        async fn on_reorg(&self, _r: &[Block], _c: &ListenContext) -> Result<(), ListenerError> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl BlockHandler for Failing {
        async fn handle_block(&self, _b: &Block, _c: &ListenContext) -> Result<(), ListenerError> {
            Err(ListenerError::Handler {
                handler: "failing".into(),
                reason: "boom".into(),
            })
        }
    }

    fn dummy_block() -> Block {
        Block {
            number: 1,
            hash: "0xa".into(),
            parent_hash: "0x0".into(),
            reorged_hash: None,
            timestamp: 0,
        }
    }

    fn dummy_ctx() -> ListenContext {
        ListenContext {
            block: dummy_block(),
            chain: "ethereum".into(),
        }
    }

    #[tokio::test]
    async fn block_handler_dispatch() {
        let count = Arc::new(AtomicU32::new(0));
        let mut registry = HandlerRegistry::new();
        registry.on_block(Arc::new(Counter(count.clone())));
        registry.on_block(Arc::new(Counter(count.clone())));

        let ctx = dummy_ctx();
        registry.dispatch_block(&dummy_block(), &ctx).await.unwrap();

        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn reorg_handler_dispatch() {
        let count = Arc::new(AtomicU32::new(0));
        let mut registry = HandlerRegistry::new();
        registry.on_reorg(Arc::new(Counter(count.clone())));

        let ctx = dummy_ctx();
        let recent = vec![dummy_block()];
        registry.dispatch_reorg(&recent, &ctx).await.unwrap();
        // Block dispatch does not fire reorg handlers.
        registry.dispatch_block(&dummy_block(), &ctx).await.unwrap();

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn handler_failure_propagates() {
        let mut registry = HandlerRegistry::new();
        registry.on_block(Arc::new(Failing));

        let ctx = dummy_ctx();
        let err = registry
            .dispatch_block(&dummy_block(), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ListenerError::Handler { .. }));
    }
}
