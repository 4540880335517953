//! Fluent builder API for creating listeners.
//!
//! # Example
//!
//! ```rust,no_run
//! use chainlisten_evm::ListenerBuilder;
//!
//! let config = ListenerBuilder::new()
//!     .chain("ethereum")
//!     .start_block(19_000_000)
//!     .keeper_capacity(128)
//!     .queue_size(64)
//!     .poll_interval_ms(2000)
//!     .build_config();
//! ```

use chainlisten_core::config::ListenerConfig;

/// Fluent builder for `ListenerConfig`.
#[derive(Default)]
pub struct ListenerBuilder {
    config: ListenerConfig,
}

impl ListenerBuilder {
    pub fn new() -> Self {
        Self {
            config: ListenerConfig::default(),
        }
    }

    /// Set the chain to listen on.
    pub fn chain(mut self, chain: impl Into<String>) -> Self {
        self.config.chain = chain.into();
        self
    }

    /// Set the keeper capacity (confirmed heads retained for reorg checks).
    pub fn keeper_capacity(mut self, capacity: usize) -> Self {
        self.config.keeper_capacity = capacity;
        self
    }

    /// Set the reordering window width in blocks.
    pub fn queue_size(mut self, size: usize) -> Self {
        self.config.queue_size = size;
        self
    }

    /// Set the first block to listen from.
    pub fn start_block(mut self, block: u64) -> Self {
        self.config.start_block = Some(block);
        self
    }

    /// Set the last block (for bounded runs).
    pub fn stop_at(mut self, block: u64) -> Self {
        self.config.stop_at = Some(block);
        self
    }

    /// Set the head polling interval in milliseconds.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the number of headers per batched fetch.
    pub fn batch_size(mut self, size: u64) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Build the `ListenerConfig`.
    pub fn build_config(self) -> ListenerConfig {
        self.config
    }
}
