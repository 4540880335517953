//! Listener configuration and state types.

use serde::{Deserialize, Serialize};

/// Configuration for a listener instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Chain to listen on (e.g. `"ethereum"`).
    pub chain: String,
    /// How many confirmed heads the keeper retains for reorg detection.
    /// 128 covers deep reorgs for all major EVM chains.
    pub keeper_capacity: usize,
    /// Width of the reordering window, in blocks. Blocks arriving more than
    /// this far ahead of the drain point slide the window forward.
    pub queue_size: usize,
    /// First block to listen from. `None` = current chain head at startup.
    pub start_block: Option<u64>,
    /// Optional last block (for bounded runs). `None` = run forever.
    pub stop_at: Option<u64>,
    /// Head polling interval (milliseconds).
    pub poll_interval_ms: u64,
    /// How many block headers to request per batched fetch.
    pub batch_size: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            chain: "ethereum".into(),
            keeper_capacity: 128,
            queue_size: 64,
            start_block: None,
            stop_at: None,
            poll_interval_ms: 2000,
            batch_size: 100,
        }
    }
}

/// Runtime state of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListenerState {
    /// Not yet started.
    Idle,
    /// Following the chain tip.
    Live,
    /// A reorg was detected and is being dispatched.
    ReorgRecovery,
    /// Terminated.
    Stopped,
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Live => write!(f, "live"),
            Self::ReorgRecovery => write!(f, "reorg-recovery"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
