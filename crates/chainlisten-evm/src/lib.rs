//! chainlisten-evm — EVM block fetcher and listen loop.

pub mod builder;
pub mod client;
pub mod listen_loop;

pub use builder::ListenerBuilder;
pub use client::{BlockFetcher, EvmRpcClient};
pub use listen_loop::BlockListener;
