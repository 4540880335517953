//! chainlisten-core — chain-tip tracking and block reordering for the
//! reorg-safe block listener.
//!
//! # Architecture
//!
//! ```text
//! ListenerBuilder → BlockListener
//!                       ├── BlockQueue      (height-indexed reordering window)
//!                       ├── BaseBlockKeeper (confirmed history, reorg predicate)
//!                       └── HandlerRegistry (user block/reorg handlers)
//! ```
//!
//! The two data structures are independent and internally locked; the listen
//! loop (in `chainlisten-evm`) sequences them: blocks land in the queue in
//! arrival order, leave it in height order, and only forwarded blocks enter
//! the keeper.

pub mod config;
pub mod error;
pub mod handler;
pub mod keeper;
pub mod queue;
pub mod types;

pub use config::{ListenerConfig, ListenerState};
pub use error::ListenerError;
pub use handler::{BlockHandler, HandlerRegistry, ListenContext, ReorgHandler};
pub use keeper::{BaseBlockKeeper, Keeper};
pub use queue::{BlockQueue, Dequeued};
pub use types::Block;
