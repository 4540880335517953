//! Error types for the chainlisten pipeline.

use thiserror::Error;

/// Errors that can occur while listening.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("block already exists")]
    AlreadyExists,

    #[error("not found")]
    NotFound,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Handler error in '{handler}': {reason}")]
    Handler { handler: String, reason: String },
}

impl ListenerError {
    /// Returns `true` if the error is a duplicate-delivery signal (benign).
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::AlreadyExists)
    }
}
