use catalog_client::ClientError;
use thiserror::Error;

use crate::db::StorageError;

/// Errors that abort a sync run
///
/// Per-item problems never surface here; they are collected as
/// `SyncIssue`s in the run summary.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Source or destination unreachable, or a batch-level non-2xx
    #[error("Transport error: {0}")]
    Transport(#[from] ClientError),

    /// Mapping store, cursor or queue failure
    #[error("Store error: {0}")]
    Store(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A collaborator returned something the engine cannot interpret
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl SyncError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

/// Result type for engine operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;
