//! Request Store Trait Definition
//!
//! Abstract interface over the remote request store. Implementations:
//! - `HttpRequestStore` - production store over its REST surface
//! - `MemoryRequestStore` - in-memory store for tests and local runs

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{StatusUpdate, WithdrawalRequest};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Http(String),

    #[error("store rejected call: status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("response decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Http(e.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Request store operations consumed by the worker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// List all requests currently in `pending` status.
    ///
    /// Rows that fail validation are quarantined by the implementation and
    /// never returned here.
    async fn list_pending(&self) -> StoreResult<Vec<WithdrawalRequest>>;

    /// Atomically claim a request: `pending -> processing` conditioned on
    /// the current status. Returns `false` when the condition did not match
    /// (already claimed, or no longer pending).
    async fn claim(&self, id: &str) -> StoreResult<bool>;

    /// Write a status-and-result update. Idempotent: repeating a terminal
    /// update with the same arguments has no further effect.
    async fn update_status(&self, update: &StatusUpdate) -> StoreResult<()>;
}
