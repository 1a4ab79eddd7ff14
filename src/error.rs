//! Common Error Types for the Payout Worker
//!
//! Root error composing the per-module error enums. Per-request failures
//! never reach this type; it exists for startup wiring, where any variant
//! other than a transient one is fatal.

use thiserror::Error;

/// Root error type for the payout worker
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Configuration errors (fatal at startup)
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging errors (fatal at startup)
    #[error("logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Request store errors
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Ledger RPC errors
    #[error("ledger error: {0}")]
    Ledger(#[from] crate::ledger::LedgerError),

    /// Transfer execution errors
    #[error("transfer error: {0}")]
    Transfer(#[from] crate::processor::TransferError),
}

/// Result type alias using WorkerError
pub type Result<T> = std::result::Result<T, WorkerError>;
