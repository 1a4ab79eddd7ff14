//! Shared Types Module
//!
//! Data types shared across the payout worker.

pub mod withdrawal;

// Re-exports for convenience
pub use withdrawal::{
    RequestRow, RequestValidationError, StatusUpdate, WithdrawalRequest, WithdrawalStatus,
};
