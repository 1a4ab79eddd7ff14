//! Withdrawal Types
//!
//! Types for withdrawal requests as read from the request store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status of a withdrawal request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Request recorded, waiting for a worker
    Pending,
    /// Claimed by a worker, transfer in flight
    Processing,
    /// Payout sent, transaction reference recorded
    Completed,
    /// Terminal failure, error message recorded
    Failed,
}

impl WithdrawalStatus {
    /// Terminal states are never left again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a transition to `next` moves strictly forward.
    pub fn can_transition_to(&self, next: WithdrawalStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for WithdrawalStatus {
    type Err = RequestValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(RequestValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// A validated withdrawal request
///
/// Constructed at the store boundary via [`TryFrom<RequestRow>`]; rows that
/// fail validation never enter the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Unique request ID
    pub id: String,
    /// Requesting internal account
    pub source_account: String,
    /// Amount in internal token units
    pub amount: u64,
    /// Destination Solana address (base58)
    pub destination_address: String,
    /// Current status
    pub status: WithdrawalStatus,
    /// Transaction signature, set only on completed
    pub tx_reference: Option<String>,
    /// Error message, set only on failed
    pub error_message: Option<String>,
    /// When the request was created (store-assigned)
    pub created_at: Option<DateTime<Utc>>,
    /// Last store update (store-assigned)
    pub updated_at: Option<DateTime<Utc>>,
}

/// A raw store row before validation
///
/// Mirrors the `withdrawal_requests` table: every field the store can hand
/// back, loosely typed. The worker only trusts it after conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source_account: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub destination_address: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub tx_reference: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    "pending".to_string()
}

impl TryFrom<RequestRow> for WithdrawalRequest {
    type Error = RequestValidationError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        if row.id.is_empty() {
            return Err(RequestValidationError::MissingId);
        }
        if row.destination_address.is_empty() {
            return Err(RequestValidationError::MissingDestination(row.id));
        }
        let status: WithdrawalStatus = row.status.parse()?;

        Ok(Self {
            id: row.id,
            source_account: row.source_account,
            amount: row.amount,
            destination_address: row.destination_address,
            status,
            tx_reference: row.tx_reference,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A status-and-result write destined for the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub id: String,
    pub status: WithdrawalStatus,
    pub tx_reference: Option<String>,
    pub error_message: Option<String>,
}

impl StatusUpdate {
    /// Mark a request in flight.
    pub fn processing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: WithdrawalStatus::Processing,
            tx_reference: None,
            error_message: None,
        }
    }

    /// Mark a request paid out, recording the signature verbatim.
    pub fn completed(id: impl Into<String>, tx_reference: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: WithdrawalStatus::Completed,
            tx_reference: Some(tx_reference.into()),
            error_message: None,
        }
    }

    /// Mark a request terminally failed.
    pub fn failed(id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: WithdrawalStatus::Failed,
            tx_reference: None,
            error_message: Some(error_message.into()),
        }
    }
}

/// Validation errors for store rows
#[derive(Debug, Error)]
pub enum RequestValidationError {
    #[error("row is missing an id")]
    MissingId,

    #[error("request {0} has no destination address")]
    MissingDestination(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, status: &str) -> RequestRow {
        RequestRow {
            id: id.to_string(),
            source_account: "acct_1".to_string(),
            amount: 2_000_000,
            destination_address: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string(),
            status: status.to_string(),
            tx_reference: None,
            error_message: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_transitions_forward_only() {
        use WithdrawalStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));

        // No transition leaves a terminal state or goes backwards
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Failed.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_row_validation() {
        let request = WithdrawalRequest::try_from(row("wd_1", "pending")).unwrap();
        assert_eq!(request.id, "wd_1");
        assert_eq!(request.status, WithdrawalStatus::Pending);

        let mut bad = row("", "pending");
        bad.id = String::new();
        assert!(matches!(
            WithdrawalRequest::try_from(bad),
            Err(RequestValidationError::MissingId)
        ));

        let mut bad = row("wd_2", "pending");
        bad.destination_address = String::new();
        assert!(matches!(
            WithdrawalRequest::try_from(bad),
            Err(RequestValidationError::MissingDestination(_))
        ));

        assert!(matches!(
            WithdrawalRequest::try_from(row("wd_3", "exploded")),
            Err(RequestValidationError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&WithdrawalStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");

        let status: WithdrawalStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, WithdrawalStatus::Failed);
    }

    #[test]
    fn test_status_update_constructors() {
        let update = StatusUpdate::completed("wd_1", "sig123");
        assert_eq!(update.status, WithdrawalStatus::Completed);
        assert_eq!(update.tx_reference.as_deref(), Some("sig123"));
        assert!(update.error_message.is_none());

        let update = StatusUpdate::failed("wd_1", "boom");
        assert_eq!(update.status, WithdrawalStatus::Failed);
        assert!(update.tx_reference.is_none());
        assert_eq!(update.error_message.as_deref(), Some("boom"));
    }
}
