//! Status Updater
//!
//! Thin contract wrapper around the store's update operation. Owns the
//! persistence-failure policy: the claim gates the transfer and so reports
//! failure, while terminal writes are logged and swallowed because a
//! submitted transfer cannot be rolled back by a failed status write.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::store::RequestStore;
use crate::types::StatusUpdate;

#[derive(Clone)]
pub struct StatusUpdater {
    store: Arc<dyn RequestStore>,
}

impl StatusUpdater {
    pub fn new(store: Arc<dyn RequestStore>) -> Self {
        Self { store }
    }

    /// Try to claim a request for processing.
    ///
    /// Returns `false` both when another worker won the claim and when the
    /// store call failed: either way the transfer must not proceed without
    /// a recorded in-flight marker, and the request stays `pending` for a
    /// later cycle.
    pub async fn claim(&self, id: &str) -> bool {
        match self.store.claim(id).await {
            Ok(true) => true,
            Ok(false) => {
                debug!(request_id = %id, "request no longer pending, skipping");
                false
            }
            Err(e) => {
                warn!(request_id = %id, error = %e, "claim failed, leaving request pending");
                false
            }
        }
    }

    /// Record a completed payout with its transaction reference.
    pub async fn complete(&self, id: &str, tx_reference: &str) {
        let update = StatusUpdate::completed(id, tx_reference);
        if let Err(e) = self.store.update_status(&update).await {
            // The transfer already happened; nothing to roll back. The
            // request is left in `processing` for operator reconciliation.
            error!(request_id = %id, tx_reference = %tx_reference, error = %e,
                "failed to record completed payout");
        }
    }

    /// Record a terminal failure with its message.
    pub async fn fail(&self, id: &str, message: &str) {
        let update = StatusUpdate::failed(id, message);
        if let Err(e) = self.store.update_status(&update).await {
            error!(request_id = %id, error = %e, "failed to record failed withdrawal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRequestStore, MockRequestStore, StoreError};
    use crate::types::{WithdrawalRequest, WithdrawalStatus};

    fn pending(id: &str) -> WithdrawalRequest {
        WithdrawalRequest {
            id: id.to_string(),
            source_account: "acct_1".to_string(),
            amount: 1,
            destination_address: "dest".to_string(),
            status: WithdrawalStatus::Pending,
            tx_reference: None,
            error_message: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_claim_then_complete() {
        let store = Arc::new(MemoryRequestStore::new());
        store.insert(pending("wd_1")).await;

        let updater = StatusUpdater::new(store.clone());
        assert!(updater.claim("wd_1").await);
        updater.complete("wd_1", "sig123").await;

        let request = store.get("wd_1").await.unwrap();
        assert_eq!(request.status, WithdrawalStatus::Completed);
        assert_eq!(request.tx_reference.as_deref(), Some("sig123"));
    }

    #[tokio::test]
    async fn test_claim_store_error_reports_false() {
        let mut store = MockRequestStore::new();
        store
            .expect_claim()
            .returning(|_| Err(StoreError::Http("store unreachable".to_string())));

        let updater = StatusUpdater::new(Arc::new(store));
        assert!(!updater.claim("wd_1").await);
    }

    #[tokio::test]
    async fn test_terminal_write_error_is_swallowed() {
        let mut store = MockRequestStore::new();
        store
            .expect_update_status()
            .returning(|_| Err(StoreError::Http("store unreachable".to_string())));

        // Must not panic or propagate
        let updater = StatusUpdater::new(Arc::new(store));
        updater.complete("wd_1", "sig123").await;
        updater.fail("wd_1", "boom").await;
    }
}
