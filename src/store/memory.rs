//! In-Memory Request Store
//!
//! Store implementation backed by a HashMap. Used by tests and local runs;
//! data is lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{RequestStore, StoreError, StoreResult};
use crate::types::{StatusUpdate, WithdrawalRequest, WithdrawalStatus};

/// Thread-safe in-memory request store
#[derive(Clone, Default)]
pub struct MemoryRequestStore {
    requests: Arc<RwLock<HashMap<String, WithdrawalRequest>>>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a request (the external actor that creates requests is out of
    /// scope for the worker, so tests insert directly).
    pub async fn insert(&self, request: WithdrawalRequest) {
        self.requests
            .write()
            .await
            .insert(request.id.clone(), request);
    }

    /// Fetch a request by id
    pub async fn get(&self, id: &str) -> Option<WithdrawalRequest> {
        self.requests.read().await.get(id).cloned()
    }

    /// Number of stored requests
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn list_pending(&self) -> StoreResult<Vec<WithdrawalRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.status == WithdrawalStatus::Pending)
            .cloned()
            .collect())
    }

    async fn claim(&self, id: &str) -> StoreResult<bool> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        // Compare-and-set under the write lock: the same atomicity the
        // production store provides with its conditional update.
        if request.status != WithdrawalStatus::Pending {
            return Ok(false);
        }
        request.status = WithdrawalStatus::Processing;
        Ok(true)
    }

    async fn update_status(&self, update: &StatusUpdate) -> StoreResult<()> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&update.id)
            .ok_or_else(|| StoreError::NotFound(update.id.clone()))?;

        request.status = update.status;
        request.tx_reference = update.tx_reference.clone();
        request.error_message = update.error_message.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(id: &str) -> WithdrawalRequest {
        WithdrawalRequest {
            id: id.to_string(),
            source_account: "acct_1".to_string(),
            amount: 2_000_000,
            destination_address: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string(),
            status: WithdrawalStatus::Pending,
            tx_reference: None,
            error_message: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_pending_filters_status() {
        let store = MemoryRequestStore::new();
        store.insert(pending("wd_1")).await;

        let mut done = pending("wd_2");
        done.status = WithdrawalStatus::Completed;
        store.insert(done).await;

        let listed = store.list_pending().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "wd_1");
    }

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let store = MemoryRequestStore::new();
        store.insert(pending("wd_1")).await;

        assert!(store.claim("wd_1").await.unwrap());
        // Second claim loses the race
        assert!(!store.claim("wd_1").await.unwrap());
        assert_eq!(
            store.get("wd_1").await.unwrap().status,
            WithdrawalStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_claim_unknown_id() {
        let store = MemoryRequestStore::new();
        assert!(matches!(
            store.claim("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_terminal_update_is_idempotent() {
        let store = MemoryRequestStore::new();
        store.insert(pending("wd_1")).await;
        store.claim("wd_1").await.unwrap();

        let update = StatusUpdate::completed("wd_1", "sig123");
        store.update_status(&update).await.unwrap();
        store.update_status(&update).await.unwrap();

        let request = store.get("wd_1").await.unwrap();
        assert_eq!(request.status, WithdrawalStatus::Completed);
        assert_eq!(request.tx_reference.as_deref(), Some("sig123"));
        assert!(request.error_message.is_none());
    }
}
