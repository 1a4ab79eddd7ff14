//! HTTP Request Store
//!
//! Speaks the request store's REST surface: PostgREST-style filters on the
//! `withdrawal_requests` table plus an RPC endpoint for the
//! status-and-result update.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::warn;

use super::traits::{RequestStore, StoreError, StoreResult};
use crate::types::{RequestRow, StatusUpdate, WithdrawalRequest, WithdrawalStatus};

const REQUESTS_PATH: &str = "/rest/v1/withdrawal_requests";
const UPDATE_RPC_PATH: &str = "/rest/v1/rpc/update_withdrawal_status";

/// Request store over HTTP
#[derive(Debug, Clone)]
pub struct HttpRequestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl HttpRequestStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request builder with the store's auth headers applied
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Body for the status-update RPC, matching the store's function args
    fn update_payload(update: &StatusUpdate) -> serde_json::Value {
        json!({
            "withdrawal_id": update.id,
            "new_status": update.status,
            "tx_hash": update.tx_reference,
            "error_msg": update.error_message,
        })
    }

    async fn check(resp: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RequestStore for HttpRequestStore {
    async fn list_pending(&self) -> StoreResult<Vec<WithdrawalRequest>> {
        let url = format!(
            "{}?status=eq.{}&select=*",
            self.endpoint(REQUESTS_PATH),
            WithdrawalStatus::Pending
        );
        let resp = self.authed(self.client.get(&url)).send().await?;
        let resp = Self::check(resp).await?;

        let rows: Vec<RequestRow> = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        // Validate at the boundary; malformed rows are quarantined, not
        // fed to the pipeline.
        let mut requests = Vec::with_capacity(rows.len());
        for row in rows {
            let row_id = row.id.clone();
            match WithdrawalRequest::try_from(row) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    warn!(request_id = %row_id, error = %e, "quarantined malformed request row");
                }
            }
        }
        Ok(requests)
    }

    async fn claim(&self, id: &str) -> StoreResult<bool> {
        // Conditional PATCH: only a row still in `pending` matches the
        // filter, so the store performs the pending -> processing
        // transition atomically and tells us whether we won it.
        let url = format!(
            "{}?id=eq.{}&status=eq.{}",
            self.endpoint(REQUESTS_PATH),
            id,
            WithdrawalStatus::Pending
        );
        let resp = self
            .authed(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(&json!({ "status": WithdrawalStatus::Processing }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;

        let updated: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(!updated.is_empty())
    }

    async fn update_status(&self, update: &StatusUpdate) -> StoreResult<()> {
        let url = self.endpoint(UPDATE_RPC_PATH);
        let resp = self
            .authed(self.client.post(&url))
            .json(&Self::update_payload(update))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
