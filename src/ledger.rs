//! Solana Ledger Client
//!
//! The worker's view of the external ledger: balance lookup, blockhash
//! fetch, transaction submission. The trait keeps the transfer executor
//! testable against a substitute ledger; `RpcLedgerClient` is the real
//! thing over `solana_client`.

use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use thiserror::Error;

/// Ledger errors
///
/// Everything here is the transient class: the RPC call itself failed, and
/// whether the ledger saw anything is unknown to the caller.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("rpc error: {0}")]
    Rpc(String),
}

/// External ledger operations consumed by the transfer executor
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Account balance in lamports
    async fn balance(&self, account: &Pubkey) -> Result<u64, LedgerError>;

    /// A recent blockhash, required by the ledger's anti-replay rules
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Submit a signed transaction, returning its signature
    async fn submit(&self, transaction: &Transaction) -> Result<Signature, LedgerError>;
}

/// Ledger client over a Solana JSON-RPC endpoint
pub struct RpcLedgerClient {
    rpc: RpcClient,
}

impl RpcLedgerClient {
    /// Create a client at confirmed commitment
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed()),
        }
    }

    /// Check connection
    pub fn is_connected(&self) -> bool {
        self.rpc.get_health().is_ok()
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn balance(&self, account: &Pubkey) -> Result<u64, LedgerError> {
        self.rpc
            .get_balance(account)
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.rpc
            .get_latest_blockhash()
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    async fn submit(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        self.rpc
            .send_transaction(transaction)
            .map_err(|e| LedgerError::Rpc(format!("transaction submission failed: {}", e)))
    }
}
