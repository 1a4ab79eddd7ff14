//! Transfer Executor
//!
//! Builds, signs, and submits one SOL payout transfer from the treasury
//! account. Each step is a distinct failure point with a typed error; the
//! first ledger call with side effects is the final submission.

use std::str::FromStr;
use std::sync::Arc;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::ledger::{LedgerClient, LedgerError};
use crate::units;

/// Lamports held back from the treasury balance for the transaction fee
pub const FEE_RESERVE_LAMPORTS: u64 = 5_000;

/// Transfer failures, by disposition class
#[derive(Debug, Error)]
pub enum TransferError {
    /// Validation class: the destination is not a usable ledger address
    #[error("invalid destination address: {0}")]
    InvalidDestination(String),

    /// Funding class: the treasury cannot cover amount plus fee reserve
    #[error("insufficient treasury balance: required {required} lamports, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// Transient class: an RPC call failed; the transfer may or may not
    /// have reached the ledger when this happened during submission
    #[error(transparent)]
    Rpc(#[from] LedgerError),
}

/// Executes payout transfers with the treasury credential
pub struct TransferExecutor {
    ledger: Arc<dyn LedgerClient>,
    treasury: Arc<Keypair>,
}

impl TransferExecutor {
    pub fn new(ledger: Arc<dyn LedgerClient>, treasury: Arc<Keypair>) -> Self {
        Self { ledger, treasury }
    }

    /// The treasury's public address
    pub fn treasury_pubkey(&self) -> Pubkey {
        self.treasury.pubkey()
    }

    /// Send `payout_sol` to `destination`, returning the transaction
    /// signature.
    ///
    /// Not retried internally: the caller decides disposition for every
    /// failure kind.
    pub async fn execute(
        &self,
        destination: &str,
        payout_sol: f64,
    ) -> Result<String, TransferError> {
        // 1. Structural check on the destination
        let destination = Pubkey::from_str(destination)
            .map_err(|_| TransferError::InvalidDestination(destination.to_string()))?;

        // 2. Fixed-point denomination
        let lamports = units::sol_to_lamports(payout_sol);

        // 3. Balance preflight
        let required = lamports.saturating_add(FEE_RESERVE_LAMPORTS);
        let available = self.ledger.balance(&self.treasury.pubkey()).await?;
        if available < required {
            return Err(TransferError::InsufficientFunds {
                required,
                available,
            });
        }
        debug!(lamports, available, "treasury preflight passed");

        // 4-6. Build and sign against a fresh blockhash
        let instruction =
            system_instruction::transfer(&self.treasury.pubkey(), &destination, lamports);
        let blockhash = self.ledger.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.treasury.pubkey()),
            &[self.treasury.as_ref()],
            blockhash,
        );

        // 7. Submit
        let signature = self.ledger.submit(&transaction).await?;
        info!(
            destination = %destination,
            amount = %units::format_sol(lamports),
            signature = %signature,
            "payout transfer submitted"
        );
        Ok(signature.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MockLedgerClient;
    use solana_sdk::{hash::Hash, signature::Signature};

    const DESTINATION: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

    fn executor_with(ledger: MockLedgerClient) -> TransferExecutor {
        TransferExecutor::new(Arc::new(ledger), Arc::new(Keypair::new()))
    }

    #[tokio::test]
    async fn test_successful_transfer_returns_signature() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_balance()
            .returning(|_| Ok(units::sol_to_lamports(10.0)));
        ledger
            .expect_latest_blockhash()
            .returning(|| Ok(Hash::default()));
        ledger
            .expect_submit()
            .times(1)
            .returning(|_| Ok(Signature::default()));

        let signature = executor_with(ledger)
            .execute(DESTINATION, 0.5)
            .await
            .unwrap();
        assert!(!signature.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_destination_makes_no_ledger_calls() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_balance().times(0);
        ledger.expect_latest_blockhash().times(0);
        ledger.expect_submit().times(0);

        let result = executor_with(ledger).execute("definitely-not-base58", 0.5).await;
        assert!(matches!(result, Err(TransferError::InvalidDestination(_))));
    }

    #[tokio::test]
    async fn test_insufficient_balance_never_submits() {
        let mut ledger = MockLedgerClient::new();
        // One lamport short of amount + fee reserve
        ledger.expect_balance().returning(|_| {
            Ok(units::sol_to_lamports(0.5) + FEE_RESERVE_LAMPORTS - 1)
        });
        ledger.expect_latest_blockhash().times(0);
        ledger.expect_submit().times(0);

        let result = executor_with(ledger).execute(DESTINATION, 0.5).await;
        match result {
            Err(TransferError::InsufficientFunds {
                required,
                available,
            }) => {
                assert_eq!(required, units::sol_to_lamports(0.5) + FEE_RESERVE_LAMPORTS);
                assert_eq!(required, available + 1);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_failure_is_transient() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_balance()
            .returning(|_| Ok(units::sol_to_lamports(10.0)));
        ledger
            .expect_latest_blockhash()
            .returning(|| Ok(Hash::default()));
        ledger
            .expect_submit()
            .returning(|_| Err(LedgerError::Rpc("connection reset".to_string())));

        let result = executor_with(ledger).execute(DESTINATION, 0.5).await;
        assert!(matches!(result, Err(TransferError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_blockhash_failure_is_transient() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_balance()
            .returning(|_| Ok(units::sol_to_lamports(10.0)));
        ledger
            .expect_latest_blockhash()
            .returning(|| Err(LedgerError::Rpc("timeout".to_string())));
        ledger.expect_submit().times(0);

        let result = executor_with(ledger).execute(DESTINATION, 0.5).await;
        assert!(matches!(result, Err(TransferError::Rpc(_))));
    }
}
