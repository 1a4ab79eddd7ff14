//! Withdrawal Pipeline
//!
//! Per-request state machine: claim -> convert -> validate -> transfer ->
//! record outcome. Every failure kind is handled here; nothing escapes to
//! the scheduler.

use tracing::{info, warn};

use super::convert::Converter;
use super::status::StatusUpdater;
use super::transfer::{TransferError, TransferExecutor};
use crate::types::WithdrawalRequest;

/// Result of one pipeline invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Payout submitted and recorded
    Completed { tx_reference: String },
    /// Terminal failure recorded
    Failed { reason: String },
    /// Claim not obtained; the request stays pending for a later cycle
    Skipped,
}

pub struct Pipeline {
    converter: Converter,
    executor: TransferExecutor,
    status: StatusUpdater,
}

impl Pipeline {
    pub fn new(converter: Converter, executor: TransferExecutor, status: StatusUpdater) -> Self {
        Self {
            converter,
            executor,
            status,
        }
    }

    /// Drive one request from `pending` to a terminal state.
    pub async fn process(&self, request: &WithdrawalRequest) -> Outcome {
        info!(
            request_id = %request.id,
            tokens = request.amount,
            destination = %request.destination_address,
            "processing withdrawal"
        );

        // No transfer without the recorded in-flight marker.
        if !self.status.claim(&request.id).await {
            return Outcome::Skipped;
        }

        let raw_sol = self.converter.raw(request.amount);
        if raw_sol < self.converter.min_payout_sol() {
            let reason = format!(
                "amount too small: {:.9} SOL converted (min: {:.9} SOL)",
                raw_sol,
                self.converter.min_payout_sol()
            );
            warn!(request_id = %request.id, %reason, "rejecting withdrawal");
            self.status.fail(&request.id, &reason).await;
            return Outcome::Failed { reason };
        }

        let payout_sol = self.converter.convert(request.amount);
        info!(
            request_id = %request.id,
            tokens = request.amount,
            payout_sol,
            "converted withdrawal amount"
        );

        match self
            .executor
            .execute(&request.destination_address, payout_sol)
            .await
        {
            Ok(tx_reference) => {
                self.status.complete(&request.id, &tx_reference).await;
                info!(request_id = %request.id, %tx_reference, "withdrawal completed");
                Outcome::Completed { tx_reference }
            }
            Err(e) => {
                let reason = failure_reason(&e);
                warn!(request_id = %request.id, error = %e, "withdrawal failed");
                self.status.fail(&request.id, &reason).await;
                Outcome::Failed { reason }
            }
        }
    }
}

/// Message recorded on the request, derived from the failure kind.
fn failure_reason(error: &TransferError) -> String {
    match error {
        TransferError::InvalidDestination(addr) => {
            format!("invalid destination address: {}", addr)
        }
        TransferError::InsufficientFunds {
            required,
            available,
        } => format!(
            "insufficient treasury balance (required {} lamports, available {})",
            required, available
        ),
        TransferError::Rpc(e) => format!("transfer submission failed: {}", e),
    }
}
