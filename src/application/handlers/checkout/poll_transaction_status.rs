//! PollTransactionStatusHandler - asks the gateway for a transaction's outcome.
//!
//! Status inquiries are read-only at the gateway, so failures that look
//! transient are retried with linear backoff. Settled transactions are
//! answered from the store without a gateway call.

use std::sync::Arc;
use std::time::Duration;

use super::{ReconcileOutcome, ReconciliationEngine};
use crate::domain::checkout::{CheckoutError, GatewayOutcome, TransactionStatus};
use crate::domain::foundation::{StateMachine, TransactionId};
use crate::ports::{GatewayError, PaymentGateway, TransactionRepository};

/// Retry policy for status inquiries.
#[derive(Debug, Clone, Copy)]
pub struct PollRetryPolicy {
    /// Total inquiries per poll, including the first.
    pub attempts: u32,
    /// Wait before retry `n` is `backoff × n`.
    pub backoff: Duration,
}

impl Default for PollRetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollTransactionStatusCommand {
    pub transaction_id: TransactionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTransactionStatusResult {
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
    /// This poll wrote a terminal status.
    pub changed: bool,
}

pub struct PollTransactionStatusHandler {
    repository: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    engine: Arc<ReconciliationEngine>,
    retry: PollRetryPolicy,
}

impl PollTransactionStatusHandler {
    pub fn new(
        repository: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        engine: Arc<ReconciliationEngine>,
        retry: PollRetryPolicy,
    ) -> Self {
        Self {
            repository,
            gateway,
            engine,
            retry,
        }
    }

    pub async fn handle(
        &self,
        cmd: PollTransactionStatusCommand,
    ) -> Result<PollTransactionStatusResult, CheckoutError> {
        let id = cmd.transaction_id;
        let transaction = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| CheckoutError::unknown_transaction(id))?;

        if transaction.status.is_terminal() {
            return Ok(PollTransactionStatusResult {
                transaction_id: id,
                status: transaction.status,
                changed: false,
            });
        }

        let Some(outcome) = self.query_with_retry(&id).await? else {
            tracing::debug!(transaction_id = %id, status = %transaction.status, "Gateway has no outcome yet");
            return Ok(PollTransactionStatusResult {
                transaction_id: id,
                status: transaction.status,
                changed: false,
            });
        };

        let applied = self.engine.apply_outcome(&id, outcome).await?;
        Ok(PollTransactionStatusResult {
            transaction_id: id,
            status: applied.status(),
            changed: matches!(applied, ReconcileOutcome::Applied(_)),
        })
    }

    async fn query_with_retry(
        &self,
        id: &TransactionId,
    ) -> Result<Option<GatewayOutcome>, CheckoutError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.gateway.query_status(id).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.retryable && attempt < attempts => {
                    tracing::warn!(
                        transaction_id = %id,
                        attempt,
                        error = %e,
                        "Status inquiry failed, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(log_failure(id, e)),
            }
        }
    }
}

fn log_failure(id: &TransactionId, e: GatewayError) -> CheckoutError {
    tracing::warn!(
        transaction_id = %id,
        error = %e,
        gateway_body = e.gateway_body.as_deref().unwrap_or(""),
        "Status inquiry failed"
    );
    CheckoutError::from(e)
}
