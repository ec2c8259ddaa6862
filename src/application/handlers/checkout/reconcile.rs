//! ReconciliationEngine - the single writer of transaction status.
//!
//! Webhook deliveries and status inquiries both end here. Every write is a
//! conditional transition on the store, so two channels reporting for the
//! same transaction converge on whichever write lands first.
//!
//! ## Outcome rules
//!
//! | Stored status | Reported outcome | Result |
//! |---------------|------------------|--------|
//! | Pending | any | step to Awaiting, then apply |
//! | Awaiting | any | apply |
//! | terminal | same status | no-op |
//! | terminal | different status | `StateConflict`, nothing written |

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, GatewayOutcome, TransactionStatus};
use crate::domain::foundation::{StateMachine, TransactionId};
use crate::ports::{TransactionRepository, TransitionResult};

/// Status moves forward at most twice, so three reads of the store always
/// reach a terminal answer.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// What applying an outcome did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// This call wrote the terminal status.
    Applied(TransactionStatus),
    /// The transaction already had this status; nothing was written.
    AlreadyApplied(TransactionStatus),
}

impl ReconcileOutcome {
    pub fn status(&self) -> TransactionStatus {
        match self {
            ReconcileOutcome::Applied(status) | ReconcileOutcome::AlreadyApplied(status) => *status,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied(_))
    }
}

pub struct ReconciliationEngine {
    repository: Arc<dyn TransactionRepository>,
}

impl ReconciliationEngine {
    pub fn new(repository: Arc<dyn TransactionRepository>) -> Self {
        Self { repository }
    }

    /// Records that the gateway accepted the purchase request.
    ///
    /// A transaction that already moved on (an early webhook) is left alone.
    pub async fn mark_awaiting(&self, id: &TransactionId) -> Result<(), CheckoutError> {
        let result = self
            .repository
            .transition(
                id,
                TransactionStatus::Pending,
                TransactionStatus::AwaitingGatewayResult,
                None,
            )
            .await?;

        match result {
            TransitionResult::Applied => {
                tracing::info!(transaction_id = %id, status = %TransactionStatus::AwaitingGatewayResult, "Awaiting gateway result");
            }
            TransitionResult::Stale { current } => {
                tracing::debug!(transaction_id = %id, status = %current, "Transaction already past pending");
            }
        }
        Ok(())
    }

    /// Applies a gateway-reported outcome.
    ///
    /// # Errors
    ///
    /// - `UnknownTransaction` if no transaction has this id
    /// - `StateConflict` if the transaction already ended differently
    /// - `Infrastructure` on store failure
    pub async fn apply_outcome(
        &self,
        id: &TransactionId,
        outcome: GatewayOutcome,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        let transaction = self.repository.find_by_id(id).await?.ok_or_else(|| {
            tracing::warn!(transaction_id = %id, outcome_code = outcome.code(), "Outcome for unknown transaction");
            CheckoutError::unknown_transaction(id)
        })?;

        let target = outcome.status();
        let mut current = transaction.status;

        for _ in 0..MAX_TRANSITION_ATTEMPTS {
            if current.is_terminal() {
                return self.settled(id, current, outcome);
            }

            let (from, to, code) = match current {
                TransactionStatus::Pending => {
                    (current, TransactionStatus::AwaitingGatewayResult, None)
                }
                _ => (current, target, Some(outcome.code())),
            };

            match self.repository.transition(id, from, to, code).await? {
                TransitionResult::Applied if to == target => {
                    tracing::info!(
                        transaction_id = %id,
                        status = %target,
                        outcome_code = outcome.code(),
                        "Gateway outcome applied"
                    );
                    return Ok(ReconcileOutcome::Applied(target));
                }
                TransitionResult::Applied => current = to,
                TransitionResult::Stale { current: latest } => current = latest,
            }
        }

        Err(CheckoutError::infrastructure(format!(
            "transaction {} did not settle after {} attempts",
            id, MAX_TRANSITION_ATTEMPTS
        )))
    }

    fn settled(
        &self,
        id: &TransactionId,
        current: TransactionStatus,
        outcome: GatewayOutcome,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        if current == outcome.status() {
            tracing::debug!(transaction_id = %id, status = %current, outcome_code = outcome.code(), "Duplicate outcome ignored");
            return Ok(ReconcileOutcome::AlreadyApplied(current));
        }

        tracing::warn!(
            transaction_id = %id,
            status = %current,
            outcome_code = outcome.code(),
            "Conflicting outcome for settled transaction"
        );
        Err(CheckoutError::StateConflict {
            transaction_id: *id,
            current,
            reported: outcome.status(),
        })
    }
}
