//! HandleGatewayWebhookHandler - applies outcomes pushed by the gateway.
//!
//! The callback body is parsed by the gateway adapter; the outcome then goes
//! through the same reconciliation rule as a status poll.

use std::sync::Arc;

use super::{ReconcileOutcome, ReconciliationEngine};
use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::TransactionId;
use crate::ports::PaymentGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleGatewayWebhookResult {
    pub transaction_id: TransactionId,
    pub outcome: ReconcileOutcome,
}

pub struct HandleGatewayWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
    engine: Arc<ReconciliationEngine>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, engine: Arc<ReconciliationEngine>) -> Self {
        Self { gateway, engine }
    }

    /// # Errors
    ///
    /// - `MalformedCallback` if the body lacks a reference or outcome
    /// - `UnknownTransaction` if the reference matches no transaction
    /// - `StateConflict` if the transaction already ended differently
    pub async fn handle(&self, payload: &[u8]) -> Result<HandleGatewayWebhookResult, CheckoutError> {
        let report = self.gateway.parse_callback(payload).map_err(|e| {
            tracing::warn!(error = %e, "Rejected malformed gateway callback");
            CheckoutError::malformed_callback(e.message)
        })?;

        let transaction_id = TransactionId::from_reference(&report.reference).map_err(|_| {
            tracing::warn!(reference = %report.reference, "Callback references no known transaction");
            CheckoutError::unknown_transaction(&report.reference)
        })?;

        tracing::info!(
            transaction_id = %transaction_id,
            outcome_code = report.outcome.code(),
            "Gateway callback received"
        );

        let outcome = self.engine.apply_outcome(&transaction_id, report.outcome).await?;
        Ok(HandleGatewayWebhookResult {
            transaction_id,
            outcome,
        })
    }
}
