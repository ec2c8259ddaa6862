//! In-process gateway double for tests and local development.
//!
//! Supports:
//! - Per-transaction outcomes returned by status inquiries
//! - Error injection per operation, optionally for a limited number of calls
//! - Call counters for assertions
//!
//! Callback parsing is the real parser, so webhook tests exercise the
//! actual wire shape.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::checkout::{GatewayOutcome, Transaction};
use crate::domain::foundation::TransactionId;
use crate::ports::{CallbackReport, GatewayError, PaymentGateway, PurchaseSession};

use super::client::parse_callback;

/// Mock payment gateway.
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.set_outcome(id, 0);
/// gateway.fail_status_queries(GatewayError::timeout("slow"), 2);
/// ```
#[derive(Default)]
pub struct MockPaymentGateway {
    state: Mutex<MockState>,
    initiate_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

#[derive(Default)]
struct MockState {
    outcomes: HashMap<TransactionId, i32>,
    initiate_error: Option<GatewayError>,
    status_error: Option<(GatewayError, usize)>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status inquiries for `id` will report `code`.
    pub fn set_outcome(&self, id: TransactionId, code: i32) {
        self.lock().outcomes.insert(id, code);
    }

    /// Every purchase initiation fails with `error`.
    pub fn fail_initiation(&self, error: GatewayError) {
        self.lock().initiate_error = Some(error);
    }

    /// The next `times` status inquiries fail with `error`.
    pub fn fail_status_queries(&self, error: GatewayError, times: usize) {
        self.lock().status_error = Some((error, times));
    }

    pub fn initiate_calls(&self) -> usize {
        self.initiate_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initiate_purchase(
        &self,
        transaction: &Transaction,
    ) -> Result<PurchaseSession, GatewayError> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.lock().initiate_error.clone() {
            return Err(error);
        }
        Ok(PurchaseSession {
            redirect_uri: Some(format!("https://gateway.test/checkout/{}", transaction.id)),
        })
    }

    async fn query_status(
        &self,
        id: &TransactionId,
    ) -> Result<Option<GatewayOutcome>, GatewayError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        if let Some((error, remaining)) = state.status_error.take() {
            if remaining > 1 {
                state.status_error = Some((error.clone(), remaining - 1));
            }
            return Err(error);
        }
        Ok(state.outcomes.get(id).copied().map(GatewayOutcome::from_code))
    }

    fn parse_callback(&self, payload: &[u8]) -> Result<CallbackReport, GatewayError> {
        parse_callback(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::TransactionStatus;

    #[tokio::test]
    async fn unknown_outcome_is_none() {
        let gateway = MockPaymentGateway::new();
        assert_eq!(gateway.query_status(&TransactionId::new()).await.unwrap(), None);
        assert_eq!(gateway.status_calls(), 1);
    }

    #[tokio::test]
    async fn configured_outcome_is_mapped() {
        let gateway = MockPaymentGateway::new();
        let id = TransactionId::new();
        gateway.set_outcome(id, 5);

        let outcome = gateway.query_status(&id).await.unwrap().unwrap();

        assert_eq!(outcome.status(), TransactionStatus::Declined);
    }

    #[tokio::test]
    async fn status_failures_run_out() {
        let gateway = MockPaymentGateway::new();
        let id = TransactionId::new();
        gateway.set_outcome(id, 0);
        gateway.fail_status_queries(GatewayError::timeout("slow"), 2);

        assert!(gateway.query_status(&id).await.is_err());
        assert!(gateway.query_status(&id).await.is_err());
        assert!(gateway.query_status(&id).await.unwrap().is_some());
        assert_eq!(gateway.status_calls(), 3);
    }
}
