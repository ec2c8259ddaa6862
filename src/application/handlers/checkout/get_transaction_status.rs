//! GetTransactionStatusHandler - Query handler for the confirmation page.

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, Money, TransactionStatus};
use crate::domain::foundation::{StateMachine, Timestamp, TransactionId};
use crate::ports::TransactionRepository;

#[derive(Debug, Clone)]
pub struct GetTransactionStatusQuery {
    pub transaction_id: TransactionId,
}

/// What a client may learn about a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatusView {
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
    pub is_terminal: bool,
    /// `Some` once terminal.
    pub approved: Option<bool>,
    pub total_amount: Money,
    pub last_updated_at: Timestamp,
}

pub struct GetTransactionStatusHandler {
    repository: Arc<dyn TransactionRepository>,
}

impl GetTransactionStatusHandler {
    pub fn new(repository: Arc<dyn TransactionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetTransactionStatusQuery,
    ) -> Result<TransactionStatusView, CheckoutError> {
        let transaction = self
            .repository
            .find_by_id(&query.transaction_id)
            .await?
            .ok_or_else(|| CheckoutError::unknown_transaction(query.transaction_id))?;

        let is_terminal = transaction.status.is_terminal();
        Ok(TransactionStatusView {
            transaction_id: transaction.id,
            status: transaction.status,
            is_terminal,
            approved: is_terminal.then_some(transaction.status == TransactionStatus::Approved),
            total_amount: transaction.total_amount,
            last_updated_at: transaction.last_updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTransactionRepository;
    use crate::application::handlers::checkout::test_support::pending_transaction;

    #[tokio::test]
    async fn pending_is_not_terminal() {
        let repo = Arc::new(InMemoryTransactionRepository::new());
        let tx = pending_transaction();
        repo.save(&tx).await.unwrap();
        let handler = GetTransactionStatusHandler::new(repo);

        let view = handler
            .handle(GetTransactionStatusQuery { transaction_id: tx.id })
            .await
            .unwrap();

        assert_eq!(view.status, TransactionStatus::Pending);
        assert!(!view.is_terminal);
        assert_eq!(view.approved, None);
        assert_eq!(view.total_amount, Money::from_cents(12200));
    }

    #[tokio::test]
    async fn declined_reports_not_approved() {
        let repo = Arc::new(InMemoryTransactionRepository::new());
        let tx = pending_transaction();
        repo.save(&tx).await.unwrap();
        repo.transition(&tx.id, TransactionStatus::Pending, TransactionStatus::AwaitingGatewayResult, None)
            .await
            .unwrap();
        repo.transition(&tx.id, TransactionStatus::AwaitingGatewayResult, TransactionStatus::Declined, Some(5))
            .await
            .unwrap();
        let handler = GetTransactionStatusHandler::new(repo);

        let view = handler
            .handle(GetTransactionStatusQuery { transaction_id: tx.id })
            .await
            .unwrap();

        assert!(view.is_terminal);
        assert_eq!(view.approved, Some(false));
    }

    #[tokio::test]
    async fn missing_transaction_is_unknown() {
        let handler = GetTransactionStatusHandler::new(Arc::new(InMemoryTransactionRepository::new()));

        let err = handler
            .handle(GetTransactionStatusQuery {
                transaction_id: TransactionId::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::UnknownTransaction(_)));
    }
}
