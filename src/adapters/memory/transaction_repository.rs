//! In-memory transaction store.
//!
//! The conditional write runs under the map's write lock, which gives the
//! same first-writer-wins behaviour as the SQL `UPDATE ... WHERE status`.
//! Useful for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::checkout::{Transaction, TransactionStatus};
use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, Timestamp, TransactionId,
};
use crate::ports::{TransactionRepository, TransitionResult};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionRepository {
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }

    /// Overwrites `last_updated_at`, for exercising the stale sweep.
    pub async fn backdate(&self, id: &TransactionId, to: Timestamp) {
        if let Some(tx) = self.transactions.write().await.get_mut(id) {
            tx.last_updated_at = to;
        }
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.id) {
            return Err(DomainError::validation("id", "Transaction already exists")
                .with_detail("transaction_id", transaction.id.to_string()));
        }
        transactions.insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        Ok(self.transactions.read().await.get(id).cloned())
    }

    async fn transition(
        &self,
        id: &TransactionId,
        from: TransactionStatus,
        to: TransactionStatus,
        gateway_status_code: Option<i32>,
    ) -> Result<TransitionResult, DomainError> {
        if !from.can_transition_to(&to) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {} to {}", from, to),
            ));
        }

        let mut transactions = self.transactions.write().await;
        let tx = transactions.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::TransactionNotFound, "Transaction not found")
                .with_detail("transaction_id", id.to_string())
        })?;

        if tx.status != from {
            return Ok(TransitionResult::Stale { current: tx.status });
        }

        tx.transition(to, gateway_status_code, Timestamp::now())?;
        Ok(TransitionResult::Applied)
    }

    async fn find_awaiting_since(
        &self,
        checked_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<TransactionId>, DomainError> {
        let transactions = self.transactions.read().await;
        let mut awaiting: Vec<&Transaction> = transactions
            .values()
            .filter(|tx| tx.is_stale(checked_before))
            .collect();
        awaiting.sort_by_key(|tx| tx.last_checked_at());
        Ok(awaiting
            .into_iter()
            .take(limit as usize)
            .map(|tx| tx.id)
            .collect())
    }

    async fn mark_polled(&self, id: &TransactionId) -> Result<(), DomainError> {
        let mut transactions = self.transactions.write().await;
        let tx = transactions.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::TransactionNotFound, "Transaction not found")
                .with_detail("transaction_id", id.to_string())
        })?;
        tx.last_polled_at = Some(Timestamp::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::{Customer, LineItem, Money, ShippingAddress};
    use crate::domain::foundation::ProductId;
    use TransactionStatus::*;

    fn pending() -> Transaction {
        let customer = Customer::new(
            "Ana",
            "Pérez",
            "ana@example.com",
            "",
            ShippingAddress {
                address: "Av. Italia 1234".to_string(),
                zip_code: "11300".to_string(),
                city: "Montevideo".to_string(),
            },
        )
        .unwrap();
        let item =
            LineItem::new(ProductId::new(1).unwrap(), "Maceta", Money::from_cents(6100), 1).unwrap();
        Transaction::create(TransactionId::new(), customer, vec![item]).unwrap()
    }

    #[tokio::test]
    async fn save_then_find() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.save(&tx).await.unwrap();

        assert_eq!(repo.find_by_id(&tx.id).await.unwrap(), Some(tx));
        assert_eq!(repo.find_by_id(&TransactionId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_save_is_rejected() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.save(&tx).await.unwrap();
        assert!(repo.save(&tx).await.is_err());
    }

    #[tokio::test]
    async fn transition_applies_when_status_matches() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.save(&tx).await.unwrap();

        let result = repo.transition(&tx.id, Pending, AwaitingGatewayResult, None).await.unwrap();

        assert_eq!(result, TransitionResult::Applied);
        assert_eq!(
            repo.find_by_id(&tx.id).await.unwrap().unwrap().status,
            AwaitingGatewayResult
        );
    }

    #[tokio::test]
    async fn transition_is_stale_when_status_moved() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.save(&tx).await.unwrap();
        repo.transition(&tx.id, Pending, AwaitingGatewayResult, None).await.unwrap();
        repo.transition(&tx.id, AwaitingGatewayResult, Approved, Some(0)).await.unwrap();

        let result = repo
            .transition(&tx.id, AwaitingGatewayResult, Declined, Some(5))
            .await
            .unwrap();

        assert_eq!(result, TransitionResult::Stale { current: Approved });
        let stored = repo.find_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Approved);
        assert_eq!(stored.gateway_status_code, Some(0));
    }

    #[tokio::test]
    async fn illegal_transition_is_an_error() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.save(&tx).await.unwrap();

        let err = repo.transition(&tx.id, Pending, Approved, Some(0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let repo = InMemoryTransactionRepository::new();
        let err = repo
            .transition(&TransactionId::new(), Pending, AwaitingGatewayResult, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionNotFound);
    }

    #[tokio::test]
    async fn concurrent_terminal_writes_have_one_winner() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.save(&tx).await.unwrap();
        repo.transition(&tx.id, Pending, AwaitingGatewayResult, None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            let id = tx.id;
            let (to, code) = if i % 2 == 0 { (Approved, 0) } else { (Declined, 5) };
            handles.push(tokio::spawn(async move {
                repo.transition(&id, AwaitingGatewayResult, to, Some(code)).await.unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap() == TransitionResult::Applied {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn find_awaiting_since_filters_and_orders() {
        let repo = InMemoryTransactionRepository::new();
        let now = Timestamp::now();
        let mut ids = Vec::new();
        for age in [600, 1200, 60] {
            let tx = pending();
            repo.save(&tx).await.unwrap();
            repo.transition(&tx.id, Pending, AwaitingGatewayResult, None).await.unwrap();
            repo.backdate(&tx.id, now.minus_secs(age)).await;
            ids.push(tx.id);
        }
        let still_pending = pending();
        repo.save(&still_pending).await.unwrap();
        repo.backdate(&still_pending.id, now.minus_secs(5000)).await;

        let stale = repo.find_awaiting_since(now.minus_secs(300), 10).await.unwrap();

        assert_eq!(stale, vec![ids[1], ids[0]]);
        assert_eq!(repo.find_awaiting_since(now.minus_secs(300), 1).await.unwrap(), vec![ids[1]]);
    }

    #[tokio::test]
    async fn polled_transaction_moves_behind_unpolled_ones() {
        let repo = InMemoryTransactionRepository::new();
        let now = Timestamp::now();
        let mut ids = Vec::new();
        for age in [1200, 600] {
            let tx = pending();
            repo.save(&tx).await.unwrap();
            repo.transition(&tx.id, Pending, AwaitingGatewayResult, None).await.unwrap();
            repo.backdate(&tx.id, now.minus_secs(age)).await;
            ids.push(tx.id);
        }

        repo.mark_polled(&ids[0]).await.unwrap();

        let stale = repo.find_awaiting_since(now.minus_secs(300), 10).await.unwrap();
        assert_eq!(stale, vec![ids[1]]);
        let stored = repo.find_by_id(&ids[0]).await.unwrap().unwrap();
        assert_eq!(stored.status, AwaitingGatewayResult);
        assert!(stored.last_polled_at.is_some());
    }

    #[tokio::test]
    async fn mark_polled_unknown_id_is_not_found() {
        let repo = InMemoryTransactionRepository::new();
        let err = repo.mark_polled(&TransactionId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionNotFound);
    }
}
