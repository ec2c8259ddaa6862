//! Transaction store port.
//!
//! The store owns transaction records. Status changes after creation go
//! through [`TransactionRepository::transition`], a per-record conditional
//! write: it applies only if the stored status still equals `from`. Two
//! racing writers for the same id therefore resolve to whichever lands
//! first, and the loser sees [`TransitionResult::Stale`] with the status
//! that won.
//!
//! # Example
//!
//! ```ignore
//! match repo.transition(&id, AwaitingGatewayResult, Approved, Some(0)).await? {
//!     TransitionResult::Applied => { /* this call decided the outcome */ }
//!     TransitionResult::Stale { current } => { /* someone else got there first */ }
//! }
//! ```

use crate::domain::checkout::{Transaction, TransactionStatus};
use crate::domain::foundation::{DomainError, Timestamp, TransactionId};
use async_trait::async_trait;

/// Result of a conditional status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// The stored status was `from` and is now `to`.
    Applied,
    /// The stored status was no longer `from`; nothing was written.
    Stale { current: TransactionStatus },
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persists a newly created transaction.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the id already exists
    /// - `DatabaseError` on persistence failure
    async fn save(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Returns `None` if no transaction has this id.
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError>;

    /// Atomically moves `id` from `from` to `to`, recording the gateway's
    /// raw outcome code when given.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if `from → to` is not a legal move
    /// - `TransactionNotFound` if the id does not exist
    /// - `DatabaseError` on persistence failure
    async fn transition(
        &self,
        id: &TransactionId,
        from: TransactionStatus,
        to: TransactionStatus,
        gateway_status_code: Option<i32>,
    ) -> Result<TransitionResult, DomainError>;

    /// Ids awaiting a gateway result with no status change and no sweep
    /// inquiry after `checked_before`, least recently checked first.
    async fn find_awaiting_since(
        &self,
        checked_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<TransactionId>, DomainError>;

    /// Records that the sweep asked the gateway about `id`, moving it to the
    /// back of the stale queue. Status is untouched.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` if the id does not exist
    /// - `DatabaseError` on persistence failure
    async fn mark_polled(&self, id: &TransactionId) -> Result<(), DomainError>;
}
