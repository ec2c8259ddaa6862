//! Transaction aggregate.
//!
//! A transaction is recorded as `Pending` before the gateway is contacted so
//! a record exists even if initiation fails. Line items and the customer
//! snapshot never change after creation; only the status moves.
//!
//! # Invariants
//!
//! - `line_items` is non-empty
//! - `total_amount` equals the sum of line amounts
//! - `status` only moves along `Pending → AwaitingGatewayResult → terminal`

use serde::{Deserialize, Serialize};

use super::{Customer, LineItem, Money, TransactionStatus};
use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, Timestamp, TransactionId, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Also the gateway correlation reference.
    pub id: TransactionId,

    pub customer: Customer,

    pub line_items: Vec<LineItem>,

    pub total_amount: Money,

    pub status: TransactionStatus,

    /// Raw outcome code reported by the gateway, once terminal.
    pub gateway_status_code: Option<i32>,

    pub created_at: Timestamp,

    pub last_updated_at: Timestamp,

    /// Last status inquiry made by the stale sweep.
    #[serde(default)]
    pub last_polled_at: Option<Timestamp>,
}

impl Transaction {
    /// Records a new pending transaction.
    pub fn create(
        id: TransactionId,
        customer: Customer,
        line_items: Vec<LineItem>,
    ) -> Result<Self, ValidationError> {
        if line_items.is_empty() {
            return Err(ValidationError::empty_field("items"));
        }
        let total_amount = line_items
            .iter()
            .map(LineItem::amount)
            .sum::<Money>()
            .within_max("total_amount")?;
        let now = Timestamp::now();
        Ok(Self {
            id,
            customer,
            line_items,
            total_amount,
            status: TransactionStatus::Pending,
            gateway_status_code: None,
            created_at: now,
            last_updated_at: now,
            last_polled_at: None,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Latest of the last status change and the last sweep inquiry.
    pub fn last_checked_at(&self) -> Timestamp {
        match self.last_polled_at {
            Some(polled) => polled.max(self.last_updated_at),
            None => self.last_updated_at,
        }
    }

    /// Awaiting the gateway with nothing heard or asked since `cutoff`.
    pub fn is_stale(&self, cutoff: Timestamp) -> bool {
        self.status == TransactionStatus::AwaitingGatewayResult
            && !cutoff.is_before(&self.last_checked_at())
    }

    /// Moves to `target`, recording the gateway code when one is given.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` if the state machine forbids the move.
    pub fn transition(
        &mut self,
        target: TransactionStatus,
        gateway_status_code: Option<i32>,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let id = self.id;
        self.status = self.status.transition_to(target).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("transaction_id", id.to_string())
        })?;
        if gateway_status_code.is_some() {
            self.gateway_status_code = gateway_status_code;
        }
        self.last_updated_at = at;
        Ok(())
    }
}
