//! PostgreSQL implementation of TransactionRepository.
//!
//! Status changes are a single conditional `UPDATE ... WHERE status = $from`;
//! row-level locking in Postgres makes the first committed writer win.

use crate::domain::checkout::{Customer, LineItem, Money, ShippingAddress, Transaction, TransactionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, StateMachine, Timestamp, TransactionId};
use crate::ports::{TransactionRepository, TransitionResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the TransactionRepository port.
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    shipping_address: String,
    shipping_zip_code: String,
    shipping_city: String,
    line_items: Json<Vec<LineItem>>,
    total_amount: Decimal,
    status: String,
    gateway_status_code: Option<i32>,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
    last_polled_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let customer = Customer::new(
            row.first_name,
            row.last_name,
            row.email,
            row.phone,
            ShippingAddress {
                address: row.shipping_address,
                zip_code: row.shipping_zip_code,
                city: row.shipping_city,
            },
        )
        .map_err(|e| corrupt_row(row.id, format!("Invalid customer: {}", e)))?;

        let total_amount = Money::new(row.total_amount)
            .map_err(|e| corrupt_row(row.id, format!("Invalid total_amount: {}", e)))?;

        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            customer,
            line_items: row.line_items.0,
            total_amount,
            status: parse_status(&row.status)?,
            gateway_status_code: row.gateway_status_code,
            created_at: Timestamp::from_datetime(row.created_at),
            last_updated_at: Timestamp::from_datetime(row.last_updated_at),
            last_polled_at: row.last_polled_at.map(Timestamp::from_datetime),
        })
    }
}

fn parse_status(s: &str) -> Result<TransactionStatus, DomainError> {
    s.parse().map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )
    })
}

fn corrupt_row(id: Uuid, message: String) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, message).with_detail("transaction_id", id.to_string())
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn save(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let customer = &transaction.customer;
        let shipping = customer.shipping();

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, first_name, last_name, email, phone,
                shipping_address, shipping_zip_code, shipping_city,
                line_items, total_amount, status, gateway_status_code,
                created_at, last_updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(customer.first_name())
        .bind(customer.last_name())
        .bind(customer.email())
        .bind(customer.phone())
        .bind(&shipping.address)
        .bind(&shipping.zip_code)
        .bind(&shipping.city)
        .bind(Json(&transaction.line_items))
        .bind(transaction.total_amount.amount())
        .bind(transaction.status.as_str())
        .bind(transaction.gateway_status_code)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.last_updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("transactions_pkey") {
                    return DomainError::validation("id", "Transaction already exists")
                        .with_detail("transaction_id", transaction.id.to_string());
                }
            }
            db_error("save transaction", e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, phone,
                   shipping_address, shipping_zip_code, shipping_city,
                   line_items, total_amount, status, gateway_status_code,
                   created_at, last_updated_at, last_polled_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find transaction", e))?;

        row.map(Transaction::try_from).transpose()
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

        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                status = $3,
                gateway_status_code = COALESCE($4, gateway_status_code),
                last_updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(gateway_status_code)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update transaction status", e))?;

        if result.rows_affected() == 1 {
            return Ok(TransitionResult::Applied);
        }

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM transactions WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("read transaction status", e))?;

        match current {
            Some(status) => Ok(TransitionResult::Stale {
                current: parse_status(&status)?,
            }),
            None => Err(DomainError::new(ErrorCode::TransactionNotFound, "Transaction not found")
                .with_detail("transaction_id", id.to_string())),
        }
    }

    async fn find_awaiting_since(
        &self,
        checked_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<TransactionId>, DomainError> {
        // GREATEST skips NULLs, so never-polled rows use last_updated_at
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM transactions
            WHERE status = $1
              AND GREATEST(last_updated_at, last_polled_at) <= $2
            ORDER BY GREATEST(last_updated_at, last_polled_at) ASC
            LIMIT $3
            "#,
        )
        .bind(TransactionStatus::AwaitingGatewayResult.as_str())
        .bind(checked_before.as_datetime())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find stale transactions", e))?;

        Ok(ids.into_iter().map(TransactionId::from_uuid).collect())
    }

    async fn mark_polled(&self, id: &TransactionId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE transactions SET last_polled_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("record status inquiry", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::TransactionNotFound, "Transaction not found")
                .with_detail("transaction_id", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_accepts_stored_values() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::AwaitingGatewayResult,
            TransactionStatus::Approved,
            TransactionStatus::Declined,
        ] {
            assert_eq!(parse_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn parse_status_rejects_unknown_values() {
        let err = parse_status("refunded").unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
