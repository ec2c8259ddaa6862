//! Checkout error taxonomy.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | MalformedCallback | 400 |
//! | UnknownTransaction | 404 |
//! | StateConflict | 409 |
//! | GatewayRejected | 402 |
//! | GatewayExpired | 402 |
//! | GatewayUnavailable | 502 |
//! | GatewayTimeout | 504 |
//! | KeyMaterial | 500 |
//! | Infrastructure | 500 |

use thiserror::Error;

use super::TransactionStatus;
use crate::domain::foundation::{DomainError, ErrorCode, TransactionId, ValidationError};
use crate::domain::signing::SigningError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("key material unavailable: {0}")]
    KeyMaterial(String),

    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("gateway timed out: {0}")]
    GatewayTimeout(String),

    #[error("gateway rejected request: {0}")]
    GatewayRejected(String),

    #[error("gateway reports request expired: {0}")]
    GatewayExpired(String),

    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("transaction {transaction_id} is already {current}, gateway now reports {reported}")]
    StateConflict {
        transaction_id: TransactionId,
        current: TransactionStatus,
        reported: TransactionStatus,
    },

    #[error("malformed gateway callback: {0}")]
    MalformedCallback(String),

    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl CheckoutError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CheckoutError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown_transaction(reference: impl ToString) -> Self {
        CheckoutError::UnknownTransaction(reference.to_string())
    }

    pub fn malformed_callback(reason: impl Into<String>) -> Self {
        CheckoutError::MalformedCallback(reason.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CheckoutError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::Validation { .. } => ErrorCode::ValidationFailed,
            CheckoutError::KeyMaterial(_) => ErrorCode::KeyMaterialUnavailable,
            CheckoutError::GatewayUnavailable(_) => ErrorCode::GatewayUnavailable,
            CheckoutError::GatewayTimeout(_) => ErrorCode::GatewayTimeout,
            CheckoutError::GatewayRejected(_) => ErrorCode::GatewayRejected,
            CheckoutError::GatewayExpired(_) => ErrorCode::GatewayExpired,
            CheckoutError::UnknownTransaction(_) => ErrorCode::TransactionNotFound,
            CheckoutError::StateConflict { .. } => ErrorCode::StateConflict,
            CheckoutError::MalformedCallback(_) => ErrorCode::MalformedCallback,
            CheckoutError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show a client. Gateway failures are reported
    /// generically; the detail only goes to the server log.
    pub fn public_message(&self) -> String {
        match self {
            CheckoutError::GatewayUnavailable(_)
            | CheckoutError::GatewayTimeout(_)
            | CheckoutError::GatewayRejected(_)
            | CheckoutError::GatewayExpired(_) => {
                "The payment could not be processed. Please try again later.".to_string()
            }
            CheckoutError::KeyMaterial(_) | CheckoutError::Infrastructure(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Only status inquiries may be retried on these.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::GatewayUnavailable(_) | CheckoutError::GatewayTimeout(_)
        )
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<SigningError> for CheckoutError {
    fn from(err: SigningError) -> Self {
        CheckoutError::validation("payload", err.to_string())
    }
}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => CheckoutError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::TransactionNotFound => CheckoutError::UnknownTransaction(
                err.details
                    .get("transaction_id")
                    .cloned()
                    .unwrap_or(err.message),
            ),
            _ => CheckoutError::Infrastructure(err.to_string()),
        }
    }
}
