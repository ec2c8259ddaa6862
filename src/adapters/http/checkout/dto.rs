//! Request and response DTOs for checkout endpoints.
//!
//! Amounts are JSON numbers with a fractional part (`122.0`), matching what
//! the gateway receives.

use serde::{Deserialize, Serialize};

use crate::application::{
    CheckoutItem, HandleGatewayWebhookResult, PollTransactionStatusResult, StartCheckoutResult,
    TransactionStatusView,
};
use crate::domain::checkout::{Customer, Money, ShippingAddress, TransactionStatus};
use crate::domain::foundation::{StateMachine, ValidationError};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckoutRequest {
    pub customer: CustomerRequest,
    pub items: Vec<CheckoutItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub zip_code: String,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItemRequest {
    pub product_id: i64,
    pub quantity: u32,
}

impl TryFrom<CustomerRequest> for Customer {
    type Error = ValidationError;

    fn try_from(req: CustomerRequest) -> Result<Self, Self::Error> {
        Customer::new(
            req.first_name,
            req.last_name,
            req.email,
            req.phone,
            ShippingAddress {
                address: req.address,
                zip_code: req.zip_code,
                city: req.city,
            },
        )
    }
}

impl From<CheckoutItemRequest> for CheckoutItem {
    fn from(req: CheckoutItemRequest) -> Self {
        CheckoutItem {
            product_id: req.product_id,
            quantity: req.quantity,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub total_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl From<StartCheckoutResult> for CheckoutResponse {
    fn from(result: StartCheckoutResult) -> Self {
        Self {
            transaction_id: result.transaction_id.to_string(),
            status: result.status,
            total_amount: result.total_amount,
            redirect_uri: result.redirect_uri,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusResponse {
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub is_terminal: bool,
    /// Present once the transaction is terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    pub total_amount: Money,
    pub last_updated_at: String,
}

impl From<TransactionStatusView> for TransactionStatusResponse {
    fn from(view: TransactionStatusView) -> Self {
        Self {
            transaction_id: view.transaction_id.to_string(),
            status: view.status,
            is_terminal: view.is_terminal,
            approved: view.approved,
            total_amount: view.total_amount,
            last_updated_at: view.last_updated_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub is_terminal: bool,
    /// This poll moved the transaction to a terminal status.
    pub changed: bool,
}

impl From<PollTransactionStatusResult> for PollResponse {
    fn from(result: PollTransactionStatusResult) -> Self {
        Self {
            transaction_id: result.transaction_id.to_string(),
            status: result.status,
            is_terminal: result.status.is_terminal(),
            changed: result.changed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub transaction_id: String,
    pub status: TransactionStatus,
    /// False when the same outcome had already been recorded.
    pub applied: bool,
}

impl From<HandleGatewayWebhookResult> for WebhookAckResponse {
    fn from(result: HandleGatewayWebhookResult) -> Self {
        Self {
            transaction_id: result.transaction_id.to_string(),
            status: result.outcome.status(),
            applied: result.outcome.changed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}
