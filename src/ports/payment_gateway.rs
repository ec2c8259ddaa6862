//! Payment gateway port.
//!
//! Two signed remote operations: initiate a purchase and query its status.
//! Implementations never retry. A repeated purchase initiation could
//! create a second charge attempt at the gateway, so retry policy is left
//! to callers, who only retry status inquiries.

use crate::domain::checkout::{CheckoutError, GatewayOutcome, Transaction};
use crate::domain::foundation::{DomainError, ErrorCode, TransactionId};
use crate::domain::signing::SigningError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Sends a signed purchase authorization for `transaction`.
    ///
    /// Returns where the payer should be sent to complete the purchase.
    async fn initiate_purchase(
        &self,
        transaction: &Transaction,
    ) -> Result<PurchaseSession, GatewayError>;

    /// Sends a signed status inquiry.
    ///
    /// Returns `None` while the gateway has no final outcome yet.
    async fn query_status(
        &self,
        id: &TransactionId,
    ) -> Result<Option<GatewayOutcome>, GatewayError>;

    /// Extracts the correlation reference and outcome from an asynchronous
    /// callback body.
    ///
    /// # Errors
    ///
    /// `InvalidResponse` if the body lacks the expected structure.
    fn parse_callback(&self, payload: &[u8]) -> Result<CallbackReport, GatewayError>;
}

/// Outcome delivered by a gateway callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackReport {
    /// Correlation reference exactly as the gateway sent it.
    pub reference: String,
    pub outcome: GatewayOutcome,
}

/// Gateway acknowledgement of a purchase authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSession {
    /// Hosted payment page for the payer.
    pub redirect_uri: Option<String>,
}

/// Gateway integration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,

    /// Human-readable message, for logs.
    pub message: String,

    /// Raw gateway response body, if one was received. Never shown to clients.
    pub gateway_body: Option<String>,

    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            gateway_body: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_gateway_body(mut self, body: impl Into<String>) -> Self {
        self.gateway_body = Some(body.into());
        self
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Unavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Rejected, message)
    }

    pub fn expired(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Expired, message)
    }

    pub fn key_material(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::KeyMaterial, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }
}

impl From<SigningError> for GatewayError {
    fn from(err: SigningError) -> Self {
        GatewayError::invalid_request(err.to_string())
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        let detail = match &err.gateway_body {
            Some(body) => format!("{} ({})", err.message, body),
            None => err.message.clone(),
        };
        match err.code {
            GatewayErrorCode::Unavailable => CheckoutError::GatewayUnavailable(detail),
            GatewayErrorCode::Timeout => CheckoutError::GatewayTimeout(detail),
            GatewayErrorCode::Rejected => CheckoutError::GatewayRejected(detail),
            GatewayErrorCode::Expired => CheckoutError::GatewayExpired(detail),
            GatewayErrorCode::KeyMaterial => CheckoutError::KeyMaterial(detail),
            GatewayErrorCode::InvalidResponse => CheckoutError::GatewayUnavailable(detail),
            // same shape as a SigningError raised outside the adapter
            GatewayErrorCode::InvalidRequest => CheckoutError::validation("payload", err.message),
        }
    }
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let code = match err.code {
            GatewayErrorCode::Unavailable | GatewayErrorCode::InvalidResponse => {
                ErrorCode::GatewayUnavailable
            }
            GatewayErrorCode::Timeout => ErrorCode::GatewayTimeout,
            GatewayErrorCode::Rejected => ErrorCode::GatewayRejected,
            GatewayErrorCode::Expired => ErrorCode::GatewayExpired,
            GatewayErrorCode::KeyMaterial => ErrorCode::KeyMaterialUnavailable,
            GatewayErrorCode::InvalidRequest => ErrorCode::ValidationFailed,
        };
        DomainError::new(code, err.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network failure or no usable response.
    Unavailable,

    /// No response within the configured bound.
    Timeout,

    /// The gateway answered with an error.
    Rejected,

    /// The gateway says the signed request outlived its expiration.
    Expired,

    /// Keystore unreadable, wrong password or no private key.
    KeyMaterial,

    /// A 2xx response that could not be understood.
    InvalidResponse,

    /// The request could not be serialized or signed. Never sent.
    InvalidRequest,
}

impl GatewayErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayErrorCode::Unavailable | GatewayErrorCode::Timeout)
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::Unavailable => "gateway_unavailable",
            GatewayErrorCode::Timeout => "gateway_timeout",
            GatewayErrorCode::Rejected => "gateway_rejected",
            GatewayErrorCode::Expired => "gateway_expired",
            GatewayErrorCode::KeyMaterial => "key_material",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::InvalidRequest => "invalid_request",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn transport_failures_are_retryable() {
        assert!(GatewayError::unavailable("refused").retryable);
        assert!(GatewayError::timeout("20s").retryable);
        assert!(!GatewayError::rejected("bad signature").retryable);
        assert!(!GatewayError::expired("late").retryable);
        assert!(!GatewayError::key_material("wrong password").retryable);
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = GatewayError::rejected("HTTP 400");
        assert_eq!(err.to_string(), "gateway_rejected: HTTP 400");
    }

    #[test]
    fn converts_into_checkout_error_with_body() {
        let err: CheckoutError = GatewayError::rejected("HTTP 400")
            .with_gateway_body(r#"{"ErrorMessage":"bad"}"#)
            .into();
        match err {
            CheckoutError::GatewayRejected(detail) => assert!(detail.contains("ErrorMessage")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unbuildable_request_is_a_non_retryable_validation_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = GatewayError::from(SigningError::from(json_err));

        assert_eq!(err.code, GatewayErrorCode::InvalidRequest);
        assert!(!err.retryable);

        let checkout: CheckoutError = err.into();
        assert!(matches!(checkout, CheckoutError::Validation { ref field, .. } if field == "payload"));
        assert!(!checkout.is_retryable());
    }

    #[test]
    fn key_material_maps_to_checkout_key_material() {
        let err: CheckoutError = GatewayError::key_material("no key").into();
        assert!(matches!(err, CheckoutError::KeyMaterial(_)));
    }
}
