//! HTTP handlers for checkout endpoints.
//!
//! These handlers connect Axum routes to the checkout command and query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{
    GetTransactionStatusHandler, GetTransactionStatusQuery, HandleGatewayWebhookHandler,
    PollRetryPolicy, PollTransactionStatusCommand, PollTransactionStatusHandler,
    ReconciliationEngine, StartCheckoutCommand, StartCheckoutHandler,
};
use crate::domain::checkout::{CheckoutError, Customer};
use crate::domain::foundation::TransactionId;
use crate::ports::{PaymentGateway, ProductCatalog, TransactionRepository};

use super::dto::{
    CheckoutResponse, ErrorResponse, HealthResponse, PollResponse, StartCheckoutRequest,
    TransactionStatusResponse, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for checkout routes. Cloned per request.
#[derive(Clone)]
pub struct CheckoutAppState {
    pub transaction_repository: Arc<dyn TransactionRepository>,
    pub product_catalog: Arc<dyn ProductCatalog>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub engine: Arc<ReconciliationEngine>,
    pub poll_retry: PollRetryPolicy,
}

impl CheckoutAppState {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        product_catalog: Arc<dyn ProductCatalog>,
        payment_gateway: Arc<dyn PaymentGateway>,
        poll_retry: PollRetryPolicy,
    ) -> Self {
        let engine = Arc::new(ReconciliationEngine::new(transaction_repository.clone()));
        Self {
            transaction_repository,
            product_catalog,
            payment_gateway,
            engine,
            poll_retry,
        }
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.transaction_repository.clone(),
            self.product_catalog.clone(),
            self.payment_gateway.clone(),
            self.engine.clone(),
        )
    }

    pub fn get_status_handler(&self) -> GetTransactionStatusHandler {
        GetTransactionStatusHandler::new(self.transaction_repository.clone())
    }

    pub fn poll_handler(&self) -> PollTransactionStatusHandler {
        PollTransactionStatusHandler::new(
            self.transaction_repository.clone(),
            self.payment_gateway.clone(),
            self.engine.clone(),
            self.poll_retry,
        )
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(self.payment_gateway.clone(), self.engine.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout - Start a checkout and initiate the gateway purchase
pub async fn start_checkout(
    State(state): State<CheckoutAppState>,
    Json(request): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let cmd = StartCheckoutCommand {
        customer: Customer::try_from(request.customer).map_err(CheckoutError::from)?,
        items: request.items.into_iter().map(Into::into).collect(),
    };

    let result = state.start_checkout_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(result))))
}

/// GET /api/checkout/:id/status - Current status for the confirmation page
pub async fn get_transaction_status(
    State(state): State<CheckoutAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let query = GetTransactionStatusQuery {
        transaction_id: parse_transaction_id(&id)?,
    };

    let view = state.get_status_handler().handle(query).await?;

    Ok(Json(TransactionStatusResponse::from(view)))
}

/// POST /api/checkout/:id/poll - Ask the gateway for the outcome
pub async fn poll_transaction_status(
    State(state): State<CheckoutAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let cmd = PollTransactionStatusCommand {
        transaction_id: parse_transaction_id(&id)?,
    };

    let result = state.poll_handler().handle(cmd).await?;

    Ok(Json(PollResponse::from(result)))
}

/// POST /api/webhooks/plexo - Gateway outcome callback
pub async fn handle_gateway_webhook(
    State(state): State<CheckoutAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let result = state.webhook_handler().handle(&body).await?;
    Ok(Json(WebhookAckResponse::from(result)))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn parse_transaction_id(raw: &str) -> Result<TransactionId, CheckoutError> {
    TransactionId::from_reference(raw)
        .map_err(|_| CheckoutError::validation("id", "not a transaction id"))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for checkout errors.
#[derive(Debug)]
pub struct CheckoutApiError(CheckoutError);

impl From<CheckoutError> for CheckoutApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl CheckoutApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            CheckoutError::Validation { .. } | CheckoutError::MalformedCallback(_) => {
                StatusCode::BAD_REQUEST
            }
            CheckoutError::UnknownTransaction(_) => StatusCode::NOT_FOUND,
            CheckoutError::StateConflict { .. } => StatusCode::CONFLICT,
            CheckoutError::GatewayRejected(_) | CheckoutError::GatewayExpired(_) => {
                StatusCode::PAYMENT_REQUIRED
            }
            CheckoutError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            CheckoutError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CheckoutError::KeyMaterial(_) | CheckoutError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Checkout request failed");
        }

        let code = self.0.code().to_string();
        let message = self.0.public_message();
        let body = match &self.0 {
            CheckoutError::Validation { field, .. } => {
                ErrorResponse::with_details(code, message, serde_json::json!({ "field": field }))
            }
            CheckoutError::StateConflict { current, .. } => ErrorResponse::with_details(
                code,
                message,
                serde_json::json!({ "current_status": current }),
            ),
            _ => ErrorResponse::new(code, message),
        };

        (status, Json(body)).into_response()
    }
}
