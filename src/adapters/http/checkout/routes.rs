//! Axum router configuration for checkout endpoints.

use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    get_transaction_status, handle_gateway_webhook, health, poll_transaction_status,
    start_checkout, CheckoutAppState,
};
use crate::config::ServerConfig;

/// # Routes
/// - `POST /` - Start a checkout
/// - `GET /:id/status` - Transaction status
/// - `POST /:id/poll` - Poll the gateway for the outcome
pub fn checkout_routes() -> Router<CheckoutAppState> {
    Router::new()
        .route("/", post(start_checkout))
        .route("/:id/status", get(get_transaction_status))
        .route("/:id/poll", post(poll_transaction_status))
}

/// Gateway callbacks. Separate from the checkout routes because they are
/// called by the gateway, not by the shop front end.
///
/// # Routes
/// - `POST /plexo` - Purchase outcome callback
pub fn webhook_routes() -> Router<CheckoutAppState> {
    Router::new().route("/plexo", post(handle_gateway_webhook))
}

/// Complete checkout router, mounted at `/api/checkout`, `/api/webhooks`
/// and `/health`.
///
/// ```ignore
/// let app = checkout_router().with_state(state);
/// ```
pub fn checkout_router() -> Router<CheckoutAppState> {
    Router::new()
        .nest("/api/checkout", checkout_routes())
        .nest("/api/webhooks", webhook_routes())
        .route("/health", get(health))
}

/// Router with tracing, CORS and request timeout applied.
pub fn build_app(state: CheckoutAppState, server: &ServerConfig) -> Router {
    checkout_router()
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryProductCatalog, InMemoryTransactionRepository};
    use crate::adapters::plexo::MockPaymentGateway;
    use crate::application::PollRetryPolicy;
    use crate::domain::checkout::Money;
    use crate::domain::foundation::{ProductId, TransactionId};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn app() -> (Router, Arc<MockPaymentGateway>) {
        let catalog = Arc::new(InMemoryProductCatalog::new());
        catalog.insert(ProductId::new(1).unwrap(), "Maceta", Money::from_cents(6100)).await;
        catalog.insert(ProductId::new(2).unwrap(), "Sustrato", Money::from_cents(6100)).await;
        let gateway = Arc::new(MockPaymentGateway::new());
        let state = CheckoutAppState::new(
            Arc::new(InMemoryTransactionRepository::new()),
            catalog,
            gateway.clone(),
            PollRetryPolicy {
                attempts: 1,
                backoff: Duration::from_millis(1),
            },
        );
        (build_app(state, &ServerConfig::default()), gateway)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn checkout_body() -> Value {
        json!({
            "customer": {
                "first_name": "Ana",
                "last_name": "Pérez",
                "email": "ana@example.com",
                "address": "Av. Italia 1234",
                "city": "Montevideo"
            },
            "items": [
                { "product_id": 1, "quantity": 1 },
                { "product_id": 2, "quantity": 1 }
            ]
        })
    }

    fn callback(reference: &str, status: i32) -> Value {
        json!({
            "Object": {
                "Object": {
                    "Transactions": {
                        "Purchase": { "ClientReferenceId": reference, "Status": status }
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app().await;

        let (status, body) = send(
            &app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn checkout_then_webhook_then_status() {
        let (app, _) = app().await;

        let (status, created) = send(&app, post_json("/api/checkout", checkout_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "awaiting_gateway_result");
        assert_eq!(created["total_amount"], json!(122.0));
        let id = created["transaction_id"].as_str().unwrap().to_string();

        let (status, ack) = send(&app, post_json("/api/webhooks/plexo", callback(&id, 0))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["applied"], true);

        let (status, view) = send(
            &app,
            Request::builder()
                .uri(format!("/api/checkout/{}/status", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["status"], "approved");
        assert_eq!(view["approved"], true);

        let (status, conflict) = send(&app, post_json("/api/webhooks/plexo", callback(&id, 5))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(conflict["error_code"], "STATE_CONFLICT");
    }

    #[tokio::test]
    async fn poll_declines_on_nonzero_outcome() {
        let (app, gateway) = app().await;
        let (_, created) = send(&app, post_json("/api/checkout", checkout_body())).await;
        let id = created["transaction_id"].as_str().unwrap().to_string();
        gateway.set_outcome(id.parse::<TransactionId>().unwrap(), 5);

        let (status, polled) = send(&app, post_json(&format!("/api/checkout/{}/poll", id), json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(polled["status"], "declined");
        assert_eq!(polled["changed"], true);
    }

    #[tokio::test]
    async fn bad_requests_map_to_client_errors() {
        let (app, _) = app().await;

        let (status, body) = send(
            &app,
            post_json("/api/checkout", json!({ "customer": checkout_body()["customer"], "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "items");

        let (status, _) = send(&app, post_json("/api/webhooks/plexo", json!({ "Object": {} }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            post_json("/api/webhooks/plexo", callback(&TransactionId::new().to_string(), 0)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Request::builder()
                .uri("/api/checkout/not-a-uuid/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn gateway_outage_is_bad_gateway_with_generic_message() {
        let (app, gateway) = app().await;
        gateway.fail_initiation(
            crate::ports::GatewayError::unavailable("connect error").with_gateway_body("secret"),
        );

        let (status, body) = send(&app, post_json("/api/checkout", checkout_body())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.to_string().contains("secret"));
    }
}
