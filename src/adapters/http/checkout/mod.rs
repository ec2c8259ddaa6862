//! HTTP adapter for checkout endpoints.
//!
//! - `POST /api/checkout` - Start a checkout
//! - `GET /api/checkout/:id/status` - Transaction status
//! - `POST /api/checkout/:id/poll` - Poll the gateway for the outcome
//! - `POST /api/webhooks/plexo` - Gateway outcome callback
//! - `GET /health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{CheckoutApiError, CheckoutAppState};
pub use routes::{build_app, checkout_router};
