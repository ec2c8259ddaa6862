//! HTTP adapters - REST API implementations.

pub mod checkout;

pub use checkout::{build_app, checkout_router, CheckoutAppState};
