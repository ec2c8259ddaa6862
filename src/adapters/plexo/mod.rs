//! Plexo express checkout adapter.
//!
//! Implements the `PaymentGateway` and `RequestSigner` ports:
//! - Purchase authorization and status inquiry payloads
//! - Canonical, signed request envelopes
//! - Callback parsing
//!
//! # Security
//!
//! - Requests are signed with the merchant's RSA key (SHA-512, PKCS#1 v1.5)
//! - The key lives in a password-protected PKCS#12 keystore, loaded once
//! - Gateway response bodies are logged, never returned to clients

mod client;
mod keystore_signer;
mod mock_gateway;
mod payload;
mod wire_types;

pub use client::{parse_callback, PlexoGatewayClient};
pub use keystore_signer::KeyStoreSigner;
pub use mock_gateway::MockPaymentGateway;
pub use payload::PayloadBuilder;
pub use wire_types::{GatewayResult, PurchaseReport, SignedMessage, RESULT_EXPIRED, RESULT_OK};
