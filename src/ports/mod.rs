//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TransactionRepository` - Transaction store with conditional status writes
//! - `PaymentGateway` - Signed purchase initiation and status inquiry
//! - `RequestSigner` - Signature over canonical request bytes
//! - `ProductCatalog` - Read-only product names and prices

mod payment_gateway;
mod product_catalog;
mod request_signer;
mod transaction_repository;

pub use payment_gateway::{
    CallbackReport, GatewayError, GatewayErrorCode, PaymentGateway, PurchaseSession,
};
pub use product_catalog::{CatalogProduct, ProductCatalog};
pub use request_signer::RequestSigner;
pub use transaction_repository::{TransactionRepository, TransitionResult};
