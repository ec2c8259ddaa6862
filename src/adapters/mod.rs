//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `plexo` - Payment gateway client, request signing, callback parsing
//! - `postgres` - Transaction store and product catalog
//! - `memory` - In-memory store and catalog for tests and local development
//! - `http` - REST API

pub mod http;
pub mod memory;
pub mod plexo;
pub mod postgres;

pub use memory::{InMemoryProductCatalog, InMemoryTransactionRepository};
pub use plexo::{KeyStoreSigner, MockPaymentGateway, PlexoGatewayClient};
pub use postgres::{PostgresProductCatalog, PostgresTransactionRepository};
