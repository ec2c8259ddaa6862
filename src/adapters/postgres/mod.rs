//! PostgreSQL adapters.
//!
//! - `PostgresTransactionRepository` - transaction records with conditional status writes
//! - `PostgresProductCatalog` - read-only product pricing

mod product_catalog;
mod transaction_repository;

pub use product_catalog::PostgresProductCatalog;
pub use transaction_repository::PostgresTransactionRepository;
