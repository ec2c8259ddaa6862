//! In-memory adapters for tests and local development.

mod product_catalog;
mod transaction_repository;

pub use product_catalog::InMemoryProductCatalog;
pub use transaction_repository::InMemoryTransactionRepository;
