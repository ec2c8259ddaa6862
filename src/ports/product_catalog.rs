//! Read-only pricing collaborator.
//!
//! Products are managed elsewhere; checkout only needs names and current
//! prices at intake time.

use crate::domain::checkout::Money;
use crate::domain::foundation::{DomainError, ProductId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the products that exist among `ids`. Missing ids are simply
    /// absent from the result.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<CatalogProduct>, DomainError>;
}
