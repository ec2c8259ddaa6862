//! In-memory product catalog, seeded by the caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::checkout::Money;
use crate::domain::foundation::{DomainError, ProductId};
use crate::ports::{CatalogProduct, ProductCatalog};

#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    products: Arc<RwLock<HashMap<ProductId, CatalogProduct>>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: ProductId, name: impl Into<String>, price: Money) {
        self.products.write().await.insert(
            id,
            CatalogProduct {
                id,
                name: name.into(),
                price,
            },
        );
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<CatalogProduct>, DomainError> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_only_known_products() {
        let catalog = InMemoryProductCatalog::new();
        let known = ProductId::new(1).unwrap();
        catalog.insert(known, "Maceta", Money::from_cents(6100)).await;

        let found = catalog
            .find_by_ids(&[known, ProductId::new(2).unwrap()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Maceta");
    }
}
