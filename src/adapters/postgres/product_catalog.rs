//! PostgreSQL product catalog reader.
//!
//! The `products` table is maintained by the catalog service; this adapter
//! only reads id, name and price.

use crate::domain::checkout::Money;
use crate::domain::foundation::{DomainError, ErrorCode, ProductId};
use crate::ports::{CatalogProduct, ProductCatalog};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

pub struct PostgresProductCatalog {
    pool: PgPool,
}

impl PostgresProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: Decimal,
}

impl TryFrom<ProductRow> for CatalogProduct {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let invalid = |e: crate::domain::foundation::ValidationError| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid product {}: {}", row.id, e),
            )
        };
        Ok(CatalogProduct {
            id: ProductId::new(row.id).map_err(invalid)?,
            name: row.name.clone(),
            price: Money::new(row.price).map_err(invalid)?,
        })
    }
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<CatalogProduct>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw_ids: Vec<i64> = ids.iter().map(ProductId::value).collect();

        let rows: Vec<ProductRow> =
            sqlx::query_as("SELECT id, name, price FROM products WHERE id = ANY($1)")
                .bind(&raw_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to load products: {}", e),
                    )
                })?;

        rows.into_iter().map(CatalogProduct::try_from).collect()
    }
}
