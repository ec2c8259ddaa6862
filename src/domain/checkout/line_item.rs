//! Priced cart line.

use serde::{Deserialize, Serialize};

use super::Money;
use crate::domain::foundation::{ProductId, ValidationError};

pub const MAX_QUANTITY: u32 = 999;

/// One product in a transaction, priced at intake time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    product_id: ProductId,
    name: String,
    unit_price: Money,
    quantity: u32,
}

impl LineItem {
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if quantity == 0 || quantity > MAX_QUANTITY {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                MAX_QUANTITY as i64,
                quantity as i64,
            ));
        }
        unit_price.times(quantity).within_max("amount")?;
        Ok(Self {
            product_id,
            name,
            unit_price,
            quantity,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price × quantity`.
    pub fn amount(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}
