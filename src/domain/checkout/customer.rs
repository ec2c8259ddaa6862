//! Payer contact and shipping details captured at checkout.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Where the order ships. Country comes from gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub zip_code: String,
    pub city: String,
}

/// Immutable snapshot of the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    shipping: ShippingAddress,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        shipping: ShippingAddress,
    ) -> Result<Self, ValidationError> {
        let first_name = required("first_name", first_name.into())?;
        let last_name = required("last_name", last_name.into())?;
        let email = required("email", email.into())?;
        let phone = phone.into().trim().to_string();

        let valid_email = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !valid_email {
            return Err(ValidationError::invalid_format("email", "expected name@domain"));
        }

        let shipping = ShippingAddress {
            address: required("address", shipping.address)?,
            zip_code: shipping.zip_code.trim().to_string(),
            city: required("city", shipping.city)?,
        };

        Ok(Self {
            first_name,
            last_name,
            email,
            phone,
            shipping,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn shipping(&self) -> &ShippingAddress {
        &self.shipping
    }
}

fn required(field: &str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed.to_string())
}
