//! Payment gateway configuration (Plexo express checkout)

use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use super::server::{split_list, Environment};

pub const MIN_GATEWAY_TIMEOUT_SECS: u64 = 10;
pub const MAX_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Merchant credentials and fixed request attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Service root, without a trailing operation path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_purchase_path")]
    pub purchase_path: String,

    #[serde(default = "default_status_path")]
    pub status_path: String,

    /// Certificate fingerprint identifying the merchant key
    #[serde(default)]
    pub fingerprint: String,

    /// Merchant client name
    #[serde(default)]
    pub client_name: String,

    pub commerce_id: i64,

    #[serde(default = "default_currency_id")]
    pub currency_id: i32,

    /// Comma-separated bank codes accepted for payment
    #[serde(default = "default_limit_banks")]
    pub limit_banks: String,

    /// Comma-separated card issuer codes accepted for payment
    #[serde(default = "default_limit_issuers")]
    pub limit_issuers: String,

    /// Where the gateway sends the payer after the hosted flow
    #[serde(default)]
    pub redirect_uri: String,

    #[serde(default = "default_shipping_country")]
    pub shipping_country: String,

    #[serde(default = "default_invoice_number")]
    pub invoice_number: i64,

    /// `TaxedAmount` as a percentage of `BilledAmount`
    #[serde(default = "default_taxed_ratio")]
    pub taxed_ratio_percent: u32,

    /// Ask the gateway to deliver outcome callbacks
    #[serde(default = "default_use_callback")]
    pub use_callback: bool,

    /// PKCS#12 keystore holding the signing key
    #[serde(default)]
    pub keystore_path: PathBuf,

    pub keystore_password: SecretString,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Lifetime of a signed request (`UTCUnixTimeExpiration - now`)
    #[serde(default = "default_request_ttl")]
    pub request_ttl_secs: u64,
}

impl GatewayConfig {
    pub fn purchase_url(&self) -> String {
        join_url(&self.base_url, &self.purchase_path)
    }

    pub fn status_url(&self) -> String {
        join_url(&self.base_url, &self.status_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn limit_banks_list(&self) -> Vec<String> {
        split_list(&self.limit_banks)
    }

    pub fn limit_issuers_list(&self) -> Vec<String> {
        split_list(&self.limit_issuers)
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.fingerprint.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__FINGERPRINT"));
        }
        if self.client_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__CLIENT_NAME"));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__REDIRECT_URI"));
        }
        if self.keystore_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__KEYSTORE_PATH"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if *environment == Environment::Production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::GatewayUrlMustBeHttps);
        }
        if !(MIN_GATEWAY_TIMEOUT_SECS..=MAX_GATEWAY_TIMEOUT_SECS).contains(&self.request_timeout_secs)
        {
            return Err(ValidationError::InvalidGatewayTimeout);
        }
        if self.request_ttl_secs == 0 {
            return Err(ValidationError::InvalidRequestTtl);
        }
        if self.taxed_ratio_percent > 100 {
            return Err(ValidationError::InvalidTaxedRatio);
        }
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn default_base_url() -> String {
    "https://testing.plexo.com.uy:4043/SecurePaymentGateway.svc".to_string()
}

fn default_purchase_path() -> String {
    "/ExpressCheckout".to_string()
}

fn default_status_path() -> String {
    "/Status".to_string()
}

fn default_currency_id() -> i32 {
    2
}

fn default_limit_banks() -> String {
    "113,137".to_string()
}

fn default_limit_issuers() -> String {
    "4,11".to_string()
}

fn default_shipping_country() -> String {
    "UY".to_string()
}

fn default_invoice_number() -> i64 {
    -1390098693
}

fn default_taxed_ratio() -> u32 {
    90
}

fn default_use_callback() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    20
}

fn default_request_ttl() -> u64 {
    3600
}

#[cfg(test)]
pub(crate) fn test_gateway_config() -> GatewayConfig {
    GatewayConfig {
        base_url: default_base_url(),
        purchase_path: default_purchase_path(),
        status_path: default_status_path(),
        fingerprint: "579F4609DD4315D890921F47293B0E7CAC6CB290".to_string(),
        client_name: "AgrojardinTest".to_string(),
        commerce_id: 12285,
        currency_id: default_currency_id(),
        limit_banks: default_limit_banks(),
        limit_issuers: default_limit_issuers(),
        redirect_uri: "https://shop.example/checkout/done".to_string(),
        shipping_country: default_shipping_country(),
        invoice_number: default_invoice_number(),
        taxed_ratio_percent: default_taxed_ratio(),
        use_callback: true,
        keystore_path: PathBuf::from("/etc/express-checkout/merchant.p12"),
        keystore_password: SecretString::new("changeit".to_string()),
        request_timeout_secs: default_request_timeout(),
        request_ttl_secs: default_request_ttl(),
    }
}
