//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `EXPRESS_CHECKOUT`
//! prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use express_checkout::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod gateway;
mod reconciliation;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::{GatewayConfig, MAX_GATEWAY_TIMEOUT_SECS, MIN_GATEWAY_TIMEOUT_SECS};
pub use reconciliation::ReconciliationConfig;
pub use server::{Environment, ServerConfig};

#[cfg(test)]
pub(crate) use gateway::test_gateway_config;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub gateway: GatewayConfig,

    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads variables with the `EXPRESS_CHECKOUT` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `EXPRESS_CHECKOUT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `EXPRESS_CHECKOUT__GATEWAY__FINGERPRINT=...` -> `gateway.fingerprint = ...`
    ///
    /// # Errors
    ///
    /// `ConfigError` if required variables are missing or fail to parse.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EXPRESS_CHECKOUT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.gateway.validate(&self.server.environment)?;
        self.reconciliation.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
