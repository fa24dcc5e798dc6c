//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `STORE_COMPLIANCE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use store_compliance::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Sweeping every {:?}", config.scheduler.interval());
//! ```

mod database;
mod error;
mod idempotency;
mod payment;
mod redis;
mod runtime;
mod scheduler;
mod storage;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use idempotency::IdempotencyConfig;
pub use payment::PaymentConfig;
pub use self::redis::RedisConfig;
pub use runtime::{Environment, LogFormat, RuntimeConfig};
pub use scheduler::SchedulerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// PostgreSQL connection pool
    pub database: DatabaseConfig,

    /// Idempotency key store
    #[serde(default)]
    pub redis: RedisConfig,

    /// Stripe API and webhook secrets
    pub payment: PaymentConfig,

    /// Expiry scheduler timing
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Webhook dedupe window
    #[serde(default)]
    pub idempotency: IdempotencyConfig,

    /// Signed document URLs
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `STORE_COMPLIANCE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `STORE_COMPLIANCE__DATABASE__URL=...` -> `database.url = ...`
    /// - `STORE_COMPLIANCE__SCHEDULER__WARNING_DAYS=30` -> `scheduler.warning_days = 30`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STORE_COMPLIANCE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Loads and validates in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let production = self.is_production();
        self.runtime.validate()?;
        self.database.validate()?;
        self.redis.validate(production)?;
        self.payment.validate(production)?;
        self.scheduler.validate()?;
        self.idempotency.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}
