//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Stripe API base URL must use HTTPS in production")]
    StripeBaseMustBeHttps,

    #[error("Scheduler interval must be at least one second")]
    InvalidSchedulerInterval,

    #[error("Scheduler warning window must be between 1 and 365 days")]
    InvalidWarningDays,

    #[error("Idempotency TTL must be at least one hour")]
    IdempotencyTtlTooShort,

    #[error("Invalid idempotency scope: {0}")]
    InvalidIdempotencyScope(String),

    #[error("Signed URL TTL must be between 1 second and 7 days")]
    InvalidUrlTtl,

    #[error("Storage base URL must be an http(s) URL")]
    InvalidStorageBaseUrl,
}
