//! Webhook idempotency configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Idempotency key settings for inbound webhooks
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    /// Lifetime of a processed-event mark in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Key scope for payment webhooks
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl IdempotencyConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        // Stripe retries for up to three days; marks must outlive one hour at least.
        if self.ttl_secs < 3600 {
            return Err(ValidationError::IdempotencyTtlTooShort);
        }
        let valid_scope = !self.scope.is_empty()
            && self
                .scope
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid_scope {
            return Err(ValidationError::InvalidIdempotencyScope(self.scope.clone()));
        }
        Ok(())
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            scope: default_scope(),
        }
    }
}

fn default_ttl() -> u64 {
    72 * 60 * 60
}

fn default_scope() -> String {
    "stripe_webhook".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IdempotencyConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(259_200));
        assert_eq!(config.scope, "stripe_webhook");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_ttl_rejected() {
        let config = IdempotencyConfig {
            ttl_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::IdempotencyTtlTooShort));
    }

    #[test]
    fn test_scope_must_be_key_safe() {
        for scope in ["", "Stripe", "a:b", "with space"] {
            let config = IdempotencyConfig {
                scope: scope.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "scope {:?}", scope);
        }
    }
}
