//! Document storage configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Signed download URL settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Public base URL of the file server
    pub base_url: String,

    /// HMAC key shared with the file server
    pub signing_key: SecretString,

    /// Lifetime of issued URLs in seconds
    #[serde(default = "default_url_ttl")]
    pub url_ttl_secs: u64,
}

impl StorageConfig {
    pub fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidStorageBaseUrl);
        }
        if self.signing_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__SIGNING_KEY"));
        }
        if self.url_ttl_secs == 0 || self.url_ttl_secs > MAX_URL_TTL_SECS {
            return Err(ValidationError::InvalidUrlTtl);
        }
        Ok(())
    }
}

fn default_url_ttl() -> u64 {
    15 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            base_url: "https://files.example.com".to_string(),
            signing_key: SecretString::new("key".to_string()),
            url_ttl_secs: default_url_ttl(),
        }
    }

    #[test]
    fn test_default_ttl_is_fifteen_minutes() {
        assert_eq!(config().url_ttl(), Duration::from_secs(900));
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let config = StorageConfig {
            base_url: "files.example.com".to_string(),
            ..config()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidStorageBaseUrl));
    }

    #[test]
    fn test_empty_signing_key() {
        let config = StorageConfig {
            signing_key: SecretString::new(String::new()),
            ..config()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STORAGE__SIGNING_KEY"))
        );
    }

    #[test]
    fn test_ttl_bounds() {
        for ttl in [0, MAX_URL_TTL_SECS + 1] {
            let config = StorageConfig {
                url_ttl_secs: ttl,
                ..config()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidUrlTtl));
        }
    }
}
