//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API. Only the
//! subscription lookup needed by payment reconciliation is supported.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_base_url("http://localhost:12111");
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::domain::billing::StripeSubscription;
use crate::ports::{PaymentError, PaymentErrorCode, PaymentProvider};

/// Default Stripe API endpoint.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_STRIPE_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, http_client }
    }

    fn subscription_url(&self, subscription_id: &str) -> String {
        format!("{}/v1/subscriptions/{}", self.config.api_base_url, subscription_id)
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn get_subscription(&self, subscription_id: &str) -> Result<Option<StripeSubscription>, PaymentError> {
        if subscription_id.is_empty() || subscription_id.contains('/') {
            return Ok(None);
        }

        let response = self
            .http_client
            .get(self.subscription_url(subscription_id))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PaymentError::authentication("Stripe rejected the API key"));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PaymentError::new(
                PaymentErrorCode::RateLimitExceeded,
                "Stripe rate limit exceeded",
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                subscription_id,
                status = status.as_u16(),
                error = %error_text,
                "Stripe get_subscription failed"
            );
            return Err(PaymentError::provider(format!("Stripe API error: {}", error_text))
                .with_provider_code(status.as_u16().to_string()));
        }

        let subscription: StripeSubscription = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::InvalidResponse,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        Ok(Some(subscription))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let adapter = StripePaymentAdapter::new(
            StripeConfig::new(SecretString::new("sk_test".to_string())).with_base_url("http://stripe.local/"),
        );
        assert_eq!(
            adapter.subscription_url("sub_1"),
            "http://stripe.local/v1/subscriptions/sub_1"
        );
    }

    #[tokio::test]
    async fn path_like_ids_are_unknown() {
        let adapter = StripePaymentAdapter::new(
            StripeConfig::new(SecretString::new("sk_test".to_string())).with_base_url("http://127.0.0.1:9"),
        );
        assert_eq!(adapter.get_subscription("../customers").await.unwrap(), None);
        assert_eq!(adapter.get_subscription("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        let adapter = StripePaymentAdapter::new(
            StripeConfig::new(SecretString::new("sk_test".to_string()))
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_millis(200)),
        );
        let err = adapter.get_subscription("sub_1").await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::NetworkError);
        assert!(err.is_retryable());
    }
}
