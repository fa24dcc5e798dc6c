//! Mock payment provider for testing.
//!
//! Provides a configurable implementation of `PaymentProvider` for unit and
//! integration tests. Supports:
//! - Pre-configured subscriptions
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::billing::StripeSubscription;
use crate::ports::{PaymentError, PaymentProvider};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_subscription(subscription);
/// mock.set_error(PaymentError::network("down"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    subscriptions: HashMap<String, StripeSubscription>,
    next_error: Option<PaymentError>,
    calls: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Makes `subscription` known under its id.
    pub fn set_subscription(&self, subscription: StripeSubscription) {
        self.state()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    /// Fails the next call with `error`.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Subscription ids requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn get_subscription(&self, subscription_id: &str) -> Result<Option<StripeSubscription>, PaymentError> {
        let mut state = self.state();
        state.calls.push(subscription_id.to_string());
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        Ok(state.subscriptions.get(subscription_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{StripeList, SubscriptionStatus};

    fn subscription(id: &str) -> StripeSubscription {
        StripeSubscription {
            id: id.to_string(),
            status: SubscriptionStatus::Active,
            customer: None,
            default_payment_method: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
            metadata: HashMap::new(),
            items: StripeList::default(),
        }
    }

    #[tokio::test]
    async fn returns_configured_subscription_and_records_calls() {
        let mock = MockPaymentProvider::new();
        mock.set_subscription(subscription("sub_1"));

        assert!(mock.get_subscription("sub_1").await.unwrap().is_some());
        assert!(mock.get_subscription("sub_2").await.unwrap().is_none());
        assert_eq!(mock.calls(), vec!["sub_1", "sub_2"]);
    }

    #[tokio::test]
    async fn injected_error_fires_once() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::network("down"));

        assert!(mock.get_subscription("sub_1").await.is_err());
        assert!(mock.get_subscription("sub_1").await.is_ok());
    }
}
