//! Local mirror of a provider subscription.
//!
//! The provider is the source of truth. A [`Subscription`] row records the last
//! state we reconciled so the store's subscription-active flag can be derived
//! without calling out to the provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StoreId, SubscriptionId, Timestamp, ValidationError};

use super::StripeSubscription;

/// Subscription status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    /// Returns true if the store should be treated as subscribed.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incomplete" => Ok(SubscriptionStatus::Incomplete),
            "incomplete_expired" => Ok(SubscriptionStatus::IncompleteExpired),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            "unpaid" => Ok(SubscriptionStatus::Unpaid),
            "paused" => Ok(SubscriptionStatus::Paused),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

/// Subscription entity.
///
/// # Invariants
///
/// - at most one row per `external_id`, bound to a single store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub store_id: StoreId,
    pub external_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub price_ref: Option<String>,
    pub customer_ref: Option<String>,
    pub payment_method_ref: Option<String>,
    pub cancel_at_period_end: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Builds a new local row from a provider object.
    pub fn from_provider(store_id: StoreId, remote: &StripeSubscription, now: Timestamp) -> Self {
        Self {
            id: SubscriptionId::new(),
            store_id,
            external_id: remote.id.clone(),
            status: remote.status,
            current_period_start: remote.current_period_start.and_then(Timestamp::from_unix_secs),
            current_period_end: remote.current_period_end.and_then(Timestamp::from_unix_secs),
            price_ref: remote.price_ref().map(str::to_string),
            customer_ref: remote.customer.clone(),
            payment_method_ref: remote.default_payment_method.clone(),
            cancel_at_period_end: remote.cancel_at_period_end,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copies provider-owned fields onto this row.
    ///
    /// Identity fields (`id`, `store_id`, `external_id`, `created_at`) are kept.
    pub fn apply(&mut self, remote: &StripeSubscription, now: Timestamp) {
        let fresh = Self::from_provider(self.store_id, remote, now);
        self.status = fresh.status;
        self.current_period_start = fresh.current_period_start;
        self.current_period_end = fresh.current_period_end;
        self.price_ref = fresh.price_ref;
        self.customer_ref = fresh.customer_ref;
        self.payment_method_ref = fresh.payment_method_ref;
        self.cancel_at_period_end = fresh.cancel_at_period_end;
        self.updated_at = now;
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
