//! Stripe webhook event types.
//!
//! Defines the structures for parsing Stripe webhook payloads.
//! Only fields relevant to subscription reconciliation are captured.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{StoreId, ValidationError};

use super::SubscriptionStatus;

/// Metadata key carrying the owning store on subscription objects.
pub const STORE_ID_METADATA_KEY: &str = "store_id";

/// Stripe webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "customer.subscription.updated").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }
}

/// Stripe event types the reconciler handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CustomerSubscriptionCreated,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    CustomerSubscriptionPaused,
    CustomerSubscriptionResumed,
    InvoicePaymentSucceeded,
    InvoicePaid,
    InvoicePaymentFailed,
    /// Unknown or unhandled event type.
    Unknown,
}

impl StripeEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "customer.subscription.created" => Self::CustomerSubscriptionCreated,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            "customer.subscription.paused" => Self::CustomerSubscriptionPaused,
            "customer.subscription.resumed" => Self::CustomerSubscriptionResumed,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "invoice.paid" => Self::InvoicePaid,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerSubscriptionCreated => "customer.subscription.created",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::CustomerSubscriptionPaused => "customer.subscription.paused",
            Self::CustomerSubscriptionResumed => "customer.subscription.resumed",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::InvoicePaid => "invoice.paid",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::Unknown => "unknown",
        }
    }

    /// Events whose data object is the subscription itself.
    pub fn carries_subscription(&self) -> bool {
        matches!(
            self,
            Self::CustomerSubscriptionCreated
                | Self::CustomerSubscriptionUpdated
                | Self::CustomerSubscriptionDeleted
                | Self::CustomerSubscriptionPaused
                | Self::CustomerSubscriptionResumed
        )
    }

    /// Events whose data object is an invoice referencing a subscription.
    pub fn carries_invoice(&self) -> bool {
        matches!(
            self,
            Self::InvoicePaymentSucceeded | Self::InvoicePaid | Self::InvoicePaymentFailed
        )
    }
}

/// Subscription object as sent in webhooks and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub default_payment_method: Option<String>,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
}

impl StripeSubscription {
    /// Store named in the subscription metadata, if any.
    ///
    /// A blank value counts as absent; a malformed one is an error.
    pub fn store_reference(&self) -> Result<Option<StoreId>, ValidationError> {
        match self.metadata.get(STORE_ID_METADATA_KEY).map(|s| s.trim()) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<StoreId>().map(Some).map_err(|_| {
                ValidationError::invalid_format(
                    "metadata.store_id",
                    format!("'{}' is not a store id", raw),
                )
            }),
        }
    }

    /// Price of the first line item.
    pub fn price_ref(&self) -> Option<&str> {
        self.items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }
}

/// Stripe list envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StripeSubscriptionItem {
    #[serde(default)]
    pub price: Option<StripePrice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StripePrice {
    pub id: String,
}

/// Invoice object; only the subscription reference matters here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StripeInvoice {
    pub id: String,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "customer.subscription.updated".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: false,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "invoice.paid",
            "created": 1704067200,
            "data": {"object": {"id": "in_1", "subscription": "sub_9"}}
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.parsed_type(), StripeEventType::InvoicePaid);
        assert!(!event.livemode);
        let invoice: StripeInvoice = event.deserialize_object().unwrap();
        assert_eq!(invoice.subscription.as_deref(), Some("sub_9"));
    }

    #[test]
    fn event_type_round_trips_through_str() {
        for t in [
            StripeEventType::CustomerSubscriptionCreated,
            StripeEventType::CustomerSubscriptionDeleted,
            StripeEventType::InvoicePaymentFailed,
        ] {
            assert_eq!(StripeEventType::parse(t.as_str()), t);
        }
        assert_eq!(
            StripeEventType::parse("checkout.session.completed"),
            StripeEventType::Unknown
        );
    }

    #[test]
    fn event_families_do_not_overlap() {
        let sub = StripeEventType::CustomerSubscriptionPaused;
        let inv = StripeEventType::InvoicePaymentSucceeded;
        assert!(sub.carries_subscription() && !sub.carries_invoice());
        assert!(inv.carries_invoice() && !inv.carries_subscription());
        assert!(!StripeEventType::Unknown.carries_subscription());
    }

    #[test]
    fn subscription_store_reference_from_metadata() {
        let store = StoreId::new();
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "metadata": {"store_id": store.to_string()}
        }))
        .unwrap();
        assert_eq!(sub.store_reference().unwrap(), Some(store));
    }

    #[test]
    fn blank_store_reference_is_absent() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "metadata": {"store_id": "  "}
        }))
        .unwrap();
        assert_eq!(sub.store_reference().unwrap(), None);
    }

    #[test]
    fn malformed_store_reference_is_error() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "metadata": {"store_id": "store-42"}
        }))
        .unwrap();
        assert_eq!(sub.store_reference().unwrap_err().field(), "metadata.store_id");
    }

    #[test]
    fn price_ref_uses_first_item() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "items": {"data": [{"price": {"id": "price_a"}}, {"price": {"id": "price_b"}}]}
        }))
        .unwrap();
        assert_eq!(sub.price_ref(), Some("price_a"));
    }

    #[test]
    fn builder_produces_requested_type() {
        let event = StripeEventBuilder::new()
            .id("evt_x")
            .event_type("customer.subscription.deleted")
            .object(json!({"id": "sub_1", "status": "canceled"}))
            .build();
        assert_eq!(event.parsed_type(), StripeEventType::CustomerSubscriptionDeleted);
        let sub: StripeSubscription = event.deserialize_object().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Canceled);
    }
}
