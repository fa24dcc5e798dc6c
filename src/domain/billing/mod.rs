//! Billing domain module.
//!
//! Mirrors provider subscriptions locally so a store's subscription-active flag
//! can be derived, and verifies the webhooks that drive the mirror.
//!
//! # Module Structure
//!
//! - `subscription` - Subscription entity and status
//! - `stripe_event` - Webhook event and provider object shapes
//! - `webhook_verifier` - Signature verification
//! - `webhook_errors` - Verification errors

mod stripe_event;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
pub use stripe_event::{
    StripeEvent, StripeEventData, StripeEventType, StripeInvoice, StripeList, StripePrice,
    StripeSubscription, StripeSubscriptionItem, STORE_ID_METADATA_KEY,
};
pub use subscription::{Subscription, SubscriptionStatus};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier};
