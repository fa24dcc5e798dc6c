//! Billing handlers.
//!
//! Webhook intake, deduplication and subscription reconciliation.

mod handle_payment_webhook;
mod idempotency_guard;
mod reconcile_payment_event;

pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    STRIPE_WEBHOOK_SCOPE,
};
pub use idempotency_guard::{IdempotencyCheck, IdempotencyGuard, DEFAULT_IDEMPOTENCY_TTL, MAX_EVENT_ID_LEN};
pub use reconcile_payment_event::{PaymentEventOutcome, PaymentEventReconciler};
