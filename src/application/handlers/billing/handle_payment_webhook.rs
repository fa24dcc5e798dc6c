//! HandlePaymentWebhookHandler - Command handler for processing payment provider webhooks.

use tracing::{info, warn};

use crate::domain::billing::StripeWebhookVerifier;
use crate::domain::foundation::{DomainError, StoreId};

use super::{IdempotencyCheck, IdempotencyGuard, PaymentEventOutcome, PaymentEventReconciler};

/// Idempotency scope for Stripe webhook deliveries.
pub const STRIPE_WEBHOOK_SCOPE: &str = "stripe_webhook";

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// Subscription state reconciled.
    Processed {
        event_id: String,
        store_id: StoreId,
        active: bool,
    },
    /// Event id seen before; nothing was done.
    AlreadyProcessed { event_id: String },
    /// Event acknowledged but no action taken.
    Ignored { event_id: String, event_type: String },
}

/// Handler for processing payment provider webhooks.
///
/// Verifies the signature, claims the event id, then reconciles. A failed
/// reconciliation releases the claim so the provider's redelivery is retried.
pub struct HandlePaymentWebhookHandler {
    verifier: StripeWebhookVerifier,
    guard: IdempotencyGuard,
    reconciler: PaymentEventReconciler,
    scope: String,
}

impl HandlePaymentWebhookHandler {
    pub fn new(verifier: StripeWebhookVerifier, guard: IdempotencyGuard, reconciler: PaymentEventReconciler) -> Self {
        Self {
            verifier,
            guard,
            reconciler,
            scope: STRIPE_WEBHOOK_SCOPE.to_string(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub async fn handle(&self, cmd: HandlePaymentWebhookCommand) -> Result<HandlePaymentWebhookResult, DomainError> {
        // 1. Verify webhook signature and parse event
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &cmd.signature)
            .map_err(|e| {
                warn!(error = %e, "Rejected payment webhook");
                DomainError::from(e)
            })?;

        // 2. Claim the event id
        if self.guard.check_and_mark(&self.scope, &event.id).await? == IdempotencyCheck::Duplicate {
            info!(event_id = %event.id, event_type = %event.event_type, "Payment webhook already processed");
            return Ok(HandlePaymentWebhookResult::AlreadyProcessed { event_id: event.id });
        }

        // 3. Reconcile, releasing the claim on failure
        let outcome = match self.reconciler.reconcile(&event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Err(release_err) = self.guard.release(&self.scope, &event.id).await {
                    warn!(
                        event_id = %event.id,
                        error = %release_err,
                        "Failed to release idempotency key"
                    );
                }
                warn!(event_id = %event.id, event_type = %event.event_type, error = %e, "Payment webhook failed");
                return Err(e);
            }
        };

        Ok(match outcome {
            PaymentEventOutcome::Reconciled { store_id, active, .. } => HandlePaymentWebhookResult::Processed {
                event_id: event.id,
                store_id,
                active,
            },
            PaymentEventOutcome::Ignored { event_type } => HandlePaymentWebhookResult::Ignored {
                event_id: event.id,
                event_type,
            },
        })
    }
}
