//! PaymentEventReconciler - Mirrors provider subscriptions onto stores.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::billing::{StripeEvent, StripeInvoice, StripeSubscription, Subscription, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, StoreId, SubscriptionId, Timestamp};
use crate::ports::{settle, ComplianceTx, PaymentProvider, TransactionManager};

/// Result of reconciling one payment event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventOutcome {
    /// The local subscription and store flag now match the provider.
    Reconciled {
        store_id: StoreId,
        subscription_id: SubscriptionId,
        external_id: String,
        status: SubscriptionStatus,
        active: bool,
        /// True when the store's subscription-active flag was written.
        flag_changed: bool,
    },
    /// Event type not handled, or an invoice without a subscription.
    Ignored { event_type: String },
}

/// Applies subscription and invoice events to the local mirror.
///
/// Subscription events carry the subscription itself. Invoice events only
/// reference one, so the current state is fetched from the provider.
pub struct PaymentEventReconciler {
    transactions: Arc<dyn TransactionManager>,
    provider: Arc<dyn PaymentProvider>,
}

impl PaymentEventReconciler {
    pub fn new(transactions: Arc<dyn TransactionManager>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { transactions, provider }
    }

    pub async fn reconcile(&self, event: &StripeEvent) -> Result<PaymentEventOutcome, DomainError> {
        let event_type = event.parsed_type();

        let remote = if event_type.carries_subscription() {
            event.deserialize_object::<StripeSubscription>().map_err(|e| {
                DomainError::validation("data.object", format!("Invalid subscription object: {}", e))
            })?
        } else if event_type.carries_invoice() {
            let invoice: StripeInvoice = event.deserialize_object().map_err(|e| {
                DomainError::validation("data.object", format!("Invalid invoice object: {}", e))
            })?;
            let Some(subscription_id) = invoice.subscription.filter(|s| !s.is_empty()) else {
                debug!(event_id = %event.id, invoice_id = %invoice.id, "Invoice without subscription");
                return Ok(PaymentEventOutcome::Ignored {
                    event_type: event.event_type.clone(),
                });
            };
            self.fetch_subscription(&subscription_id).await?
        } else {
            debug!(event_id = %event.id, event_type = %event.event_type, "Unhandled payment event type");
            return Ok(PaymentEventOutcome::Ignored {
                event_type: event.event_type.clone(),
            });
        };

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(|e| e.in_operation("reconcile_payment_event"))?;
        let result = apply(&mut *tx, &remote).await;
        let outcome = settle(tx, result)
            .await
            .map_err(|e| e.in_operation("reconcile_payment_event"))?;

        if let PaymentEventOutcome::Reconciled {
            store_id,
            status,
            active,
            flag_changed,
            ..
        } = &outcome
        {
            info!(
                event_id = %event.id,
                event_type = %event.event_type,
                store_id = %store_id,
                subscription = %remote.id,
                status = status.as_str(),
                active,
                flag_changed,
                "Subscription reconciled"
            );
        }

        Ok(outcome)
    }

    async fn fetch_subscription(&self, subscription_id: &str) -> Result<StripeSubscription, DomainError> {
        self.provider
            .get_subscription(subscription_id)
            .await
            .map_err(|e| DomainError::from(e).in_operation("fetch_subscription"))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    format!("Subscription {} unknown to the payment provider", subscription_id),
                )
            })
    }
}

/// Resolves the owning store, upserts the subscription and syncs the store flag.
async fn apply(tx: &mut dyn ComplianceTx, remote: &StripeSubscription) -> Result<PaymentEventOutcome, DomainError> {
    let existing = tx.find_subscription_by_external_id(&remote.id).await?;
    let store_id = resolve_store(remote, existing.as_ref())?;

    let current_flag = tx.store_subscription_active(store_id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::StoreNotFound, format!("Store {} not found", store_id))
    })?;

    let now = Timestamp::now();
    match existing {
        Some(mut local) => {
            local.apply(remote, now);
            tx.update_subscription(&local).await?;
        }
        None => {
            tx.insert_subscription(&Subscription::from_provider(store_id, remote, now))
                .await?;
        }
    }

    let persisted = tx
        .find_subscription_by_external_id(&remote.id)
        .await?
        .ok_or_else(|| DomainError::internal(format!("Subscription {} missing after write", remote.id)))?;

    let active = persisted.is_active();
    let flag_changed = active != current_flag;
    if flag_changed {
        tx.set_store_subscription_active(store_id, active).await?;
    }

    Ok(PaymentEventOutcome::Reconciled {
        store_id,
        subscription_id: persisted.id,
        external_id: persisted.external_id,
        status: persisted.status,
        active,
        flag_changed,
    })
}

/// Metadata wins; a known subscription falls back to its bound store.
fn resolve_store(remote: &StripeSubscription, existing: Option<&Subscription>) -> Result<StoreId, DomainError> {
    match (remote.store_reference()?, existing) {
        (Some(referenced), Some(local)) if local.store_id != referenced => Err(DomainError::new(
            ErrorCode::SubscriptionStoreMismatch,
            format!(
                "Subscription {} is bound to store {}, not {}",
                remote.id, local.store_id, referenced
            ),
        )),
        (Some(referenced), _) => Ok(referenced),
        (None, Some(local)) => Ok(local.store_id),
        (None, None) => Err(DomainError::new(
            ErrorCode::MissingStoreReference,
            format!("Subscription {} carries no store reference", remote.id),
        )
        .with_detail("field", "metadata.store_id")),
    }
}
