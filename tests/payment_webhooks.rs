//! Payment webhooks end to end: signature, dedupe and subscription mirroring.

mod common;

use serde_json::json;

use common::{signed_webhook, subscription_event, Harness};
use store_compliance::application::HandlePaymentWebhookResult;
use store_compliance::domain::billing::{StripeSubscription, SubscriptionStatus};
use store_compliance::domain::foundation::{ErrorKind, StoreId};
use store_compliance::domain::store::KycStatus;
use store_compliance::ports::{PaymentError, PaymentErrorCode};

#[tokio::test]
async fn canceled_subscription_clears_active_flag_once() {
    let h = Harness::with_store(KycStatus::PendingVerification, true).await;

    let created = subscription_event("evt_created", "customer.subscription.created", "active", h.store_id);
    h.webhook.handle(signed_webhook(&created)).await.unwrap();
    // Already active; nothing to write.
    assert_eq!(h.store.flag_write_count(h.store_id).await, 0);

    let canceled = subscription_event("evt_canceled", "customer.subscription.updated", "canceled", h.store_id);
    let result = h.webhook.handle(signed_webhook(&canceled)).await.unwrap();

    assert_eq!(
        result,
        HandlePaymentWebhookResult::Processed {
            event_id: "evt_canceled".to_string(),
            store_id: h.store_id,
            active: false,
        }
    );
    assert_eq!(h.store.subscription_active(h.store_id).await, Some(false));
    assert_eq!(h.store.flag_write_count(h.store_id).await, 1);

    let subscriptions = h.store.subscriptions().await;
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].status, SubscriptionStatus::Canceled);
    assert_eq!(subscriptions[0].price_ref.as_deref(), Some("price_monthly"));
}

#[tokio::test]
async fn redelivered_event_is_not_applied_twice() {
    let h = Harness::new().await;
    let event = subscription_event("evt_dup", "customer.subscription.created", "trialing", h.store_id);

    let first = h.webhook.handle(signed_webhook(&event)).await.unwrap();
    let second = h.webhook.handle(signed_webhook(&event)).await.unwrap();

    assert!(matches!(first, HandlePaymentWebhookResult::Processed { active: true, .. }));
    assert_eq!(
        second,
        HandlePaymentWebhookResult::AlreadyProcessed {
            event_id: "evt_dup".to_string()
        }
    );
    assert_eq!(h.store.flag_write_count(h.store_id).await, 1);
    assert_eq!(h.store.subscriptions().await.len(), 1);
}

#[tokio::test]
async fn invoice_event_reads_subscription_from_provider() {
    let h = Harness::new().await;
    let remote: StripeSubscription = serde_json::from_value(
        subscription_event("unused", "customer.subscription.created", "active", h.store_id)["data"]["object"]
            .clone(),
    )
    .unwrap();
    h.provider.set_subscription(remote);

    let invoice = json!({
        "id": "evt_invoice",
        "type": "invoice.paid",
        "created": 1_700_000_000,
        "data": { "object": { "id": "in_1", "subscription": "sub_integration" } }
    });
    let result = h.webhook.handle(signed_webhook(&invoice)).await.unwrap();

    assert!(matches!(result, HandlePaymentWebhookResult::Processed { active: true, .. }));
    assert_eq!(h.provider.calls(), vec!["sub_integration".to_string()]);
    assert_eq!(h.store.subscription_active(h.store_id).await, Some(true));
}

#[tokio::test]
async fn provider_failure_releases_event_for_retry() {
    let h = Harness::new().await;
    let remote: StripeSubscription = serde_json::from_value(
        subscription_event("unused", "customer.subscription.created", "active", h.store_id)["data"]["object"]
            .clone(),
    )
    .unwrap();
    h.provider.set_subscription(remote);
    h.provider
        .set_error(PaymentError::new(PaymentErrorCode::NetworkError, "connection reset"));

    let invoice = json!({
        "id": "evt_retry",
        "type": "invoice.payment_succeeded",
        "created": 1_700_000_000,
        "data": { "object": { "id": "in_2", "subscription": "sub_integration" } }
    });

    let err = h.webhook.handle(signed_webhook(&invoice)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dependency);
    assert_eq!(h.store.subscription_active(h.store_id).await, Some(false));

    let retried = h.webhook.handle(signed_webhook(&invoice)).await.unwrap();
    assert!(matches!(retried, HandlePaymentWebhookResult::Processed { active: true, .. }));
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
    let h = Harness::new().await;
    let event = json!({
        "id": "evt_other",
        "type": "charge.refunded",
        "created": 1_700_000_000,
        "data": { "object": { "id": "ch_1" } }
    });

    let result = h.webhook.handle(signed_webhook(&event)).await.unwrap();

    assert_eq!(
        result,
        HandlePaymentWebhookResult::Ignored {
            event_id: "evt_other".to_string(),
            event_type: "charge.refunded".to_string(),
        }
    );
    assert!(h.store.subscriptions().await.is_empty());
}

#[tokio::test]
async fn forged_signature_is_forbidden() {
    let h = Harness::new().await;
    let event = subscription_event("evt_forged", "customer.subscription.created", "active", h.store_id);
    let mut cmd = signed_webhook(&event);
    let tampered = subscription_event("evt_forged", "customer.subscription.created", "active", StoreId::new());
    cmd.payload = tampered.to_string().into_bytes();

    let err = h.webhook.handle(cmd).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(h.store.subscriptions().await.is_empty());
}
