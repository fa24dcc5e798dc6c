//! Shared harness for integration tests.
//!
//! Wires every handler against the in-memory adapters so scenarios run end to
//! end without PostgreSQL, Redis or Stripe.

#![allow(dead_code)]

use chrono::NaiveDate;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use store_compliance::adapters::membership::StubMembershipChecker;
use store_compliance::adapters::memory::{
    InMemoryComplianceStore, InMemoryIdempotencyStore, InMemoryMediaRepository,
};
use store_compliance::adapters::storage::HmacUrlSigner;
use store_compliance::adapters::stripe::MockPaymentProvider;
use store_compliance::application::{
    CreateLicenseCommand, CreateLicenseHandler, DeleteLicenseHandler, ExpiryScheduler,
    ExpirySchedulerConfig, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    IdempotencyGuard, KycReconciler, ListLicensesHandler, PaymentEventReconciler,
    VerifyLicenseCommand, VerifyLicenseHandler,
};
use store_compliance::domain::billing::{sign_payload, StripeWebhookVerifier};
use store_compliance::domain::foundation::{LicenseId, MediaId, StoreId, UserId};
use store_compliance::domain::license::{License, LicenseStatus};
use store_compliance::domain::media::{MediaKind, MediaRecord, MediaStatus};
use store_compliance::domain::store::{KycStatus, LicensePolicy, StoreRole};

pub const WEBHOOK_SECRET: &str = "whsec_integration";

pub struct Harness {
    pub store: InMemoryComplianceStore,
    pub media: Arc<InMemoryMediaRepository>,
    pub members: Arc<StubMembershipChecker>,
    pub provider: MockPaymentProvider,
    pub keys: Arc<InMemoryIdempotencyStore>,
    pub create: CreateLicenseHandler,
    pub verify: VerifyLicenseHandler,
    pub delete: DeleteLicenseHandler,
    pub list: ListLicensesHandler,
    pub webhook: HandlePaymentWebhookHandler,
    pub scheduler: ExpiryScheduler,
    pub store_id: StoreId,
    pub owner: UserId,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_store(KycStatus::PendingVerification, false).await
    }

    pub async fn with_store(kyc: KycStatus, subscription_active: bool) -> Self {
        let store = InMemoryComplianceStore::new();
        let media = Arc::new(InMemoryMediaRepository::new());
        let members = Arc::new(StubMembershipChecker::new());
        let provider = MockPaymentProvider::new();
        let keys = Arc::new(InMemoryIdempotencyStore::new());
        let kyc_reconciler = Arc::new(KycReconciler::new());
        let transactions = Arc::new(store.clone());

        let store_id = StoreId::new();
        let owner = UserId::new("owner-1").expect("valid user id");
        store.add_store_with(store_id, kyc, subscription_active).await;
        members.grant(&owner, store_id, StoreRole::Owner);

        let policy = LicensePolicy::default();
        let signer = Arc::new(HmacUrlSigner::new(
            "https://files.test",
            SecretString::new("signing-key".to_string()),
        ));

        Self {
            create: CreateLicenseHandler::new(
                transactions.clone(),
                members.clone(),
                media.clone(),
                policy.clone(),
            ),
            verify: VerifyLicenseHandler::new(transactions.clone(), kyc_reconciler.clone()),
            delete: DeleteLicenseHandler::new(transactions.clone(), members.clone(), policy),
            list: ListLicensesHandler::new(transactions.clone(), media.clone(), signer),
            webhook: HandlePaymentWebhookHandler::new(
                StripeWebhookVerifier::new(SecretString::new(WEBHOOK_SECRET.to_string())),
                IdempotencyGuard::new(keys.clone(), Duration::from_secs(72 * 3600)),
                PaymentEventReconciler::new(transactions.clone(), Arc::new(provider.clone())),
            ),
            scheduler: ExpiryScheduler::new(
                transactions.clone(),
                transactions,
                kyc_reconciler,
                ExpirySchedulerConfig::default(),
            ),
            store,
            media,
            members,
            provider,
            keys,
            store_id,
            owner,
        }
    }

    /// Registers a ready PDF license document for this store.
    pub fn ready_document(&self) -> MediaId {
        let id = MediaId::new();
        self.media.insert(MediaRecord {
            id,
            store_id: self.store_id,
            kind: MediaKind::LicenseDocument,
            status: MediaStatus::Ready,
            content_type: "application/pdf".to_string(),
            storage_key: format!("licenses/{}.pdf", id),
        });
        id
    }

    pub fn create_command(&self, expires_on: Option<NaiveDate>) -> CreateLicenseCommand {
        CreateLicenseCommand {
            user_id: self.owner.clone(),
            store_id: self.store_id,
            media_id: Some(self.ready_document()),
            issuing_jurisdiction: "CA".to_string(),
            license_type: "seller_permit".to_string(),
            license_number: "SP-2001".to_string(),
            issued_on: None,
            expires_on,
        }
    }

    pub async fn create_license(&self, expires_on: Option<NaiveDate>) -> License {
        self.create
            .handle(self.create_command(expires_on))
            .await
            .expect("license created")
            .license
    }

    pub async fn decide(&self, license_id: LicenseId, decision: LicenseStatus) {
        self.verify
            .handle(VerifyLicenseCommand {
                license_id,
                decision,
                reason: None,
                reviewer: None,
            })
            .await
            .expect("decision applied");
    }

    pub async fn verified_license(&self, expires_on: Option<NaiveDate>) -> License {
        let license = self.create_license(expires_on).await;
        self.decide(license.id, LicenseStatus::Verified).await;
        self.store.license(license.id).await.expect("license stored")
    }
}

/// Signs `event` the way Stripe would, stamped now.
pub fn signed_webhook(event: &serde_json::Value) -> HandlePaymentWebhookCommand {
    let payload = event.to_string();
    let signature = sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &payload);
    HandlePaymentWebhookCommand {
        payload: payload.into_bytes(),
        signature,
    }
}

pub fn subscription_event(event_id: &str, kind: &str, status: &str, store_id: StoreId) -> serde_json::Value {
    serde_json::json!({
        "id": event_id,
        "type": kind,
        "created": 1_700_000_000,
        "data": { "object": {
            "id": "sub_integration",
            "customer": "cus_1",
            "status": status,
            "current_period_start": 1_700_000_000,
            "current_period_end": 1_702_592_000,
            "cancel_at_period_end": false,
            "metadata": { "store_id": store_id.to_string() },
            "items": { "data": [ { "price": { "id": "price_monthly" } } ] }
        }}
    })
}
