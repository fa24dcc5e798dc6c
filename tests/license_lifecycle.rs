//! End-to-end license lifecycle through the public handlers.
//!
//! Covers creation, reviewer decisions, deletion and listing, including the
//! all-or-nothing behavior of state writes and their outbox events.

mod common;

use chrono::NaiveDate;

use common::Harness;
use store_compliance::adapters::memory::FaultPoint;
use store_compliance::application::{DeleteLicenseCommand, ListLicensesQuery, VerifyLicenseCommand};
use store_compliance::domain::foundation::{ErrorCode, ErrorKind, LicenseId, Timestamp};
use store_compliance::domain::license::LicenseStatus;
use store_compliance::domain::store::KycStatus;

fn far_future() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2099, 12, 31)
}

fn verify(license_id: LicenseId, decision: LicenseStatus) -> VerifyLicenseCommand {
    VerifyLicenseCommand {
        license_id,
        decision,
        reason: None,
        reviewer: None,
    }
}

fn delete(h: &Harness, license_id: LicenseId) -> DeleteLicenseCommand {
    DeleteLicenseCommand {
        user_id: h.owner.clone(),
        store_id: h.store_id,
        license_id,
    }
}

#[tokio::test]
async fn created_license_is_pending_and_kyc_untouched() {
    let h = Harness::new().await;

    let license = h.create_license(far_future()).await;

    assert_eq!(license.status, LicenseStatus::Pending);
    assert_eq!(h.store.kyc_status(h.store_id).await, Some(KycStatus::PendingVerification));
    assert_eq!(h.store.kyc_write_count(h.store_id).await, 0);

    let events = h.store.outbox_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload["status"], "pending");
}

#[tokio::test]
async fn verifying_pending_license_verifies_store() {
    let h = Harness::new().await;
    let license = h.create_license(far_future()).await;

    let result = h.verify.handle(verify(license.id, LicenseStatus::Verified)).await.unwrap();

    assert_eq!(result.license.status, LicenseStatus::Verified);
    assert!(result.kyc.changed);
    assert_eq!(h.store.kyc_status(h.store_id).await, Some(KycStatus::Verified));

    let verified_events: Vec<_> = h
        .store
        .outbox_events()
        .await
        .into_iter()
        .filter(|e| e.payload["status"] == "verified")
        .collect();
    assert_eq!(verified_events.len(), 1);
    assert_eq!(verified_events[0].event_id, result.event_id);
    assert_eq!(verified_events[0].payload["previous_status"], "pending");
}

#[tokio::test]
async fn second_decision_conflicts_whatever_the_decision() {
    let h = Harness::new().await;

    for second in [LicenseStatus::Verified, LicenseStatus::Rejected] {
        let license = h.create_license(far_future()).await;
        h.decide(license.id, LicenseStatus::Rejected).await;

        let err = h.verify.handle(verify(license.id, second)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.code, ErrorCode::LicenseAlreadyFinalized);
    }
}

#[tokio::test]
async fn concurrent_decisions_finalize_once() {
    let h = Harness::new().await;
    let license = h.create_license(far_future()).await;
    let events_before = h.store.outbox_events().await.len();

    let (first, second) = tokio::join!(
        h.verify.handle(verify(license.id, LicenseStatus::Verified)),
        h.verify.handle(verify(license.id, LicenseStatus::Rejected)),
    );

    let (winner, loser) = match (first, second) {
        (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
        _ => panic!("exactly one decision must be applied"),
    };
    assert_eq!(loser.kind(), ErrorKind::Conflict);
    assert_eq!(loser.code, ErrorCode::LicenseAlreadyFinalized);
    assert_eq!(
        h.store.license(license.id).await.unwrap().status,
        winner.license.status
    );
    assert_eq!(h.store.outbox_events().await.len(), events_before + 1);
}

#[tokio::test]
async fn expiry_racing_verification_ends_expired() {
    let h = Harness::new().await;
    let today = chrono::Utc::now().date_naive();
    let license = h.create_license(Some(today)).await;
    let events_before = h.store.outbox_events().await.len();

    let (sweep, decision) = tokio::join!(
        h.scheduler.run_once(Timestamp::now()),
        h.verify.handle(verify(license.id, LicenseStatus::Verified)),
    );

    let report = sweep.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(h.store.license(license.id).await.unwrap().status, LicenseStatus::Expired);
    assert_eq!(h.store.kyc_status(h.store_id).await, Some(KycStatus::Expired));

    let events = h.store.outbox_events().await;
    match decision {
        Ok(result) => {
            assert_eq!(result.license.status, LicenseStatus::Verified);
            assert_eq!(events.len(), events_before + 2);
        }
        Err(err) => {
            assert_eq!(err.code, ErrorCode::LicenseAlreadyFinalized);
            assert_eq!(events.len(), events_before + 1);
        }
    }
    assert_eq!(events.last().unwrap().payload["status"], "expired");
}

#[tokio::test]
async fn verified_license_outranks_expired_one() {
    let h = Harness::new().await;
    let today = chrono::Utc::now().date_naive();
    let _keeper = h.verified_license(far_future()).await;
    let lapsing = h.verified_license(Some(today)).await;

    let report = h.scheduler.run_once(Timestamp::now()).await.unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(h.store.license(lapsing.id).await.unwrap().status, LicenseStatus::Expired);
    assert_eq!(h.store.kyc_status(h.store_id).await, Some(KycStatus::Verified));
    // Only the first verification wrote the store row.
    assert_eq!(h.store.kyc_write_count(h.store_id).await, 1);
}

#[tokio::test]
async fn outbox_failure_after_state_write_persists_nothing() {
    let h = Harness::new().await;
    let license = h.create_license(far_future()).await;
    let events_before = h.store.outbox_events().await.len();

    h.store.fail_next(FaultPoint::AppendOutbox);
    let err = h.verify.handle(verify(license.id, LicenseStatus::Verified)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Dependency);
    assert_eq!(h.store.license(license.id).await.unwrap().status, LicenseStatus::Pending);
    assert_eq!(h.store.kyc_status(h.store_id).await, Some(KycStatus::PendingVerification));
    assert_eq!(h.store.outbox_events().await.len(), events_before);
}

#[tokio::test]
async fn commit_failure_after_event_write_persists_nothing() {
    let h = Harness::new().await;
    let license = h.create_license(far_future()).await;
    let events_before = h.store.outbox_events().await.len();

    h.store.fail_next(FaultPoint::Commit);
    assert!(h.verify.handle(verify(license.id, LicenseStatus::Verified)).await.is_err());

    assert_eq!(h.store.license(license.id).await.unwrap().status, LicenseStatus::Pending);
    assert_eq!(h.store.outbox_events().await.len(), events_before);

    // The same decision succeeds once the fault is gone.
    h.verify.handle(verify(license.id, LicenseStatus::Verified)).await.unwrap();
    assert_eq!(h.store.outbox_events().await.len(), events_before + 1);
}

#[tokio::test]
async fn failed_creation_leaves_no_license_or_event() {
    let h = Harness::new().await;

    h.store.fail_next(FaultPoint::AppendOutbox);
    assert!(h.create.handle(h.create_command(far_future())).await.is_err());

    let page = h.list.handle(ListLicensesQuery::first_page(h.store_id)).await.unwrap();
    assert!(page.items.is_empty());
    assert!(h.store.outbox_events().await.is_empty());
}

#[tokio::test]
async fn deleting_expired_license_resets_kyc() {
    let h = Harness::new().await;
    let today = chrono::Utc::now().date_naive();
    let license = h.verified_license(Some(today)).await;
    h.scheduler.run_once(Timestamp::now()).await.unwrap();
    assert_eq!(h.store.kyc_status(h.store_id).await, Some(KycStatus::Expired));

    let result = h.delete.handle(delete(&h, license.id)).await.unwrap();

    assert!(result.kyc_reset);
    assert!(h.store.license(license.id).await.is_none());
    assert_eq!(h.store.kyc_status(h.store_id).await, Some(KycStatus::PendingVerification));
}

#[tokio::test]
async fn pending_license_cannot_be_deleted() {
    let h = Harness::new().await;
    let license = h.create_license(far_future()).await;

    let err = h.delete.handle(delete(&h, license.id)).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::LicenseNotDeletable);
    assert!(h.store.license(license.id).await.is_some());
}

#[tokio::test]
async fn listing_signs_document_urls() {
    let h = Harness::new().await;
    let license = h.create_license(far_future()).await;

    let page = h.list.handle(ListLicensesQuery::first_page(h.store_id)).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].license.id, license.id);
    let url = &page.items[0].document_url;
    assert!(url.starts_with("https://files.test/licenses/"), "url {}", url);
    assert!(url.contains("signature="));
}
