//! KycReconciler - Re-derives a store's KYC status from its licenses.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode, StoreId};
use crate::domain::store::derive_kyc_status;
use crate::ports::{ComplianceTx, KycOutcome, KycReconciliation, LicenseTx, StoreTx};

/// Reconciles store KYC inside the caller's transaction.
///
/// Writes the store row only when the derived status differs from the stored
/// one. Emits no event of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct KycReconciler;

impl KycReconciler {
    pub fn new() -> Self {
        Self
    }

    pub async fn reconcile<T>(&self, tx: &mut T, store_id: StoreId) -> Result<KycOutcome, DomainError>
    where
        T: LicenseTx + StoreTx + ?Sized,
    {
        let previous = tx
            .store_kyc_status(store_id)
            .await
            .map_err(|e| e.in_operation("reconcile_kyc"))?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::StoreNotFound, format!("Store {} not found", store_id))
            })?;

        let statuses = tx
            .license_statuses(store_id)
            .await
            .map_err(|e| e.in_operation("reconcile_kyc"))?;
        let current = derive_kyc_status(statuses);
        let changed = current != previous;

        if changed {
            tx.set_store_kyc_status(store_id, current)
                .await
                .map_err(|e| e.in_operation("reconcile_kyc"))?;
            debug!(store_id = %store_id, from = %previous, to = %current, "Store KYC status changed");
        }

        Ok(KycOutcome {
            store_id,
            previous,
            current,
            changed,
        })
    }
}

#[async_trait]
impl KycReconciliation for KycReconciler {
    async fn reconcile_in(&self, tx: &mut dyn ComplianceTx, store_id: StoreId) -> Result<KycOutcome, DomainError> {
        self.reconcile(tx, store_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryComplianceStore;
    use crate::domain::foundation::{MediaId, Timestamp, UserId};
    use crate::domain::license::{License, LicenseDetails, LicenseStatus};
    use crate::domain::store::KycStatus;
    use crate::ports::TransactionManager;

    fn license(store_id: StoreId, status: LicenseStatus) -> License {
        let details = LicenseDetails::new(Some(MediaId::new()), "CA", "other", "N", None, None).unwrap();
        let mut l = License::submit(store_id, UserId::new("u").unwrap(), details, Timestamp::now());
        l.status = status;
        l
    }

    #[tokio::test]
    async fn writes_only_when_status_changes() {
        let store = InMemoryComplianceStore::new();
        let store_id = StoreId::new();
        store.add_store(store_id).await;
        store.put_license(license(store_id, LicenseStatus::Verified)).await;

        let mut tx = store.begin().await.unwrap();
        let outcome = KycReconciler.reconcile(&mut *tx, store_id).await.unwrap();
        tx.commit().await.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.previous, KycStatus::PendingVerification);
        assert_eq!(outcome.current, KycStatus::Verified);

        let mut tx = store.begin().await.unwrap();
        let outcome = KycReconciler.reconcile_in(&mut *tx, store_id).await.unwrap();
        tx.commit().await.unwrap();
        assert!(!outcome.changed);

        assert_eq!(store.kyc_write_count(store_id).await, 1);
    }

    #[tokio::test]
    async fn verified_beats_expired() {
        let store = InMemoryComplianceStore::new();
        let store_id = StoreId::new();
        store.add_store(store_id).await;
        store.put_license(license(store_id, LicenseStatus::Verified)).await;
        store.put_license(license(store_id, LicenseStatus::Expired)).await;

        let mut tx = store.begin().await.unwrap();
        let outcome = KycReconciler.reconcile(&mut *tx, store_id).await.unwrap();
        assert_eq!(outcome.current, KycStatus::Verified);
    }

    #[tokio::test]
    async fn missing_store_is_not_found() {
        let store = InMemoryComplianceStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = KycReconciler.reconcile(&mut *tx, StoreId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreNotFound);
    }
}
