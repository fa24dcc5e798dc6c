//! Transactional repository port.
//!
//! A [`ComplianceTx`] is one open unit of work. Every write a use case makes
//! (license rows, store flags, subscriptions, attachments, outbox entries) goes
//! through the same handle so it commits or rolls back as a whole.
//!
//! Dropping a handle without calling `commit` discards its writes.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, LicenseId, MediaId, StoreId};
use crate::domain::license::{License, LicenseStatus};
use crate::domain::media::AttachmentTarget;
use crate::domain::store::KycStatus;

use super::OutboxWriter;

/// License rows inside a transaction.
#[async_trait]
pub trait LicenseTx: Send {
    async fn insert_license(&mut self, license: &License) -> Result<(), DomainError>;

    /// Reads a license and locks it until the transaction ends.
    async fn find_license_for_update(&mut self, id: LicenseId) -> Result<Option<License>, DomainError>;

    /// Persists status and `updated_at`.
    async fn update_license(&mut self, license: &License) -> Result<(), DomainError>;

    /// Returns false if no row existed.
    async fn delete_license(&mut self, id: LicenseId) -> Result<bool, DomainError>;

    /// Statuses of every license the store owns, as seen by this transaction.
    async fn license_statuses(&mut self, store_id: StoreId) -> Result<Vec<LicenseStatus>, DomainError>;
}

/// Store compliance columns inside a transaction.
#[async_trait]
pub trait StoreTx: Send {
    /// Current KYC status, or None if the store does not exist. Locks the row.
    async fn store_kyc_status(&mut self, store_id: StoreId) -> Result<Option<KycStatus>, DomainError>;

    async fn set_store_kyc_status(&mut self, store_id: StoreId, status: KycStatus) -> Result<(), DomainError>;

    /// Current subscription-active flag, or None if the store does not exist.
    async fn store_subscription_active(&mut self, store_id: StoreId) -> Result<Option<bool>, DomainError>;

    async fn set_store_subscription_active(&mut self, store_id: StoreId, active: bool) -> Result<(), DomainError>;
}

/// Subscription mirror rows inside a transaction.
#[async_trait]
pub trait SubscriptionTx: Send {
    async fn find_subscription_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    async fn insert_subscription(&mut self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn update_subscription(&mut self, subscription: &Subscription) -> Result<(), DomainError>;
}

/// Media attachment links inside a transaction.
#[async_trait]
pub trait AttachmentTx: Send {
    async fn link_attachments(&mut self, target: AttachmentTarget, media_ids: &[MediaId]) -> Result<(), DomainError>;

    /// Removes every link of `target`, returning how many were removed.
    async fn unlink_attachments(&mut self, target: AttachmentTarget) -> Result<u64, DomainError>;
}

/// One open unit of work against the compliance store.
#[async_trait]
pub trait ComplianceTx: LicenseTx + StoreTx + SubscriptionTx + AttachmentTx + OutboxWriter {
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Opens transactions.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ComplianceTx>, DomainError>;
}

/// Commits `tx` if `result` is Ok, rolls it back otherwise.
///
/// A failed rollback is logged; the original error is returned.
pub async fn settle<T>(tx: Box<dyn ComplianceTx>, result: Result<T, DomainError>) -> Result<T, DomainError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after {}", err);
            }
            Err(err)
        }
    }
}
