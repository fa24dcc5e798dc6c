//! In-memory compliance store.
//!
//! Implements [`TransactionManager`] and [`LicenseReader`] over a single
//! mutex-protected state. A transaction holds the mutex for its whole lifetime
//! and works on a copy of the state, which replaces the shared state on commit.
//! Transactions are therefore fully serialized.
//!
//! Intended for tests and local runs. Faults can be injected per operation with
//! [`InMemoryComplianceStore::fail_next`].
//!
//! # Example
//!
//! ```ignore
//! let store = InMemoryComplianceStore::new();
//! store.add_store(store_id).await;
//! store.fail_next(FaultPoint::AppendOutbox);
//!
//! let err = handler.handle(cmd).await.unwrap_err();
//! assert!(store.outbox_entries().await.is_empty());
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, EventEnvelope, LicenseId, MediaId, StoreId};
use crate::domain::license::{License, LicenseStatus};
use crate::domain::media::AttachmentTarget;
use crate::domain::store::KycStatus;
use crate::ports::{
    AttachmentTx, ComplianceTx, LicenseReader, LicenseTx, OutboxEntry, OutboxWriter, Page,
    PageRequest, StoreTx, SubscriptionTx, TransactionManager,
};

/// Operations that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Begin,
    InsertLicense,
    FindLicense,
    UpdateLicense,
    DeleteLicense,
    LicenseStatuses,
    SetKycStatus,
    SetSubscriptionActive,
    InsertSubscription,
    UpdateSubscription,
    LinkAttachments,
    UnlinkAttachments,
    AppendOutbox,
    Commit,
    ListLicenses,
    FindExpiring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StoreRow {
    kyc_status: KycStatus,
    subscription_active: bool,
}

#[derive(Debug, Clone, Default)]
struct State {
    licenses: HashMap<LicenseId, License>,
    stores: HashMap<StoreId, StoreRow>,
    subscriptions: Vec<Subscription>,
    attachments: HashMap<AttachmentTarget, Vec<MediaId>>,
    outbox: Vec<OutboxEntry>,
    kyc_writes: HashMap<StoreId, usize>,
    flag_writes: HashMap<StoreId, usize>,
}

type Faults = Arc<StdMutex<HashSet<FaultPoint>>>;

fn take_fault(faults: &Faults, point: FaultPoint) -> Result<(), DomainError> {
    let mut set = faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if set.remove(&point) {
        Err(DomainError::database(format!("injected fault at {:?}", point)))
    } else {
        Ok(())
    }
}

/// Shared in-memory backing store.
#[derive(Clone, Default)]
pub struct InMemoryComplianceStore {
    state: Arc<Mutex<State>>,
    faults: Faults,
}

impl InMemoryComplianceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `point` fail with a database error.
    pub fn fail_next(&self, point: FaultPoint) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(point);
    }

    // === Seeding ===

    /// Registers a store with PendingVerification KYC and an inactive subscription.
    pub async fn add_store(&self, store_id: StoreId) {
        self.add_store_with(store_id, KycStatus::PendingVerification, false).await;
    }

    pub async fn add_store_with(&self, store_id: StoreId, kyc_status: KycStatus, subscription_active: bool) {
        self.state.lock().await.stores.insert(
            store_id,
            StoreRow {
                kyc_status,
                subscription_active,
            },
        );
    }

    /// Inserts a license row directly, bypassing use cases.
    pub async fn put_license(&self, license: License) {
        self.state.lock().await.licenses.insert(license.id, license);
    }

    pub async fn put_subscription(&self, subscription: Subscription) {
        self.state.lock().await.subscriptions.push(subscription);
    }

    // === Inspection ===

    pub async fn license(&self, id: LicenseId) -> Option<License> {
        self.state.lock().await.licenses.get(&id).cloned()
    }

    pub async fn kyc_status(&self, store_id: StoreId) -> Option<KycStatus> {
        self.state.lock().await.stores.get(&store_id).map(|s| s.kyc_status)
    }

    pub async fn subscription_active(&self, store_id: StoreId) -> Option<bool> {
        self.state
            .lock()
            .await
            .stores
            .get(&store_id)
            .map(|s| s.subscription_active)
    }

    /// Committed KYC status writes for a store.
    pub async fn kyc_write_count(&self, store_id: StoreId) -> usize {
        self.state.lock().await.kyc_writes.get(&store_id).copied().unwrap_or(0)
    }

    /// Committed subscription-active flag writes for a store.
    pub async fn flag_write_count(&self, store_id: StoreId) -> usize {
        self.state.lock().await.flag_writes.get(&store_id).copied().unwrap_or(0)
    }

    pub async fn subscriptions(&self) -> Vec<Subscription> {
        self.state.lock().await.subscriptions.clone()
    }

    pub async fn attachments(&self, target: AttachmentTarget) -> Vec<MediaId> {
        self.state
            .lock()
            .await
            .attachments
            .get(&target)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn outbox_entries(&self) -> Vec<OutboxEntry> {
        self.state.lock().await.outbox.clone()
    }

    /// Envelopes of committed outbox entries, in append order.
    pub async fn outbox_events(&self) -> Vec<EventEnvelope> {
        self.outbox_entries().await.into_iter().map(|e| e.event).collect()
    }
}

#[async_trait]
impl TransactionManager for InMemoryComplianceStore {
    async fn begin(&self) -> Result<Box<dyn ComplianceTx>, DomainError> {
        take_fault(&self.faults, FaultPoint::Begin)?;
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTx {
            guard,
            working,
            faults: Arc::clone(&self.faults),
        }))
    }
}

/// Open transaction over [`InMemoryComplianceStore`].
pub struct InMemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
    faults: Faults,
}

impl InMemoryTx {
    fn fault(&self, point: FaultPoint) -> Result<(), DomainError> {
        take_fault(&self.faults, point)
    }

    fn store_row(&mut self, store_id: StoreId) -> Result<&mut StoreRow, DomainError> {
        self.working
            .stores
            .get_mut(&store_id)
            .ok_or_else(|| DomainError::database(format!("store {} does not exist", store_id)))
    }
}

#[async_trait]
impl LicenseTx for InMemoryTx {
    async fn insert_license(&mut self, license: &License) -> Result<(), DomainError> {
        self.fault(FaultPoint::InsertLicense)?;
        if self.working.licenses.contains_key(&license.id) {
            return Err(DomainError::database(format!("duplicate license {}", license.id)));
        }
        self.working.licenses.insert(license.id, license.clone());
        Ok(())
    }

    async fn find_license_for_update(&mut self, id: LicenseId) -> Result<Option<License>, DomainError> {
        self.fault(FaultPoint::FindLicense)?;
        Ok(self.working.licenses.get(&id).cloned())
    }

    async fn update_license(&mut self, license: &License) -> Result<(), DomainError> {
        self.fault(FaultPoint::UpdateLicense)?;
        match self.working.licenses.get_mut(&license.id) {
            Some(row) => {
                row.status = license.status;
                row.updated_at = license.updated_at;
                Ok(())
            }
            None => Err(DomainError::database(format!("license {} vanished", license.id))),
        }
    }

    async fn delete_license(&mut self, id: LicenseId) -> Result<bool, DomainError> {
        self.fault(FaultPoint::DeleteLicense)?;
        Ok(self.working.licenses.remove(&id).is_some())
    }

    async fn license_statuses(&mut self, store_id: StoreId) -> Result<Vec<LicenseStatus>, DomainError> {
        self.fault(FaultPoint::LicenseStatuses)?;
        Ok(self
            .working
            .licenses
            .values()
            .filter(|l| l.store_id == store_id)
            .map(|l| l.status)
            .collect())
    }
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn store_kyc_status(&mut self, store_id: StoreId) -> Result<Option<KycStatus>, DomainError> {
        Ok(self.working.stores.get(&store_id).map(|s| s.kyc_status))
    }

    async fn set_store_kyc_status(&mut self, store_id: StoreId, status: KycStatus) -> Result<(), DomainError> {
        self.fault(FaultPoint::SetKycStatus)?;
        self.store_row(store_id)?.kyc_status = status;
        *self.working.kyc_writes.entry(store_id).or_default() += 1;
        Ok(())
    }

    async fn store_subscription_active(&mut self, store_id: StoreId) -> Result<Option<bool>, DomainError> {
        Ok(self.working.stores.get(&store_id).map(|s| s.subscription_active))
    }

    async fn set_store_subscription_active(&mut self, store_id: StoreId, active: bool) -> Result<(), DomainError> {
        self.fault(FaultPoint::SetSubscriptionActive)?;
        self.store_row(store_id)?.subscription_active = active;
        *self.working.flag_writes.entry(store_id).or_default() += 1;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionTx for InMemoryTx {
    async fn find_subscription_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn insert_subscription(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        self.fault(FaultPoint::InsertSubscription)?;
        if self
            .working
            .subscriptions
            .iter()
            .any(|s| s.external_id == subscription.external_id)
        {
            return Err(DomainError::database(format!(
                "duplicate subscription {}",
                subscription.external_id
            )));
        }
        self.working.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn update_subscription(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        self.fault(FaultPoint::UpdateSubscription)?;
        match self
            .working
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id)
        {
            Some(row) => {
                *row = subscription.clone();
                Ok(())
            }
            None => Err(DomainError::database(format!(
                "subscription {} vanished",
                subscription.id
            ))),
        }
    }
}

#[async_trait]
impl AttachmentTx for InMemoryTx {
    async fn link_attachments(&mut self, target: AttachmentTarget, media_ids: &[MediaId]) -> Result<(), DomainError> {
        self.fault(FaultPoint::LinkAttachments)?;
        let links = self.working.attachments.entry(target).or_default();
        for id in media_ids {
            if !links.contains(id) {
                links.push(*id);
            }
        }
        Ok(())
    }

    async fn unlink_attachments(&mut self, target: AttachmentTarget) -> Result<u64, DomainError> {
        self.fault(FaultPoint::UnlinkAttachments)?;
        Ok(self
            .working
            .attachments
            .remove(&target)
            .map(|links| links.len() as u64)
            .unwrap_or(0))
    }
}

#[async_trait]
impl OutboxWriter for InMemoryTx {
    async fn append_outbox(&mut self, entry: OutboxEntry) -> Result<(), DomainError> {
        self.fault(FaultPoint::AppendOutbox)?;
        self.working.outbox.push(entry);
        Ok(())
    }
}

#[async_trait]
impl ComplianceTx for InMemoryTx {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryTx {
            mut guard,
            working,
            faults,
        } = *self;
        take_fault(&faults, FaultPoint::Commit)?;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl LicenseReader for InMemoryComplianceStore {
    async fn list_by_store(&self, store_id: StoreId, page: PageRequest) -> Result<Page<License>, DomainError> {
        take_fault(&self.faults, FaultPoint::ListLicenses)?;
        let state = self.state.lock().await;
        let mut rows: Vec<License> = state
            .licenses
            .values()
            .filter(|l| l.store_id == store_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        let rows = rows
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize + 1)
            .collect();
        Ok(Page::from_overfetch(rows, page.limit))
    }

    async fn find_expiring_on(&self, day: NaiveDate) -> Result<Vec<License>, DomainError> {
        take_fault(&self.faults, FaultPoint::FindExpiring)?;
        let state = self.state.lock().await;
        let mut rows: Vec<License> = state
            .licenses
            .values()
            .filter(|l| l.status.is_expirable() && l.details.expires_on == Some(day))
            .cloned()
            .collect();
        rows.sort_by_key(|l| l.id);
        Ok(rows)
    }

    async fn find_due_for_expiry(&self, day: NaiveDate) -> Result<Vec<License>, DomainError> {
        let state = self.state.lock().await;
        let mut rows: Vec<License> = state
            .licenses
            .values()
            .filter(|l| l.is_due_for_expiry(day))
            .cloned()
            .collect();
        rows.sort_by_key(|l| (l.details.expires_on, l.id));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::license::LicenseDetails;
    use serde_json::json;

    fn license(store_id: StoreId, expires_on: Option<NaiveDate>) -> License {
        let details =
            LicenseDetails::new(Some(MediaId::new()), "CA", "other", "N-1", None, expires_on).unwrap();
        License::submit(store_id, UserId::new("u").unwrap(), details, Timestamp::now())
    }

    fn entry() -> OutboxEntry {
        OutboxEntry::new(EventEnvelope::new("t.v1", "a", "A", json!({})), "p")
    }

    #[tokio::test]
    async fn committed_writes_become_visible() {
        let store = InMemoryComplianceStore::new();
        let store_id = StoreId::new();
        store.add_store(store_id).await;

        let mut tx = store.begin().await.unwrap();
        tx.set_store_kyc_status(store_id, KycStatus::Verified).await.unwrap();
        tx.append_outbox(entry()).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.kyc_status(store_id).await, Some(KycStatus::Verified));
        assert_eq!(store.kyc_write_count(store_id).await, 1);
        assert_eq!(store.outbox_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryComplianceStore::new();
        let store_id = StoreId::new();
        store.add_store(store_id).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_store_kyc_status(store_id, KycStatus::Rejected).await.unwrap();
            tx.append_outbox(entry()).await.unwrap();
        }

        assert_eq!(store.kyc_status(store_id).await, Some(KycStatus::PendingVerification));
        assert_eq!(store.kyc_write_count(store_id).await, 0);
        assert!(store.outbox_entries().await.is_empty());
    }

    #[tokio::test]
    async fn injected_fault_fires_once() {
        let store = InMemoryComplianceStore::new();
        store.fail_next(FaultPoint::AppendOutbox);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.append_outbox(entry()).await.is_err());
        assert!(tx.append_outbox(entry()).await.is_ok());
    }

    #[tokio::test]
    async fn failed_commit_discards_writes() {
        let store = InMemoryComplianceStore::new();
        store.fail_next(FaultPoint::Commit);

        let mut tx = store.begin().await.unwrap();
        tx.append_outbox(entry()).await.unwrap();
        assert!(tx.commit().await.is_err());

        assert!(store.outbox_entries().await.is_empty());
    }

    #[tokio::test]
    async fn list_by_store_pages_newest_first() {
        let store = InMemoryComplianceStore::new();
        let store_id = StoreId::new();
        let mut ids = Vec::new();
        for day in 1..=3 {
            let mut l = license(store_id, None);
            l.created_at = Timestamp::from_unix_secs(1_700_000_000 + day * 86_400).unwrap();
            ids.push(l.id);
            store.put_license(l).await;
        }
        store.put_license(license(StoreId::new(), None)).await;

        let first = store.list_by_store(store_id, PageRequest::new(2, 0)).await.unwrap();
        assert_eq!(first.items.iter().map(|l| l.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);
        assert!(first.has_more);

        let second = store.list_by_store(store_id, PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn due_for_expiry_skips_terminal_licenses() {
        let store = InMemoryComplianceStore::new();
        let store_id = StoreId::new();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let due = license(store_id, Some(today));
        let mut rejected = license(store_id, Some(today));
        rejected.decide(LicenseStatus::Rejected, Timestamp::now()).unwrap();
        let future = license(store_id, today.succ_opt());
        store.put_license(due.clone()).await;
        store.put_license(rejected).await;
        store.put_license(future).await;

        let rows = store.find_due_for_expiry(today).await.unwrap();
        assert_eq!(rows.iter().map(|l| l.id).collect::<Vec<_>>(), vec![due.id]);
    }
}
