//! KYC reconciliation port.
//!
//! License use cases depend on this narrow capability instead of a store
//! service, which keeps the license and store modules from depending on each
//! other.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, StoreId};
use crate::domain::store::KycStatus;

use super::ComplianceTx;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KycOutcome {
    pub store_id: StoreId,
    pub previous: KycStatus,
    pub current: KycStatus,
    pub changed: bool,
}

#[async_trait]
pub trait KycReconciliation: Send + Sync {
    /// Re-derives the store's KYC status inside `tx` and persists it if it changed.
    async fn reconcile_in(&self, tx: &mut dyn ComplianceTx, store_id: StoreId) -> Result<KycOutcome, DomainError>;
}
