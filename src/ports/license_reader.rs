//! License reader port - Query operations outside a transaction.
//!
//! Used for listing and for selecting scheduler candidates. Callers that mutate
//! a license re-read it through [`super::LicenseTx`] before acting.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, StoreId};
use crate::domain::license::License;

/// Offset pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Clamps `limit` into `1..=MAX_LIMIT`.
    pub fn new(limit: u32, offset: u64) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Builds a page from up to `limit + 1` fetched rows.
    pub fn from_overfetch(mut rows: Vec<T>, limit: u32) -> Self {
        let has_more = rows.len() > limit as usize;
        rows.truncate(limit as usize);
        Self { items: rows, has_more }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }
}

#[async_trait]
pub trait LicenseReader: Send + Sync {
    /// Licenses of a store, newest first.
    async fn list_by_store(&self, store_id: StoreId, page: PageRequest) -> Result<Page<License>, DomainError>;

    /// Pending or Verified licenses whose expiration date is exactly `day`.
    async fn find_expiring_on(&self, day: NaiveDate) -> Result<Vec<License>, DomainError>;

    /// Pending or Verified licenses whose expiration date is on or before `day`.
    async fn find_due_for_expiry(&self, day: NaiveDate) -> Result<Vec<License>, DomainError>;
}
