//! License domain events.
//!
//! A single event type describes every license status change. Expiry warnings
//! reuse it with `warning` set and the status unchanged, so downstream
//! consumers only subscribe to one topic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, LicenseId, StoreId, Timestamp};

use super::{License, LicenseStatus};

/// Reason recorded when the scheduler expires a license.
pub const EXPIRED_BY_SCHEDULER: &str = "expired by scheduler";

/// Published when a license is created, decided, expired, or about to expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseStatusChanged {
    pub event_id: EventId,
    pub license_id: LicenseId,
    pub store_id: StoreId,
    pub status: LicenseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<LicenseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// True for expiry warnings, which carry the unchanged status.
    #[serde(default)]
    pub warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
    pub occurred_at: Timestamp,
}

domain_event!(
    LicenseStatusChanged,
    event_type = "license.status_changed.v1",
    schema_version = 1,
    aggregate_id = license_id,
    aggregate_type = "License",
    occurred_at = occurred_at,
    event_id = event_id
);

impl LicenseStatusChanged {
    fn base(license: &License, occurred_at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            license_id: license.id,
            store_id: license.store_id,
            status: license.status,
            previous_status: None,
            reason: None,
            warning: false,
            expires_on: license.details.expires_on,
            occurred_at,
        }
    }

    /// A license was submitted.
    pub fn created(license: &License) -> Self {
        Self::base(license, license.created_at)
    }

    /// A license moved from `previous` to its current status.
    pub fn transitioned(license: &License, previous: LicenseStatus, reason: Option<String>) -> Self {
        Self {
            previous_status: Some(previous),
            reason,
            ..Self::base(license, license.updated_at)
        }
    }

    /// A license expires soon; its status is unchanged.
    pub fn expiry_warning(license: &License, occurred_at: Timestamp) -> Self {
        Self {
            warning: true,
            ..Self::base(license, occurred_at)
        }
    }
}
