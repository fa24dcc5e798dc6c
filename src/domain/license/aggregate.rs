//! License aggregate entity.
//!
//! A License is a permit document a store submits for compliance review. It is
//! created Pending, decided once by a reviewer, and may later expire.
//!
//! # Design Decisions
//!
//! - **Decide once**: a reviewer decision is only accepted while Pending
//! - **Delete only terminal**: Rejected and Expired licenses may be removed
//! - **Dates are calendar days**: issue/expiration carry no time of day, compared in UTC

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, LicenseId, MediaId, StateMachine, StoreId, Timestamp, UserId,
    ValidationError,
};

use super::{LicenseStatus, LicenseType};

/// Validated descriptive fields of a license submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseDetails {
    pub media_id: MediaId,
    pub issuing_jurisdiction: String,
    pub license_type: LicenseType,
    pub license_number: String,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

impl LicenseDetails {
    /// Validates raw submission fields.
    ///
    /// Fields are checked in a fixed order so the reported field is stable:
    /// media reference, jurisdiction, license number, license type, dates.
    pub fn new(
        media_id: Option<MediaId>,
        issuing_jurisdiction: &str,
        license_type: &str,
        license_number: &str,
        issued_on: Option<NaiveDate>,
        expires_on: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let media_id = media_id.ok_or_else(|| ValidationError::empty_field("media_id"))?;

        let issuing_jurisdiction = issuing_jurisdiction.trim();
        if issuing_jurisdiction.is_empty() {
            return Err(ValidationError::empty_field("issuing_jurisdiction"));
        }

        let license_number = license_number.trim();
        if license_number.is_empty() {
            return Err(ValidationError::empty_field("license_number"));
        }

        let license_type: LicenseType = license_type.parse()?;

        if let (Some(issued), Some(expires)) = (issued_on, expires_on) {
            if expires < issued {
                return Err(ValidationError::invalid_format(
                    "expires_on",
                    "expiration date precedes issue date",
                ));
            }
        }

        Ok(Self {
            media_id,
            issuing_jurisdiction: issuing_jurisdiction.to_string(),
            license_type,
            license_number: license_number.to_string(),
            issued_on,
            expires_on,
        })
    }
}

/// License aggregate.
///
/// # Invariants
///
/// - `status` only changes along the [`LicenseStatus`] state machine
/// - `expires_on >= issued_on` when both are present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: LicenseId,
    pub store_id: StoreId,
    pub user_id: UserId,
    pub status: LicenseStatus,
    pub details: LicenseDetails,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl License {
    /// Creates a new Pending license.
    pub fn submit(store_id: StoreId, user_id: UserId, details: LicenseDetails, now: Timestamp) -> Self {
        Self {
            id: LicenseId::new(),
            store_id,
            user_id,
            status: LicenseStatus::Pending,
            details,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a reviewer decision, returning the previous status.
    ///
    /// # Errors
    ///
    /// - `InvalidDecision` if `decision` is neither Verified nor Rejected
    /// - `LicenseAlreadyFinalized` unless the license is Pending
    pub fn decide(&mut self, decision: LicenseStatus, now: Timestamp) -> Result<LicenseStatus, DomainError> {
        if !matches!(decision, LicenseStatus::Verified | LicenseStatus::Rejected) {
            return Err(DomainError::new(
                ErrorCode::InvalidDecision,
                format!("Decision must be verified or rejected, got {}", decision),
            )
            .with_detail("field", "decision"));
        }
        if self.status != LicenseStatus::Pending {
            return Err(self.already_finalized());
        }
        self.transition(decision, now)
    }

    /// Marks the license expired, returning the previous status.
    ///
    /// # Errors
    ///
    /// Returns `LicenseAlreadyFinalized` if the license is already terminal.
    pub fn expire(&mut self, now: Timestamp) -> Result<LicenseStatus, DomainError> {
        self.transition(LicenseStatus::Expired, now)
    }

    /// Fails with `LicenseNotDeletable` unless the license is terminal.
    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if self.status.is_deletable() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::LicenseNotDeletable,
                format!("License {} is {} and cannot be deleted", self.id, self.status),
            ))
        }
    }

    /// Returns true if the expiration date is on or before `today`.
    pub fn is_due_for_expiry(&self, today: NaiveDate) -> bool {
        self.status.is_expirable() && self.details.expires_on.is_some_and(|d| d <= today)
    }

    fn transition(&mut self, target: LicenseStatus, now: Timestamp) -> Result<LicenseStatus, DomainError> {
        let previous = self.status;
        self.status = previous
            .transition_to(target)
            .map_err(|_| self.already_finalized())?;
        self.updated_at = now;
        Ok(previous)
    }

    fn already_finalized(&self) -> DomainError {
        DomainError::new(
            ErrorCode::LicenseAlreadyFinalized,
            format!("License {} is already {}", self.id, self.status),
        )
    }
}
