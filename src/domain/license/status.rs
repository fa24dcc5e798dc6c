//! License status state machine.
//!
//! Defines the verification lifecycle of a compliance license.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Verification status of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// Submitted, awaiting a reviewer decision.
    Pending,

    /// Accepted by a reviewer.
    Verified,

    /// Declined by a reviewer. Terminal.
    Rejected,

    /// Past its expiration date. Terminal.
    Expired,
}

impl LicenseStatus {
    /// Returns true if the license may be deleted in this status.
    pub fn is_deletable(&self) -> bool {
        matches!(self, LicenseStatus::Rejected | LicenseStatus::Expired)
    }

    /// Returns true if the expiry scheduler should look at this license.
    pub fn is_expirable(&self) -> bool {
        matches!(self, LicenseStatus::Pending | LicenseStatus::Verified)
    }

    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Pending => "pending",
            LicenseStatus::Verified => "verified",
            LicenseStatus::Rejected => "rejected",
            LicenseStatus::Expired => "expired",
        }
    }
}

impl StateMachine for LicenseStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LicenseStatus::*;
        matches!(
            (self, target),
            (Pending, Verified) | (Pending, Rejected) | (Pending, Expired) | (Verified, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LicenseStatus::*;
        match self {
            Pending => vec![Verified, Rejected, Expired],
            Verified => vec![Expired],
            Rejected | Expired => vec![],
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LicenseStatus::Pending),
            "verified" => Ok(LicenseStatus::Verified),
            "rejected" => Ok(LicenseStatus::Rejected),
            "expired" => Ok(LicenseStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown license status '{}'", other),
            )),
        }
    }
}
