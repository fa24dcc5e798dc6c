//! Store compliance (KYC) status and its derivation from license statuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;
use crate::domain::license::LicenseStatus;

/// Derived compliance state of a store.
///
/// Never set directly by callers; always the output of [`derive_kyc_status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    PendingVerification,
    Verified,
    Expired,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::PendingVerification => "pending_verification",
            KycStatus::Verified => "verified",
            KycStatus::Expired => "expired",
            KycStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_verification" => Ok(KycStatus::PendingVerification),
            "verified" => Ok(KycStatus::Verified),
            "expired" => Ok(KycStatus::Expired),
            "rejected" => Ok(KycStatus::Rejected),
            other => Err(ValidationError::invalid_format(
                "kyc_status",
                format!("unknown kyc status '{}'", other),
            )),
        }
    }
}

/// Derives a store's KYC status from its licenses. First match wins:
///
/// 1. any Verified → Verified
/// 2. any Expired and no Rejected → Expired
/// 3. any Rejected → Rejected
/// 4. otherwise → PendingVerification
pub fn derive_kyc_status<I>(statuses: I) -> KycStatus
where
    I: IntoIterator<Item = LicenseStatus>,
{
    let (mut verified, mut expired, mut rejected) = (false, false, false);
    for status in statuses {
        match status {
            LicenseStatus::Verified => verified = true,
            LicenseStatus::Expired => expired = true,
            LicenseStatus::Rejected => rejected = true,
            LicenseStatus::Pending => {}
        }
    }

    if verified {
        KycStatus::Verified
    } else if expired && !rejected {
        KycStatus::Expired
    } else if rejected {
        KycStatus::Rejected
    } else {
        KycStatus::PendingVerification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use LicenseStatus::*;

    #[test]
    fn no_licenses_is_pending_verification() {
        assert_eq!(derive_kyc_status([]), KycStatus::PendingVerification);
    }

    #[test]
    fn verified_wins_over_expired() {
        assert_eq!(derive_kyc_status([Expired, Verified]), KycStatus::Verified);
    }

    #[test]
    fn rejected_suppresses_expired() {
        assert_eq!(derive_kyc_status([Expired, Rejected]), KycStatus::Rejected);
    }

    #[test]
    fn expired_alone_is_expired() {
        assert_eq!(derive_kyc_status([Expired, Pending]), KycStatus::Expired);
    }

    #[test]
    fn only_pending_is_pending_verification() {
        assert_eq!(
            derive_kyc_status([Pending, Pending]),
            KycStatus::PendingVerification
        );
    }

    #[test]
    fn parses_storage_representation() {
        assert_eq!(
            "pending_verification".parse::<KycStatus>().unwrap(),
            KycStatus::PendingVerification
        );
        assert!("approved".parse::<KycStatus>().is_err());
    }

    fn any_status() -> impl Strategy<Value = LicenseStatus> {
        prop_oneof![Just(Pending), Just(Verified), Just(Rejected), Just(Expired)]
    }

    fn expected(statuses: &[LicenseStatus]) -> KycStatus {
        let has = |s: LicenseStatus| statuses.contains(&s);
        if has(Verified) {
            KycStatus::Verified
        } else if has(Expired) && !has(Rejected) {
            KycStatus::Expired
        } else if has(Rejected) {
            KycStatus::Rejected
        } else {
            KycStatus::PendingVerification
        }
    }

    proptest! {
        #[test]
        fn derivation_follows_precedence(statuses in prop::collection::vec(any_status(), 0..12)) {
            prop_assert_eq!(derive_kyc_status(statuses.iter().copied()), expected(&statuses));
        }

        #[test]
        fn derivation_ignores_order(
            (statuses, shuffled) in prop::collection::vec(any_status(), 0..12)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            prop_assert_eq!(derive_kyc_status(statuses), derive_kyc_status(shuffled));
        }
    }
}
