//! Store membership roles and the role sets that guard license operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Role a user holds within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    Owner,
    Manager,
    Staff,
    Viewer,
}

impl StoreRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreRole::Owner => "owner",
            StoreRole::Manager => "manager",
            StoreRole::Staff => "staff",
            StoreRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(StoreRole::Owner),
            "manager" => Ok(StoreRole::Manager),
            "staff" => Ok(StoreRole::Staff),
            "viewer" => Ok(StoreRole::Viewer),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown store role '{}'", other),
            )),
        }
    }
}

/// Ordered, duplicate-free set of roles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleSet(BTreeSet<StoreRole>);

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = StoreRole>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn contains(&self, role: StoreRole) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StoreRole> + '_ {
        self.0.iter().copied()
    }

    /// Storage names, in role order.
    pub fn as_strs(&self) -> Vec<&'static str> {
        self.iter().map(|r| r.as_str()).collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_strs().join(","))
    }
}

/// Roles allowed to perform each license operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicensePolicy {
    pub create_roles: RoleSet,
    pub delete_roles: RoleSet,
}

impl Default for LicensePolicy {
    fn default() -> Self {
        Self {
            create_roles: RoleSet::new([StoreRole::Owner, StoreRole::Manager, StoreRole::Staff]),
            delete_roles: RoleSet::new([StoreRole::Owner, StoreRole::Manager]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_set_is_ordered_and_deduplicated() {
        let set = RoleSet::new([StoreRole::Staff, StoreRole::Owner, StoreRole::Staff]);
        assert_eq!(set.as_strs(), vec!["owner", "staff"]);
    }

    #[test]
    fn default_policy_lets_staff_create_but_not_delete() {
        let policy = LicensePolicy::default();
        assert!(policy.create_roles.contains(StoreRole::Staff));
        assert!(!policy.delete_roles.contains(StoreRole::Staff));
        assert!(!policy.create_roles.contains(StoreRole::Viewer));
    }

    #[test]
    fn roles_parse_from_storage_names() {
        assert_eq!("manager".parse::<StoreRole>().unwrap(), StoreRole::Manager);
        assert!("admin".parse::<StoreRole>().is_err());
    }
}
