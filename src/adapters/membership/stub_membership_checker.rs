//! Stub implementation of MembershipChecker for development and testing.
//!
//! Holds an explicit grant table. Users without a grant hold no role.
//!
//! # Usage
//!
//! ```ignore
//! use store_compliance::adapters::membership::StubMembershipChecker;
//!
//! let checker = StubMembershipChecker::new();
//! checker.grant(&user_id, store_id, StoreRole::Owner);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, StoreId, UserId};
use crate::domain::store::{RoleSet, StoreRole};
use crate::ports::MembershipChecker;

#[derive(Debug, Default)]
pub struct StubMembershipChecker {
    grants: RwLock<HashMap<(UserId, StoreId), HashSet<StoreRole>>>,
    /// When set, every check fails with this message.
    failure: RwLock<Option<String>>,
}

impl StubMembershipChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: &UserId, store_id: StoreId, role: StoreRole) {
        self.grants
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .entry((user_id.clone(), store_id))
            .or_default()
            .insert(role);
    }

    /// Makes every subsequent check fail, simulating a broken membership store.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap_or_else(|p| p.into_inner()) = Some(message.into());
    }
}

#[async_trait]
impl MembershipChecker for StubMembershipChecker {
    async fn has_any_role(&self, user_id: &UserId, store_id: StoreId, roles: &RoleSet) -> Result<bool, DomainError> {
        if let Some(message) = self.failure.read().unwrap_or_else(|p| p.into_inner()).clone() {
            return Err(DomainError::database(message));
        }
        let grants = self.grants.read().unwrap_or_else(|p| p.into_inner());
        Ok(grants
            .get(&(user_id.clone(), store_id))
            .is_some_and(|held| roles.iter().any(|r| held.contains(&r))))
    }
}
