//! Membership checker port - Store role lookups for authorization.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, StoreId, UserId};
use crate::domain::store::RoleSet;

#[async_trait]
pub trait MembershipChecker: Send + Sync {
    /// Returns true if `user_id` holds any of `roles` in `store_id`.
    async fn has_any_role(&self, user_id: &UserId, store_id: StoreId, roles: &RoleSet) -> Result<bool, DomainError>;
}
