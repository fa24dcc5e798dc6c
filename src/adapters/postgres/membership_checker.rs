//! PostgreSQL implementation of MembershipChecker.
//!
//! Roles live in `store_members`, one row per (store, user, role).

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, StoreId, UserId};
use crate::domain::store::RoleSet;
use crate::ports::MembershipChecker;

use super::rows::db_error;

#[derive(Clone)]
pub struct PostgresMembershipChecker {
    pool: PgPool,
}

impl PostgresMembershipChecker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipChecker for PostgresMembershipChecker {
    async fn has_any_role(&self, user_id: &UserId, store_id: StoreId, roles: &RoleSet) -> Result<bool, DomainError> {
        if roles.is_empty() {
            return Ok(false);
        }

        let roles: Vec<String> = roles.as_strs().into_iter().map(str::to_string).collect();
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM store_members
                WHERE store_id = $1 AND user_id = $2 AND role = ANY($3)
            )
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(user_id.as_str())
        .bind(&roles)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("check store membership"))
    }
}
