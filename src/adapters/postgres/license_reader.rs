//! PostgreSQL implementation of LicenseReader.
//!
//! Read-only queries outside any transaction. Results may be stale by the time
//! a caller acts on them.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, StoreId};
use crate::domain::license::License;
use crate::ports::{LicenseReader, Page, PageRequest};

use super::rows::{db_error, LicenseRow, LICENSE_COLUMNS};

#[derive(Clone)]
pub struct PostgresLicenseReader {
    pool: PgPool,
}

impl PostgresLicenseReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str, day: NaiveDate, action: &'static str) -> Result<Vec<License>, DomainError> {
        let rows: Vec<LicenseRow> = sqlx::query_as(sql)
            .bind(day)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error(action))?;

        rows.into_iter().map(License::try_from).collect()
    }
}

#[async_trait]
impl LicenseReader for PostgresLicenseReader {
    async fn list_by_store(&self, store_id: StoreId, page: PageRequest) -> Result<Page<License>, DomainError> {
        let sql = format!(
            "SELECT {} FROM licenses WHERE store_id = $1 \
             ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3",
            LICENSE_COLUMNS
        );
        let rows: Vec<LicenseRow> = sqlx::query_as(&sql)
            .bind(store_id.as_uuid())
            .bind(i64::from(page.limit) + 1)
            .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list licenses"))?;

        let licenses = rows
            .into_iter()
            .map(License::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::from_overfetch(licenses, page.limit))
    }

    async fn find_expiring_on(&self, day: NaiveDate) -> Result<Vec<License>, DomainError> {
        let sql = format!(
            "SELECT {} FROM licenses WHERE expires_on = $1 \
             AND status IN ('pending', 'verified') ORDER BY id",
            LICENSE_COLUMNS
        );
        self.fetch(&sql, day, "find expiring licenses").await
    }

    async fn find_due_for_expiry(&self, day: NaiveDate) -> Result<Vec<License>, DomainError> {
        let sql = format!(
            "SELECT {} FROM licenses WHERE expires_on <= $1 \
             AND status IN ('pending', 'verified') ORDER BY expires_on, id",
            LICENSE_COLUMNS
        );
        self.fetch(&sql, day, "find licenses due for expiry").await
    }
}
