//! PostgreSQL implementation of the transactional repository port.
//!
//! Each [`PgComplianceTx`] wraps one `sqlx` transaction. Reads that precede a
//! write take row locks (`FOR UPDATE`) so concurrent reviewers of the same
//! license or store serialize on the database.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, LicenseId, MediaId, StoreId};
use crate::domain::license::{License, LicenseStatus};
use crate::domain::media::AttachmentTarget;
use crate::domain::store::KycStatus;
use crate::ports::{
    AttachmentTx, ComplianceTx, LicenseTx, OutboxEntry, OutboxWriter, StoreTx, SubscriptionTx,
    TransactionManager,
};

use super::rows::{
    db_error, parse_column, parse_license_status, LicenseRow, SubscriptionRow, LICENSE_COLUMNS,
    SUBSCRIPTION_COLUMNS,
};

/// Opens [`PgComplianceTx`] handles from a pool.
#[derive(Clone)]
pub struct PostgresTransactionManager {
    pool: PgPool,
}

impl PostgresTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PostgresTransactionManager {
    async fn begin(&self) -> Result<Box<dyn ComplianceTx>, DomainError> {
        let tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        Ok(Box::new(PgComplianceTx { tx }))
    }
}

/// Open PostgreSQL transaction. Dropping it rolls back.
pub struct PgComplianceTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LicenseTx for PgComplianceTx {
    async fn insert_license(&mut self, license: &License) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO licenses (
                id, store_id, user_id, status, media_id, issuing_jurisdiction,
                license_type, license_number, issued_on, expires_on, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(license.id.as_uuid())
        .bind(license.store_id.as_uuid())
        .bind(license.user_id.as_str())
        .bind(license.status.as_str())
        .bind(license.details.media_id.as_uuid())
        .bind(&license.details.issuing_jurisdiction)
        .bind(license.details.license_type.as_str())
        .bind(&license.details.license_number)
        .bind(license.details.issued_on)
        .bind(license.details.expires_on)
        .bind(license.created_at.as_datetime())
        .bind(license.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("insert license"))?;

        Ok(())
    }

    async fn find_license_for_update(&mut self, id: LicenseId) -> Result<Option<License>, DomainError> {
        let sql = format!("SELECT {} FROM licenses WHERE id = $1 FOR UPDATE", LICENSE_COLUMNS);
        let row: Option<LicenseRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("lock license"))?;

        row.map(License::try_from).transpose()
    }

    async fn update_license(&mut self, license: &License) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE licenses SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(license.id.as_uuid())
            .bind(license.status.as_str())
            .bind(license.updated_at.as_datetime())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("update license"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::database(format!("License {} vanished during update", license.id)));
        }
        Ok(())
    }

    async fn delete_license(&mut self, id: LicenseId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM licenses WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("delete license"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn license_statuses(&mut self, store_id: StoreId) -> Result<Vec<LicenseStatus>, DomainError> {
        let statuses: Vec<String> = sqlx::query_scalar("SELECT status FROM licenses WHERE store_id = $1")
            .bind(store_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("read license statuses"))?;

        statuses.iter().map(|s| parse_license_status(s)).collect()
    }
}

#[async_trait]
impl StoreTx for PgComplianceTx {
    async fn store_kyc_status(&mut self, store_id: StoreId) -> Result<Option<KycStatus>, DomainError> {
        let status: Option<String> = sqlx::query_scalar("SELECT kyc_status FROM stores WHERE id = $1 FOR UPDATE")
            .bind(store_id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("lock store"))?;

        status.map(|s| parse_column("kyc_status", &s)).transpose()
    }

    async fn set_store_kyc_status(&mut self, store_id: StoreId, status: KycStatus) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE stores SET kyc_status = $2, updated_at = now() WHERE id = $1")
            .bind(store_id.as_uuid())
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("update store kyc status"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::database(format!("Store {} does not exist", store_id)));
        }
        Ok(())
    }

    async fn store_subscription_active(&mut self, store_id: StoreId) -> Result<Option<bool>, DomainError> {
        sqlx::query_scalar("SELECT subscription_active FROM stores WHERE id = $1 FOR UPDATE")
            .bind(store_id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("lock store"))
    }

    async fn set_store_subscription_active(&mut self, store_id: StoreId, active: bool) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE stores SET subscription_active = $2, updated_at = now() WHERE id = $1")
            .bind(store_id.as_uuid())
            .bind(active)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("update store subscription flag"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::database(format!("Store {} does not exist", store_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionTx for PgComplianceTx {
    async fn find_subscription_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE external_id = $1 FOR UPDATE",
            SUBSCRIPTION_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(external_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("lock subscription"))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn insert_subscription(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, store_id, external_id, status, current_period_start, current_period_end,
                price_ref, customer_ref, payment_method_ref, cancel_at_period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.store_id.as_uuid())
        .bind(&subscription.external_id)
        .bind(subscription.status.as_str())
        .bind(subscription.current_period_start.map(|t| *t.as_datetime()))
        .bind(subscription.current_period_end.map(|t| *t.as_datetime()))
        .bind(&subscription.price_ref)
        .bind(&subscription.customer_ref)
        .bind(&subscription.payment_method_ref)
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("insert subscription"))?;

        Ok(())
    }

    async fn update_subscription(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = $2,
                current_period_start = $3,
                current_period_end = $4,
                price_ref = $5,
                customer_ref = $6,
                payment_method_ref = $7,
                cancel_at_period_end = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.status.as_str())
        .bind(subscription.current_period_start.map(|t| *t.as_datetime()))
        .bind(subscription.current_period_end.map(|t| *t.as_datetime()))
        .bind(&subscription.price_ref)
        .bind(&subscription.customer_ref)
        .bind(&subscription.payment_method_ref)
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update subscription"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::database(format!(
                "Subscription {} vanished during update",
                subscription.id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AttachmentTx for PgComplianceTx {
    async fn link_attachments(&mut self, target: AttachmentTarget, media_ids: &[MediaId]) -> Result<(), DomainError> {
        for media_id in media_ids {
            sqlx::query(
                r#"
                INSERT INTO attachments (aggregate_type, aggregate_id, store_id, media_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(target.kind.as_str())
            .bind(target.aggregate_id)
            .bind(target.store_id.as_uuid())
            .bind(media_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("link attachment"))?;
        }
        Ok(())
    }

    async fn unlink_attachments(&mut self, target: AttachmentTarget) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM attachments WHERE aggregate_type = $1 AND aggregate_id = $2")
            .bind(target.kind.as_str())
            .bind(target.aggregate_id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("unlink attachments"))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OutboxWriter for PgComplianceTx {
    async fn append_outbox(&mut self, entry: OutboxEntry) -> Result<(), DomainError> {
        let envelope = serde_json::to_value(&entry.event)
            .map_err(|e| DomainError::internal(format!("Failed to serialize event envelope: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO event_outbox (
                id, event_id, event_type, aggregate_type, aggregate_id, partition_key, envelope, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.event.event_id.as_str())
        .bind(&entry.event.event_type)
        .bind(&entry.event.aggregate_type)
        .bind(&entry.event.aggregate_id)
        .bind(&entry.partition_key)
        .bind(envelope)
        .bind(entry.created_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("append outbox entry"))?;

        Ok(())
    }
}

#[async_trait]
impl ComplianceTx for PgComplianceTx {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let PgComplianceTx { tx } = *self;
        tx.commit().await.map_err(db_error("commit transaction"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let PgComplianceTx { tx } = *self;
        tx.rollback().await.map_err(db_error("roll back transaction"))
    }
}
