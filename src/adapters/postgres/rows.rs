//! Row types shared by the PostgreSQL adapters.

use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::{
    DomainError, ErrorCode, LicenseId, MediaId, StoreId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::license::{License, LicenseDetails, LicenseStatus, LicenseType};
use crate::domain::media::{MediaKind, MediaRecord, MediaStatus};

pub(super) const LICENSE_COLUMNS: &str = "id, store_id, user_id, status, media_id, issuing_jurisdiction, \
     license_type, license_number, issued_on, expires_on, created_at, updated_at";

pub(super) const SUBSCRIPTION_COLUMNS: &str = "id, store_id, external_id, status, current_period_start, \
     current_period_end, price_ref, customer_ref, payment_method_ref, cancel_at_period_end, created_at, updated_at";

/// Database row representation of a license.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct LicenseRow {
    id: Uuid,
    store_id: Uuid,
    user_id: String,
    status: String,
    media_id: Uuid,
    issuing_jurisdiction: String,
    license_type: String,
    license_number: String,
    issued_on: Option<NaiveDate>,
    expires_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LicenseRow> for License {
    type Error = DomainError;

    fn try_from(row: LicenseRow) -> Result<Self, Self::Error> {
        Ok(License {
            id: LicenseId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            status: parse_column("status", &row.status)?,
            details: LicenseDetails {
                media_id: MediaId::from_uuid(row.media_id),
                issuing_jurisdiction: row.issuing_jurisdiction,
                license_type: parse_column::<LicenseType>("license_type", &row.license_type)?,
                license_number: row.license_number,
                issued_on: row.issued_on,
                expires_on: row.expires_on,
            },
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of a mirrored subscription.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct SubscriptionRow {
    id: Uuid,
    store_id: Uuid,
    external_id: String,
    status: String,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    price_ref: Option<String>,
    customer_ref: Option<String>,
    payment_method_ref: Option<String>,
    cancel_at_period_end: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            external_id: row.external_id,
            status: parse_column::<SubscriptionStatus>("status", &row.status)?,
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            price_ref: row.price_ref,
            customer_ref: row.customer_ref,
            payment_method_ref: row.payment_method_ref,
            cancel_at_period_end: row.cancel_at_period_end,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of a media record.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct MediaRow {
    id: Uuid,
    store_id: Uuid,
    kind: String,
    status: String,
    content_type: String,
    storage_key: String,
}

impl TryFrom<MediaRow> for MediaRecord {
    type Error = DomainError;

    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        Ok(MediaRecord {
            id: MediaId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            kind: MediaKind::parse(&row.kind).ok_or_else(|| corrupt("kind", &row.kind))?,
            status: MediaStatus::parse(&row.status).ok_or_else(|| corrupt("status", &row.status))?,
            content_type: row.content_type,
            storage_key: row.storage_key,
        })
    }
}

/// Parses a status-like column, reporting bad values as database errors.
pub(super) fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, DomainError> {
    value.parse::<T>().map_err(|_| corrupt(column, value))
}

pub(super) fn parse_license_status(value: &str) -> Result<LicenseStatus, DomainError> {
    parse_column("status", value)
}

fn corrupt(column: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, value),
    )
}

/// Wraps a driver error with the failed action.
pub(super) fn db_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::database(format!("Failed to {}: {}", action, e))
}
