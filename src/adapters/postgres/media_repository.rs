//! PostgreSQL implementation of MediaRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, MediaId};
use crate::domain::media::MediaRecord;
use crate::ports::MediaRepository;

use super::rows::{db_error, MediaRow};

#[derive(Clone)]
pub struct PostgresMediaRepository {
    pool: PgPool,
}

impl PostgresMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRepository for PostgresMediaRepository {
    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>, DomainError> {
        let row: Option<MediaRow> = sqlx::query_as(
            "SELECT id, store_id, kind, status, content_type, storage_key FROM media WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("load media"))?;

        row.map(MediaRecord::try_from).transpose()
    }
}
