//! In-memory media repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, MediaId};
use crate::domain::media::MediaRecord;
use crate::ports::MediaRepository;

#[derive(Debug, Default)]
pub struct InMemoryMediaRepository {
    records: RwLock<HashMap<MediaId, MediaRecord>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: MediaRecord) {
        self.records
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(record.id, record);
    }

    pub fn remove(&self, id: MediaId) {
        self.records.write().unwrap_or_else(|p| p.into_inner()).remove(&id);
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(&id)
            .cloned())
    }
}
