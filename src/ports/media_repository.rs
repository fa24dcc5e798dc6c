//! Media repository port - Read access to uploaded documents.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MediaId};
use crate::domain::media::MediaRecord;

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>, DomainError>;
}
