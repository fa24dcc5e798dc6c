//! Document URL signer port - Short-lived download links.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::DomainError;

#[async_trait]
pub trait DocumentUrlSigner: Send + Sync {
    /// Returns a URL granting read access to `storage_key` for `ttl`.
    async fn sign_download_url(&self, storage_key: &str, ttl: Duration) -> Result<String, DomainError>;
}
