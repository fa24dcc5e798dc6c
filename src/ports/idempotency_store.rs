//! Idempotency store port - Set-if-absent keys with expiry.
//!
//! Backs deduplication of externally delivered events. Events may be delivered
//! more than once due to provider retries or consumer crashes before
//! acknowledgment; the first writer of a key wins until it expires or is
//! deleted.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::DomainError;

#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Atomically stores `key` with `ttl` unless present.
    ///
    /// Returns true if this call stored the key.
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, DomainError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}
