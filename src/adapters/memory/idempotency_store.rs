//! In-memory idempotency key store.
//!
//! Expiry uses `tokio::time::Instant`, so tests can advance time with a paused
//! runtime instead of sleeping.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::foundation::DomainError;
use crate::ports::IdempotencyStore;

#[derive(Debug, Default)]
pub struct InMemoryIdempotencyStore {
    keys: Mutex<HashMap<String, Instant>>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` is present and unexpired.
    pub fn contains(&self, key: &str) -> bool {
        let keys = self.keys.lock().unwrap_or_else(|p| p.into_inner());
        keys.get(key).is_some_and(|deadline| *deadline > Instant::now())
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        let now = Instant::now();
        let mut keys = self.keys.lock().unwrap_or_else(|p| p.into_inner());
        keys.retain(|_, deadline| *deadline > now);
        if keys.contains_key(key) {
            return Ok(false);
        }
        keys.insert(key.to_string(), now + ttl);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        self.keys.lock().unwrap_or_else(|p| p.into_inner()).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn key_expires_after_ttl() {
        let store = InMemoryIdempotencyStore::new();
        let ttl = Duration::from_secs(60);

        assert!(store.set_if_absent("k", ttl).await.unwrap());
        assert!(!store.set_if_absent("k", ttl).await.unwrap());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!store.contains("k"));
        assert!(store.set_if_absent("k", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn delete_frees_key() {
        let store = InMemoryIdempotencyStore::new();
        let ttl = Duration::from_secs(60);

        store.set_if_absent("k", ttl).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("missing").await.unwrap();

        assert!(store.set_if_absent("k", ttl).await.unwrap());
    }
}
