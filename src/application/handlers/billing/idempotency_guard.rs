//! IdempotencyGuard - Deduplicates externally delivered events.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::foundation::{DomainError, ValidationError};
use crate::ports::IdempotencyStore;

/// Longest accepted event id, in bytes.
pub const MAX_EVENT_ID_LEN: usize = 255;

/// Default retention of processed event ids.
pub const DEFAULT_IDEMPOTENCY_TTL: Duration = Duration::from_secs(72 * 60 * 60);

/// Result of [`IdempotencyGuard::check_and_mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyCheck {
    /// First delivery; the key is now held.
    New,
    /// Seen within the retention window.
    Duplicate,
}

pub struct IdempotencyGuard {
    store: Arc<dyn IdempotencyStore>,
    ttl: Duration,
}

impl IdempotencyGuard {
    pub fn new(store: Arc<dyn IdempotencyStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Storage key for an event within a scope.
    pub fn key(scope: &str, event_id: &str) -> String {
        format!("idempotency:{}:{}", scope, event_id)
    }

    /// Marks the event as seen unless it already is.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a malformed event id, before any write
    /// - `CacheError` if the store is unreachable
    pub async fn check_and_mark(&self, scope: &str, event_id: &str) -> Result<IdempotencyCheck, DomainError> {
        validate_event_id(event_id)?;

        let key = Self::key(scope, event_id);
        let stored = self
            .store
            .set_if_absent(&key, self.ttl)
            .await
            .map_err(|e| e.in_operation("idempotency_check"))?;

        if stored {
            Ok(IdempotencyCheck::New)
        } else {
            debug!(scope, event_id, "Duplicate event delivery");
            Ok(IdempotencyCheck::Duplicate)
        }
    }

    /// Forgets the event so a redelivery is processed again.
    pub async fn release(&self, scope: &str, event_id: &str) -> Result<(), DomainError> {
        validate_event_id(event_id)?;
        self.store
            .delete(&Self::key(scope, event_id))
            .await
            .map_err(|e| e.in_operation("idempotency_release"))
    }
}

fn validate_event_id(event_id: &str) -> Result<(), ValidationError> {
    if event_id.is_empty() {
        return Err(ValidationError::empty_field("event_id"));
    }
    if event_id.len() > MAX_EVENT_ID_LEN {
        return Err(ValidationError::invalid_format(
            "event_id",
            format!("longer than {} bytes", MAX_EVENT_ID_LEN),
        ));
    }
    if event_id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::invalid_format(
            "event_id",
            "contains whitespace or control characters",
        ));
    }
    Ok(())
}
