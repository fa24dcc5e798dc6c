//! OutboxWriter port - Interface for transactional event persistence.
//!
//! Implements the Transactional Outbox Pattern: domain events are appended in
//! the same transaction as the state change they describe, so an external relay
//! can deliver them at-least-once without distributed transactions.
//!
//! Relaying rows downstream is not part of this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, EventEnvelope, Timestamp};

/// An entry in the event outbox table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    /// Unique identifier for this outbox entry
    pub id: Uuid,

    /// The domain event envelope
    pub event: EventEnvelope,

    /// When the event was written to the outbox
    pub created_at: Timestamp,

    /// Partition key for ordered delivery (the owning store)
    pub partition_key: String,
}

impl OutboxEntry {
    /// Create a new outbox entry for an event.
    pub fn new(event: EventEnvelope, partition_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            created_at: Timestamp::now(),
            partition_key: partition_key.into(),
        }
    }
}

/// Port for appending events through an open transaction.
///
/// Implemented by transaction handles, never by a pool: an append that is not
/// part of the caller's transaction would break the outbox guarantee.
#[async_trait]
pub trait OutboxWriter: Send {
    /// Append a single entry. Becomes visible only when the transaction commits.
    async fn append_outbox(&mut self, entry: OutboxEntry) -> Result<(), DomainError>;
}
