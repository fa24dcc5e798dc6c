//! Outbox emission.
//!
//! Wraps a domain event in an envelope attributed to its actor and appends it
//! through the caller's transaction. No batching, no retries: a failed append
//! fails the enclosing use case.

use serde::Serialize;
use tracing::debug;

use crate::domain::foundation::{Actor, DomainError, DomainEvent, EventEnvelope, EventId, StoreId};
use crate::ports::{OutboxEntry, OutboxWriter};

/// Appends `event` to the outbox, partitioned by the owning store.
pub async fn emit_event<W, E>(
    tx: &mut W,
    event: &E,
    actor: &Actor,
    store_id: StoreId,
) -> Result<EventId, DomainError>
where
    W: OutboxWriter + ?Sized,
    E: DomainEvent + Serialize,
{
    let envelope = EventEnvelope::from_event(event)?.with_actor(actor);
    let event_id = envelope.event_id.clone();
    let event_type = envelope.event_type.clone();

    tx.append_outbox(OutboxEntry::new(envelope, store_id.to_string()))
        .await
        .map_err(|e| e.in_operation("append_outbox"))?;

    debug!(event_id = %event_id, event_type = %event_type, store_id = %store_id, "Outbox entry appended");
    Ok(event_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FaultPoint, InMemoryComplianceStore};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::ports::TransactionManager;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Pinged {
        event_id: EventId,
        store_id: StoreId,
        occurred_at: Timestamp,
    }

    crate::domain_event!(
        Pinged,
        event_type = "store.pinged.v1",
        schema_version = 1,
        aggregate_id = store_id,
        aggregate_type = "Store",
        occurred_at = occurred_at,
        event_id = event_id
    );

    #[tokio::test]
    async fn emitted_entry_carries_actor_and_partition() {
        let store = InMemoryComplianceStore::new();
        let store_id = StoreId::new();
        let user_id = UserId::new("u-1").unwrap();
        let event = Pinged {
            event_id: EventId::new(),
            store_id,
            occurred_at: Timestamp::now(),
        };

        let mut tx = store.begin().await.unwrap();
        let id = emit_event(
            &mut *tx,
            &event,
            &Actor::User {
                user_id,
                store_id,
            },
            store_id,
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let entries = store.outbox_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event.event_id, id);
        assert_eq!(entries[0].partition_key, store_id.to_string());
        assert_eq!(entries[0].event.metadata.user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn append_failure_names_the_operation() {
        let store = InMemoryComplianceStore::new();
        store.fail_next(FaultPoint::AppendOutbox);
        let store_id = StoreId::new();
        let event = Pinged {
            event_id: EventId::new(),
            store_id,
            occurred_at: Timestamp::now(),
        };

        let mut tx = store.begin().await.unwrap();
        let err = emit_event(&mut *tx, &event, &Actor::System, store_id)
            .await
            .unwrap_err();
        assert!(err.message.starts_with("append_outbox:"));
    }
}
