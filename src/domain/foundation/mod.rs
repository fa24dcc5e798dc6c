//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the event envelope, the state machine
//! trait and the error taxonomy shared by every compliance module.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError};
pub use events::{domain_event, Actor, DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::{LicenseId, MediaId, StoreId, SubscriptionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
