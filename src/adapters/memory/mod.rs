//! In-memory adapters for tests and local runs.

mod compliance_store;
mod idempotency_store;
mod media_repository;

pub use compliance_store::{FaultPoint, InMemoryComplianceStore, InMemoryTx};
pub use idempotency_store::InMemoryIdempotencyStore;
pub use media_repository::InMemoryMediaRepository;
