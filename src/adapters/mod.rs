//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-memory implementations for tests and local runs
//! - `membership` - Stub membership checker
//! - `postgres` - sqlx-backed transactions and readers
//! - `redis` - Shared idempotency keys
//! - `storage` - Signed document download URLs
//! - `stripe` - Subscription lookups against the Stripe API

pub mod membership;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod storage;
pub mod stripe;

pub use memory::{InMemoryComplianceStore, InMemoryIdempotencyStore, InMemoryMediaRepository};
pub use membership::StubMembershipChecker;
pub use postgres::{
    PostgresLicenseReader, PostgresMediaRepository, PostgresMembershipChecker,
    PostgresTransactionManager,
};
pub use self::redis::RedisIdempotencyStore;
pub use storage::HmacUrlSigner;
pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
