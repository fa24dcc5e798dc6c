//! Redis adapters.
//!
//! - `RedisIdempotencyStore` - Set-if-absent keys shared across instances

mod idempotency_store;

pub use idempotency_store::RedisIdempotencyStore;
