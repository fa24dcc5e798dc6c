//! Redis-backed idempotency store for multi-instance deployments.
//!
//! Uses `SET key 1 NX EX ttl`, which is atomic on the server. Keys expire on
//! their own, so nothing needs sweeping.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::IdempotencyStore;

/// Redis idempotency store.
///
/// The connection is cloned per call; clones share one multiplexed socket.
#[derive(Clone)]
pub struct RedisIdempotencyStore {
    conn: MultiplexedConnection,
}

impl RedisIdempotencyStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(cache_error)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(cache_error)?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();

        // SET NX replies nil when the key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(cache_error)
    }
}

/// Redis EX takes whole seconds; round up and never send zero.
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Redis error: {}", e))
}
