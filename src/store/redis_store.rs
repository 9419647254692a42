//! Redis-backed counter store.
//!
//! The record is a single integer string under `store.key`. Each operation is
//! one Redis command, so the server serializes them:
//! - ensure: `SET key 0 NX` (never overwrites)
//! - get-or-create: `INCRBY key 0` (creates at 0 if absent, returns the value)
//! - increment: `INCR key`

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{CounterRecord, CounterStore, StoreError};

/// Counter store using a shared, auto-reconnecting Redis connection
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    key: String,
}

impl RedisStore {
    /// Open a connection to `url`. Fails if the server cannot be reached.
    pub async fn connect(url: &str, key: String) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection_manager().await?;

        tracing::debug!(key = %key, "Connected to Redis");

        Ok(Self { connection, key })
    }

    /// Key holding the counter record
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn ensure_counter(&self) -> Result<CounterRecord, StoreError> {
        let mut connection = self.connection.clone();

        let created: Option<String> = redis::cmd("SET")
            .arg(&self.key)
            .arg(0)
            .arg("NX")
            .query_async(&mut connection)
            .await?;

        if created.is_some() {
            tracing::info!(key = %self.key, "Created counter record");
        }

        self.get_or_create().await
    }

    async fn get_or_create(&self) -> Result<CounterRecord, StoreError> {
        let mut connection = self.connection.clone();
        let value: i64 = connection.incr(&self.key, 0i64).await?;
        Ok(CounterRecord { value })
    }

    async fn increment(&self) -> Result<CounterRecord, StoreError> {
        let mut connection = self.connection.clone();
        let value: i64 = connection.incr(&self.key, 1i64).await?;
        Ok(CounterRecord { value })
    }
}
