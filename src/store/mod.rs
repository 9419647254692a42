//! Counter persistence.
//!
//! The counter record is kept behind the `CounterStore` trait so the HTTP layer
//! never sees which backend is in use. Every operation is a single atomic step
//! at the store level: there is no read-then-write across round trips, and the
//! record lives under one fixed key (or one slot), so at most one record can
//! ever exist.
//!
//! Backends are selected by the scheme of the connection string:
//! - `redis://` / `rediss://`: Redis, using `INCR`/`INCRBY`/`SET NX`
//! - `memory://`: an in-process single-writer task, for development and tests

mod memory;
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::StoreSettings;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// The single persisted counter record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub value: i64,
}

impl CounterRecord {
    /// A freshly created record
    pub const fn initial() -> Self {
        Self { value: 0 }
    }
}

/// Errors raised by a counter store. All of them mean "store unavailable" to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store worker stopped")]
    WorkerStopped,

    #[error("Store operation timed out after {0}s")]
    Timeout(u64),

    #[error("Unsupported store URL scheme: {0}")]
    UnsupportedUrl(String),
}

/// Atomic operations on the single counter record.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Short backend name for logging
    fn backend(&self) -> &'static str;

    /// Create the record with value 0 unless it already exists; never overwrites.
    async fn ensure_counter(&self) -> Result<CounterRecord, StoreError>;

    /// Return the record, creating it with value 0 if absent, as one atomic step.
    async fn get_or_create(&self) -> Result<CounterRecord, StoreError>;

    /// Increment the record by exactly one and return the new state, creating it first if absent.
    async fn increment(&self) -> Result<CounterRecord, StoreError>;
}

/// Open the store named by `url`.
pub async fn connect(url: &str, settings: &StoreSettings) -> Result<Arc<dyn CounterStore>, StoreError> {
    let scheme = url.split_once("://").map(|(scheme, _)| scheme).unwrap_or("");

    match scheme {
        "redis" | "rediss" | "redis+unix" => {
            let store = RedisStore::connect(url, settings.key.clone()).await?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryStore::spawn())),
        _ => Err(StoreError::UnsupportedUrl(redact(url))),
    }
}

/// Strip credentials and path from a connection string before it reaches a log line.
pub fn redact(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.rsplit_once('@').map(|(_, host)| host).unwrap_or(rest);
            let host = host.split('/').next().unwrap_or(host);
            format!("{}://{}", scheme, host)
        }
        None => "<invalid>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_scheme() {
        let store = connect("memory://", &StoreSettings::default()).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert_eq!(store.get_or_create().await.unwrap(), CounterRecord::initial());
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_scheme() {
        let result = connect("mongodb://user:secret@db:27017/app", &StoreSettings::default()).await;
        match result {
            Err(StoreError::UnsupportedUrl(url)) => assert_eq!(url, "mongodb://db:27017"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected unsupported scheme"),
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_missing_scheme() {
        let result = connect("localhost:6379", &StoreSettings::default()).await;
        assert!(matches!(result, Err(StoreError::UnsupportedUrl(_))));
    }

    #[test]
    fn test_redact_hides_credentials() {
        assert_eq!(redact("redis://:hunter2@cache:6379/0"), "redis://cache:6379");
        assert_eq!(redact("redis://localhost"), "redis://localhost");
        assert_eq!(redact("nonsense"), "<invalid>");
    }
}
