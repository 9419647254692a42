//! Counter service: the read and increment operations exposed over HTTP.
//!
//! The service is stateless; the record lives in the store. Each operation is
//! a single atomic store call bounded by the configured store timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::instrument;

use crate::store::{CounterRecord, CounterStore, StoreError};

#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn CounterStore>,
    timeout_seconds: u64,
}

impl CounterService {
    pub fn new(store: Arc<dyn CounterStore>, timeout_seconds: u64) -> Self {
        Self {
            store,
            timeout_seconds,
        }
    }

    /// Name of the backing store, for logs
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Make sure the record exists before the first request arrives.
    #[instrument(name = "counter.initialize", skip(self), fields(backend = self.backend()))]
    pub async fn initialize(&self) -> Result<CounterRecord, StoreError> {
        let record = self.bounded(self.store.ensure_counter()).await?;
        tracing::info!(value = record.value, "Counter record ready");
        Ok(record)
    }

    /// Return the record, creating it with value 0 if it does not exist yet.
    pub async fn get_or_create_counter(&self) -> Result<CounterRecord, StoreError> {
        self.bounded(self.store.get_or_create()).await
    }

    #[instrument(name = "counter.read", skip(self))]
    pub async fn read_counter(&self) -> Result<i64, StoreError> {
        let record = self.get_or_create_counter().await?;
        tracing::debug!(value = record.value, "Read counter");
        Ok(record.value)
    }

    /// Add one and return the new value. Each call increments; retries double-count.
    #[instrument(name = "counter.increment", skip(self))]
    pub async fn increment_counter(&self) -> Result<i64, StoreError> {
        let record = self.bounded(self.store.increment()).await?;
        tracing::debug!(value = record.value, "Incremented counter");
        Ok(record.value)
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        timeout(Duration::from_secs(self.timeout_seconds), operation)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout_seconds))?
    }
}
