//! In-process counter store backed by a single writer task.
//!
//! One task owns the record slot and drains commands from a bounded queue one
//! at a time, answering over oneshot channels. Because only that task touches
//! the slot, every command is linearizable and concurrent increments cannot
//! be lost.

use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::config::MEMORY_STORE_QUEUE_CAPACITY;

use super::{CounterRecord, CounterStore, StoreError};

/// Commands processed by the writer task
enum StoreCommand {
    /// Create the record if absent
    Ensure {
        response: oneshot::Sender<CounterRecord>,
    },
    /// Read the record, creating it if absent
    GetOrCreate {
        response: oneshot::Sender<CounterRecord>,
    },
    /// Add one to the record, creating it if absent
    Increment {
        response: oneshot::Sender<CounterRecord>,
    },
    /// Observe the slot without creating anything
    Peek {
        response: oneshot::Sender<Option<CounterRecord>>,
    },
}

/// Handle to the writer task. Clones share the same record.
#[derive(Clone)]
pub struct MemoryStore {
    tx: Sender<StoreCommand>,
}

impl MemoryStore {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = async_channel::bounded(MEMORY_STORE_QUEUE_CAPACITY);
        tokio::spawn(run_writer(rx));
        Self { tx }
    }

    /// Current slot contents, without the create-on-read side effect.
    pub async fn peek(&self) -> Result<Option<CounterRecord>, StoreError> {
        let (response, rx) = oneshot::channel();
        self.send(StoreCommand::Peek { response }).await?;
        rx.await.map_err(|_| StoreError::WorkerStopped)
    }

    async fn send(&self, command: StoreCommand) -> Result<(), StoreError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| StoreError::WorkerStopped)
    }

    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<CounterRecord>) -> StoreCommand,
    ) -> Result<CounterRecord, StoreError> {
        let (response, rx) = oneshot::channel();
        self.send(build(response)).await?;
        rx.await.map_err(|_| StoreError::WorkerStopped)
    }
}

async fn run_writer(rx: Receiver<StoreCommand>) {
    let mut slot: Option<CounterRecord> = None;

    while let Ok(command) = rx.recv().await {
        match command {
            StoreCommand::Ensure { response } | StoreCommand::GetOrCreate { response } => {
                let record = *slot.get_or_insert_with(|| {
                    tracing::debug!("Created counter record");
                    CounterRecord::initial()
                });
                let _ = response.send(record);
            }
            StoreCommand::Increment { response } => {
                let record = slot.get_or_insert_with(CounterRecord::initial);
                record.value += 1;
                let _ = response.send(*record);
            }
            StoreCommand::Peek { response } => {
                let _ = response.send(slot);
            }
        }
    }

    tracing::debug!("Memory store writer stopped");
}

#[async_trait]
impl CounterStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ensure_counter(&self) -> Result<CounterRecord, StoreError> {
        self.request(|response| StoreCommand::Ensure { response }).await
    }

    async fn get_or_create(&self) -> Result<CounterRecord, StoreError> {
        self.request(|response| StoreCommand::GetOrCreate { response })
            .await
    }

    async fn increment(&self) -> Result<CounterRecord, StoreError> {
        self.request(|response| StoreCommand::Increment { response })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_read_creates_single_record_at_zero() {
        let store = MemoryStore::spawn();
        assert_eq!(store.peek().await.unwrap(), None);

        let record = store.get_or_create().await.unwrap();
        assert_eq!(record.value, 0);
        assert_eq!(store.peek().await.unwrap(), Some(CounterRecord { value: 0 }));
    }

    #[tokio::test]
    async fn test_reads_do_not_mutate() {
        let store = MemoryStore::spawn();
        store.increment().await.unwrap();

        for _ in 0..5 {
            assert_eq!(store.get_or_create().await.unwrap().value, 1);
        }
    }

    #[tokio::test]
    async fn test_ensure_keeps_existing_value() {
        let store = MemoryStore::spawn();
        store.increment().await.unwrap();
        store.increment().await.unwrap();

        assert_eq!(store.ensure_counter().await.unwrap().value, 2);
        assert_eq!(store.get_or_create().await.unwrap().value, 2);
    }

    #[tokio::test]
    async fn test_increment_on_absent_record_starts_from_zero() {
        let store = MemoryStore::spawn();
        assert_eq!(store.increment().await.unwrap().value, 1);
    }

    #[tokio::test]
    async fn test_sequential_increments_are_consecutive() {
        let store = MemoryStore::spawn();
        let mut values = Vec::new();
        for _ in 0..10 {
            values.push(store.increment().await.unwrap().value);
        }
        assert_eq!(values, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = MemoryStore::spawn();
        let tasks: Vec<_> = (0..200)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment().await.unwrap().value })
            })
            .collect();

        let mut values = Vec::new();
        for task in tasks {
            values.push(task.await.unwrap());
        }
        values.sort_unstable();

        assert_eq!(values, (1..=200).collect::<Vec<_>>());
        assert_eq!(store.get_or_create().await.unwrap().value, 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_reads_create_one_record() {
        let store = MemoryStore::spawn();
        let reads = futures::future::join_all((0..50).map(|_| store.get_or_create())).await;

        assert!(reads.iter().all(|r| matches!(r, Ok(CounterRecord { value: 0 }))));
        assert_eq!(store.peek().await.unwrap(), Some(CounterRecord::initial()));
    }
}
