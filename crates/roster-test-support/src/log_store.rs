//! Test log stores: mock `LogStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use roster_core::error::DomainError;
use roster_core::log_entry::LogEntry;
use roster_core::log_store::LogStore;

/// A log store that keeps every entry in memory and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingLogStore {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all stored entries, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogStore for RecordingLogStore {
    async fn put(&self, entry: &LogEntry) -> Result<(), DomainError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LogEntry>, DomainError> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by_key(|entry| entry.processed_at);
        Ok(entries)
    }
}

/// A log store that always returns an infrastructure error. Useful for
/// testing redelivery paths.
#[derive(Debug)]
pub struct FailingLogStore;

#[async_trait]
impl LogStore for FailingLogStore {
    async fn put(&self, _entry: &LogEntry) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list(&self) -> Result<Vec<LogEntry>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A log store that fails the first `failures` writes, then records like
/// [`RecordingLogStore`]. Counts every attempted write.
#[derive(Debug)]
pub struct FlakyLogStore {
    remaining_failures: Mutex<usize>,
    attempts: Mutex<usize>,
    inner: RecordingLogStore,
}

impl FlakyLogStore {
    /// Create a store that fails its first `failures` writes.
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            remaining_failures: Mutex::new(failures),
            attempts: Mutex::new(0),
            inner: RecordingLogStore::new(),
        }
    }

    /// Returns the entries that were successfully stored.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.entries()
    }

    /// Returns how many writes were attempted, failed ones included.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl LogStore for FlakyLogStore {
    async fn put(&self, entry: &LogEntry) -> Result<(), DomainError> {
        *self.attempts.lock().unwrap() += 1;
        {
            let mut remaining = self.remaining_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DomainError::Infrastructure("write throttled".into()));
            }
        }
        self.inner.put(entry).await
    }

    async fn list(&self) -> Result<Vec<LogEntry>, DomainError> {
        self.inner.list().await
    }
}
