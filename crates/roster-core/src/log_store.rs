//! Log store port.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::log_entry::LogEntry;

/// Durable store for log entries, keyed by `LogEntry::id`.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persists a new entry. Entries are insert-only.
    async fn put(&self, entry: &LogEntry) -> Result<(), DomainError>;

    /// Returns every stored entry, oldest `processed_at` first.
    async fn list(&self) -> Result<Vec<LogEntry>, DomainError>;
}
