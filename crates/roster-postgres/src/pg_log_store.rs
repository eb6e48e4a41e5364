//! `PostgreSQL` implementation of the `LogStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::error::DomainError;
use roster_core::log_entry::LogEntry;
use roster_core::log_store::LogStore;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct LogEntryRow {
    id: Uuid,
    event_type: String,
    subject_id: String,
    name: String,
    email: String,
    event_timestamp: DateTime<Utc>,
    processed_at: DateTime<Utc>,
}

impl From<LogEntryRow> for LogEntry {
    fn from(row: LogEntryRow) -> Self {
        Self {
            id: row.id,
            event_type: row.event_type,
            subject_id: row.subject_id,
            name: row.name,
            email: row.email,
            event_timestamp: row.event_timestamp,
            processed_at: row.processed_at,
        }
    }
}

/// PostgreSQL-backed log store.
#[derive(Debug, Clone)]
pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    /// Creates a new `PgLogStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn put(&self, entry: &LogEntry) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO log_entries \
             (id, event_type, subject_id, name, email, event_timestamp, processed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(&entry.event_type)
        .bind(&entry.subject_id)
        .bind(&entry.name)
        .bind(&entry.email)
        .bind(entry.event_timestamp)
        .bind(entry.processed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("failed to save log entry: {e}")))?;

        debug!(log_entry_id = %entry.id, "log entry saved");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LogEntry>, DomainError> {
        let rows: Vec<LogEntryRow> = sqlx::query_as(
            "SELECT id, event_type, subject_id, name, email, event_timestamp, processed_at \
             FROM log_entries ORDER BY processed_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("failed to list log entries: {e}")))?;

        Ok(rows.into_iter().map(LogEntry::from).collect())
    }
}
