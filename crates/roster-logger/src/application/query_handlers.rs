//! Query handlers for the logger context.

use roster_core::error::DomainError;
use roster_core::log_entry::LogEntry;
use roster_core::log_store::LogStore;
use serde::Deserialize;

/// Filters for listing log entries. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    /// Only entries with this event type.
    pub event_type: Option<String>,
    /// Only entries about this employee.
    pub subject_id: Option<String>,
    /// Keep at most this many of the most recent matches.
    pub limit: Option<usize>,
}

/// Lists stored log entries, oldest first, narrowed by `query`.
///
/// Duplicates from redelivered events are returned as-is.
///
/// # Errors
///
/// Returns the store's error if listing fails.
pub async fn list_log_entries(
    query: &LogQuery,
    store: &dyn LogStore,
) -> Result<Vec<LogEntry>, DomainError> {
    let mut entries: Vec<LogEntry> = store
        .list()
        .await?
        .into_iter()
        .filter(|entry| {
            query
                .event_type
                .as_deref()
                .is_none_or(|event_type| entry.event_type == event_type)
        })
        .filter(|entry| {
            query
                .subject_id
                .as_deref()
                .is_none_or(|subject_id| entry.subject_id == subject_id)
        })
        .collect();

    if let Some(limit) = query.limit {
        let excess = entries.len().saturating_sub(limit);
        entries.drain(..excess);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use roster_test_support::{FailingLogStore, RecordingLogStore};
    use uuid::Uuid;

    use super::*;

    fn entry(n: u128, event_type: &str, subject_id: &str) -> LogEntry {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
            + Duration::seconds(i64::try_from(n).unwrap());
        LogEntry {
            id: Uuid::from_u128(n),
            event_type: event_type.to_owned(),
            subject_id: subject_id.to_owned(),
            name: "Ada".to_owned(),
            email: "ada@x.io".to_owned(),
            event_timestamp: at,
            processed_at: at,
        }
    }

    async fn seeded_store() -> RecordingLogStore {
        let store = RecordingLogStore::new();
        for entry in [
            entry(1, "employee.created", "e1"),
            entry(2, "employee.created", "e2"),
            entry(3, "employee.updated", "e1"),
            entry(4, "employee.created", "e1"),
        ] {
            store.put(&entry).await.unwrap();
        }
        store
    }

    fn ids(entries: &[LogEntry]) -> Vec<Uuid> {
        entries.iter().map(|entry| entry.id).collect()
    }

    #[tokio::test]
    async fn test_list_log_entries_without_filters_returns_everything_in_order() {
        let store = seeded_store().await;

        let entries = list_log_entries(&LogQuery::default(), &store).await.unwrap();

        assert_eq!(
            ids(&entries),
            (1..=4).map(Uuid::from_u128).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_list_log_entries_filters_by_event_type_and_subject() {
        let store = seeded_store().await;
        let query = LogQuery {
            event_type: Some("employee.created".to_owned()),
            subject_id: Some("e1".to_owned()),
            limit: None,
        };

        let entries = list_log_entries(&query, &store).await.unwrap();

        assert_eq!(ids(&entries), vec![Uuid::from_u128(1), Uuid::from_u128(4)]);
    }

    #[tokio::test]
    async fn test_list_log_entries_limit_keeps_most_recent() {
        let store = seeded_store().await;
        let query = LogQuery {
            limit: Some(2),
            ..LogQuery::default()
        };

        let entries = list_log_entries(&query, &store).await.unwrap();

        assert_eq!(ids(&entries), vec![Uuid::from_u128(3), Uuid::from_u128(4)]);
    }

    #[tokio::test]
    async fn test_list_log_entries_propagates_store_failure() {
        let result = list_log_entries(&LogQuery::default(), &FailingLogStore).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
