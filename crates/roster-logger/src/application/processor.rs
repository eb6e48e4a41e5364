//! Log-entry processor: the consumer's callback into the log store.

use std::sync::Arc;

use async_trait::async_trait;
use roster_core::clock::Clock;
use roster_core::error::DomainError;
use roster_core::event::EmployeeEvent;
use roster_core::id::IdGenerator;
use roster_core::log_entry::LogEntry;
use roster_core::log_store::LogStore;
use tracing::{info, warn};

use crate::domain::ports::EventProcessor;

/// Persists one [`LogEntry`] per processed event.
///
/// Each call assigns a fresh id, so a redelivered event produces a second
/// entry rather than overwriting the first.
#[derive(Clone)]
pub struct LogEntryProcessor {
    store: Arc<dyn LogStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl LogEntryProcessor {
    /// Creates a processor writing to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LogStore>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, clock, ids }
    }
}

#[async_trait]
impl EventProcessor for LogEntryProcessor {
    async fn process(&self, event: &EmployeeEvent) -> Result<(), DomainError> {
        let processed_at = self.clock.now();
        if event.occurred_at().is_none() {
            warn!(
                event_type = event.event_type(),
                timestamp = event.occurred_at_raw(),
                "unparseable event timestamp; using processing time"
            );
        }

        let entry = LogEntry::from_event(self.ids.next_id(), event, processed_at);
        self.store.put(&entry).await?;

        info!(
            log_entry_id = %entry.id,
            event_type = %entry.event_type,
            employee_id = %entry.subject_id,
            name = %entry.name,
            email = %entry.email,
            event_timestamp = %entry.event_timestamp,
            processed_at = %entry.processed_at,
            "event received"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use roster_test_support::{FailingLogStore, FixedClock, RecordingLogStore, SequenceIds};
    use uuid::Uuid;

    use super::*;

    fn event(timestamp: &str) -> EmployeeEvent {
        let body = serde_json::json!({
            "event_type": "employee.created",
            "employee": {"id": "e1", "name": "Ada", "email": "ada@x.io", "created_at": ""},
            "timestamp": timestamp,
        });
        EmployeeEvent::from_json(&serde_json::to_vec(&body).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_process_persists_entry_with_fresh_id() {
        // Arrange
        let store = Arc::new(RecordingLogStore::new());
        let clock = FixedClock::default_instant();
        let processor = LogEntryProcessor::new(
            store.clone(),
            Arc::new(clock),
            Arc::new(SequenceIds::counting(1)),
        );

        // Act
        processor.process(&event("2024-01-01T00:00:00Z")).await.unwrap();

        // Assert
        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.id, Uuid::from_u128(1));
        assert_eq!(entry.event_type, "employee.created");
        assert_eq!(entry.subject_id, "e1");
        assert_eq!(
            entry.event_timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(entry.processed_at, clock.0);
    }

    #[tokio::test]
    async fn test_process_same_event_twice_yields_two_entries() {
        let store = Arc::new(RecordingLogStore::new());
        let processor = LogEntryProcessor::new(
            store.clone(),
            Arc::new(FixedClock::default_instant()),
            Arc::new(SequenceIds::counting(2)),
        );
        let event = event("2024-01-01T00:00:00Z");

        processor.process(&event).await.unwrap();
        processor.process(&event).await.unwrap();

        let ids: Vec<Uuid> = store.entries().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
    }

    #[tokio::test]
    async fn test_process_uses_processing_time_for_bad_timestamp() {
        let store = Arc::new(RecordingLogStore::new());
        let clock = FixedClock::default_instant();
        let processor = LogEntryProcessor::new(
            store.clone(),
            Arc::new(clock),
            Arc::new(SequenceIds::counting(1)),
        );

        processor.process(&event("last tuesday")).await.unwrap();

        assert_eq!(store.entries()[0].event_timestamp, clock.0);
    }

    #[tokio::test]
    async fn test_process_fails_when_store_write_fails() {
        let processor = LogEntryProcessor::new(
            Arc::new(FailingLogStore),
            Arc::new(FixedClock::default_instant()),
            Arc::new(SequenceIds::counting(1)),
        );

        let result = processor.process(&event("2024-01-01T00:00:00Z")).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
