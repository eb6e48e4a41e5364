//! Log records produced by the logger for each processed event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::EmployeeEvent;

/// Durable record of one successful processing of an [`EmployeeEvent`].
///
/// The id is assigned by the logger, not the producer, so every delivery of
/// the same event yields a distinct entry. Entries are never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Logger-assigned identifier.
    pub id: Uuid,
    /// Event type tag copied from the event.
    pub event_type: String,
    /// Employee identifier copied from the event subject.
    pub subject_id: String,
    /// Employee name copied from the event subject.
    pub name: String,
    /// Employee email copied from the event subject.
    pub email: String,
    /// When the event occurred, per its own timestamp.
    pub event_timestamp: DateTime<Utc>,
    /// When the logger persisted this entry.
    pub processed_at: DateTime<Utc>,
}

impl LogEntry {
    /// Derives an entry from an event.
    ///
    /// `event_timestamp` falls back to `processed_at` when the event's
    /// timestamp does not parse.
    #[must_use]
    pub fn from_event(id: Uuid, event: &EmployeeEvent, processed_at: DateTime<Utc>) -> Self {
        let subject = event.subject();
        Self {
            id,
            event_type: event.event_type().to_owned(),
            subject_id: subject.id.clone(),
            name: subject.name.clone(),
            email: subject.email.clone(),
            event_timestamp: event.occurred_at_or(processed_at),
            processed_at,
        }
    }
}
