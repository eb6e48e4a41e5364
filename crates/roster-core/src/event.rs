//! Employee domain events and their wire format.
//!
//! The JSON shape produced here is the compatibility contract between the
//! employee service and the logger, which are deployed independently:
//!
//! ```json
//! {
//!   "event_type": "employee.created",
//!   "employee": { "id": "e1", "name": "Ada", "email": "ada@x.io", "created_at": "..." },
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, format_wire_timestamp, parse_wire_timestamp};
use crate::error::DomainError;

/// Event type tag for a newly created employee.
pub const EMPLOYEE_CREATED: &str = "employee.created";

/// Public attributes of an employee at the time an event was published.
/// Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    /// Employee identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Creation time of the employee record, in wire format.
    #[serde(default)]
    pub created_at: String,
}

impl EmployeeSnapshot {
    /// Checks that every attribute the logger copies is present.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first blank field.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [("id", &self.id), ("name", &self.name), ("email", &self.email)] {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "employee {field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// A fact about an employee that already happened. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeEvent {
    event_type: String,
    #[serde(rename = "employee", alias = "subject")]
    subject: EmployeeSnapshot,
    #[serde(rename = "timestamp")]
    occurred_at: String,
}

impl EmployeeEvent {
    /// Builds an event stamped with the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the event type is blank or the
    /// subject is missing required attributes.
    pub fn new(
        event_type: impl Into<String>,
        subject: EmployeeSnapshot,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let event_type = event_type.into();
        if event_type.trim().is_empty() {
            return Err(DomainError::Validation(
                "event type must not be empty".into(),
            ));
        }
        subject.validate()?;

        Ok(Self {
            event_type,
            subject,
            occurred_at: format_wire_timestamp(clock.now()),
        })
    }

    /// Builds an `employee.created` event.
    ///
    /// # Errors
    ///
    /// See [`EmployeeEvent::new`].
    pub fn employee_created(
        subject: EmployeeSnapshot,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        Self::new(EMPLOYEE_CREATED, subject, clock)
    }

    /// Decodes an event from a queue message body.
    ///
    /// Decoding is lenient about the timestamp: an unparseable `timestamp` is
    /// kept as text and resolved later by [`EmployeeEvent::occurred_at_or`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if the body is not an event object.
    pub fn from_json(body: &[u8]) -> Result<Self, DomainError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Encodes the event for the queue.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<Vec<u8>, DomainError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Returns the event type tag.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Returns the subject snapshot.
    #[must_use]
    pub fn subject(&self) -> &EmployeeSnapshot {
        &self.subject
    }

    /// Returns the raw occurrence timestamp as carried on the wire.
    #[must_use]
    pub fn occurred_at_raw(&self) -> &str {
        &self.occurred_at
    }

    /// Returns the parsed occurrence time, if it is valid RFC3339.
    #[must_use]
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        parse_wire_timestamp(&self.occurred_at).ok()
    }

    /// Returns the parsed occurrence time, or `fallback` when the wire value
    /// does not parse.
    #[must_use]
    pub fn occurred_at_or(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        self.occurred_at().unwrap_or(fallback)
    }
}
