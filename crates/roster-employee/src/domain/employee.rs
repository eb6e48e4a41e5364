//! The employee entity.

use chrono::{DateTime, Utc};
use roster_core::clock::{Clock, format_wire_timestamp};
use roster_core::error::DomainError;
use roster_core::event::EmployeeSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Builds a new employee stamped with the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name or email is blank.
    pub fn register(
        id: Uuid,
        name: impl Into<String>,
        email: impl Into<String>,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let employee = Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at: clock.now(),
        };
        employee.validate()?;
        Ok(employee)
    }

    /// Checks the invariants of a registered employee.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name or email is blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("invalid employee name".into()));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::Validation("invalid employee email".into()));
        }
        Ok(())
    }

    /// Public attributes carried by events about this employee.
    #[must_use]
    pub fn snapshot(&self) -> EmployeeSnapshot {
        EmployeeSnapshot {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: format_wire_timestamp(self.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use roster_test_support::FixedClock;

    use super::*;

    #[test]
    fn test_register_stamps_created_at_from_clock() {
        let clock = FixedClock::default_instant();
        let id = Uuid::new_v4();

        let employee = Employee::register(id, "Ada", "ada@x.io", &clock).unwrap();

        assert_eq!(employee.id, id);
        assert_eq!(employee.created_at, clock.0);
    }

    #[test]
    fn test_register_rejects_blank_name() {
        let clock = FixedClock::default_instant();

        let result = Employee::register(Uuid::new_v4(), " ", "ada@x.io", &clock);

        match result {
            Err(DomainError::Validation(msg)) => assert_eq!(msg, "invalid employee name"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_formats_id_and_created_at_as_text() {
        let id = Uuid::from_u128(7);
        let employee =
            Employee::register(id, "Ada", "ada@x.io", &FixedClock::default_instant()).unwrap();

        let snapshot = employee.snapshot();

        assert_eq!(snapshot.id, id.to_string());
        assert_eq!(snapshot.created_at, "2026-01-15T10:00:00Z");
    }
}
