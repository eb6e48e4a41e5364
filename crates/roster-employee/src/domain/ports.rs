//! Ports the employee context depends on.

use async_trait::async_trait;
use roster_core::error::DomainError;
use roster_core::event::{EmployeeEvent, EmployeeSnapshot};

use crate::domain::employee::Employee;

/// Persistence for employee records.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Stores a newly registered employee.
    async fn save(&self, employee: &Employee) -> Result<(), DomainError>;
}

/// Outbound channel for employee events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an `employee.created` event for `subject` and returns the
    /// event exactly as it was enqueued.
    async fn publish_employee_created(
        &self,
        subject: EmployeeSnapshot,
    ) -> Result<EmployeeEvent, DomainError>;
}
