//! Command handlers for the employee context.
//!
//! Each handler validates the command, performs the write, and only then
//! publishes the corresponding event.

use roster_core::clock::Clock;
use roster_core::error::DomainError;
use roster_core::id::IdGenerator;
use tracing::{info, instrument};

use crate::domain::commands::CreateEmployee;
use crate::domain::employee::Employee;
use crate::domain::ports::{EmployeeRepository, EventPublisher};

/// Handles the `CreateEmployee` command: registers the employee, persists
/// it, and publishes `employee.created`.
///
/// The event is only published after the write succeeds. If publishing fails
/// the employee stays persisted and the publish error is returned.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name or email (nothing is
/// written or sent), or the repository's or publisher's error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_create_employee(
    command: &CreateEmployee,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn EmployeeRepository,
    publisher: &dyn EventPublisher,
) -> Result<Employee, DomainError> {
    let employee = Employee::register(
        ids.next_id(),
        command.name.trim(),
        command.email.trim(),
        clock,
    )?;

    repo.save(&employee).await?;
    publisher.publish_employee_created(employee.snapshot()).await?;

    info!(employee_id = %employee.id, "employee created");
    Ok(employee)
}
