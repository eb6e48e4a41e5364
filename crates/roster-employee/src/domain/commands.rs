//! Commands for the employee context.

use uuid::Uuid;

/// Command to register a new employee.
#[derive(Debug, Clone)]
pub struct CreateEmployee {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The employee's display name.
    pub name: String,
    /// The employee's contact email.
    pub email: String,
}
