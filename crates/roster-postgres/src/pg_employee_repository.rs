//! `PostgreSQL` implementation of the `EmployeeRepository` trait.

use async_trait::async_trait;
use roster_core::error::DomainError;
use roster_employee::domain::employee::Employee;
use roster_employee::domain::ports::EmployeeRepository;
use sqlx::PgPool;

/// PostgreSQL-backed employee repository.
#[derive(Debug, Clone)]
pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    /// Creates a new `PgEmployeeRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn save(&self, employee: &Employee) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO employees (id, name, email, created_at) VALUES ($1, $2, $3, $4)")
            .bind(employee.id)
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(employee.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Infrastructure(format!("failed to save employee: {e}")))?;
        Ok(())
    }
}
