//! PostgreSQL adapters for the Roster ports.

pub mod pg_employee_repository;
pub mod pg_log_store;
pub mod pg_message_queue;
pub mod schema;
