//! Shared application state.

use std::sync::Arc;

use roster_core::clock::Clock;
use roster_core::id::IdGenerator;
use roster_core::log_store::LogStore;
use roster_employee::domain::ports::{EmployeeRepository, EventPublisher};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Queue the consumers drain and employee events go to.
    pub queue_name: Arc<str>,
    /// Clock used to stamp new employees.
    pub clock: Arc<dyn Clock>,
    /// Id source for new employees.
    pub ids: Arc<dyn IdGenerator>,
    /// Where processed log entries are read from.
    pub log_store: Arc<dyn LogStore>,
    /// Employee persistence.
    pub employee_repository: Arc<dyn EmployeeRepository>,
    /// Publishes employee events onto the queue.
    pub event_publisher: Arc<dyn EventPublisher>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        queue_name: impl Into<Arc<str>>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        log_store: Arc<dyn LogStore>,
        employee_repository: Arc<dyn EmployeeRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            queue_name: queue_name.into(),
            clock,
            ids,
            log_store,
            employee_repository,
            event_publisher,
        }
    }
}
