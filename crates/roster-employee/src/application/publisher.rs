//! Queue-backed event publisher.

use std::sync::Arc;

use async_trait::async_trait;
use roster_core::clock::Clock;
use roster_core::error::DomainError;
use roster_core::event::{EmployeeEvent, EmployeeSnapshot};
use roster_core::queue::MessageQueue;
use tracing::{error, info};

use crate::domain::ports::EventPublisher;

/// Publishes employee events by appending them to a durable queue.
///
/// Performs no retries: a queue failure is handed back to the caller as-is,
/// since the triggering write may need compensating action.
#[derive(Clone)]
pub struct QueueEventPublisher {
    queue: Arc<dyn MessageQueue>,
    clock: Arc<dyn Clock>,
}

impl QueueEventPublisher {
    /// Creates a publisher for `queue`, stamping events with `clock`.
    #[must_use]
    pub fn new(queue: Arc<dyn MessageQueue>, clock: Arc<dyn Clock>) -> Self {
        Self { queue, clock }
    }

    /// Validates, encodes and enqueues one event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` before anything is sent if the event
    /// is incomplete, or `DomainError::Queue` carrying the queue's own error.
    pub async fn publish(
        &self,
        event_type: &str,
        subject: EmployeeSnapshot,
    ) -> Result<EmployeeEvent, DomainError> {
        let event = EmployeeEvent::new(event_type, subject, self.clock.as_ref())?;
        let body = event.to_json()?;

        match self.queue.send(&body).await {
            Ok(message_id) => {
                info!(
                    event_type = event.event_type(),
                    employee_id = %event.subject().id,
                    message_id = %message_id,
                    "event published"
                );
                Ok(event)
            }
            Err(err) => {
                error!(event_type = event.event_type(), error = %err, "failed to publish event");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl EventPublisher for QueueEventPublisher {
    async fn publish_employee_created(
        &self,
        subject: EmployeeSnapshot,
    ) -> Result<EmployeeEvent, DomainError> {
        self.publish(roster_core::event::EMPLOYEE_CREATED, subject)
            .await
    }
}
