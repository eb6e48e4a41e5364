//! Ports the logger context depends on.

use async_trait::async_trait;
use roster_core::error::DomainError;
use roster_core::event::EmployeeEvent;

/// Handles one decoded event on behalf of the consumer loop.
///
/// Returning `Ok` tells the consumer to acknowledge the delivery; returning
/// `Err` leaves it on the queue for redelivery. Implementations must tolerate
/// seeing the same event more than once.
#[async_trait]
pub trait EventProcessor: Send + Sync {
    /// Processes one event.
    async fn process(&self, event: &EmployeeEvent) -> Result<(), DomainError>;
}
