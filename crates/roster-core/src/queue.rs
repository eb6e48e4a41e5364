//! Durable message queue port.
//!
//! Models a store-and-forward queue with visibility-timeout semantics: a
//! received message stays hidden for the visibility timeout and becomes
//! eligible for redelivery unless it is deleted with the receipt handle of
//! that delivery first.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of messages a single receive may request.
pub const MAX_BATCH_SIZE: u32 = 10;

/// Errors reported by a queue client.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue could not be reached or is throttling requests.
    #[error("queue unavailable: {0}")]
    Unavailable(String),

    /// The receipt handle does not belong to a live delivery (already deleted
    /// or its visibility window expired).
    #[error("invalid receipt handle: {0}")]
    InvalidReceipt(ReceiptHandle),

    /// The queue refused the request (malformed or oversized payload, bad
    /// parameters).
    #[error("queue rejected request: {0}")]
    Rejected(String),
}

/// Opaque token identifying one delivery of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    /// Wraps a queue-issued receipt token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One delivery of a queued message. Owned by the queue; consumers may only
/// acknowledge it through `receipt`.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Queue-assigned message identifier, stable across redeliveries.
    pub message_id: String,
    /// Serialized payload.
    pub body: Vec<u8>,
    /// Receipt for this delivery.
    pub receipt: ReceiptHandle,
    /// How many times the message has been delivered, including this one.
    pub receive_count: u32,
}

/// Parameters of a single receive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions {
    /// Upper bound on messages returned.
    pub max_messages: u32,
    /// How long to long-poll when no message is visible.
    pub wait_time: Duration,
    /// How long returned messages stay hidden from other receivers.
    pub visibility_timeout: Duration,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self {
            max_messages: MAX_BATCH_SIZE,
            wait_time: Duration::from_secs(20),
            visibility_timeout: Duration::from_secs(30),
        }
    }
}

/// Client for a durable queue.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Appends a message. Returns the queue-assigned message id once the
    /// queue has durably accepted it.
    async fn send(&self, body: &[u8]) -> Result<String, QueueError>;

    /// Receives up to `options.max_messages` visible messages, waiting up to
    /// `options.wait_time` for at least one to appear.
    async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, QueueError>;

    /// Acknowledges a delivery, removing the message permanently.
    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError>;

    /// Moves a delivered message out of the live queue into quarantine.
    async fn archive(&self, receipt: &ReceiptHandle) -> Result<(), QueueError>;
}
