//! Event consumer loop.
//!
//! The consumer drives a sequential receive → process → acknowledge cycle
//! until its cancellation token fires:
//!
//! ```text
//! EventConsumer::run
//!     │
//!     ├─► shutdown requested? ──► stop, return ConsumerReport
//!     ├─► receive batch (long-poll, visibility timeout)
//!     │       └─► error: log, back off, next iteration
//!     └─► for each message, in receipt order
//!             ├─► decode EmployeeEvent   (malformed: leave for redelivery)
//!             ├─► EventProcessor::process (error: leave for redelivery)
//!             └─► delete via receipt      (error: log only)
//! ```
//!
//! Cancellation is observed between iterations: a receive already in
//! flight completes and its whole batch is processed before the loop stops.
//! The one exception is the backoff after a failed receive, which is cut
//! short when the token fires.
//! Retries come from the queue itself; the consumer keeps no retry state.

use std::sync::Arc;
use std::time::Duration;

use roster_core::event::EmployeeEvent;
use roster_core::queue::{MessageQueue, QueueError, QueueMessage, ReceiveOptions};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::ports::EventProcessor;

/// Configuration for an event consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Identifier used in logs to tell concurrent consumers apart.
    pub consumer_id: String,
    /// Batch size, long-poll wait and visibility timeout for each receive.
    pub receive: ReceiveOptions,
    /// Pause after a failed receive before trying again.
    pub backoff: Duration,
    /// Deliveries allowed before a message is quarantined. `None` disables
    /// quarantine, so undeliverable messages are retried indefinitely.
    pub max_receive_count: Option<u32>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            consumer_id: format!("consumer-{}", Uuid::new_v4()),
            receive: ReceiveOptions::default(),
            backoff: Duration::from_secs(5),
            max_receive_count: None,
        }
    }
}

impl ConsumerConfig {
    /// Create a default config with a specific consumer ID.
    pub fn with_consumer_id(consumer_id: impl Into<String>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            ..Default::default()
        }
    }
}

/// What happened to a single delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Processed and deleted from the queue.
    Acknowledged,
    /// Processed, but the delete failed; the queue may redeliver it.
    AcknowledgeFailed,
    /// The processor failed; left on the queue for redelivery.
    Rejected,
    /// The body is not an employee event; left on the queue.
    Malformed,
    /// Exceeded the delivery limit and moved to quarantine.
    Quarantined,
}

/// Counters accumulated over the lifetime of one `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    /// Loop iterations started (one receive attempt each).
    pub iterations: u64,
    /// Receive calls that failed.
    pub receive_failures: u64,
    /// Messages received across all batches.
    pub received: u64,
    /// Messages processed and deleted.
    pub acknowledged: u64,
    /// Messages processed whose delete failed.
    pub acknowledge_failures: u64,
    /// Messages the processor failed on.
    pub rejected: u64,
    /// Messages that did not decode.
    pub malformed: u64,
    /// Messages moved to quarantine.
    pub quarantined: u64,
}

impl ConsumerReport {
    /// Adds another loop's counters to this one.
    pub fn absorb(&mut self, other: &ConsumerReport) {
        self.iterations += other.iterations;
        self.receive_failures += other.receive_failures;
        self.received += other.received;
        self.acknowledged += other.acknowledged;
        self.acknowledge_failures += other.acknowledge_failures;
        self.rejected += other.rejected;
        self.malformed += other.malformed;
        self.quarantined += other.quarantined;
    }

    fn record(&mut self, outcomes: &[MessageOutcome]) {
        self.received += outcomes.len() as u64;
        for outcome in outcomes {
            let counter = match outcome {
                MessageOutcome::Acknowledged => &mut self.acknowledged,
                MessageOutcome::AcknowledgeFailed => &mut self.acknowledge_failures,
                MessageOutcome::Rejected => &mut self.rejected,
                MessageOutcome::Malformed => &mut self.malformed,
                MessageOutcome::Quarantined => &mut self.quarantined,
            };
            *counter += 1;
        }
    }
}

/// Drains a queue of employee events into an [`EventProcessor`].
///
/// One consumer is one sequential loop. Run several consumers, each with its
/// own queue client, for more throughput.
pub struct EventConsumer {
    queue: Arc<dyn MessageQueue>,
    processor: Arc<dyn EventProcessor>,
    config: ConsumerConfig,
}

impl EventConsumer {
    /// Create a consumer with the default configuration.
    pub fn new(queue: Arc<dyn MessageQueue>, processor: Arc<dyn EventProcessor>) -> Self {
        Self::with_config(queue, processor, ConsumerConfig::default())
    }

    /// Create a consumer with a custom configuration.
    pub fn with_config(
        queue: Arc<dyn MessageQueue>,
        processor: Arc<dyn EventProcessor>,
        config: ConsumerConfig,
    ) -> Self {
        Self {
            queue,
            processor,
            config,
        }
    }

    /// Returns the consumer's configuration.
    #[must_use]
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Runs the receive loop until `shutdown` is cancelled.
    ///
    /// Receive and processing errors never end the loop; the only way out is
    /// cancellation, which is checked before every receive.
    pub async fn run(&self, shutdown: &CancellationToken) -> ConsumerReport {
        info!(
            consumer_id = %self.config.consumer_id,
            batch_size = self.config.receive.max_messages,
            "event consumer starting"
        );

        let mut report = ConsumerReport::default();
        loop {
            if shutdown.is_cancelled() {
                break;
            }
            report.iterations += 1;

            match self.poll_once().await {
                Ok(outcomes) => report.record(&outcomes),
                Err(err) => {
                    report.receive_failures += 1;
                    error!(
                        consumer_id = %self.config.consumer_id,
                        error = %err,
                        backoff_ms = u64::try_from(self.config.backoff.as_millis()).unwrap_or(u64::MAX),
                        "failed to receive messages"
                    );

                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(self.config.backoff) => {}
                    }
                }
            }
        }

        info!(
            consumer_id = %self.config.consumer_id,
            iterations = report.iterations,
            acknowledged = report.acknowledged,
            "event consumer stopped"
        );
        report
    }

    /// Performs one receive and processes the returned batch in order.
    ///
    /// # Errors
    ///
    /// Returns the queue's error if the receive itself fails. Per-message
    /// failures are reported through the returned outcomes instead.
    pub async fn poll_once(&self) -> Result<Vec<MessageOutcome>, QueueError> {
        let messages = self.queue.receive(&self.config.receive).await?;
        if !messages.is_empty() {
            debug!(
                consumer_id = %self.config.consumer_id,
                count = messages.len(),
                "received batch"
            );
        }

        let mut outcomes = Vec::with_capacity(messages.len());
        for message in &messages {
            outcomes.push(self.handle_message(message).await);
        }
        Ok(outcomes)
    }

    async fn handle_message(&self, message: &QueueMessage) -> MessageOutcome {
        if self
            .config
            .max_receive_count
            .is_some_and(|limit| message.receive_count > limit)
        {
            return self.quarantine(message).await;
        }

        let event = match EmployeeEvent::from_json(&message.body) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    message_id = %message.message_id,
                    receive_count = message.receive_count,
                    error = %err,
                    "malformed message; leaving it for redelivery"
                );
                return MessageOutcome::Malformed;
            }
        };

        if let Err(err) = self.processor.process(&event).await {
            warn!(
                message_id = %message.message_id,
                event_type = event.event_type(),
                receive_count = message.receive_count,
                error = %err,
                "failed to process event; leaving it for redelivery"
            );
            return MessageOutcome::Rejected;
        }

        match self.queue.delete(&message.receipt).await {
            Ok(()) => {
                debug!(message_id = %message.message_id, "message acknowledged");
                MessageOutcome::Acknowledged
            }
            Err(err) => {
                error!(
                    message_id = %message.message_id,
                    receipt = %message.receipt,
                    error = %err,
                    "failed to delete processed message"
                );
                MessageOutcome::AcknowledgeFailed
            }
        }
    }

    async fn quarantine(&self, message: &QueueMessage) -> MessageOutcome {
        match self.queue.archive(&message.receipt).await {
            Ok(()) => {
                warn!(
                    message_id = %message.message_id,
                    receive_count = message.receive_count,
                    "delivery limit exceeded; message quarantined"
                );
                MessageOutcome::Quarantined
            }
            Err(err) => {
                error!(
                    message_id = %message.message_id,
                    error = %err,
                    "failed to quarantine message"
                );
                MessageOutcome::Rejected
            }
        }
    }
}
