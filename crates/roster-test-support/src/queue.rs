//! Test queues: in-memory `MessageQueue` implementations for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use roster_core::queue::{MessageQueue, QueueError, QueueMessage, ReceiptHandle, ReceiveOptions};
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: Vec<u8>,
    receive_count: u32,
    visible_at: Instant,
    receipt: Option<String>,
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<StoredMessage>,
    archived: Vec<StoredMessage>,
    deleted: Vec<String>,
    next_message_id: u64,
    next_receipt: u64,
    receive_calls: usize,
}

impl QueueState {
    fn take_visible(&mut self, now: Instant, options: &ReceiveOptions) -> Vec<QueueMessage> {
        let limit = options.max_messages as usize;
        let mut batch = Vec::new();
        for stored in &mut self.messages {
            if batch.len() == limit {
                break;
            }
            if stored.visible_at > now {
                continue;
            }
            self.next_receipt += 1;
            let receipt = format!("receipt-{}", self.next_receipt);
            stored.receive_count += 1;
            stored.visible_at = now + options.visibility_timeout;
            stored.receipt = Some(receipt.clone());
            batch.push(QueueMessage {
                message_id: stored.message_id.clone(),
                body: stored.body.clone(),
                receipt: ReceiptHandle::new(receipt),
                receive_count: stored.receive_count,
            });
        }
        batch
    }

    fn next_visible_at(&self) -> Option<Instant> {
        self.messages.iter().map(|stored| stored.visible_at).min()
    }

    fn remove_live(&mut self, receipt: &ReceiptHandle, now: Instant) -> Option<StoredMessage> {
        let position = self.messages.iter().position(|stored| {
            stored.receipt.as_deref() == Some(receipt.as_str()) && stored.visible_at > now
        })?;
        self.messages.remove(position)
    }
}

/// A queue with real visibility-timeout semantics, held in memory.
///
/// Received messages stay hidden for the requested visibility timeout and
/// reappear with a new receipt if not deleted in time. Receives long-poll up
/// to the requested wait. Time is `tokio::time`, so paused-clock tests work.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    arrivals: Notify,
}

impl InMemoryQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages not yet deleted or archived, hidden ones included.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    /// Returns `true` if every message has been deleted or archived.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Message ids acknowledged through `delete`, in deletion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// Bodies moved to quarantine through `archive`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn archived_bodies(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .archived
            .iter()
            .map(|stored| stored.body.clone())
            .collect()
    }

    /// Bodies still in the queue, in send order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn pending_bodies(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .map(|stored| stored.body.clone())
            .collect()
    }

    /// Number of `receive` calls served.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn receive_calls(&self) -> usize {
        self.state.lock().unwrap().receive_calls
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn send(&self, body: &[u8]) -> Result<String, QueueError> {
        let message_id = {
            let mut state = self.state.lock().unwrap();
            state.next_message_id += 1;
            let message_id = format!("msg-{}", state.next_message_id);
            state.messages.push_back(StoredMessage {
                message_id: message_id.clone(),
                body: body.to_vec(),
                receive_count: 0,
                visible_at: Instant::now(),
                receipt: None,
            });
            message_id
        };
        self.arrivals.notify_waiters();
        Ok(message_id)
    }

    async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, QueueError> {
        let deadline = Instant::now() + options.wait_time;
        self.state.lock().unwrap().receive_calls += 1;

        loop {
            let arrival = self.arrivals.notified();
            tokio::pin!(arrival);
            arrival.as_mut().enable();

            let wake_at = {
                let now = Instant::now();
                let mut state = self.state.lock().unwrap();
                let batch = state.take_visible(now, options);
                if !batch.is_empty() || now >= deadline {
                    return Ok(batch);
                }
                state
                    .next_visible_at()
                    .map_or(deadline, |visible_at| visible_at.min(deadline))
            };

            tokio::select! {
                () = &mut arrival => {}
                () = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        let removed = state
            .remove_live(receipt, Instant::now())
            .ok_or_else(|| QueueError::InvalidReceipt(receipt.clone()))?;
        state.deleted.push(removed.message_id);
        Ok(())
    }

    async fn archive(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        let removed = state
            .remove_live(receipt, Instant::now())
            .ok_or_else(|| QueueError::InvalidReceipt(receipt.clone()))?;
        state.archived.push(removed);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Faults {
    receive_failures: usize,
    delete_failures: usize,
    send_failures: usize,
    receive_attempts: usize,
}

/// Wraps another queue and fails a configured number of calls per operation
/// before delegating. Counts every receive attempt, failed ones included.
pub struct FaultyQueue {
    inner: Arc<dyn MessageQueue>,
    faults: Mutex<Faults>,
}

impl FaultyQueue {
    /// Wrap `inner` with no faults configured.
    #[must_use]
    pub fn new(inner: Arc<dyn MessageQueue>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
        }
    }

    /// Fail the next `count` receives with `QueueError::Unavailable`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn failing_receives(self, count: usize) -> Self {
        self.faults.lock().unwrap().receive_failures = count;
        self
    }

    /// Fail the next `count` deletes with `QueueError::Unavailable`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn failing_deletes(self, count: usize) -> Self {
        self.faults.lock().unwrap().delete_failures = count;
        self
    }

    /// Fail the next `count` sends with `QueueError::Unavailable`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn failing_sends(self, count: usize) -> Self {
        self.faults.lock().unwrap().send_failures = count;
        self
    }

    /// Number of receive calls made, including injected failures.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn receive_attempts(&self) -> usize {
        self.faults.lock().unwrap().receive_attempts
    }

    fn consume(counter: &mut usize) -> bool {
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        true
    }
}

#[async_trait]
impl MessageQueue for FaultyQueue {
    async fn send(&self, body: &[u8]) -> Result<String, QueueError> {
        let fail = Self::consume(&mut self.faults.lock().unwrap().send_failures);
        if fail {
            return Err(QueueError::Unavailable("send throttled".into()));
        }
        self.inner.send(body).await
    }

    async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, QueueError> {
        let fail = {
            let mut faults = self.faults.lock().unwrap();
            faults.receive_attempts += 1;
            Self::consume(&mut faults.receive_failures)
        };
        if fail {
            return Err(QueueError::Unavailable("queue endpoint unreachable".into()));
        }
        self.inner.receive(options).await
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let fail = Self::consume(&mut self.faults.lock().unwrap().delete_failures);
        if fail {
            return Err(QueueError::Unavailable("delete timed out".into()));
        }
        self.inner.delete(receipt).await
    }

    async fn archive(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.inner.archive(receipt).await
    }
}
