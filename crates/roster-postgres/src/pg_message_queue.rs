//! `PostgreSQL` implementation of the `MessageQueue` trait.
//!
//! Messages live in `queue_messages`. A receive claims visible rows with
//! `FOR UPDATE SKIP LOCKED`, assigns each a fresh receipt, bumps its delivery
//! count and pushes `visible_at` out by the visibility timeout. A receipt is
//! only honored while its row is still hidden, so a late delete cannot remove
//! a message that has since been redelivered.

use std::time::Duration;

use async_trait::async_trait;
use roster_core::queue::{
    MAX_BATCH_SIZE, MessageQueue, QueueError, QueueMessage, ReceiptHandle, ReceiveOptions,
};
use sqlx::PgPool;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const CLAIM_VISIBLE: &str = r"
UPDATE queue_messages AS m
SET visible_at = NOW() + make_interval(secs => $3),
    receive_count = m.receive_count + 1,
    receipt = gen_random_uuid()
WHERE m.message_id IN (
    SELECT message_id FROM queue_messages
    WHERE queue_name = $1 AND visible_at <= NOW()
    ORDER BY message_id
    LIMIT $2
    FOR UPDATE SKIP LOCKED
)
RETURNING m.message_id, m.body, m.receipt, m.receive_count
";

const DELETE_LIVE: &str = r"
DELETE FROM queue_messages
WHERE queue_name = $1 AND receipt = $2 AND visible_at > NOW()
";

const ARCHIVE_LIVE: &str = r"
WITH moved AS (
    DELETE FROM queue_messages
    WHERE queue_name = $1 AND receipt = $2 AND visible_at > NOW()
    RETURNING message_id, queue_name, body, enqueued_at, receive_count
)
INSERT INTO queue_messages_archive (message_id, queue_name, body, enqueued_at, receive_count)
SELECT message_id, queue_name, body, enqueued_at, receive_count FROM moved
";

#[derive(Debug, sqlx::FromRow)]
struct ClaimedRow {
    message_id: i64,
    body: Vec<u8>,
    receipt: Uuid,
    receive_count: i32,
}

impl From<ClaimedRow> for QueueMessage {
    fn from(row: ClaimedRow) -> Self {
        Self {
            message_id: row.message_id.to_string(),
            body: row.body,
            receipt: ReceiptHandle::new(row.receipt.to_string()),
            receive_count: u32::try_from(row.receive_count).unwrap_or(0),
        }
    }
}

fn unavailable(err: &sqlx::Error) -> QueueError {
    QueueError::Unavailable(err.to_string())
}

/// PostgreSQL-backed queue client bound to one named queue.
#[derive(Debug, Clone)]
pub struct PgMessageQueue {
    pool: PgPool,
    queue_name: String,
    poll_interval: Duration,
}

impl PgMessageQueue {
    /// Creates a client for `queue_name`.
    #[must_use]
    pub fn new(pool: PgPool, queue_name: impl Into<String>) -> Self {
        Self {
            pool,
            queue_name: queue_name.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets how often an empty long-poll re-checks for visible messages.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Returns the queue name this client is bound to.
    #[must_use]
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    async fn claim(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, QueueError> {
        let mut rows: Vec<ClaimedRow> = sqlx::query_as(CLAIM_VISIBLE)
            .bind(&self.queue_name)
            .bind(i64::from(options.max_messages))
            .bind(options.visibility_timeout.as_secs_f64())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable(&e))?;
        rows.sort_by_key(|row| row.message_id);
        Ok(rows.into_iter().map(QueueMessage::from).collect())
    }

    fn parse_receipt(receipt: &ReceiptHandle) -> Result<Uuid, QueueError> {
        Uuid::parse_str(receipt.as_str()).map_err(|_| QueueError::InvalidReceipt(receipt.clone()))
    }

    async fn remove_live(&self, sql: &str, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let token = Self::parse_receipt(receipt)?;
        let result = sqlx::query(sql)
            .bind(&self.queue_name)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable(&e))?;
        if result.rows_affected() == 0 {
            return Err(QueueError::InvalidReceipt(receipt.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageQueue for PgMessageQueue {
    async fn send(&self, body: &[u8]) -> Result<String, QueueError> {
        let message_id: i64 = sqlx::query_scalar(
            "INSERT INTO queue_messages (queue_name, body) VALUES ($1, $2) RETURNING message_id",
        )
        .bind(&self.queue_name)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unavailable(&e))?;

        debug!(queue = %self.queue_name, message_id, "message enqueued");
        Ok(message_id.to_string())
    }

    async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<QueueMessage>, QueueError> {
        if options.max_messages == 0 || options.max_messages > MAX_BATCH_SIZE {
            return Err(QueueError::Rejected(format!(
                "max_messages must be between 1 and {MAX_BATCH_SIZE}, got {}",
                options.max_messages
            )));
        }

        let deadline = Instant::now() + options.wait_time;
        loop {
            let batch = self.claim(options).await?;
            let now = Instant::now();
            if !batch.is_empty() || now >= deadline {
                return Ok(batch);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.remove_live(DELETE_LIVE, receipt).await
    }

    async fn archive(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.remove_live(ARCHIVE_LIVE, receipt).await
    }
}
