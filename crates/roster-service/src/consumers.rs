//! Spawns and joins the consumer loops.

use std::sync::Arc;

use roster_core::queue::MessageQueue;
use roster_logger::application::consumer::{ConsumerReport, EventConsumer};
use roster_logger::domain::ports::EventProcessor;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServiceConfig;

/// Running consumer loops sharing one shutdown token.
pub struct ConsumerPool {
    tasks: JoinSet<ConsumerReport>,
}

impl ConsumerPool {
    /// Starts `config.consumer_instances` independent loops over the same
    /// queue and processor. Each loop handles its batches sequentially.
    #[must_use]
    pub fn spawn(
        config: &ServiceConfig,
        queue: &Arc<dyn MessageQueue>,
        processor: &Arc<dyn EventProcessor>,
        shutdown: &CancellationToken,
    ) -> Self {
        let mut tasks = JoinSet::new();
        for instance in 0..config.consumer_instances {
            let consumer = EventConsumer::with_config(
                Arc::clone(queue),
                Arc::clone(processor),
                config.consumer_config(instance),
            );
            let shutdown = shutdown.clone();
            tasks.spawn(async move { consumer.run(&shutdown).await });
        }
        info!(instances = config.consumer_instances, queue = %config.queue_name, "consumers started");
        Self { tasks }
    }

    /// Waits for every loop to stop and sums their reports.
    pub async fn join(mut self) -> ConsumerReport {
        let mut total = ConsumerReport::default();
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(report) => total.absorb(&report),
                Err(err) => error!(error = %err, "consumer task failed"),
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use roster_core::clock::Clock;
    use roster_core::event::{EmployeeEvent, EmployeeSnapshot};
    use roster_core::log_store::LogStore;
    use roster_logger::application::processor::LogEntryProcessor;
    use roster_test_support::{FixedClock, InMemoryQueue, RecordingLogStore, SequenceIds};

    use super::*;

    fn test_config(instances: usize) -> ServiceConfig {
        let mut config = ServiceConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/roster".to_owned()),
            "QUEUE_NAME" => Some("employee-events".to_owned()),
            _ => None,
        })
        .unwrap();
        config.consumer_instances = instances;
        config.wait_time = Duration::from_millis(20);
        config.backoff = Duration::from_millis(10);
        config
    }

    fn event_body(id: &str, clock: &dyn Clock) -> Vec<u8> {
        EmployeeEvent::employee_created(
            EmployeeSnapshot {
                id: id.to_owned(),
                name: "Ada".to_owned(),
                email: "ada@x.io".to_owned(),
                created_at: String::new(),
            },
            clock,
        )
        .unwrap()
        .to_json()
        .unwrap()
    }

    #[tokio::test]
    async fn test_pool_drains_queue_and_reports_on_shutdown() {
        // Arrange
        let clock = Arc::new(FixedClock::default_instant());
        let queue = Arc::new(InMemoryQueue::new());
        for n in 0..6 {
            queue.send(&event_body(&format!("e{n}"), clock.as_ref())).await.unwrap();
        }
        let store = Arc::new(RecordingLogStore::new());
        let processor: Arc<dyn EventProcessor> = Arc::new(LogEntryProcessor::new(
            store.clone(),
            clock,
            Arc::new(SequenceIds::counting(6)),
        ));
        let queue_port: Arc<dyn MessageQueue> = queue.clone();
        let shutdown = CancellationToken::new();

        // Act
        let pool = ConsumerPool::spawn(&test_config(2), &queue_port, &processor, &shutdown);
        for _ in 0..100 {
            if store.list().await.unwrap().len() == 6 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        shutdown.cancel();
        let report = pool.join().await;

        // Assert
        assert_eq!(store.list().await.unwrap().len(), 6);
        assert_eq!(report.received, 6);
        assert_eq!(report.acknowledged, 6);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pool_with_cancelled_token_returns_empty_report() {
        let queue: Arc<dyn MessageQueue> = Arc::new(InMemoryQueue::new());
        let processor: Arc<dyn EventProcessor> = Arc::new(LogEntryProcessor::new(
            Arc::new(RecordingLogStore::new()),
            Arc::new(FixedClock::default_instant()),
            Arc::new(SequenceIds::counting(1)),
        ));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let report = ConsumerPool::spawn(&test_config(3), &queue, &processor, &shutdown)
            .join()
            .await;

        assert_eq!(report, ConsumerReport::default());
    }
}
