//! Shared test helpers for service HTTP tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use roster_core::error::DomainError;
use roster_core::log_store::LogStore;
use roster_core::queue::MessageQueue;
use roster_employee::application::publisher::QueueEventPublisher;
use roster_employee::domain::employee::Employee;
use roster_employee::domain::ports::EmployeeRepository;
use roster_test_support::{FixedClock, InMemoryQueue, RecordingLogStore, SequenceIds};
use tower::ServiceExt;

use roster_service::app;
use roster_service::state::AppState;

pub const QUEUE_NAME: &str = "employee-events";

/// Employee repository that keeps saved rows in memory.
#[derive(Default)]
pub struct RecordingEmployeeRepository {
    saved: Mutex<Vec<Employee>>,
}

impl RecordingEmployeeRepository {
    pub fn saved(&self) -> Vec<Employee> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmployeeRepository for RecordingEmployeeRepository {
    async fn save(&self, employee: &Employee) -> Result<(), DomainError> {
        self.saved.lock().unwrap().push(employee.clone());
        Ok(())
    }
}

/// Everything a test may want to inspect after driving the router.
pub struct TestApp {
    pub router: Router,
    pub log_store: Arc<RecordingLogStore>,
    pub queue: Arc<InMemoryQueue>,
    pub employees: Arc<RecordingEmployeeRepository>,
}

/// Build the full app router over in-memory adapters and a fixed clock.
/// Uses the same route structure as `main.rs`.
pub fn build_test_app() -> TestApp {
    build_test_app_with_queue(Arc::new(InMemoryQueue::new()))
}

/// Same as [`build_test_app`] but publishing through `queue_port`, which may
/// wrap the returned in-memory queue.
pub fn build_test_app_over(queue: Arc<InMemoryQueue>, queue_port: Arc<dyn MessageQueue>) -> TestApp {
    let clock = Arc::new(FixedClock::default_instant());
    let log_store = Arc::new(RecordingLogStore::new());
    let employees = Arc::new(RecordingEmployeeRepository::default());
    let state = AppState::new(
        QUEUE_NAME,
        clock.clone(),
        Arc::new(SequenceIds::counting(16)),
        log_store.clone(),
        employees.clone(),
        Arc::new(QueueEventPublisher::new(queue_port, clock)),
    );

    TestApp {
        router: app::router(state),
        log_store,
        queue,
        employees,
    }
}

fn build_test_app_with_queue(queue: Arc<InMemoryQueue>) -> TestApp {
    let port: Arc<dyn MessageQueue> = queue.clone();
    build_test_app_over(queue, port)
}

/// Seed the log store with entries.
pub async fn seed_logs(store: &dyn LogStore, entries: &[roster_core::log_entry::LogEntry]) {
    for entry in entries {
        store.put(entry).await.unwrap();
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
