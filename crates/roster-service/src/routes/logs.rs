//! Routes for reading processed log entries.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use roster_core::log_entry::LogEntry;
use roster_logger::application::query_handlers::{self, LogQuery};
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct LogListResponse {
    /// Number of entries returned.
    pub count: usize,
    /// Matching entries, oldest first.
    pub entries: Vec<LogEntry>,
}

/// GET /
#[instrument(skip(state))]
async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogListResponse>, ApiError> {
    let entries = query_handlers::list_log_entries(&query, state.log_store.as_ref()).await?;

    Ok(Json(LogListResponse {
        count: entries.len(),
        entries,
    }))
}

/// Returns the router for log entry queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_logs))
}
