//! Routes for the employee context.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use roster_employee::application::command_handlers;
use roster_employee::domain::commands;
use roster_employee::domain::employee::Employee;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// POST /
#[instrument(skip(state, request))]
async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let command = commands::CreateEmployee {
        correlation_id: Uuid::new_v4(),
        name: request.name,
        email: request.email,
    };

    info!(correlation_id = %command.correlation_id, "handling create_employee command");

    let employee = command_handlers::handle_create_employee(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.employee_repository.as_ref(),
        state.event_publisher.as_ref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// Returns the router for the employee context.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_employee))
}
