//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::AppState,
    timer::TimerEvent,
};
use super::responses::{ApiResponse, FieldUpdate, HealthResponse, StatusResponse};

/// Forward an event to the timer and wrap the outcome
async fn dispatch_event(state: &AppState, event: TimerEvent) -> Result<Json<ApiResponse>, StatusCode> {
    match state.dispatch(event).await {
        Ok(result) if result.handled => {
            info!("{} accepted, timer is {}", event.name(), result.snapshot.state);
            Ok(Json(ApiResponse::accepted(
                format!("{} accepted", event.name()),
                result.snapshot,
            )))
        }
        Ok(result) => {
            let message = format!("{} ignored in state {}", event.name(), result.snapshot.state);
            Ok(Json(ApiResponse::ignored(message, result.snapshot)))
        }
        Err(e) => {
            error!("Failed to dispatch {}: {}", event.name(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn raw_value(body: Bytes) -> f64 {
    FieldUpdate::parse(&body)
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::Start).await
}

/// Handle POST /timer/stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::Stop).await
}

/// Handle POST /timer/continue
pub async fn continue_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::Continue).await
}

/// Handle POST /timer/restart
pub async fn restart_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::Restart).await
}

/// Handle POST /timer/clear
pub async fn clear_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::Clear).await
}

/// Handle PUT /timer/hours
pub async fn hours_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::UpdateHours(raw_value(body))).await
}

/// Handle PUT /timer/minutes
pub async fn minutes_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::UpdateMinutes(raw_value(body))).await
}

/// Handle PUT /timer/seconds
pub async fn seconds_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch_event(&state, TimerEvent::UpdateSeconds(raw_value(body))).await
}

/// Handle GET /status - Return the latest timer snapshot
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.get_snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
