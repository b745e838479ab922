//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{coerce_count, AppState, StartOutcome, WorkoutSnapshot};
use super::responses::{ApiResponse, ConfigEdit, HealthResponse, StatusResponse};

fn current_snapshot(state: &AppState) -> Result<WorkoutSnapshot, StatusCode> {
    state.snapshot().map_err(|e| {
        error!("Failed to read workout state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Spawn the countdown for an accepted start and describe the outcome
fn start_response(state: &Arc<AppState>, outcome: StartOutcome) -> Result<Json<ApiResponse>, StatusCode> {
    if let StartOutcome::Pending(generation) = outcome {
        let countdown_state = Arc::clone(state);
        tokio::spawn(async move {
            match countdown_state.complete_start(generation).await {
                Ok(outcome) => info!("Countdown {} finished: {:?}", generation, outcome),
                Err(e) => error!("Failed to complete start: {}", e),
            }
        });
        return Ok(Json(ApiResponse::starting(current_snapshot(state)?)));
    }

    let message = match outcome {
        StartOutcome::AlreadyRunning => "Workout is already running",
        StartOutcome::AlreadyStarting => "Countdown already in progress",
        StartOutcome::NothingToDo => "Workout is complete or has no sets; reset first",
        _ => "Start request ignored",
    };
    warn!("Start not accepted: {}", message);
    Ok(Json(ApiResponse::unchanged(message, current_snapshot(state)?)))
}

/// Handle POST /start - Play the countdown, then start the workout
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.begin_start() {
        Ok(outcome) => start_response(&state, outcome),
        Err(e) => {
            error!("Failed to start workout: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /stop - Pause the workout or cancel a pending start
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.stop() {
        Ok(snapshot) => {
            info!("Stop endpoint called - workout paused");
            Ok(Json(ApiResponse::ok("Workout stopped", snapshot)))
        }
        Err(e) => {
            error!("Failed to stop workout: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /toggle - Start when idle, stop otherwise
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.toggle() {
        Ok(Some(outcome)) => start_response(&state, outcome),
        Ok(None) => Ok(Json(ApiResponse::ok("Workout stopped", current_snapshot(&state)?))),
        Err(e) => {
            error!("Failed to toggle workout: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Return to the initial idle state
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset() {
        Ok(snapshot) => {
            info!("Reset endpoint called - workout reset");
            Ok(Json(ApiResponse::ok("Workout reset", snapshot)))
        }
        Err(e) => {
            error!("Failed to reset workout: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /config/jump-duration
pub async fn jump_duration_handler(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<ConfigEdit>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let seconds = coerce_count(&edit.value);
    match state.set_jump_duration(seconds) {
        Ok(snapshot) => Ok(Json(ApiResponse::ok(format!("Jump duration set to {}s", seconds), snapshot))),
        Err(e) => {
            error!("Failed to set jump duration: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /config/rest-duration
pub async fn rest_duration_handler(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<ConfigEdit>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let seconds = coerce_count(&edit.value);
    match state.set_rest_duration(seconds) {
        Ok(snapshot) => Ok(Json(ApiResponse::ok(format!("Rest duration set to {}s", seconds), snapshot))),
        Err(e) => {
            error!("Failed to set rest duration: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /config/total-sets
pub async fn total_sets_handler(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<ConfigEdit>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let sets = coerce_count(&edit.value);
    match state.set_total_sets(sets) {
        Ok(snapshot) => Ok(Json(ApiResponse::ok(format!("Total sets set to {}", sets), snapshot))),
        Err(e) => {
            error!("Failed to set total sets: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return the workout and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = current_snapshot(&state)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        workout: snapshot.into(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
