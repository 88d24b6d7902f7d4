//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! User-scoped handlers take the caller from [`CurrentUser`]. Core errors map
//! to status codes in [`error_status`].

use super::{
    AppState,
    auth::CurrentUser,
    types::{
        HealthResponse, HistoryQuery, HistoryResponse, ProfileRequest, ProgressResponse,
        ResolveResponse, SnapshotRequest, StagesResponse, WorkoutResponse,
    },
};
use crate::now;
use ascend_core::{AscendError, primitives::DEFAULT_HISTORY_LIMIT};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

/// HTTP status for a core error.
pub fn error_status(error: &AscendError) -> StatusCode {
    match error {
        AscendError::InvalidSnapshot(_)
        | AscendError::InvalidCatalog(_)
        | AscendError::InvalidUser(_)
        | AscendError::ConfigError(_) => StatusCode::BAD_REQUEST,
        AscendError::UserNotFound(_) | AscendError::JourneyNotStarted(_) => StatusCode::NOT_FOUND,
        AscendError::BaselineAlreadySet(_) => StatusCode::CONFLICT,
        AscendError::SerializationError(_) | AscendError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn log_failure(operation: &str, error: &AscendError) {
    let status = error_status(error);
    if status.is_server_error() {
        tracing::error!(operation, error = %error, "Request failed");
    } else {
        tracing::debug!(operation, error = %error, status = status.as_u16(), "Request rejected");
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CATALOG HANDLERS
// =============================================================================

/// List the stage catalog.
pub async fn stages_handler(State(state): State<AppState>) -> impl IntoResponse {
    let journey = state.journey.read().await;
    let response = StagesResponse {
        policy: journey.policy(),
        stages: journey.catalog().iter().cloned().collect(),
    };
    (StatusCode::OK, Json(response))
}

/// Resolve a snapshot without storing anything.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Json(request): Json<SnapshotRequest>,
) -> impl IntoResponse {
    let snapshot = match request.to_snapshot() {
        Ok(s) => s,
        Err(e) => {
            return (
                error_status(&e),
                Json(ResolveResponse::error(e.to_string())),
            );
        }
    };

    let journey = state.journey.read().await;
    let resolver = journey.resolver();
    let stage = resolver.resolve(&snapshot).clone();
    let progress = resolver.progress_to_next(&snapshot, stage.rank);
    (StatusCode::OK, Json(ResolveResponse::success(stage, progress)))
}

// =============================================================================
// JOURNEY HANDLERS
// =============================================================================

/// Record the caller's baseline and place them on their first stage.
pub async fn start_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SnapshotRequest>,
) -> impl IntoResponse {
    let baseline = match request.to_snapshot() {
        Ok(s) => s,
        Err(e) => {
            return (
                error_status(&e),
                Json(ProgressResponse::error(e.to_string())),
            );
        }
    };

    let mut journey = state.journey.write().await;
    match journey.start(&user, baseline, now()) {
        Ok(progress) => {
            tracing::info!(
                event = "journey_started",
                user = %user,
                stage = progress.current_stage.rank,
                "Baseline recorded"
            );
            (StatusCode::CREATED, Json(ProgressResponse::record(progress)))
        }
        Err(e) => {
            log_failure("start", &e);
            (error_status(&e), Json(ProgressResponse::error(e.to_string())))
        }
    }
}

/// The caller's progress record and next-stage gaps.
pub async fn progress_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let journey = state.journey.read().await;
    let result = journey.progress(&user).and_then(|progress| {
        let next = journey.progress_to_next(&user)?;
        let count = journey.workout_count(&user)?;
        Ok(ProgressResponse::success(progress, next, count))
    });

    match result {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            log_failure("progress", &e);
            (error_status(&e), Json(ProgressResponse::error(e.to_string())))
        }
    }
}

/// Log a workout for the caller.
pub async fn log_workout_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SnapshotRequest>,
) -> impl IntoResponse {
    let snapshot = match request.to_snapshot() {
        Ok(s) => s,
        Err(e) => {
            return (
                error_status(&e),
                Json(WorkoutResponse::error(e.to_string())),
            );
        }
    };

    let mut journey = state.journey.write().await;
    match journey.log_workout(&user, snapshot, now()) {
        Ok(outcome) => {
            tracing::info!(
                event = "workout_logged",
                user = %user,
                seq = outcome.entry.seq,
                stage = outcome.stage.rank,
                change = ?outcome.change,
                improvement = ?outcome.merge.improvement(),
                "Workout logged"
            );
            (StatusCode::CREATED, Json(WorkoutResponse::success(outcome)))
        }
        Err(e) => {
            log_failure("log_workout", &e);
            (error_status(&e), Json(WorkoutResponse::error(e.to_string())))
        }
    }
}

/// The caller's workout history, newest first.
pub async fn history_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let journey = state.journey.read().await;
    match journey.history(&user, limit) {
        Ok(entries) => (StatusCode::OK, Json(HistoryResponse::success(entries))),
        Err(e) => {
            log_failure("history", &e);
            (error_status(&e), Json(HistoryResponse::error(e.to_string())))
        }
    }
}

/// Set the caller's display name.
pub async fn profile_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ProfileRequest>,
) -> impl IntoResponse {
    let mut journey = state.journey.write().await;
    match journey.set_username(&user, &request.username, now()) {
        Ok(progress) => (StatusCode::OK, Json(ProgressResponse::record(progress))),
        Err(e) => {
            log_failure("profile", &e);
            (error_status(&e), Json(ProgressResponse::error(e.to_string())))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::UserId;

    #[test]
    fn lifecycle_errors_map_to_client_statuses() {
        let user = UserId::parse("alice").expect("valid user id");
        assert_eq!(
            error_status(&AscendError::BaselineAlreadySet(user.clone())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&AscendError::JourneyNotStarted(user)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&AscendError::InvalidSnapshot("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&AscendError::IoError("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
