//! Integration tests for the Ascend HTTP API.
//!
//! Uses axum-test to drive the router without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await - tests are serialized to avoid
// env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use ascend::api::{
    AppState, ErrorResponse, HealthResponse, HistoryResponse, ProgressResponse, ResolveResponse,
    StagesResponse, WorkoutResponse, create_router,
};
use ascend_core::{Journey, RunGap, RunTime, StageCatalog, StageChange, StagePolicy};
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::json;
use std::sync::Mutex;

/// Mutex to serialize tests since some modify env vars.
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard that holds the mutex and clears the API key on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("ASCEND_API_KEY") };
    }
}

fn user_header() -> HeaderName {
    HeaderName::from_static("x-ascend-user")
}

fn as_user(id: &'static str) -> HeaderValue {
    HeaderValue::from_static(id)
}

fn server_for(journey: Journey) -> (TestServer, TestGuard) {
    let guard = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("ASCEND_API_KEY") };
    let router = create_router(AppState::new(journey));
    (
        TestServer::new(router).unwrap(),
        TestGuard { _guard: guard },
    )
}

/// Test server over an in-memory journey with the reference catalog.
fn create_test_server() -> (TestServer, TestGuard) {
    server_for(Journey::in_memory(StageCatalog::reference()))
}

/// Test server where "alice" has already recorded a stage 1 baseline.
async fn create_started_server() -> (TestServer, TestGuard) {
    let (server, guard) = create_test_server();
    server
        .post("/journey")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({
            "pushups": 12, "situps": 25, "squats": 25, "pullups": 0,
            "run_minutes": 44
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
    (server, guard)
}

// =============================================================================
// HEALTH & CATALOG
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_stages_lists_reference_catalog() {
    let (server, _guard) = create_test_server();

    let response = server.get("/stages").await;
    response.assert_status_ok();

    let stages: StagesResponse = response.json();
    assert_eq!(stages.policy, StagePolicy::LatestWorkout);
    assert_eq!(stages.stages.len(), 7);
    assert_eq!(stages.stages[0].rank, 1);
    assert_eq!(
        stages.stages[6].thresholds.max_run_5k,
        RunTime::from_millis(1_498_800)
    );
}

#[tokio::test]
async fn test_resolve_without_identity() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/resolve")
        .json(&json!({
            "pushups": 15, "situps": 25, "squats": 25, "pullups": 0,
            "run_5k": "42:00"
        }))
        .await;
    response.assert_status_ok();

    let body: ResolveResponse = response.json();
    assert!(body.success);
    assert_eq!(body.stage.map(|s| s.rank), Some(1));
    let progress = body.progress.unwrap();
    assert_eq!(progress.next.map(|s| s.rank), Some(2));
    assert_eq!(progress.run_gap, RunGap::Faster(RunTime::from_minutes(2)));
}

#[tokio::test]
async fn test_resolve_rejects_malformed_run_time() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/resolve")
        .json(&json!({ "pushups": 10, "run_5k": "quick" }))
        .await;
    response.assert_status_bad_request();

    let body: ResolveResponse = response.json();
    assert!(!body.success);
    assert!(body.error.unwrap().contains("run time"));
}

#[tokio::test]
async fn test_resolve_rejects_out_of_range_reps() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/resolve")
        .json(&json!({ "pushups": 1_000_000 }))
        .await;
    response.assert_status_bad_request();
}

// =============================================================================
// IDENTITY
// =============================================================================

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let (server, _guard) = create_test_server();

    let response = server.get("/progress").await;
    response.assert_status_unauthorized();

    let body: ErrorResponse = response.json();
    assert!(!body.success);
    assert!(body.error.contains("X-Ascend-User"));
}

#[tokio::test]
async fn test_malformed_user_header_is_bad_request() {
    let (server, _guard) = create_test_server();

    let response = server
        .get("/progress")
        .add_header(user_header(), as_user("not a valid id!"))
        .await;
    response.assert_status_bad_request();
}

// =============================================================================
// JOURNEY LIFECYCLE
// =============================================================================

#[tokio::test]
async fn test_start_journey_places_user() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/journey")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({
            "pushups": 25, "situps": 35, "squats": 35, "pullups": 2,
            "run_minutes": 38, "run_seconds": 30
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: ProgressResponse = response.json();
    let progress = body.progress.unwrap();
    assert_eq!(progress.current_stage.rank, 2);
    assert_eq!(progress.baseline, progress.best);
    assert_eq!(progress.baseline.run_5k, RunTime::from_parts(38, 30));
}

#[tokio::test]
async fn test_second_baseline_conflicts() {
    let (server, _guard) = create_started_server().await;

    let response = server
        .post("/journey")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({ "pushups": 99 }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);

    let body: ProgressResponse = response.json();
    assert!(!body.success);
}

#[tokio::test]
async fn test_progress_unknown_user_is_not_found() {
    let (server, _guard) = create_test_server();

    let response = server
        .get("/progress")
        .add_header(user_header(), as_user("nobody"))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_workout_before_start_is_not_found() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/workouts")
        .add_header(user_header(), as_user("bob"))
        .json(&json!({ "pushups": 10 }))
        .await;
    response.assert_status_not_found();

    let body: WorkoutResponse = response.json();
    assert!(body.error.unwrap().contains("not started"));
}

#[tokio::test]
async fn test_workout_stage_up_and_records() {
    let (server, _guard) = create_started_server().await;

    let response = server
        .post("/workouts")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({
            "pushups": 22, "situps": 31, "squats": 31, "pullups": 1,
            "run_5k": "39:30"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: WorkoutResponse = response.json();
    assert_eq!(body.headline.as_deref(), Some("Stage Up!"));
    let outcome = body.outcome.unwrap();
    assert_eq!(outcome.change, StageChange::Up);
    assert_eq!(outcome.stage.rank, 2);
    assert!(outcome.merge.time_record());
    assert_eq!(outcome.merge.best().pushups, 22);
}

#[tokio::test]
async fn test_weak_workout_keeps_bests() {
    let (server, _guard) = create_started_server().await;

    let response = server
        .post("/workouts")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({ "pushups": 3 }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: WorkoutResponse = response.json();
    // Stage 1 is the floor, so a weak session stays there.
    assert_eq!(body.headline.as_deref(), Some("Workout Logged"));

    let progress: ProgressResponse = server
        .get("/progress")
        .add_header(user_header(), as_user("alice"))
        .await
        .json();
    let record = progress.progress.unwrap();
    assert_eq!(record.best.pushups, 12);
    assert_eq!(record.best.run_5k, RunTime::from_minutes(44));
    assert_eq!(progress.workout_count, 1);
}

#[tokio::test]
async fn test_progress_reports_gaps_from_latest_workout() {
    let (server, _guard) = create_started_server().await;

    server
        .post("/workouts")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({
            "pushups": 20, "situps": 30, "squats": 30, "pullups": 0,
            "run_minutes": 40
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .get("/progress")
        .add_header(user_header(), as_user("alice"))
        .await;
    response.assert_status_ok();

    let body: ProgressResponse = response.json();
    let next = body.next.unwrap();
    assert_eq!(next.next.map(|s| s.rank), Some(2));
    assert_eq!(next.rep_gaps.len(), 1);
    assert_eq!(next.rep_gaps[0].remaining, 1);
    assert_eq!(next.run_gap, RunGap::Met);
    assert_eq!(next.percent, 80);
}

// =============================================================================
// HISTORY & PROFILE
// =============================================================================

#[tokio::test]
async fn test_history_newest_first_with_limit() {
    let (server, _guard) = create_started_server().await;

    for pushups in [10, 20, 30] {
        server
            .post("/workouts")
            .add_header(user_header(), as_user("alice"))
            .json(&json!({ "pushups": pushups }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    let response = server
        .get("/workouts")
        .add_query_param("limit", 2)
        .add_header(user_header(), as_user("alice"))
        .await;
    response.assert_status_ok();

    let body: HistoryResponse = response.json();
    let pushups: Vec<u32> = body.workouts.iter().map(|w| w.snapshot.pushups).collect();
    assert_eq!(pushups, vec![30, 20]);
}

#[tokio::test]
async fn test_histories_are_per_user() {
    let (server, _guard) = create_started_server().await;

    server
        .post("/journey")
        .add_header(user_header(), as_user("bob"))
        .json(&json!({}))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
    server
        .post("/workouts")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({ "pushups": 40 }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let body: HistoryResponse = server
        .get("/workouts")
        .add_header(user_header(), as_user("bob"))
        .await
        .json();
    assert!(body.success);
    assert!(body.workouts.is_empty());
}

#[tokio::test]
async fn test_profile_sets_username() {
    let (server, _guard) = create_started_server().await;

    let response = server
        .put("/profile")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({ "username": "  Alice  " }))
        .await;
    response.assert_status_ok();

    let body: ProgressResponse = response.json();
    assert_eq!(body.progress.unwrap().username.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_profile_rejects_blank_username() {
    let (server, _guard) = create_started_server().await;

    let response = server
        .put("/profile")
        .add_header(user_header(), as_user("alice"))
        .json(&json!({ "username": "   " }))
        .await;
    response.assert_status_bad_request();
}

// =============================================================================
// POLICY
// =============================================================================

#[tokio::test]
async fn test_all_time_best_policy_never_moves_down() {
    let journey =
        Journey::in_memory(StageCatalog::reference()).with_policy(StagePolicy::AllTimeBest);
    let (server, _guard) = server_for(journey);

    server
        .post("/journey")
        .add_header(user_header(), as_user("carol"))
        .json(&json!({
            "pushups": 30, "situps": 40, "squats": 50, "pullups": 3,
            "run_minutes": 34
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let body: WorkoutResponse = server
        .post("/workouts")
        .add_header(user_header(), as_user("carol"))
        .json(&json!({ "pushups": 1 }))
        .await
        .json();
    let outcome = body.outcome.unwrap();
    assert_eq!(outcome.change, StageChange::Same);
    assert_eq!(outcome.stage.rank, 3);
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let (server, _guard) = create_test_server();
    server.get("/unknown").await.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (server, _guard) = create_test_server();
    let response = server.delete("/workouts").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/resolve")
        .bytes(bytes::Bytes::from("not valid json"))
        .content_type("application/json")
        .await;
    assert!(response.status_code().is_client_error());
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Server with `ASCEND_API_KEY` set. The key stays set until the guard drops.
fn create_auth_test_server(api_key: &str) -> (TestServer, TestGuard) {
    let guard = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var("ASCEND_API_KEY", api_key) };
    let router = create_router(AppState::new(Journey::in_memory(StageCatalog::reference())));
    (
        TestServer::new(router).unwrap(),
        TestGuard { _guard: guard },
    )
}

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let api_key = "test-secret-key-12345";
    let (server, _guard) = create_auth_test_server(api_key);

    let response = server
        .get("/stages")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let (server, _guard) = create_auth_test_server("correct-key");

    let response = server
        .get("/stages")
        .add_header(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer wrong-key"),
        )
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let (server, _guard) = create_auth_test_server("correct-key");
    server.get("/stages").await.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_health_always_allowed() {
    let (server, _guard) = create_auth_test_server("correct-key");
    server.get("/health").await.assert_status_ok();
}
