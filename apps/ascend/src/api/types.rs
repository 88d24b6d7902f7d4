//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Every response carries a `success` flag; failures add an `error` string.
//! Run times travel as integer milliseconds (`run_5k`) in responses.

use ascend_core::{
    AscendError, PerformanceSnapshot, RunTime, StageDefinition, StagePolicy, StageProgress,
    UserProgress, WorkoutEntry, WorkoutOutcome,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body returned by middleware and extractors when a request is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STAGES RESPONSE
// =============================================================================

/// The stage catalog and the policy used to place users on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagesResponse {
    pub policy: StagePolicy,
    pub stages: Vec<StageDefinition>,
}

// =============================================================================
// SNAPSHOT REQUEST
// =============================================================================

/// Measured values for a baseline, a workout or a resolve request.
///
/// The run is given either as `run_5k` (`"MM:SS"` or `"MM:SS.mmm"`) or as
/// `run_minutes` + `run_seconds`. Omitted fields are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotRequest {
    #[serde(default)]
    pub pushups: u32,
    #[serde(default)]
    pub situps: u32,
    #[serde(default)]
    pub squats: u32,
    #[serde(default)]
    pub pullups: u32,
    #[serde(default)]
    pub run_5k: Option<String>,
    #[serde(default)]
    pub run_minutes: u32,
    #[serde(default)]
    pub run_seconds: u32,
}

impl SnapshotRequest {
    /// Convert to a validated snapshot.
    pub fn to_snapshot(&self) -> Result<PerformanceSnapshot, AscendError> {
        let run_5k = match self.run_5k.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.parse::<RunTime>()?,
            _ => RunTime::from_parts(self.run_minutes, self.run_seconds),
        };
        let snapshot = PerformanceSnapshot::new(
            self.pushups,
            self.situps,
            self.squats,
            self.pullups,
            run_5k,
        );
        snapshot.validate()?;
        Ok(snapshot)
    }
}

// =============================================================================
// RESOLVE RESPONSE
// =============================================================================

/// Stage for an ad-hoc snapshot, with the gaps to the following stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub success: bool,
    pub stage: Option<StageDefinition>,
    pub progress: Option<StageProgress>,
    pub error: Option<String>,
}

impl ResolveResponse {
    pub fn success(stage: StageDefinition, progress: StageProgress) -> Self {
        Self {
            success: true,
            stage: Some(stage),
            progress: Some(progress),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            stage: None,
            progress: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// PROGRESS RESPONSE
// =============================================================================

/// A user's progress record plus the gaps to their next stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub progress: Option<UserProgress>,
    pub next: Option<StageProgress>,
    pub workout_count: usize,
    pub error: Option<String>,
}

impl ProgressResponse {
    pub fn success(progress: UserProgress, next: StageProgress, workout_count: usize) -> Self {
        Self {
            success: true,
            progress: Some(progress),
            next: Some(next),
            workout_count,
            error: None,
        }
    }

    /// Record only, for responses where gaps were not computed.
    pub fn record(progress: UserProgress) -> Self {
        Self {
            success: true,
            progress: Some(progress),
            next: None,
            workout_count: 0,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            progress: None,
            next: None,
            workout_count: 0,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// WORKOUT RESPONSE
// =============================================================================

/// Result of logging a workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutResponse {
    pub success: bool,
    pub headline: Option<String>,
    pub outcome: Option<WorkoutOutcome>,
    pub error: Option<String>,
}

impl WorkoutResponse {
    pub fn success(outcome: WorkoutOutcome) -> Self {
        Self {
            success: true,
            headline: Some(outcome.headline().to_string()),
            outcome: Some(outcome),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            headline: None,
            outcome: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// `GET /workouts` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Workout history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub workouts: Vec<WorkoutEntry>,
    pub error: Option<String>,
}

impl HistoryResponse {
    pub fn success(workouts: Vec<WorkoutEntry>) -> Self {
        Self {
            success: true,
            workouts,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            workouts: Vec::new(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// PROFILE REQUEST
// =============================================================================

/// Display name update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub username: String,
}
