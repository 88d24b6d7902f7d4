//! # ascend-core
//!
//! The deterministic progression engine for Ascend - THE LOGIC.
//!
//! Ascend places a user on one of a fixed ladder of fitness stages according
//! to five measured metrics (push-ups, sit-ups, squats, pull-ups and a timed
//! 5K run), and keeps a per-metric personal-best record across workouts.
//!
//! ## Components
//!
//! - [`StageCatalog`]: the ordered, immutable list of stage definitions
//! - [`StageResolver`]: maps a snapshot to the highest stage it qualifies for
//! - [`BestPerformanceTracker`]: merges a workout into the personal bests
//! - [`Journey`]: baseline, workout logging and history over a [`ProgressStore`]
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network dependencies (pure Rust)
//! - Resolution and merging are pure functions with no error path
//! - Every threshold comparison is an integer comparison
//! - Never reads a clock: timestamps are always passed in

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod journey;
pub mod primitives;
pub mod storage;
pub mod system;
pub mod tracker;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AscendError, Metric, PerformanceSnapshot, RunTime, StageDefinition, Thresholds, Timestamp,
    UserId, UserProgress, WorkoutEntry, WorkoutForm, sanitize_count, validate_username,
};

// =============================================================================
// RE-EXPORTS: Progression Engine
// =============================================================================

pub use catalog::{MonotonicityViolation, StageCatalog};
pub use journey::{Journey, StageChange, StagePolicy, WorkoutOutcome};
pub use storage::{MemoryStore, ProgressStore, RedbStore, StorageBackend};
pub use tracker::{BestPerformanceTracker, Improvement, MergeOutcome};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::{RepGap, RunGap, StageProgress, StageResolver, qualifies, resolve};
