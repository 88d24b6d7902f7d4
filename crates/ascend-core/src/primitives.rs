//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Ascend CORE.
//!
//! These limits are compiled into the binary and are immutable at runtime.
//! Every boundary (CLI, HTTP, config file) validates against them before
//! data reaches the resolver or the tracker.

/// Milliseconds in one minute. Run times are stored as integer milliseconds.
pub const MILLIS_PER_MINUTE: u64 = 60_000;

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Number of stages in the reference catalog.
pub const REFERENCE_STAGE_COUNT: usize = 7;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum accepted repetition count for any single metric.
///
/// Anything above this is treated as a data-entry error and rejected.
pub const MAX_REPS: u32 = 10_000;

/// Maximum accepted 5K run time, in minutes (10 hours).
pub const MAX_RUN_MINUTES: u64 = 600;

/// Maximum number of stages a catalog may define.
pub const MAX_STAGES: usize = 64;

/// Maximum length of a stage title.
pub const MAX_TITLE_LENGTH: usize = 128;

/// Maximum length of a user identifier.
pub const MAX_USER_ID_LENGTH: usize = 128;

/// Maximum length of a display name.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum number of workout entries returned by a single history read.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Default number of workout entries returned by a history read.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
