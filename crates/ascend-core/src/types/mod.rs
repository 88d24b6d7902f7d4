//! # Core Type Definitions
//!
//! This module contains all core types for the Ascend progression engine:
//! - Identifiers and time (`UserId`, `Timestamp`)
//! - Measurements (`RunTime`, `PerformanceSnapshot`, `Metric`)
//! - Stage data (`Thresholds`, `StageDefinition`)
//! - Persisted aggregates (`WorkoutEntry`, `UserProgress`)
//! - Raw form input (`WorkoutForm`)
//! - Error types (`AscendError`)
//!
//! ## Determinism Guarantees
//!
//! Every comparison made by the resolver and tracker is an integer comparison.
//! Run times are fixed-point milliseconds; the fractional "total minutes"
//! value exists for display only.

use crate::primitives::{
    MAX_REPS, MAX_RUN_MINUTES, MAX_USER_ID_LENGTH, MAX_USERNAME_LENGTH, MILLIS_PER_MINUTE,
    MILLIS_PER_SECOND,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of an authenticated user, as issued by the identity provider.
///
/// Restricted to ASCII alphanumerics and `-_.@` so it can be used verbatim as
/// a storage key and in HTTP headers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Parse and validate a user identifier.
    pub fn parse(raw: &str) -> Result<Self, AscendError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AscendError::InvalidUser("user id is empty".to_string()));
        }
        if trimmed.len() > MAX_USER_ID_LENGTH {
            return Err(AscendError::InvalidUser(format!(
                "user id length {} exceeds maximum {}",
                trimmed.len(),
                MAX_USER_ID_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
        {
            return Err(AscendError::InvalidUser(format!(
                "user id '{}' contains unsupported characters",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seconds since the Unix epoch.
///
/// The CORE never reads a clock; callers supply the time of each event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    #[must_use]
    pub const fn from_unix_secs(secs: u64) -> Self {
        Self(secs)
    }

    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }
}

// =============================================================================
// RUN TIME
// =============================================================================

/// A 5K run time, stored as fixed-point milliseconds.
///
/// `RunTime::ZERO` means the run was not attempted. Minutes and seconds shown
/// to users are derived from the same value, so the display fields can never
/// disagree with the total.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RunTime(u64);

impl RunTime {
    /// "Not attempted".
    pub const ZERO: RunTime = RunTime(0);

    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Build a run time from whole minutes and seconds, as entered on the
    /// workout form. Seconds above 59 simply carry into minutes.
    #[must_use]
    pub const fn from_parts(minutes: u32, seconds: u32) -> Self {
        Self(minutes as u64 * MILLIS_PER_MINUTE + seconds as u64 * MILLIS_PER_SECOND)
    }

    #[must_use]
    pub const fn from_minutes(minutes: u32) -> Self {
        Self::from_parts(minutes, 0)
    }

    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Whole minutes component.
    #[must_use]
    pub const fn minutes(self) -> u64 {
        self.0 / MILLIS_PER_MINUTE
    }

    /// Whole seconds component (0..60).
    #[must_use]
    pub const fn seconds(self) -> u64 {
        (self.0 % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND
    }

    /// True unless this is the "not attempted" value.
    #[must_use]
    pub const fn is_recorded(self) -> bool {
        self.0 > 0
    }

    /// Difference between two run times, zero if `other` is not smaller.
    #[must_use]
    pub const fn saturating_sub(self, other: RunTime) -> RunTime {
        RunTime(self.0.saturating_sub(other.0))
    }

    /// Total minutes as a fraction (`minutes + seconds / 60`).
    ///
    /// Display only. Never used for comparisons.
    #[allow(clippy::float_arithmetic)]
    #[must_use]
    pub fn total_minutes(self) -> f64 {
        self.0 as f64 / MILLIS_PER_MINUTE as f64
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fraction = self.0 % MILLIS_PER_SECOND;
        if fraction == 0 {
            write!(f, "{}:{:02}", self.minutes(), self.seconds())
        } else {
            let digits = format!("{:03}", fraction);
            write!(
                f,
                "{}:{:02}.{}",
                self.minutes(),
                self.seconds(),
                digits.trim_end_matches('0')
            )
        }
    }
}

impl FromStr for RunTime {
    type Err = AscendError;

    /// Parse `MM`, `MM:SS` or `MM:SS.fff` using integer arithmetic only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || {
            AscendError::InvalidSnapshot(format!(
                "invalid run time '{}': expected MM, MM:SS or MM:SS.fff",
                s
            ))
        };
        let is_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());

        let (minutes_part, rest) = match s.split_once(':') {
            Some((m, r)) => (m, Some(r)),
            None => (s, None),
        };
        if !is_digits(minutes_part) {
            return Err(invalid());
        }
        let minutes: u64 = minutes_part.parse().map_err(|_| invalid())?;

        let within_minute = match rest {
            None => 0,
            Some(rest) => {
                let (secs_part, frac_part) = rest.split_once('.').unwrap_or((rest, ""));
                if !is_digits(secs_part) || secs_part.len() > 2 {
                    return Err(invalid());
                }
                let secs: u64 = secs_part.parse().map_err(|_| invalid())?;
                if secs >= 60 {
                    return Err(invalid());
                }
                let frac_millis = if frac_part.is_empty() {
                    0
                } else {
                    if !is_digits(frac_part) || frac_part.len() > 3 {
                        return Err(invalid());
                    }
                    let value: u64 = frac_part.parse().map_err(|_| invalid())?;
                    value * 10u64.pow(3 - frac_part.len() as u32)
                };
                secs * MILLIS_PER_SECOND + frac_millis
            }
        };

        let total = minutes
            .saturating_mul(MILLIS_PER_MINUTE)
            .saturating_add(within_minute);
        if total > MAX_RUN_MINUTES * MILLIS_PER_MINUTE {
            return Err(AscendError::InvalidSnapshot(format!(
                "run time '{}' exceeds maximum of {} minutes",
                s, MAX_RUN_MINUTES
            )));
        }
        Ok(Self(total))
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// The five tracked fitness metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Pushups,
    Situps,
    Squats,
    Pullups,
    Run5k,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 5] = [
        Metric::Pushups,
        Metric::Situps,
        Metric::Squats,
        Metric::Pullups,
        Metric::Run5k,
    ];

    /// The four repetition metrics (higher is better).
    pub const REPS: [Metric; 4] = [
        Metric::Pushups,
        Metric::Situps,
        Metric::Squats,
        Metric::Pullups,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Pushups => "Push-ups",
            Metric::Situps => "Sit-ups",
            Metric::Squats => "Squats",
            Metric::Pullups => "Pull-ups",
            Metric::Run5k => "5K Run",
        }
    }

    /// True for repetition counts, false for the run time.
    #[must_use]
    pub fn is_rep_count(&self) -> bool {
        !matches!(self, Metric::Run5k)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// PERFORMANCE SNAPSHOT
// =============================================================================

/// One measured set of the five fitness metrics at a point in time.
///
/// All fields default to zero. A zero run time means "not attempted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct PerformanceSnapshot {
    #[serde(default)]
    pub pushups: u32,
    #[serde(default)]
    pub situps: u32,
    #[serde(default)]
    pub squats: u32,
    #[serde(default)]
    pub pullups: u32,
    #[serde(default)]
    pub run_5k: RunTime,
}

impl PerformanceSnapshot {
    #[must_use]
    pub const fn new(
        pushups: u32,
        situps: u32,
        squats: u32,
        pullups: u32,
        run_5k: RunTime,
    ) -> Self {
        Self {
            pushups,
            situps,
            squats,
            pullups,
            run_5k,
        }
    }

    /// Repetition count for a rep metric, `None` for the run.
    #[must_use]
    pub fn reps(&self, metric: Metric) -> Option<u32> {
        match metric {
            Metric::Pushups => Some(self.pushups),
            Metric::Situps => Some(self.situps),
            Metric::Squats => Some(self.squats),
            Metric::Pullups => Some(self.pullups),
            Metric::Run5k => None,
        }
    }

    /// True if `self` is at least as good as `other` in every metric
    /// (more or equal reps, equal or lower run time).
    #[must_use]
    pub fn dominates(&self, other: &PerformanceSnapshot) -> bool {
        self.pushups >= other.pushups
            && self.situps >= other.situps
            && self.squats >= other.squats
            && self.pullups >= other.pullups
            && self.run_5k <= other.run_5k
    }

    /// Check every field against the input limits.
    pub fn validate(&self) -> Result<(), AscendError> {
        for metric in Metric::REPS {
            let value = self.reps(metric).unwrap_or(0);
            if value > MAX_REPS {
                return Err(AscendError::InvalidSnapshot(format!(
                    "{} count {} exceeds maximum {}",
                    metric, value, MAX_REPS
                )));
            }
        }
        if self.run_5k.millis() > MAX_RUN_MINUTES * MILLIS_PER_MINUTE {
            return Err(AscendError::InvalidSnapshot(format!(
                "5K run time {} exceeds maximum of {} minutes",
                self.run_5k, MAX_RUN_MINUTES
            )));
        }
        Ok(())
    }
}

// =============================================================================
// RAW FORM INPUT
// =============================================================================

/// Workout values exactly as typed by a user.
///
/// Converting to a [`PerformanceSnapshot`] never fails: unparseable, empty or
/// negative entries become zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkoutForm {
    #[serde(default)]
    pub pushups: String,
    #[serde(default)]
    pub situps: String,
    #[serde(default)]
    pub squats: String,
    #[serde(default)]
    pub pullups: String,
    #[serde(default)]
    pub run_minutes: String,
    #[serde(default)]
    pub run_seconds: String,
}

impl WorkoutForm {
    /// Sanitize every field and derive the run time from minutes and seconds.
    #[must_use]
    pub fn to_snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            pushups: sanitize_count(&self.pushups),
            situps: sanitize_count(&self.situps),
            squats: sanitize_count(&self.squats),
            pullups: sanitize_count(&self.pullups),
            run_5k: RunTime::from_parts(
                sanitize_count(&self.run_minutes),
                sanitize_count(&self.run_seconds),
            ),
        }
    }
}

/// Turn user-entered text into a non-negative whole number.
///
/// A decimal entry keeps its whole part (`"12.7"` is 12). Anything else that
/// does not parse, including negative numbers, is 0. Values too large for a
/// `u32` saturate, so snapshot validation rejects them instead of reading 0.
#[must_use]
pub fn sanitize_count(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let whole = match trimmed.split_once('.') {
        Some((whole, frac)) if frac.chars().all(|c| c.is_ascii_digit()) => whole,
        Some(_) => return 0,
        None => trimmed,
    };
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    // Digits only, so the one remaining parse failure is overflow.
    whole.parse().unwrap_or(u32::MAX)
}

// =============================================================================
// STAGE DATA
// =============================================================================

/// Requirements for a stage: minimum rep counts and a maximum run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Thresholds {
    pub pushups: u32,
    pub situps: u32,
    pub squats: u32,
    pub pullups: u32,
    pub max_run_5k: RunTime,
}

impl Thresholds {
    #[must_use]
    pub const fn new(
        pushups: u32,
        situps: u32,
        squats: u32,
        pullups: u32,
        max_run_5k: RunTime,
    ) -> Self {
        Self {
            pushups,
            situps,
            squats,
            pullups,
            max_run_5k,
        }
    }

    /// Minimum for a rep metric, `None` for the run.
    #[must_use]
    pub fn min_reps(&self, metric: Metric) -> Option<u32> {
        match metric {
            Metric::Pushups => Some(self.pushups),
            Metric::Situps => Some(self.situps),
            Metric::Squats => Some(self.squats),
            Metric::Pullups => Some(self.pullups),
            Metric::Run5k => None,
        }
    }
}

/// One rank in the achievement progression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Rank, 1-based and contiguous within a catalog.
    pub rank: u32,
    /// Display label.
    pub title: String,
    pub thresholds: Thresholds,
}

impl StageDefinition {
    #[must_use]
    pub fn new(rank: u32, title: impl Into<String>, thresholds: Thresholds) -> Self {
        Self {
            rank,
            title: title.into(),
            thresholds,
        }
    }
}

impl fmt::Display for StageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage {}: {}", self.rank, self.title)
    }
}

// =============================================================================
// PERSISTED AGGREGATES
// =============================================================================

/// An immutable, timestamped workout record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    /// Per-user sequence number, strictly increasing in append order.
    pub seq: u64,
    pub recorded_at: Timestamp,
    pub snapshot: PerformanceSnapshot,
}

/// Per-user progress record.
///
/// `baseline` is fixed when the journey starts. `best` and `current_stage`
/// are recomputed on every workout submission. Workout entries live in the
/// store's append-only log, not in this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user: UserId,
    pub username: Option<String>,
    pub baseline: PerformanceSnapshot,
    pub best: PerformanceSnapshot,
    pub current_stage: StageDefinition,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserProgress {
    /// Create the record for a freshly assessed baseline.
    #[must_use]
    pub fn from_baseline(
        user: UserId,
        baseline: PerformanceSnapshot,
        stage: StageDefinition,
        now: Timestamp,
    ) -> Self {
        Self {
            user,
            username: None,
            baseline,
            best: baseline,
            current_stage: stage,
            started_at: now,
            updated_at: now,
        }
    }
}

/// Validate a display name: non-empty after trimming and length-bounded.
pub fn validate_username(raw: &str) -> Result<String, AscendError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AscendError::InvalidUser("username cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AscendError::InvalidUser(format!(
            "username exceeds maximum of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Ascend system.
///
/// The resolver and tracker never fail; these errors come from input
/// validation, the journey lifecycle and the persistence layer.
#[derive(Debug, Error)]
pub enum AscendError {
    /// A performance snapshot or run time is out of range or malformed.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A stage catalog violates its structural rules.
    #[error("Invalid stage catalog: {0}")]
    InvalidCatalog(String),

    /// A user identifier or display name is malformed.
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    /// No progress record exists for the user.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// A workout was submitted before a baseline was recorded.
    #[error("Journey not started for user {0}: record a baseline first")]
    JourneyNotStarted(UserId),

    /// The baseline is immutable once set.
    #[error("Baseline already recorded for user {0}")]
    BaselineAlreadySet(UserId),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration file could not be used.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================
