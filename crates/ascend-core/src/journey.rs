//! # Journey Module
//!
//! Orchestrates one user's progression: baseline assessment, workout logging,
//! best-performance merging and stage placement.
//!
//! A journey owns its [`ProgressStore`] and a [`StageResolver`]. It never reads
//! a clock; callers pass `now` in, which keeps every operation reproducible.
//!
//! ## Workout flow
//!
//! 1. Validate the snapshot
//! 2. Merge it into the best record ([`BestPerformanceTracker`])
//! 3. Resolve the stage according to the [`StagePolicy`]
//! 4. Append the entry and save the record in one store commit

use crate::primitives::MAX_HISTORY_LIMIT;
use crate::storage::{ProgressStore, StorageBackend};
use crate::{
    AscendError, BestPerformanceTracker, Improvement, MergeOutcome, PerformanceSnapshot,
    StageCatalog, StageDefinition, StageProgress, StageResolver, Timestamp, UserId, UserProgress,
    WorkoutEntry, validate_username,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// STAGE POLICY
// =============================================================================

/// Which snapshot decides the current stage after a workout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePolicy {
    /// The workout just logged. A weak session can move a user down.
    #[default]
    LatestWorkout,
    /// The merged personal bests. Stages only ever go up.
    AllTimeBest,
}

impl StagePolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StagePolicy::LatestWorkout => "latest_workout",
            StagePolicy::AllTimeBest => "all_time_best",
        }
    }
}

impl fmt::Display for StagePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StagePolicy {
    type Err = AscendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "latest_workout" | "latest" => Ok(StagePolicy::LatestWorkout),
            "all_time_best" | "best" => Ok(StagePolicy::AllTimeBest),
            other => Err(AscendError::ConfigError(format!(
                "unknown stage policy '{other}' (expected latest_workout or all_time_best)"
            ))),
        }
    }
}

// =============================================================================
// WORKOUT OUTCOME
// =============================================================================

/// Direction of a stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageChange {
    Up,
    Down,
    Same,
}

impl StageChange {
    #[must_use]
    pub fn between(previous: &StageDefinition, current: &StageDefinition) -> Self {
        match current.rank.cmp(&previous.rank) {
            std::cmp::Ordering::Greater => StageChange::Up,
            std::cmp::Ordering::Less => StageChange::Down,
            std::cmp::Ordering::Equal => StageChange::Same,
        }
    }
}

/// Everything that happened when a workout was logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutOutcome {
    pub entry: WorkoutEntry,
    pub merge: MergeOutcome,
    pub previous_stage: StageDefinition,
    pub stage: StageDefinition,
    pub change: StageChange,
}

impl WorkoutOutcome {
    /// Short user-facing message. A stage change outranks a new record.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match (self.change, self.merge.improvement()) {
            (StageChange::Up, _) => "Stage Up!",
            (StageChange::Down, _) => "Stage Down",
            (StageChange::Same, Improvement::None) => "Workout Logged",
            (StageChange::Same, _) => "New Record!",
        }
    }
}

// =============================================================================
// JOURNEY
// =============================================================================

/// A user's progression through the stage catalog, backed by a store.
#[derive(Debug)]
pub struct Journey<S: ProgressStore = StorageBackend> {
    store: S,
    resolver: StageResolver,
    policy: StagePolicy,
}

impl Journey<StorageBackend> {
    /// In-memory journey over the given catalog.
    #[must_use]
    pub fn in_memory(catalog: StageCatalog) -> Self {
        Self::new(StorageBackend::default(), catalog)
    }

    /// Journey persisted to a redb file.
    pub fn with_redb(path: impl AsRef<Path>, catalog: StageCatalog) -> Result<Self, AscendError> {
        Ok(Self::new(StorageBackend::redb(path)?, catalog))
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }
}

impl<S: ProgressStore> Journey<S> {
    #[must_use]
    pub fn new(store: S, catalog: StageCatalog) -> Self {
        Self {
            store,
            resolver: StageResolver::new(catalog),
            policy: StagePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: StagePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> StagePolicy {
        self.policy
    }

    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        self.resolver.catalog()
    }

    #[must_use]
    pub fn resolver(&self) -> &StageResolver {
        &self.resolver
    }

    /// Record the baseline assessment and place the user on their first stage.
    pub fn start(
        &mut self,
        user: &UserId,
        baseline: PerformanceSnapshot,
        now: Timestamp,
    ) -> Result<UserProgress, AscendError> {
        baseline.validate()?;
        if self.store.load(user)?.is_some() {
            return Err(AscendError::BaselineAlreadySet(user.clone()));
        }

        let stage = self.resolver.resolve(&baseline).clone();
        let progress = UserProgress::from_baseline(user.clone(), baseline, stage, now);
        self.store.save(&progress)?;
        Ok(progress)
    }

    /// Log a workout, update personal bests and re-resolve the stage.
    pub fn log_workout(
        &mut self,
        user: &UserId,
        snapshot: PerformanceSnapshot,
        now: Timestamp,
    ) -> Result<WorkoutOutcome, AscendError> {
        snapshot.validate()?;
        let mut progress = self
            .store
            .load(user)?
            .ok_or_else(|| AscendError::JourneyNotStarted(user.clone()))?;

        let merge = BestPerformanceTracker::merge_best(&progress.best, &snapshot);
        let basis = match self.policy {
            StagePolicy::LatestWorkout => &snapshot,
            StagePolicy::AllTimeBest => merge.best(),
        };
        let stage = self.resolver.resolve(basis).clone();

        let previous_stage = std::mem::replace(&mut progress.current_stage, stage.clone());
        progress.best = *merge.best();
        progress.updated_at = now;

        let entry = self.store.commit_workout(&progress, now, snapshot)?;
        let change = StageChange::between(&previous_stage, &stage);

        Ok(WorkoutOutcome {
            entry,
            merge,
            previous_stage,
            stage,
            change,
        })
    }

    /// The stored progress record.
    pub fn progress(&self, user: &UserId) -> Result<UserProgress, AscendError> {
        self.store
            .load(user)?
            .ok_or_else(|| AscendError::UserNotFound(user.clone()))
    }

    /// What the user still lacks for the next stage.
    ///
    /// Gaps are measured from the same snapshot the stage policy uses: the
    /// latest workout (or the baseline before any workout), or the best record.
    pub fn progress_to_next(&self, user: &UserId) -> Result<StageProgress, AscendError> {
        let progress = self.progress(user)?;
        let basis = match self.policy {
            StagePolicy::LatestWorkout => self
                .store
                .latest_workout(user)?
                .map_or(progress.baseline, |entry| entry.snapshot),
            StagePolicy::AllTimeBest => progress.best,
        };
        Ok(self
            .resolver
            .progress_to_next(&basis, progress.current_stage.rank))
    }

    /// Workout history, newest first. `limit` is capped at the history maximum.
    pub fn history(&self, user: &UserId, limit: usize) -> Result<Vec<WorkoutEntry>, AscendError> {
        if self.store.load(user)?.is_none() {
            return Err(AscendError::UserNotFound(user.clone()));
        }
        self.store.workouts(user, limit.min(MAX_HISTORY_LIMIT))
    }

    /// Number of workouts logged so far.
    pub fn workout_count(&self, user: &UserId) -> Result<usize, AscendError> {
        self.store.workout_count(user)
    }

    /// Set the display name shown on the profile.
    pub fn set_username(
        &mut self,
        user: &UserId,
        username: &str,
        now: Timestamp,
    ) -> Result<UserProgress, AscendError> {
        let name = validate_username(username)?;
        let mut progress = self.progress(user)?;
        progress.username = Some(name);
        progress.updated_at = now;
        self.store.save(&progress)?;
        Ok(progress)
    }

    /// All users with a progress record.
    pub fn users(&self) -> Result<Vec<UserId>, AscendError> {
        self.store.users()
    }
}

// =============================================================================
// TESTS
// =============================================================================
