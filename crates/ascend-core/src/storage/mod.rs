//! # Progress Storage
//!
//! The persistence collaborator behind a [`Journey`](crate::Journey).
//!
//! A store keeps one [`UserProgress`] record per user plus an append-only
//! log of [`WorkoutEntry`] values. Entries are never edited or deleted; their
//! `seq` numbers increase in append order and define history order.
//!
//! Two backends are provided:
//! - [`MemoryStore`]: BTreeMap-backed, volatile
//! - [`RedbStore`]: disk-backed, ACID, survives restarts

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::{AscendError, PerformanceSnapshot, Timestamp, UserId, UserProgress, WorkoutEntry};
use std::path::Path;

/// Read and write access to per-user progress.
pub trait ProgressStore {
    /// Load the progress record for a user, if one exists.
    fn load(&self, user: &UserId) -> Result<Option<UserProgress>, AscendError>;

    /// Create or replace the progress record for `progress.user`.
    fn save(&mut self, progress: &UserProgress) -> Result<(), AscendError>;

    /// Append an immutable workout entry, assigning the next sequence number.
    fn append_workout(
        &mut self,
        user: &UserId,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError>;

    /// Append a workout and save the updated record together.
    ///
    /// Backends with transactions override this to make both writes atomic.
    fn commit_workout(
        &mut self,
        progress: &UserProgress,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError> {
        let entry = self.append_workout(&progress.user, recorded_at, snapshot)?;
        self.save(progress)?;
        Ok(entry)
    }

    /// Up to `limit` workout entries, newest first.
    fn workouts(&self, user: &UserId, limit: usize) -> Result<Vec<WorkoutEntry>, AscendError>;

    /// The most recently appended workout entry.
    fn latest_workout(&self, user: &UserId) -> Result<Option<WorkoutEntry>, AscendError> {
        Ok(self.workouts(user, 1)?.into_iter().next())
    }

    /// Number of workout entries logged by a user.
    fn workout_count(&self, user: &UserId) -> Result<usize, AscendError>;

    /// All users with a progress record, in identifier order.
    fn users(&self) -> Result<Vec<UserId>, AscendError>;
}

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Storage backend selected at runtime.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl StorageBackend {
    /// Open or create a redb-backed store.
    pub fn redb(path: impl AsRef<Path>) -> Result<Self, AscendError> {
        Ok(Self::Persistent(RedbStore::open(path)?))
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, StorageBackend::Persistent(_))
    }

    fn store(&self) -> &dyn ProgressStore {
        match self {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn ProgressStore {
        match self {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }
}

impl ProgressStore for StorageBackend {
    fn load(&self, user: &UserId) -> Result<Option<UserProgress>, AscendError> {
        self.store().load(user)
    }

    fn save(&mut self, progress: &UserProgress) -> Result<(), AscendError> {
        self.store_mut().save(progress)
    }

    fn append_workout(
        &mut self,
        user: &UserId,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError> {
        self.store_mut().append_workout(user, recorded_at, snapshot)
    }

    fn commit_workout(
        &mut self,
        progress: &UserProgress,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError> {
        self.store_mut()
            .commit_workout(progress, recorded_at, snapshot)
    }

    fn workouts(&self, user: &UserId, limit: usize) -> Result<Vec<WorkoutEntry>, AscendError> {
        self.store().workouts(user, limit)
    }

    fn workout_count(&self, user: &UserId) -> Result<usize, AscendError> {
        self.store().workout_count(user)
    }

    fn users(&self) -> Result<Vec<UserId>, AscendError> {
        self.store().users()
    }
}
