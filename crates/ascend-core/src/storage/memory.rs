//! In-memory progress store.

use super::ProgressStore;
use crate::{AscendError, PerformanceSnapshot, Timestamp, UserId, UserProgress, WorkoutEntry};
use std::collections::BTreeMap;

/// BTreeMap-backed store. Volatile; used for tests and ephemeral servers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<UserId, UserProgress>,
    workouts: BTreeMap<UserId, Vec<WorkoutEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, user: &UserId) -> Result<Option<UserProgress>, AscendError> {
        Ok(self.records.get(user).cloned())
    }

    fn save(&mut self, progress: &UserProgress) -> Result<(), AscendError> {
        self.records.insert(progress.user.clone(), progress.clone());
        Ok(())
    }

    fn append_workout(
        &mut self,
        user: &UserId,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError> {
        let log = self.workouts.entry(user.clone()).or_default();
        let entry = WorkoutEntry {
            seq: log.len() as u64,
            recorded_at,
            snapshot,
        };
        log.push(entry.clone());
        Ok(entry)
    }

    fn workouts(&self, user: &UserId, limit: usize) -> Result<Vec<WorkoutEntry>, AscendError> {
        Ok(self
            .workouts
            .get(user)
            .map(|log| log.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn workout_count(&self, user: &UserId) -> Result<usize, AscendError> {
        Ok(self.workouts.get(user).map_or(0, Vec::len))
    }

    fn users(&self) -> Result<Vec<UserId>, AscendError> {
        Ok(self.records.keys().cloned().collect())
    }
}
