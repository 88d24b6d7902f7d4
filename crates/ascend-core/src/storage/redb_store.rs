//! # redb-backed Progress Storage
//!
//! A disk-backed progress store using the redb embedded database:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Records and workout entries are serialized with postcard. Workout entries
//! are keyed by `(user, seq)` so one user's history is a contiguous range.

use super::ProgressStore;
use crate::{AscendError, PerformanceSnapshot, Timestamp, UserId, UserProgress, WorkoutEntry};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;

/// Table for progress records: user id -> serialized UserProgress
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Table for workout entries: (user id, seq) -> serialized WorkoutEntry
const WORKOUTS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("workouts");

/// Table for per-user sequence counters: user id -> next seq
const WORKOUT_SEQ: TableDefinition<&str, u64> = TableDefinition::new("workout_seq");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const SCHEMA_VERSION: u64 = 1;

fn io_err(e: impl std::fmt::Display) -> AscendError {
    AscendError::IoError(e.to_string())
}

fn ser_err(e: impl std::fmt::Display) -> AscendError {
    AscendError::SerializationError(e.to_string())
}

/// A disk-backed progress store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a progress database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AscendError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(USERS).map_err(io_err)?;
            let _ = write_txn.open_table(WORKOUTS).map_err(io_err)?;
            let _ = write_txn.open_table(WORKOUT_SEQ).map_err(io_err)?;
            {
                let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
                let stored = meta
                    .get("schema_version")
                    .map_err(io_err)?
                    .map(|v| v.value());
                match stored {
                    None => {
                        meta.insert("schema_version", SCHEMA_VERSION)
                            .map_err(io_err)?;
                    }
                    Some(SCHEMA_VERSION) => {}
                    Some(other) => {
                        return Err(AscendError::IoError(format!(
                            "unsupported schema version {other} (expected {SCHEMA_VERSION})"
                        )));
                    }
                }
            }
            write_txn.commit().map_err(io_err)?;
        }

        Ok(Self { db })
    }

    fn save_in(txn: &WriteTransaction, progress: &UserProgress) -> Result<(), AscendError> {
        let bytes = postcard::to_allocvec(progress).map_err(ser_err)?;
        let mut table = txn.open_table(USERS).map_err(io_err)?;
        table
            .insert(progress.user.as_str(), bytes.as_slice())
            .map_err(io_err)?;
        Ok(())
    }

    fn append_in(
        txn: &WriteTransaction,
        user: &UserId,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError> {
        let seq = {
            let mut seq_table = txn.open_table(WORKOUT_SEQ).map_err(io_err)?;
            let seq = seq_table
                .get(user.as_str())
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            seq_table
                .insert(user.as_str(), seq.saturating_add(1))
                .map_err(io_err)?;
            seq
        };

        let entry = WorkoutEntry {
            seq,
            recorded_at,
            snapshot,
        };
        let bytes = postcard::to_allocvec(&entry).map_err(ser_err)?;
        let mut table = txn.open_table(WORKOUTS).map_err(io_err)?;
        table
            .insert((user.as_str(), seq), bytes.as_slice())
            .map_err(io_err)?;
        Ok(entry)
    }
}

impl ProgressStore for RedbStore {
    fn load(&self, user: &UserId) -> Result<Option<UserProgress>, AscendError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(USERS).map_err(io_err)?;
        match table.get(user.as_str()).map_err(io_err)? {
            Some(data) => {
                let progress: UserProgress = postcard::from_bytes(data.value()).map_err(ser_err)?;
                Ok(Some(progress))
            }
            None => Ok(None),
        }
    }

    fn save(&mut self, progress: &UserProgress) -> Result<(), AscendError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        Self::save_in(&write_txn, progress)?;
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn append_workout(
        &mut self,
        user: &UserId,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let entry = Self::append_in(&write_txn, user, recorded_at, snapshot)?;
        write_txn.commit().map_err(io_err)?;
        Ok(entry)
    }

    fn commit_workout(
        &mut self,
        progress: &UserProgress,
        recorded_at: Timestamp,
        snapshot: PerformanceSnapshot,
    ) -> Result<WorkoutEntry, AscendError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let entry = Self::append_in(&write_txn, &progress.user, recorded_at, snapshot)?;
        Self::save_in(&write_txn, progress)?;
        write_txn.commit().map_err(io_err)?;
        Ok(entry)
    }

    fn workouts(&self, user: &UserId, limit: usize) -> Result<Vec<WorkoutEntry>, AscendError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(WORKOUTS).map_err(io_err)?;
        let key = user.as_str();

        let mut entries = Vec::new();
        for item in table
            .range((key, 0u64)..=(key, u64::MAX))
            .map_err(io_err)?
            .rev()
            .take(limit)
        {
            let (_, value) = item.map_err(io_err)?;
            let entry: WorkoutEntry = postcard::from_bytes(value.value()).map_err(ser_err)?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn workout_count(&self, user: &UserId) -> Result<usize, AscendError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(WORKOUT_SEQ).map_err(io_err)?;
        let next = table
            .get(user.as_str())
            .map_err(io_err)?
            .map(|v| v.value())
            .unwrap_or(0);
        usize::try_from(next).map_err(io_err)
    }

    fn users(&self) -> Result<Vec<UserId>, AscendError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(USERS).map_err(io_err)?;
        let mut users = Vec::new();
        for item in table.iter().map_err(io_err)? {
            let (key, _) = item.map_err(io_err)?;
            users.push(UserId::parse(key.value())?);
        }
        Ok(users)
    }
}
