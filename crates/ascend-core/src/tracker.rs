//! # Best Performance Tracker
//!
//! Merges one workout into the running personal-best record.
//!
//! Each metric improves independently:
//! - rep counts keep the maximum seen
//! - the 5K run keeps the minimum *recorded* time
//!
//! A zero run time means "not attempted" and never replaces a real time.
//! A new time must be recorded and strictly faster than the stored best, so a
//! best of zero is never replaced by a later run.
//!
//! The result is a tagged [`MergeOutcome`] rather than a boolean, so callers
//! can derive their messaging from the outcome alone.

use crate::{Metric, PerformanceSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// MERGE OUTCOME
// =============================================================================

/// Result of merging a snapshot into a best-performance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MergeOutcome {
    /// No metric improved; `best` equals the previous record.
    Unchanged { best: PerformanceSnapshot },
    /// At least one metric set a new record.
    Improved {
        best: PerformanceSnapshot,
        /// Improved metrics, in display order. Never empty.
        records: BTreeSet<Metric>,
    },
}

/// Coarse classification of what improved, for messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Improvement {
    None,
    Reps,
    Time,
    RepsAndTime,
}

impl MergeOutcome {
    /// The (possibly unchanged) best record.
    #[must_use]
    pub fn best(&self) -> &PerformanceSnapshot {
        match self {
            MergeOutcome::Unchanged { best } | MergeOutcome::Improved { best, .. } => best,
        }
    }

    #[must_use]
    pub fn into_best(self) -> PerformanceSnapshot {
        match self {
            MergeOutcome::Unchanged { best } | MergeOutcome::Improved { best, .. } => best,
        }
    }

    #[must_use]
    pub fn improved(&self) -> bool {
        matches!(self, MergeOutcome::Improved { .. })
    }

    /// Metrics that set a new record (empty when unchanged).
    #[must_use]
    pub fn records(&self) -> Vec<Metric> {
        match self {
            MergeOutcome::Unchanged { .. } => Vec::new(),
            MergeOutcome::Improved { records, .. } => records.iter().copied().collect(),
        }
    }

    /// Rep metrics that set a new record.
    #[must_use]
    pub fn rep_records(&self) -> Vec<Metric> {
        self.records()
            .into_iter()
            .filter(Metric::is_rep_count)
            .collect()
    }

    /// True if the 5K run time improved.
    #[must_use]
    pub fn time_record(&self) -> bool {
        match self {
            MergeOutcome::Unchanged { .. } => false,
            MergeOutcome::Improved { records, .. } => records.contains(&Metric::Run5k),
        }
    }

    #[must_use]
    pub fn improvement(&self) -> Improvement {
        match (!self.rep_records().is_empty(), self.time_record()) {
            (false, false) => Improvement::None,
            (true, false) => Improvement::Reps,
            (false, true) => Improvement::Time,
            (true, true) => Improvement::RepsAndTime,
        }
    }
}

// =============================================================================
// TRACKER
// =============================================================================

/// Best Performance Tracker - stateless merge of snapshots into a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestPerformanceTracker;

impl BestPerformanceTracker {
    /// Merge `latest` into `previous_best`, metric by metric.
    #[must_use]
    pub fn merge_best(
        previous_best: &PerformanceSnapshot,
        latest: &PerformanceSnapshot,
    ) -> MergeOutcome {
        let mut best = *previous_best;
        let mut records = BTreeSet::new();

        let mut keep_max = |slot: &mut u32, candidate: u32, metric: Metric| {
            if candidate > *slot {
                *slot = candidate;
                records.insert(metric);
            }
        };
        keep_max(&mut best.pushups, latest.pushups, Metric::Pushups);
        keep_max(&mut best.situps, latest.situps, Metric::Situps);
        keep_max(&mut best.squats, latest.squats, Metric::Squats);
        keep_max(&mut best.pullups, latest.pullups, Metric::Pullups);

        if Self::is_faster(latest, previous_best) {
            best.run_5k = latest.run_5k;
            records.insert(Metric::Run5k);
        }

        if records.is_empty() {
            MergeOutcome::Unchanged { best }
        } else {
            MergeOutcome::Improved { best, records }
        }
    }

    /// True if `latest` holds a recorded run time strictly below the record.
    fn is_faster(latest: &PerformanceSnapshot, previous_best: &PerformanceSnapshot) -> bool {
        latest.run_5k.is_recorded() && latest.run_5k < previous_best.run_5k
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunTime;

    fn run_only(minutes: u32) -> PerformanceSnapshot {
        PerformanceSnapshot {
            run_5k: RunTime::from_minutes(minutes),
            ..PerformanceSnapshot::default()
        }
    }

    #[test]
    fn faster_run_improves_even_when_reps_drop() {
        let previous = PerformanceSnapshot {
            pushups: 20,
            run_5k: RunTime::from_minutes(30),
            ..PerformanceSnapshot::default()
        };
        let latest = PerformanceSnapshot {
            pushups: 18,
            run_5k: RunTime::from_minutes(28),
            ..PerformanceSnapshot::default()
        };

        let outcome = BestPerformanceTracker::merge_best(&previous, &latest);

        assert!(outcome.improved());
        assert_eq!(outcome.best().pushups, 20);
        assert_eq!(outcome.best().run_5k, RunTime::from_minutes(28));
        assert_eq!(outcome.improvement(), Improvement::Time);
        assert!(outcome.rep_records().is_empty());
    }

    #[test]
    fn zero_run_never_overwrites_recorded_best() {
        let outcome = BestPerformanceTracker::merge_best(&run_only(30), &run_only(0));
        assert!(!outcome.improved());
        assert_eq!(outcome.best().run_5k, RunTime::from_minutes(30));
    }

    #[test]
    fn slower_run_is_ignored() {
        let outcome = BestPerformanceTracker::merge_best(&run_only(30), &run_only(31));
        assert_eq!(outcome, MergeOutcome::Unchanged { best: run_only(30) });
    }

    #[test]
    fn zero_best_is_not_replaced_by_a_run() {
        let previous = PerformanceSnapshot::new(10, 10, 10, 0, RunTime::ZERO);
        let latest = PerformanceSnapshot::new(10, 10, 10, 0, RunTime::from_minutes(33));

        let outcome = BestPerformanceTracker::merge_best(&previous, &latest);

        assert!(!outcome.improved());
        assert!(!outcome.time_record());
        assert_eq!(outcome.best().run_5k, RunTime::ZERO);
    }

    #[test]
    fn rep_records_are_listed_in_display_order() {
        let previous = PerformanceSnapshot::new(10, 10, 10, 1, RunTime::from_minutes(40));
        let latest = PerformanceSnapshot::new(12, 9, 15, 1, RunTime::from_minutes(41));

        let outcome = BestPerformanceTracker::merge_best(&previous, &latest);

        assert_eq!(outcome.rep_records(), vec![Metric::Pushups, Metric::Squats]);
        assert_eq!(outcome.improvement(), Improvement::Reps);
        assert_eq!(
            *outcome.best(),
            PerformanceSnapshot::new(12, 10, 15, 1, RunTime::from_minutes(40))
        );
    }

    #[test]
    fn reps_and_time_together() {
        let previous = PerformanceSnapshot::new(10, 10, 10, 1, RunTime::from_minutes(40));
        let latest = PerformanceSnapshot::new(11, 10, 10, 1, RunTime::from_minutes(39));
        let outcome = BestPerformanceTracker::merge_best(&previous, &latest);
        assert_eq!(outcome.improvement(), Improvement::RepsAndTime);
    }

    #[test]
    fn equal_values_are_not_records() {
        let snapshot = PerformanceSnapshot::new(10, 10, 10, 1, RunTime::from_minutes(40));
        let outcome = BestPerformanceTracker::merge_best(&snapshot, &snapshot);
        assert_eq!(outcome.improvement(), Improvement::None);
        assert_eq!(outcome.into_best(), snapshot);
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let previous = PerformanceSnapshot::new(10, 10, 10, 1, RunTime::from_minutes(40));
        let latest = PerformanceSnapshot::new(20, 5, 10, 3, RunTime::from_minutes(35));

        let first = BestPerformanceTracker::merge_best(&previous, &latest);
        let second = BestPerformanceTracker::merge_best(first.best(), &latest);

        assert!(first.improved());
        assert!(!second.improved());
        assert_eq!(second.best(), first.best());
    }
}
