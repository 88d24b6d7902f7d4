//! # Stage Resolution
//!
//! Maps a performance snapshot to the single stage it qualifies for.
//!
//! ## Algorithm
//!
//! Scan the catalog from the highest rank downward and return the first stage
//! whose thresholds are all met:
//!
//! | Metric | Condition |
//! |--------|-----------|
//! | push-ups, sit-ups, squats, pull-ups | `snapshot >= minimum` |
//! | 5K run | `snapshot <= maximum` |
//!
//! If nothing qualifies, the lowest stage is returned. A user is never left
//! without a stage, and there is no error path.
//!
//! A zero run time is not special-cased here: `0 <= maximum` holds, so an
//! unattempted run never blocks a stage on its own. Progress reporting does
//! distinguish it (see [`RunGap::NotRecorded`]).

use crate::{Metric, PerformanceSnapshot, RunTime, StageCatalog, StageDefinition};
use serde::{Deserialize, Serialize};

// =============================================================================
// RESOLUTION
// =============================================================================

/// Check whether a snapshot meets every threshold of a stage.
#[must_use]
pub fn qualifies(snapshot: &PerformanceSnapshot, stage: &StageDefinition) -> bool {
    let t = &stage.thresholds;
    snapshot.pushups >= t.pushups
        && snapshot.situps >= t.situps
        && snapshot.squats >= t.squats
        && snapshot.pullups >= t.pullups
        && snapshot.run_5k <= t.max_run_5k
}

/// Return the highest-ranked stage the snapshot qualifies for, or the lowest
/// stage when none qualifies.
#[must_use]
pub fn resolve<'a>(
    snapshot: &PerformanceSnapshot,
    catalog: &'a StageCatalog,
) -> &'a StageDefinition {
    catalog
        .iter()
        .rev()
        .find(|stage| qualifies(snapshot, stage))
        .unwrap_or_else(|| catalog.lowest())
}

// =============================================================================
// STAGE RESOLVER
// =============================================================================

/// Stage Resolver - pure functions over a shared catalog.
#[derive(Debug, Clone, Default)]
pub struct StageResolver {
    catalog: StageCatalog,
}

impl StageResolver {
    #[must_use]
    pub fn new(catalog: StageCatalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Resolve the stage for a snapshot.
    #[must_use]
    pub fn resolve(&self, snapshot: &PerformanceSnapshot) -> &StageDefinition {
        resolve(snapshot, &self.catalog)
    }

    /// What `snapshot` still lacks to reach the stage after `current_rank`.
    ///
    /// An unknown `current_rank` is treated as the lowest stage.
    #[must_use]
    pub fn progress_to_next(
        &self,
        snapshot: &PerformanceSnapshot,
        current_rank: u32,
    ) -> StageProgress {
        let current = self
            .catalog
            .get(current_rank)
            .unwrap_or_else(|| self.catalog.lowest())
            .clone();

        let Some(next) = self.catalog.next_after(current.rank) else {
            return StageProgress::terminal(current);
        };

        let rep_gaps: Vec<RepGap> = Metric::REPS
            .iter()
            .filter_map(|&metric| {
                let required = next.thresholds.min_reps(metric)?;
                let have = snapshot.reps(metric)?;
                (have < required).then(|| RepGap {
                    metric,
                    required,
                    current: have,
                    remaining: required.saturating_sub(have),
                })
            })
            .collect();

        let run_gap = if !snapshot.run_5k.is_recorded() {
            RunGap::NotRecorded
        } else if snapshot.run_5k <= next.thresholds.max_run_5k {
            RunGap::Met
        } else {
            RunGap::Faster(snapshot.run_5k.saturating_sub(next.thresholds.max_run_5k))
        };

        let total = Metric::ALL.len();
        let unmet = rep_gaps.len() + usize::from(!matches!(run_gap, RunGap::Met));
        let percent = ((total - unmet) * 100 / total) as u8;

        StageProgress {
            current,
            next: Some(next.clone()),
            rep_gaps,
            run_gap,
            percent,
        }
    }
}

// =============================================================================
// PROGRESS TOWARD THE NEXT STAGE
// =============================================================================

/// Shortfall on one repetition metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepGap {
    pub metric: Metric,
    pub required: u32,
    pub current: u32,
    pub remaining: u32,
}

/// Standing of the 5K run against the next stage's limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "by", rename_all = "snake_case")]
pub enum RunGap {
    /// Already fast enough.
    Met,
    /// Needs to get faster by this much.
    Faster(RunTime),
    /// No run time on record.
    NotRecorded,
}

/// Progress information toward the next stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub current: StageDefinition,
    pub next: Option<StageDefinition>,
    /// Only metrics that still fall short.
    pub rep_gaps: Vec<RepGap>,
    pub run_gap: RunGap,
    /// Share of the next stage's five requirements already met.
    pub percent: u8,
}

impl StageProgress {
    fn terminal(current: StageDefinition) -> Self {
        Self {
            current,
            next: None,
            rep_gaps: Vec::new(),
            run_gap: RunGap::Met,
            percent: 100,
        }
    }

    /// True once the highest stage has been reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thresholds;

    fn two_stage_catalog() -> StageCatalog {
        StageCatalog::new(vec![
            StageDefinition::new(
                1,
                "One",
                Thresholds::new(10, 20, 20, 0, RunTime::from_minutes(45)),
            ),
            StageDefinition::new(
                2,
                "Two",
                Thresholds::new(20, 30, 30, 1, RunTime::from_minutes(40)),
            ),
        ])
        .expect("valid catalog")
    }

    #[test]
    fn zero_snapshot_resolves_to_lowest() {
        let catalog = StageCatalog::reference();
        let stage = resolve(&PerformanceSnapshot::default(), &catalog);
        assert_eq!(stage.rank, 1);
    }

    #[test]
    fn partial_qualification_picks_lower_stage() {
        let catalog = two_stage_catalog();
        let snapshot = PerformanceSnapshot::new(15, 25, 25, 0, RunTime::from_minutes(42));
        assert_eq!(resolve(&snapshot, &catalog).rank, 1);
    }

    #[test]
    fn highest_thresholds_resolve_to_highest() {
        let catalog = StageCatalog::reference();
        let snapshot = PerformanceSnapshot::new(100, 100, 100, 20, RunTime::from_parts(24, 58));
        assert_eq!(resolve(&snapshot, &catalog).rank, 7);
    }

    #[test]
    fn run_time_is_inclusive_upper_bound() {
        let catalog = two_stage_catalog();
        let at_limit = PerformanceSnapshot::new(20, 30, 30, 1, RunTime::from_minutes(40));
        let over = PerformanceSnapshot::new(20, 30, 30, 1, RunTime::from_parts(40, 1));
        assert_eq!(resolve(&at_limit, &catalog).rank, 2);
        assert_eq!(resolve(&over, &catalog).rank, 1);
    }

    #[test]
    fn unattempted_run_does_not_block() {
        let catalog = two_stage_catalog();
        let snapshot = PerformanceSnapshot::new(25, 35, 35, 2, RunTime::ZERO);
        assert_eq!(resolve(&snapshot, &catalog).rank, 2);
    }

    #[test]
    fn progress_lists_only_shortfalls() {
        let resolver = StageResolver::new(two_stage_catalog());
        let snapshot = PerformanceSnapshot::new(15, 30, 25, 0, RunTime::from_minutes(42));
        let progress = resolver.progress_to_next(&snapshot, 1);

        assert_eq!(progress.next.as_ref().map(|s| s.rank), Some(2));
        let metrics: Vec<Metric> = progress.rep_gaps.iter().map(|g| g.metric).collect();
        assert_eq!(metrics, vec![Metric::Pushups, Metric::Squats, Metric::Pullups]);
        assert_eq!(progress.rep_gaps[0].remaining, 5);
        assert_eq!(progress.run_gap, RunGap::Faster(RunTime::from_minutes(2)));
        // Only sit-ups met: 1 of 5.
        assert_eq!(progress.percent, 20);
    }

    #[test]
    fn progress_reports_missing_run() {
        let resolver = StageResolver::new(two_stage_catalog());
        let snapshot = PerformanceSnapshot::new(20, 30, 30, 1, RunTime::ZERO);
        let progress = resolver.progress_to_next(&snapshot, 1);
        assert!(progress.rep_gaps.is_empty());
        assert_eq!(progress.run_gap, RunGap::NotRecorded);
        assert_eq!(progress.percent, 80);
    }

    #[test]
    fn progress_at_final_stage_is_terminal() {
        let resolver = StageResolver::default();
        let progress = resolver.progress_to_next(&PerformanceSnapshot::default(), 7);
        assert!(progress.is_terminal());
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.current.rank, 7);
    }

    #[test]
    fn progress_unknown_rank_falls_back_to_lowest() {
        let resolver = StageResolver::default();
        let progress = resolver.progress_to_next(&PerformanceSnapshot::default(), 99);
        assert_eq!(progress.current.rank, 1);
        assert_eq!(progress.next.map(|s| s.rank), Some(2));
    }
}
