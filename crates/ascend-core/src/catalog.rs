//! # Stage Catalog
//!
//! The fixed, ordered progression of achievement stages.
//!
//! A catalog is built once at process start (from the reference table or a
//! configuration file) and shared by cheap clone with every consumer: the
//! resolver, the journey and any display code. It is never mutated.
//!
//! ## Structural rules (enforced)
//!
//! - At least one stage, at most `MAX_STAGES`
//! - Ranks contiguous from 1, in ascending order
//! - Non-empty titles
//!
//! ## Monotonicity (reported, not enforced)
//!
//! Rep minimums should not decrease and the run maximum should not increase
//! as rank goes up. A catalog that breaks this still resolves, but
//! progression becomes non-monotonic; [`StageCatalog::monotonicity_violations`]
//! lists the offending pairs so the application can warn about them.

use crate::primitives::{MAX_STAGES, MAX_TITLE_LENGTH};
use crate::{AscendError, Metric, RunTime, StageDefinition, Thresholds};
use std::sync::Arc;

/// Immutable, shareable sequence of stage definitions, rank-ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCatalog {
    stages: Arc<[StageDefinition]>,
}

/// A pair of adjacent stages whose thresholds regress on one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonotonicityViolation {
    pub lower_rank: u32,
    pub higher_rank: u32,
    pub metric: Metric,
}

impl std::fmt::Display for MonotonicityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stage {} requires less {} than stage {}",
            self.higher_rank, self.metric, self.lower_rank
        )
    }
}

impl StageCatalog {
    /// Build a catalog, validating its structural rules.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, AscendError> {
        if stages.is_empty() {
            return Err(AscendError::InvalidCatalog(
                "catalog must define at least one stage".to_string(),
            ));
        }
        if stages.len() > MAX_STAGES {
            return Err(AscendError::InvalidCatalog(format!(
                "catalog defines {} stages, maximum is {}",
                stages.len(),
                MAX_STAGES
            )));
        }

        for (index, stage) in stages.iter().enumerate() {
            let expected = index as u32 + 1;
            if stage.rank != expected {
                return Err(AscendError::InvalidCatalog(format!(
                    "stage at position {} has rank {}, expected {}",
                    index + 1,
                    stage.rank,
                    expected
                )));
            }
            let title = stage.title.trim();
            if title.is_empty() || title.len() > MAX_TITLE_LENGTH {
                return Err(AscendError::InvalidCatalog(format!(
                    "stage {} title must be 1..={} bytes",
                    stage.rank, MAX_TITLE_LENGTH
                )));
            }
        }

        Ok(Self {
            stages: stages.into(),
        })
    }

    /// The seven-stage reference progression.
    #[must_use]
    pub fn reference() -> Self {
        let stage = |rank, title: &str, push, sit, squat, pull, run| {
            StageDefinition::new(rank, title, Thresholds::new(push, sit, squat, pull, run))
        };
        let stages: Vec<StageDefinition> = vec![
            stage(1, "Awakened Seeker", 10, 20, 20, 0, RunTime::from_minutes(45)),
            stage(2, "Pathfinder", 20, 30, 30, 1, RunTime::from_minutes(40)),
            stage(3, "Disciple", 30, 40, 50, 3, RunTime::from_minutes(35)),
            stage(4, "Enlightened Warrior", 50, 50, 75, 5, RunTime::from_minutes(30)),
            stage(5, "Mountain Sage", 70, 75, 90, 10, RunTime::from_minutes(27)),
            stage(6, "Heavenly Champion", 90, 90, 100, 15, RunTime::from_minutes(25)),
            // 24.98 minutes
            stage(7, "Monkey King Ascended", 100, 100, 100, 20, RunTime::from_millis(1_498_800)),
        ];
        Self {
            stages: stages.into(),
        }
    }

    /// Number of stages (always at least 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages in ascending rank order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StageDefinition> + ExactSizeIterator {
        self.stages.iter()
    }

    /// The rank-1 stage, the floor every user starts from.
    #[must_use]
    pub fn lowest(&self) -> &StageDefinition {
        // Non-empty by construction.
        &self.stages[0]
    }

    /// The terminal stage.
    #[must_use]
    pub fn highest(&self) -> &StageDefinition {
        &self.stages[self.stages.len() - 1]
    }

    /// Look up a stage by rank.
    #[must_use]
    pub fn get(&self, rank: u32) -> Option<&StageDefinition> {
        let index = (rank as usize).checked_sub(1)?;
        self.stages.get(index)
    }

    /// The stage directly above `rank`, if any.
    #[must_use]
    pub fn next_after(&self, rank: u32) -> Option<&StageDefinition> {
        self.get(rank.saturating_add(1))
    }

    /// Adjacent stage pairs whose thresholds get easier as rank increases.
    #[must_use]
    pub fn monotonicity_violations(&self) -> Vec<MonotonicityViolation> {
        let mut violations = Vec::new();
        for pair in self.stages.windows(2) {
            let (lower, higher) = (&pair[0], &pair[1]);
            for metric in Metric::REPS {
                let lower_min = lower.thresholds.min_reps(metric).unwrap_or(0);
                let higher_min = higher.thresholds.min_reps(metric).unwrap_or(0);
                if higher_min < lower_min {
                    violations.push(MonotonicityViolation {
                        lower_rank: lower.rank,
                        higher_rank: higher.rank,
                        metric,
                    });
                }
            }
            if higher.thresholds.max_run_5k > lower.thresholds.max_run_5k {
                violations.push(MonotonicityViolation {
                    lower_rank: lower.rank,
                    higher_rank: higher.rank,
                    metric: Metric::Run5k,
                });
            }
        }
        violations
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::REFERENCE_STAGE_COUNT;

    fn stage(rank: u32, title: &str) -> StageDefinition {
        StageDefinition::new(
            rank,
            title,
            Thresholds::new(rank, rank, rank, rank, RunTime::from_minutes(60 - rank)),
        )
    }

    #[test]
    fn reference_catalog_shape() {
        let catalog = StageCatalog::reference();
        assert_eq!(catalog.len(), REFERENCE_STAGE_COUNT);
        assert_eq!(catalog.lowest().title, "Awakened Seeker");
        assert_eq!(catalog.highest().title, "Monkey King Ascended");
        assert_eq!(
            catalog.highest().thresholds.max_run_5k,
            "24:58.8".parse::<RunTime>().expect("parse")
        );
    }

    #[test]
    fn reference_catalog_passes_own_validation() {
        let catalog = StageCatalog::reference();
        let rebuilt = StageCatalog::new(catalog.iter().cloned().collect()).expect("valid");
        assert_eq!(rebuilt, catalog);
    }

    #[test]
    fn reference_catalog_is_monotonic() {
        assert!(StageCatalog::reference().monotonicity_violations().is_empty());
    }

    #[test]
    fn empty_catalog_rejected() {
        let result = StageCatalog::new(Vec::new());
        assert!(matches!(result, Err(AscendError::InvalidCatalog(_))));
    }

    #[test]
    fn non_contiguous_ranks_rejected() {
        let result = StageCatalog::new(vec![stage(1, "One"), stage(3, "Three")]);
        assert!(matches!(result, Err(AscendError::InvalidCatalog(_))));
    }

    #[test]
    fn ranks_must_start_at_one() {
        let result = StageCatalog::new(vec![stage(2, "Two")]);
        assert!(result.is_err());
    }

    #[test]
    fn blank_title_rejected() {
        let result = StageCatalog::new(vec![stage(1, "  ")]);
        assert!(result.is_err());
    }

    #[test]
    fn lookup_by_rank() {
        let catalog = StageCatalog::reference();
        assert_eq!(catalog.get(0), None);
        assert_eq!(catalog.get(3).map(|s| s.title.as_str()), Some("Disciple"));
        assert_eq!(catalog.next_after(6).map(|s| s.rank), Some(7));
        assert_eq!(catalog.next_after(7), None);
    }

    #[test]
    fn single_stage_catalog_is_its_own_floor_and_ceiling() {
        let catalog = StageCatalog::new(vec![stage(1, "Only")]).expect("valid");
        assert_eq!(catalog.lowest(), catalog.highest());
    }

    #[test]
    fn monotonicity_violation_reported() {
        let easy = StageDefinition::new(
            2,
            "Easier",
            Thresholds::new(5, 50, 50, 5, RunTime::from_minutes(50)),
        );
        let base = StageDefinition::new(
            1,
            "Base",
            Thresholds::new(10, 20, 20, 0, RunTime::from_minutes(45)),
        );
        let catalog = StageCatalog::new(vec![base, easy]).expect("structurally valid");
        let violations = catalog.monotonicity_violations();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.metric == Metric::Pushups));
        assert!(violations.iter().any(|v| v.metric == Metric::Run5k));
    }

    #[test]
    fn clones_share_storage() {
        let catalog = StageCatalog::reference();
        let shared = catalog.clone();
        assert!(Arc::ptr_eq(&catalog.stages, &shared.stages));
    }
}
