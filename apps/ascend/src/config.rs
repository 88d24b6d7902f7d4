//! # Configuration
//!
//! Optional TOML configuration for the Ascend binary.
//!
//! ```toml
//! [journey]
//! stage_policy = "all_time_best"   # or "latest_workout" (default)
//!
//! [[stages]]
//! rank = 1
//! title = "Awakened Seeker"
//! pushups = 10
//! situps = 20
//! squats = 20
//! pullups = 0
//! max_run_5k = "45:00"
//! ```
//!
//! When no `[[stages]]` are given, the reference seven-stage catalog is used.
//! Run-time limits are `"MM"`, `"MM:SS"` or `"MM:SS.mmm"` strings.

use ascend_core::{
    AscendError, Journey, RunTime, StageCatalog, StageDefinition, StagePolicy, StorageBackend,
    Thresholds,
};
use serde::Deserialize;
use std::path::Path;

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// FILE FORMAT
// =============================================================================

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub journey: JourneyConfig,
    /// Custom stage catalog, replacing the reference one.
    #[serde(default)]
    pub stages: Option<Vec<StageConfig>>,
}

/// `[journey]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JourneyConfig {
    #[serde(default)]
    pub stage_policy: StagePolicy,
}

/// One `[[stages]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub rank: u32,
    pub title: String,
    #[serde(default)]
    pub pushups: u32,
    #[serde(default)]
    pub situps: u32,
    #[serde(default)]
    pub squats: u32,
    #[serde(default)]
    pub pullups: u32,
    pub max_run_5k: String,
}

impl StageConfig {
    fn to_definition(&self) -> Result<StageDefinition, AscendError> {
        let max_run_5k: RunTime = self.max_run_5k.parse().map_err(|e| {
            AscendError::ConfigError(format!("stage {}: max_run_5k: {}", self.rank, e))
        })?;
        Ok(StageDefinition::new(
            self.rank,
            self.title.clone(),
            Thresholds::new(self.pushups, self.situps, self.squats, self.pullups, max_run_5k),
        ))
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, AscendError> {
        toml::from_str(text).map_err(|e| AscendError::ConfigError(e.to_string()))
    }

    /// Load configuration from a file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, AscendError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            AscendError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(AscendError::ConfigError(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            AscendError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Build the stage catalog, warning about non-monotonic thresholds.
    pub fn catalog(&self) -> Result<StageCatalog, AscendError> {
        let catalog = match &self.stages {
            None => StageCatalog::reference(),
            Some(entries) => {
                let stages = entries
                    .iter()
                    .map(StageConfig::to_definition)
                    .collect::<Result<Vec<_>, _>>()?;
                StageCatalog::new(stages)?
            }
        };

        for violation in catalog.monotonicity_violations() {
            tracing::warn!(
                event = "catalog_not_monotonic",
                lower_rank = violation.lower_rank,
                higher_rank = violation.higher_rank,
                metric = %violation.metric,
                "Stage catalog is not monotonic: {}",
                violation
            );
        }

        Ok(catalog)
    }

    /// Open a journey over the configured catalog and policy.
    pub fn open_journey(
        &self,
        db_path: &Path,
        backend: &str,
    ) -> Result<Journey<StorageBackend>, AscendError> {
        let catalog = self.catalog()?;
        let journey = match backend {
            "redb" => Journey::with_redb(db_path, catalog)?,
            "memory" => Journey::in_memory(catalog),
            other => {
                return Err(AscendError::ConfigError(format!(
                    "Unknown backend '{}' (expected redb or memory)",
                    other
                )));
            }
        };
        Ok(journey.with_policy(self.journey.stage_policy))
    }
}

// =============================================================================
// TESTS
// =============================================================================
