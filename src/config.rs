//! Analyzer configuration
//!
//! All settings have defaults, so an empty JSON object is a valid configuration.

use crate::error::AnalyzerError;
use crate::types::UnitSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds deciding whether a field carries substantial data.
///
/// With `T` time-series records, a field is substantial when its non-zero
/// count reaches `max(nonzero_floor, floor(T * nonzero_fraction))` or its
/// non-null count reaches `max(nonnull_floor, floor(T * nonnull_fraction))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityThresholds {
    pub nonzero_floor: usize,
    pub nonzero_fraction: f64,
    pub nonnull_floor: usize,
    pub nonnull_fraction: f64,
}

impl Default for AvailabilityThresholds {
    fn default() -> Self {
        Self {
            nonzero_floor: 3,
            nonzero_fraction: 0.01,
            nonnull_floor: 10,
            nonnull_fraction: 0.02,
        }
    }
}

impl AvailabilityThresholds {
    /// Minimum non-zero samples for `total` records
    pub fn min_nonzero(&self, total: usize) -> usize {
        self.nonzero_floor.max(fraction_of(total, self.nonzero_fraction))
    }

    /// Minimum non-null samples for `total` records
    pub fn min_nonnull(&self, total: usize) -> usize {
        self.nonnull_floor.max(fraction_of(total, self.nonnull_fraction))
    }
}

fn fraction_of(total: usize, fraction: f64) -> usize {
    (total as f64 * fraction).floor() as usize
}

/// Top-level analyzer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Unit system for speed and pace
    pub units: UnitSystem,
    /// Availability filtering thresholds
    pub thresholds: AvailabilityThresholds,
}

impl AnalyzerConfig {
    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalyzerError> {
        let config: AnalyzerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, AnalyzerError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), AnalyzerError> {
        let t = &self.thresholds;
        for (name, fraction) in [
            ("nonzero_fraction", t.nonzero_fraction),
            ("nonnull_fraction", t.nonnull_fraction),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(AnalyzerError::ConfigError(format!(
                    "{} must be within 0..=1, got {}",
                    name, fraction
                )));
            }
        }
        Ok(())
    }
}
