use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::lod::LodThresholds;
use crate::spatial::DEFAULT_CELL_SIZE;

/// Optimizer configuration
///
/// All subsystem flags are orthogonal; any combination is valid. Disabled
/// subsystems answer queries with empty/no-op results instead of erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Enable the uniform-grid spatial index
    pub spatial_grid_enabled: bool,
    /// Enable type-keyed entity batching
    pub batching_enabled: bool,
    /// Enable named object pools
    pub pooling_enabled: bool,
    /// Enable distance-based LOD classification
    pub lod_enabled: bool,
    /// Spatial grid cell size in world units
    pub cell_size: f32,
    /// LOD distance bands
    pub lod_thresholds: LodThresholds,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            spatial_grid_enabled: true,
            batching_enabled: true,
            pooling_enabled: true,
            lod_enabled: true,
            cell_size: DEFAULT_CELL_SIZE,
            lod_thresholds: LodThresholds::default(),
        }
    }
}

impl OptimizerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("PERF_CELL_SIZE") {
            match raw.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 && parsed.is_finite() => config.cell_size = parsed,
                _ => warn!("Invalid PERF_CELL_SIZE '{}', using default", raw),
            }
        }

        let mut thresholds = config.lod_thresholds;
        read_distance("PERF_LOD_HIGH", &mut thresholds.high);
        read_distance("PERF_LOD_MEDIUM", &mut thresholds.medium);
        read_distance("PERF_LOD_LOW", &mut thresholds.low);
        if thresholds.is_ascending() {
            config.lod_thresholds = thresholds;
        } else {
            warn!(
                "LOD thresholds {:?} are not ascending, using defaults",
                thresholds
            );
        }

        read_flag("PERF_SPATIAL_ENABLED", &mut config.spatial_grid_enabled);
        read_flag("PERF_BATCHING_ENABLED", &mut config.batching_enabled);
        read_flag("PERF_POOLING_ENABLED", &mut config.pooling_enabled);
        read_flag("PERF_LOD_ENABLED", &mut config.lod_enabled);

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !self.lod_thresholds.is_ascending() {
            return Err(ConfigError::ThresholdsNotAscending {
                high: self.lod_thresholds.high,
                medium: self.lod_thresholds.medium,
                low: self.lod_thresholds.low,
            });
        }
        Ok(())
    }
}

fn read_distance(var: &str, target: &mut f32) {
    if let Ok(raw) = std::env::var(var) {
        match raw.parse::<f32>() {
            Ok(parsed) if parsed > 0.0 && parsed.is_finite() => *target = parsed,
            _ => warn!("Invalid {} '{}', using default", var, raw),
        }
    }
}

fn read_flag(var: &str, target: &mut bool) {
    if let Ok(raw) = std::env::var(var) {
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "on" => *target = true,
            "0" | "false" | "off" => *target = false,
            _ => warn!("Invalid {} '{}', using default", var, raw),
        }
    }
}

/// Configuration validation failures
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cell_size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("LOD thresholds must ascend: high={high} medium={medium} low={low}")]
    ThresholdsNotAscending { high: f32, medium: f32, low: f32 },
}
