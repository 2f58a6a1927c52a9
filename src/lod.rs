//! Level-of-detail classification
//!
//! Assigns each entity a coarseness tier from its distance to the camera.
//! Pure and monotonic: farther never yields a finer band.

use serde::{Deserialize, Serialize};

/// Detail tier, ordered fine to coarse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LodLevel {
    High,
    Medium,
    Low,
    /// Beyond the largest threshold; skip update/render work entirely
    Culled,
}

/// Ascending distance thresholds for the three visible bands
///
/// Distances at or beyond `low` classify as [`LodLevel::Culled`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodThresholds {
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            high: 300.0,
            medium: 600.0,
            low: 1000.0,
        }
    }
}

impl LodThresholds {
    /// Thresholds are usable iff strictly ascending and positive
    pub fn is_ascending(&self) -> bool {
        self.high > 0.0 && self.high < self.medium && self.medium < self.low
    }
}

impl LodLevel {
    /// Bucket a camera distance against the thresholds
    #[inline]
    pub fn classify(distance: f32, thresholds: &LodThresholds) -> LodLevel {
        if distance < thresholds.high {
            LodLevel::High
        } else if distance < thresholds.medium {
            LodLevel::Medium
        } else if distance < thresholds.low {
            LodLevel::Low
        } else {
            LodLevel::Culled
        }
    }
}
