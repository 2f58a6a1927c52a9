//! Per-category frame throttling
//!
//! Maps update categories ("ai", "particles", ...) to a period in frames.
//! The run decision is a pure function of the shared frame counter, so a
//! category with period `p` executes on frames 0, p, 2p, ... regardless of
//! wall-clock timing - deterministic and reproducible cadence.

use hashbrown::HashMap;
use tracing::warn;

/// Built-in category periods (frames between executions)
pub const DEFAULT_PERIODS: [(&str, u32); 4] =
    [("ai", 3), ("particles", 1), ("effects", 2), ("ui", 2)];

/// Frame-period registry for update categories
pub struct ThrottleScheduler {
    periods: HashMap<String, u32>,
}

impl ThrottleScheduler {
    pub fn new() -> Self {
        let mut periods = HashMap::with_capacity(DEFAULT_PERIODS.len());
        for (category, frames) in DEFAULT_PERIODS {
            periods.insert(category.to_string(), frames);
        }
        Self { periods }
    }

    /// Period for a category; unknown categories run every frame
    pub fn period(&self, category: &str) -> u32 {
        match self.periods.get(category) {
            Some(&frames) => frames,
            None => {
                warn!(category, "unknown throttle category, defaulting to every frame");
                1
            }
        }
    }

    /// Set a category's period; values below 1 are clamped to 1
    pub fn set_period(&mut self, category: &str, frames: u32) {
        self.periods.insert(category.to_string(), frames.max(1));
    }

    /// Whether the category is due on the given frame
    #[inline]
    pub fn should_run(&self, category: &str, frame: u64) -> bool {
        frame % u64::from(self.period(category)) == 0
    }

    /// Iterate over configured (category, period) pairs
    pub fn periods(&self) -> impl Iterator<Item = (&str, u32)> {
        self.periods.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

impl Default for ThrottleScheduler {
    fn default() -> Self {
        Self::new()
    }
}
