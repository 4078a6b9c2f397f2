//! Human-pacing rate limiter.

use rand::distr::{Distribution, Uniform};

use crate::core::types::Settings;

/// Inter-action delay configuration, re-derived from the live [`Settings`]
/// at every loop boundary so panel edits take effect on the next iteration.
#[derive(Debug, Clone, Copy)]
pub struct ActionDelay {
    /// Minimum delay in milliseconds between actions.
    pub min_ms: u64,
    /// Maximum delay in milliseconds between actions.
    pub max_ms: u64,
}

impl ActionDelay {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_ms: settings.min_delay_ms,
            max_ms: settings.max_delay_ms,
        }
    }

    /// Draw a delay uniformly from `[min, max)`. A degenerate range
    /// (`min == max`, or an inverted range produced by a mid-run settings
    /// edit) deterministically yields `min`.
    pub fn sample(&self) -> u64 {
        if self.min_ms >= self.max_ms {
            return self.min_ms;
        }
        let mut rng = rand::rng();
        let dist = Uniform::new(self.min_ms, self.max_ms).unwrap();
        dist.sample(&mut rng)
    }
}
