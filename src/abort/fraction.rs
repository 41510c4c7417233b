//! Abort after a fraction of the search space.

use crate::abort::AbortCondition;
use crate::data::TuningData;

/// Stops once `⌈fraction · |SP|⌉` *distinct* configurations have an outcome.
///
/// Counting distinct configurations (rather than raw evaluations) makes
/// `Fraction(1.0)` coincide with full exploration even when the technique
/// proposes duplicates.
#[derive(Debug, Clone)]
pub struct Fraction {
    fraction: f64,
}

impl Fraction {
    /// `fraction` is clamped to `[0,1]`.
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    fn target(&self, data: &TuningData) -> u64 {
        (self.fraction * data.constrained_search_space_size as f64).ceil() as u64
    }
}

impl AbortCondition for Fraction {
    fn stop(&self, data: &TuningData) -> bool {
        data.distinct_evaluations >= self.target(data)
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        let target = self.target(data);
        if target == 0 {
            return Some(1.0);
        }
        Some((data.distinct_evaluations as f64 / target as f64).min(1.0))
    }

    fn describe(&self) -> String {
        format!("Fraction({})", self.fraction)
    }
}

/// Stops once the number of valid evaluations reaches `⌈fraction · |SP|⌉`.
#[derive(Debug, Clone)]
pub struct ValidFraction {
    fraction: f64,
}

impl ValidFraction {
    /// `fraction` is clamped to `[0,1]`.
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    fn target(&self, data: &TuningData) -> u64 {
        (self.fraction * data.constrained_search_space_size as f64).ceil() as u64
    }
}

impl AbortCondition for ValidFraction {
    fn stop(&self, data: &TuningData) -> bool {
        data.valid_evaluations >= self.target(data)
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        let target = self.target(data);
        if target == 0 {
            return Some(1.0);
        }
        Some((data.valid_evaluations as f64 / target as f64).min(1.0))
    }

    fn describe(&self) -> String {
        format!("ValidFraction({})", self.fraction)
    }
}
