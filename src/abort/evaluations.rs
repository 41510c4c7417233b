//! Abort after a number of evaluations.

use crate::abort::AbortCondition;
use crate::data::TuningData;

/// Stops once the number of evaluated configurations reaches the limit.
#[derive(Debug, Clone)]
pub struct Evaluations {
    limit: u64,
}

impl Evaluations {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl AbortCondition for Evaluations {
    fn stop(&self, data: &TuningData) -> bool {
        data.evaluations >= self.limit
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        if self.limit == 0 {
            return Some(1.0);
        }
        Some((data.evaluations as f64 / self.limit as f64).min(1.0))
    }

    fn describe(&self) -> String {
        format!("Evaluations({})", self.limit)
    }
}

/// Stops once the number of *valid* evaluated configurations reaches the
/// limit.
#[derive(Debug, Clone)]
pub struct ValidEvaluations {
    limit: u64,
}

impl ValidEvaluations {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl AbortCondition for ValidEvaluations {
    fn stop(&self, data: &TuningData) -> bool {
        data.valid_evaluations >= self.limit
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        if self.limit == 0 {
            return Some(1.0);
        }
        Some((data.valid_evaluations as f64 / self.limit as f64).min(1.0))
    }

    fn describe(&self) -> String {
        format!("ValidEvaluations({})", self.limit)
    }
}
