//! Abort after a wall-clock duration.

use std::time::Duration as StdDuration;

use crate::abort::AbortCondition;
use crate::data::TuningData;

/// Stops once the wall-clock time since tuning start reaches the limit.
///
/// The tuner checks between evaluations, so a long-running cost function
/// delays the stop until it returns.
#[derive(Debug, Clone)]
pub struct Duration {
    limit: StdDuration,
}

impl Duration {
    pub fn new(limit: StdDuration) -> Self {
        Self { limit }
    }
}

impl AbortCondition for Duration {
    fn stop(&self, data: &TuningData) -> bool {
        data.elapsed() >= self.limit
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        if self.limit.is_zero() {
            return Some(1.0);
        }
        Some((data.elapsed().as_secs_f64() / self.limit.as_secs_f64()).min(1.0))
    }

    fn describe(&self) -> String {
        format!("Duration({:?})", self.limit)
    }
}
