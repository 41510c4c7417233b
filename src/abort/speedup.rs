//! Abort when the best cost stops improving.

use std::time::Duration as StdDuration;

use crate::abort::AbortCondition;
use crate::data::TuningData;

#[derive(Debug, Clone)]
enum Window {
    Duration(StdDuration),
    Evaluations(u64),
    ValidEvaluations(u64),
}

/// Stops once a trailing window passed without the best cost improving by the
/// given factor.
///
/// The baseline is the best cost in effect just before the window started; the
/// run continues while `baseline / best >= min_speedup`. Costs are assumed
/// positive for the ratio to be meaningful. Before the first valid cost the
/// search is granted one full window to find one.
#[derive(Debug, Clone)]
pub struct Speedup {
    min_speedup: f64,
    window: Window,
}

impl Speedup {
    /// Require the factor within a trailing wall-clock window.
    pub fn over_duration(min_speedup: f64, window: StdDuration) -> Self {
        Self {
            min_speedup,
            window: Window::Duration(window),
        }
    }

    /// Require the factor within a trailing window of evaluations.
    pub fn over_evaluations(min_speedup: f64, window: u64) -> Self {
        Self {
            min_speedup,
            window: Window::Evaluations(window),
        }
    }

    /// Require the factor within a trailing window of valid evaluations.
    pub fn over_valid_evaluations(min_speedup: f64, window: u64) -> Self {
        Self {
            min_speedup,
            window: Window::ValidEvaluations(window),
        }
    }
}

impl AbortCondition for Speedup {
    fn stop(&self, data: &TuningData) -> bool {
        let Some(best) = data.min_cost() else {
            return match self.window {
                Window::Duration(t) => data.elapsed() >= t,
                Window::Evaluations(n) => data.evaluations >= n,
                Window::ValidEvaluations(n) => data.valid_evaluations >= n,
            };
        };
        // last improvement at or before the window start; if the first
        // improvement lies inside the window the run is still improving
        let baseline = data
            .improvement_history
            .iter()
            .rev()
            .find(|e| match self.window {
                Window::Duration(t) => data
                    .elapsed()
                    .checked_sub(t)
                    .is_some_and(|cutoff| e.elapsed <= cutoff),
                Window::Evaluations(n) => data
                    .evaluations
                    .checked_sub(n)
                    .is_some_and(|cutoff| e.evaluations <= cutoff),
                Window::ValidEvaluations(n) => data
                    .valid_evaluations
                    .checked_sub(n)
                    .is_some_and(|cutoff| e.valid_evaluations <= cutoff),
            });
        match baseline.and_then(|e| e.cost) {
            None => false,
            Some(before) => before / best < self.min_speedup,
        }
    }

    fn describe(&self) -> String {
        match self.window {
            Window::Duration(t) => format!("Speedup({}, Duration({t:?}))", self.min_speedup),
            Window::Evaluations(n) => format!("Speedup({}, Evaluations({n}))", self.min_speedup),
            Window::ValidEvaluations(n) => {
                format!("Speedup({}, ValidEvaluations({n}))", self.min_speedup)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::testkit::{data, record};

    #[test]
    fn test_stalled_run_stops_one_window_after_first_cost() {
        let mut d = data(100);
        let condition = Speedup::over_evaluations(2.0, 5);
        for _ in 0..5 {
            record(&mut d, Some(1.0));
            assert!(!condition.stop(&d));
        }
        // sixth evaluation pushes the first (and only) improvement out of the
        // trailing window
        record(&mut d, Some(1.0));
        assert!(condition.stop(&d));
    }

    #[test]
    fn test_improving_run_keeps_going() {
        let mut d = data(100);
        let condition = Speedup::over_evaluations(1.5, 2);
        for cost in [8.0, 4.0, 2.0, 1.0, 0.5] {
            record(&mut d, Some(cost));
            assert!(!condition.stop(&d), "still halving every evaluation");
        }
    }

    #[test]
    fn test_improvement_below_factor_stops() {
        let mut d = data(100);
        let condition = Speedup::over_evaluations(2.0, 2);
        record(&mut d, Some(10.0));
        record(&mut d, Some(9.5));
        record(&mut d, Some(9.0));
        // baseline 9.5 vs best 9.0: factor well below 2.0
        record(&mut d, Some(9.0));
        assert!(condition.stop(&d));
    }

    #[test]
    fn test_no_valid_cost_grants_one_window() {
        let mut d = data(100);
        let condition = Speedup::over_evaluations(2.0, 3);
        record(&mut d, None);
        record(&mut d, None);
        assert!(!condition.stop(&d));
        record(&mut d, None);
        assert!(condition.stop(&d));
    }

    #[test]
    fn test_valid_evaluation_window_ignores_invalids() {
        let mut d = data(100);
        let condition = Speedup::over_valid_evaluations(2.0, 2);
        record(&mut d, Some(1.0));
        record(&mut d, None);
        record(&mut d, None);
        record(&mut d, None);
        // only one valid evaluation so far, window not yet past
        assert!(!condition.stop(&d));
        record(&mut d, Some(1.0));
        record(&mut d, Some(1.0));
        assert!(condition.stop(&d));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            Speedup::over_evaluations(2.0, 5).describe(),
            "Speedup(2, Evaluations(5))"
        );
    }
}
