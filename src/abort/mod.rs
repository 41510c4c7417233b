//! Abort conditions: predicates over tuning data that end the tuning loop.
//!
//! The tuner consults the abort condition between evaluations; a single
//! `stop == true` terminates the run and marks it terminated-early.
//! `progress` optionally reports how close the condition is to firing, which
//! drives progress display. Conditions compose with [`And`] and [`Or`].

mod cost;
mod duration;
mod evaluations;
mod fraction;
mod speedup;

pub use cost::Cost;
pub use duration::Duration;
pub use evaluations::{Evaluations, ValidEvaluations};
pub use fraction::{Fraction, ValidFraction};
pub use speedup::Speedup;

use crate::data::TuningData;

/// Decides between evaluations whether a tuning run should end.
pub trait AbortCondition {
    fn stop(&self, data: &TuningData) -> bool;

    /// Progress towards the condition in `[0,1]`, or `None` when it cannot be
    /// determined.
    fn progress(&self, data: &TuningData) -> Option<f64> {
        let _ = data;
        None
    }

    /// Identifier recorded in tuning data.
    fn describe(&self) -> String;
}

impl<T: AbortCondition + ?Sized> AbortCondition for Box<T> {
    fn stop(&self, data: &TuningData) -> bool {
        (**self).stop(data)
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        (**self).progress(data)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Stops when both conditions hold.
#[derive(Debug, Clone)]
pub struct And<A, B> {
    a: A,
    b: B,
}

impl<A: AbortCondition, B: AbortCondition> And<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: AbortCondition, B: AbortCondition> AbortCondition for And<A, B> {
    fn stop(&self, data: &TuningData) -> bool {
        self.a.stop(data) && self.b.stop(data)
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        match (self.a.progress(data), self.b.progress(data)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        format!("And({}, {})", self.a.describe(), self.b.describe())
    }
}

/// Stops when either condition holds.
#[derive(Debug, Clone)]
pub struct Or<A, B> {
    a: A,
    b: B,
}

impl<A: AbortCondition, B: AbortCondition> Or<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: AbortCondition, B: AbortCondition> AbortCondition for Or<A, B> {
    fn stop(&self, data: &TuningData) -> bool {
        self.a.stop(data) || self.b.stop(data)
    }

    fn progress(&self, data: &TuningData) -> Option<f64> {
        match (self.a.progress(data), self.b.progress(data)) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        format!("Or({}, {})", self.a.describe(), self.b.describe())
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use crate::data::{Configuration, Cost, Proposal, TuningData};

    pub fn data(space_size: u64) -> TuningData {
        TuningData::new(
            Vec::new(),
            space_size,
            space_size,
            std::time::Duration::from_millis(0),
            "test".into(),
            "test".into(),
        )
    }

    pub fn record(data: &mut TuningData, cost: Option<Cost>) {
        let n = data.evaluations;
        data.record_evaluation(
            Configuration::from_entries(Vec::new()),
            cost,
            Proposal::Index(n),
        );
        data.distinct_evaluations = data.evaluations;
    }
}

#[cfg(test)]
mod tests {
    use super::testkit::{data, record};
    use super::*;

    #[test]
    fn test_and_requires_both() {
        let mut d = data(100);
        record(&mut d, Some(0.5));
        let condition = And::new(Evaluations::new(1), Cost::new(0.1));
        assert!(!condition.stop(&d));
        let condition = And::new(Evaluations::new(1), Cost::new(1.0));
        assert!(condition.stop(&d));
    }

    #[test]
    fn test_or_fires_on_either() {
        let mut d = data(100);
        record(&mut d, Some(0.5));
        let condition = Or::new(Evaluations::new(10), Cost::new(1.0));
        assert!(condition.stop(&d));
        let condition = Or::new(Evaluations::new(10), Cost::new(0.1));
        assert!(!condition.stop(&d));
    }

    #[test]
    fn test_combinator_progress() {
        let mut d = data(100);
        for _ in 0..5 {
            record(&mut d, Some(1.0));
        }
        let and = And::new(Evaluations::new(10), Evaluations::new(20));
        assert_eq!(and.progress(&d), Some(0.25));
        let or = Or::new(Evaluations::new(10), Evaluations::new(20));
        assert_eq!(or.progress(&d), Some(0.5));
        // Cost has no determinable progress, so neither has the combination
        let and = And::new(Evaluations::new(10), Cost::new(0.0));
        assert_eq!(and.progress(&d), None);
    }

    #[test]
    fn test_describe_nests() {
        let condition = Or::new(Evaluations::new(3), Cost::new(1.5));
        assert_eq!(condition.describe(), "Or(Evaluations(3), Cost(1.5))");
    }
}
