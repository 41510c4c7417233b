//! Abort on reaching a target cost.

use crate::abort::AbortCondition;
use crate::data::{Cost as CostValue, TuningData};

/// Stops once the best valid cost is at or below the bound.
#[derive(Debug, Clone)]
pub struct Cost {
    bound: CostValue,
}

impl Cost {
    pub fn new(bound: CostValue) -> Self {
        Self { bound }
    }
}

impl AbortCondition for Cost {
    fn stop(&self, data: &TuningData) -> bool {
        data.min_cost().is_some_and(|best| best <= self.bound)
    }

    fn describe(&self) -> String {
        format!("Cost({})", self.bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::testkit::{data, record};

    #[test]
    fn test_does_not_fire_without_valid_cost() {
        let mut d = data(10);
        let condition = Cost::new(100.0);
        assert!(!condition.stop(&d));
        record(&mut d, None);
        assert!(!condition.stop(&d));
    }

    #[test]
    fn test_fires_at_or_below_bound() {
        let mut d = data(10);
        let condition = Cost::new(2.0);
        record(&mut d, Some(3.0));
        assert!(!condition.stop(&d));
        record(&mut d, Some(2.0));
        assert!(condition.stop(&d));
    }

    #[test]
    fn test_progress_unknown() {
        let d = data(10);
        assert_eq!(Cost::new(1.0).progress(&d), None);
    }
}
