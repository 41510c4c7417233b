//! Uniform random sampling of the coordinate cube.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::{Coordinates, Cost};
use crate::technique::SearchTechnique;

/// Proposes one uniformly random point in `(0,1]^D` per step.
///
/// Use [`with_seed`](RandomSearch::with_seed) for reproducible runs; two runs
/// with the same seed over the same search space propose identical sequences.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    dimensionality: usize,
    rng: StdRng,
}

impl RandomSearch {
    pub fn new() -> Self {
        Self {
            dimensionality: 0,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            dimensionality: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTechnique for RandomSearch {
    fn initialize(&mut self, dimensionality: usize) {
        self.dimensionality = dimensionality;
    }

    fn next_coordinates(&mut self) -> Vec<Coordinates> {
        // random::<f64>() is in [0,1); mirror it into (0,1]
        let point = (0..self.dimensionality)
            .map(|_| 1.0 - self.rng.random::<f64>())
            .collect();
        vec![point]
    }

    fn report_costs(&mut self, _costs: &[(Coordinates, Cost)]) {}

    fn name(&self) -> String {
        "RandomSearch".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_half_open_unit_cube() {
        let mut technique = RandomSearch::with_seed(7);
        technique.initialize(4);
        for _ in 0..100 {
            let batch = technique.next_coordinates();
            assert_eq!(batch.len(), 1);
            assert_eq!(batch[0].len(), 4);
            for c in &batch[0] {
                assert!(*c > 0.0 && *c <= 1.0, "coordinate {c} outside (0,1]");
            }
        }
    }

    #[test]
    fn test_seed_determinism() {
        let mut a = RandomSearch::with_seed(42);
        let mut b = RandomSearch::with_seed(42);
        a.initialize(3);
        b.initialize(3);
        for _ in 0..20 {
            assert_eq!(a.next_coordinates(), b.next_coordinates());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = RandomSearch::with_seed(1);
        let mut b = RandomSearch::with_seed(2);
        a.initialize(3);
        b.initialize(3);
        assert_ne!(a.next_coordinates(), b.next_coordinates());
    }
}
