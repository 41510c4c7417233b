//! Sequential enumeration of the index space.

use crate::data::{Cost, Index};
use crate::technique::IndexTechnique;

/// Proposes indices `0, 1, 2, …` in order, wrapping around at `|SP|`.
///
/// Combined with the tuner's default abort condition this explores the whole
/// search space exactly once.
#[derive(Debug, Clone, Default)]
pub struct Exhaustive {
    next_index: Index,
    search_space_size: u64,
}

impl Exhaustive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexTechnique for Exhaustive {
    fn initialize(&mut self, search_space_size: u64) {
        self.search_space_size = search_space_size;
        self.next_index = 0;
    }

    fn next_indices(&mut self) -> Vec<Index> {
        let index = self.next_index;
        self.next_index += 1;
        if self.next_index >= self.search_space_size {
            self.next_index = 0;
        }
        vec![index]
    }

    fn report_costs(&mut self, _costs: &[(Index, Cost)]) {}

    fn name(&self) -> String {
        "Exhaustive".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerates_in_order() {
        let mut technique = Exhaustive::new();
        technique.initialize(3);
        assert_eq!(technique.next_indices(), vec![0]);
        assert_eq!(technique.next_indices(), vec![1]);
        assert_eq!(technique.next_indices(), vec![2]);
        // wraps around
        assert_eq!(technique.next_indices(), vec![0]);
    }

    #[test]
    fn test_reinitialize_resets() {
        let mut technique = Exhaustive::new();
        technique.initialize(5);
        technique.next_indices();
        technique.next_indices();
        technique.initialize(5);
        assert_eq!(technique.next_indices(), vec![0]);
    }
}
