//! Search-technique interfaces.
//!
//! A technique explores the search space in one of two shapes: through the
//! continuous coordinate cube `(0,1]^D` ([`SearchTechnique`]) or through the
//! flat index space `[0, |SP|)` ([`IndexTechnique`]). The tuner alternates
//! `next_* -> report_costs` strictly: every report call carries a cost for
//! exactly the candidates of the preceding proposal batch (penalty costs
//! substitute for invalid configurations), in no particular order. Batch size
//! is up to the technique; state between calls is private to it.

mod exhaustive;
mod random;

pub use exhaustive::Exhaustive;
pub use random::RandomSearch;

use crate::data::{Coordinates, Cost, Index};

/// A search technique proposing points in the coordinate cube `(0,1]^D`.
pub trait SearchTechnique {
    /// Called once before the first proposal; `dimensionality` is the number
    /// of tuning parameters.
    fn initialize(&mut self, dimensionality: usize);

    /// Called once when the tuning run ends.
    fn finalize(&mut self) {}

    /// The next batch of candidate coordinates (at least one).
    fn next_coordinates(&mut self) -> Vec<Coordinates>;

    /// Costs for the batch last returned by [`next_coordinates`](Self::next_coordinates).
    fn report_costs(&mut self, costs: &[(Coordinates, Cost)]);

    /// Identifier recorded in tuning data.
    fn name(&self) -> String;
}

/// A search technique proposing flat indices in `[0, |SP|)`.
pub trait IndexTechnique {
    /// Called once before the first proposal; `search_space_size` is `|SP|`.
    fn initialize(&mut self, search_space_size: u64);

    /// Called once when the tuning run ends.
    fn finalize(&mut self) {}

    /// The next batch of candidate indices (at least one).
    fn next_indices(&mut self) -> Vec<Index>;

    /// Costs for the batch last returned by [`next_indices`](Self::next_indices).
    fn report_costs(&mut self, costs: &[(Index, Cost)]);

    /// Identifier recorded in tuning data.
    fn name(&self) -> String;
}
