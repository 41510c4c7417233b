//! Error types for search-space generation and tuning runs.

use thiserror::Error;

use crate::data::Cost;

/// Errors surfaced by search-space generation and the tuning loop.
#[derive(Debug, Error)]
pub enum TuningError {
    /// Invalid tuning-parameter definitions or misuse of the tuner surface.
    #[error("invalid tuning setup: {0}")]
    Configuration(String),

    /// Every configuration was pruned by constraints.
    #[error("search space is empty: all configurations are pruned by constraints")]
    EmptySearchSpace,

    /// A search technique proposed an index outside `[0, |SP|)`.
    #[error("index {index} out of bounds for search space of size {size}")]
    IndexOutOfBounds { index: u64, size: u64 },

    /// A search technique proposed coordinates of the wrong arity or outside `(0,1]^D`.
    #[error("invalid coordinates: {0}")]
    Coordinates(String),

    /// The cost function failed with something other than an invalid configuration.
    #[error("cost function failed: {0}")]
    CostFunction(String),

    /// The run log could not be created or written.
    #[error("log file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tuning operations.
pub type Result<T> = std::result::Result<T, TuningError>;

/// Failure signal returned by cost functions.
#[derive(Debug, Error)]
pub enum CostError {
    /// The configuration cannot be evaluated (does not compile, fails to run,
    /// produces wrong results, ...). Recorded as invalid; the tuning run
    /// continues and the search technique receives a penalty cost.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Any other failure. Aborts the tuning run.
    #[error("{0}")]
    Failed(String),
}

/// What a cost function returns for a single configuration.
pub type CostResult = std::result::Result<Cost, CostError>;
