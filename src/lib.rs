//! # afinar: generic auto-tuning for interdependent parameters
//!
//! Given a set of tuning parameters (each with a finite range and an optional
//! constraint over earlier parameters), a cost function, a search technique,
//! and an abort condition, `afinar` finds a parameter assignment minimizing
//! cost. Its core is the constraint-aware search-space generator: valid
//! configurations are stored as a *chain of trees* (one prefix tree per
//! maximal contiguous group of interdependent parameters), which exposes the
//! constrained space to search techniques both as a flat index space
//! `[0, |SP|)` and as a continuous coordinate cube `(0,1]^D`; either way,
//! every proposal maps to a valid configuration by construction.
//!
//! # Architecture
//!
//! - [`TuningParam`] / [`Range`] / [`Constraint`]: the parameter model
//! - [`SearchSpace`]: chain-of-trees generation plus index/coordinate mapping
//! - [`SearchTechnique`] / [`IndexTechnique`]: exploration strategies
//!   (shipped: [`RandomSearch`], [`Exhaustive`])
//! - [`abort`]: termination rules and their combinators
//! - [`Tuner`]: the orchestrating loop; [`TuningData`]: the run's record
//!
//! # Example
//!
//! ```
//! use afinar::technique::Exhaustive;
//! use afinar::{Constraint, Range, Tuner, TuningParam, Value};
//!
//! # fn main() -> afinar::Result<()> {
//! let n = 12i64;
//! // work-per-thread must divide n; local size must divide the remainder
//! let mut tuner = Tuner::new()
//!     .tuning_parameters([
//!         TuningParam::new("wpt", Range::interval(1, n)).with_constraint(Constraint::new(
//!             ["wpt"],
//!             move |v: &[Value]| v[0].as_int().is_some_and(|wpt| n % wpt == 0),
//!         )),
//!         TuningParam::new("ls", Range::interval(1, n)).with_constraint(Constraint::new(
//!             ["ls", "wpt"],
//!             move |v: &[Value]| match (v[0].as_int(), v[1].as_int()) {
//!                 (Some(ls), Some(wpt)) => (n / wpt) % ls == 0,
//!                 _ => false,
//!             },
//!         )),
//!     ])
//!     .index_technique(Exhaustive::new())
//!     .silent(true);
//!
//! let data = tuner.tune(
//!     |config| {
//!         let wpt = config.get("wpt").and_then(Value::as_int).unwrap_or(1);
//!         let ls = config.get("ls").and_then(Value::as_int).unwrap_or(1);
//!         Ok((n / wpt / ls) as f64)
//!     },
//!     None,
//! )?;
//!
//! assert_eq!(data.min_cost(), Some(1.0));
//! # Ok(())
//! # }
//! ```

pub mod abort;
pub mod data;
pub mod error;
mod logging;
pub mod param;
pub mod range;
pub mod space;
pub mod technique;
pub mod tuner;
pub mod value;

pub use abort::AbortCondition;
pub use data::{Configuration, Coordinates, Cost, History, HistoryEntry, Index, Proposal, TuningData};
pub use error::{CostError, CostResult, Result, TuningError};
pub use param::{Constraint, ParamDescriptor, TuningParam};
pub use range::Range;
pub use space::SearchSpace;
pub use technique::{Exhaustive, IndexTechnique, RandomSearch, SearchTechnique};
pub use tuner::Tuner;
pub use value::Value;
