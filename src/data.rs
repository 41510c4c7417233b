//! Run bookkeeping: configurations, evaluation history, and tuning data.
//!
//! `TuningData` is the read-only summary of a run exposed to abort conditions
//! during tuning and to the caller afterwards. It is mutated exclusively by
//! the tuner orchestrator.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::param::ParamDescriptor;
use crate::value::Value;

/// Cost of a configuration, as reported by the cost function. Lower is better.
pub type Cost = f64;

/// A point in the continuous search cube `(0,1]^D`.
pub type Coordinates = Vec<f64>;

/// A flat search-space index in `[0, |SP|)`.
pub type Index = u64;

/// The candidate a search technique emitted for an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Proposal {
    Coordinates(Coordinates),
    Index(Index),
}

/// A complete assignment of values to all parameters, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    entries: Vec<(String, Value)>,
}

impl Configuration {
    pub(crate) fn from_entries(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    /// Value bound to the named parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate `(name, value)` pairs in declared parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// One evaluated configuration.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time since tuning start.
    pub elapsed: Duration,
    /// Running count of evaluated configurations, this entry included.
    pub evaluations: u64,
    /// Running count of valid evaluations, this entry included.
    pub valid_evaluations: u64,
    pub configuration: Configuration,
    /// `None` marks an invalid configuration.
    pub cost: Option<Cost>,
    /// What the search technique proposed to reach this configuration.
    pub proposal: Proposal,
}

impl HistoryEntry {
    pub fn is_valid(&self) -> bool {
        self.cost.is_some()
    }
}

/// Evaluation log, appended strictly in evaluation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }
}

/// Read-only summary of a tuning run.
///
/// `history` records every evaluation; `improvement_history` is the
/// subsequence where the best-so-far cost strictly decreased, so its last
/// entry is always the best configuration found.
#[derive(Debug, Clone, Serialize)]
pub struct TuningData {
    pub parameters: Vec<ParamDescriptor>,
    pub constrained_search_space_size: u64,
    pub unconstrained_search_space_size: u64,
    pub search_space_generation: Duration,
    pub search_technique: String,
    pub abort_condition: String,
    pub tuning_start: DateTime<Utc>,
    #[serde(skip)]
    started: Instant,
    /// Total run duration, set once when the run finishes.
    pub total_duration: Option<Duration>,
    /// True when the run was cut short by the abort condition, a cost-function
    /// failure, or the host; false when the search space was exhausted.
    pub terminated_early: bool,
    pub history: History,
    pub improvement_history: History,
    /// Number of evaluated configurations (valid + invalid).
    pub evaluations: u64,
    pub valid_evaluations: u64,
    pub invalid_evaluations: u64,
    /// Number of distinct configurations with a recorded outcome.
    pub distinct_evaluations: u64,
}

impl TuningData {
    pub(crate) fn new(
        parameters: Vec<ParamDescriptor>,
        constrained_search_space_size: u64,
        unconstrained_search_space_size: u64,
        search_space_generation: Duration,
        search_technique: String,
        abort_condition: String,
    ) -> Self {
        Self {
            parameters,
            constrained_search_space_size,
            unconstrained_search_space_size,
            search_space_generation,
            search_technique,
            abort_condition,
            tuning_start: Utc::now(),
            started: Instant::now(),
            total_duration: None,
            terminated_early: false,
            history: History::default(),
            improvement_history: History::default(),
            evaluations: 0,
            valid_evaluations: 0,
            invalid_evaluations: 0,
            distinct_evaluations: 0,
        }
    }

    /// Wall-clock time since tuning start, frozen once the run finished.
    pub fn elapsed(&self) -> Duration {
        self.total_duration.unwrap_or_else(|| self.started.elapsed())
    }

    /// Append an evaluation. Returns true when the entry improved on the best
    /// cost so far.
    pub(crate) fn record_evaluation(
        &mut self,
        configuration: Configuration,
        cost: Option<Cost>,
        proposal: Proposal,
    ) -> bool {
        debug_assert!(self.total_duration.is_none(), "run already finished");
        self.evaluations += 1;
        if cost.is_some() {
            self.valid_evaluations += 1;
        } else {
            self.invalid_evaluations += 1;
        }
        let entry = HistoryEntry {
            timestamp: Utc::now(),
            elapsed: self.started.elapsed(),
            evaluations: self.evaluations,
            valid_evaluations: self.valid_evaluations,
            configuration,
            cost,
            proposal,
        };
        let improved = match (cost, self.min_cost()) {
            (Some(c), Some(best)) => c < best,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if improved {
            self.improvement_history.push(entry.clone());
        }
        self.history.push(entry);
        improved
    }

    pub(crate) fn record_finished(&mut self, terminated_early: bool) {
        if self.total_duration.is_none() {
            self.total_duration = Some(self.started.elapsed());
            self.terminated_early = terminated_early;
        }
    }

    fn best_entry(&self) -> Option<&HistoryEntry> {
        self.improvement_history.last()
    }

    /// Lowest valid cost observed, if any.
    pub fn min_cost(&self) -> Option<Cost> {
        self.best_entry().and_then(|e| e.cost)
    }

    /// Configuration of the lowest valid cost.
    pub fn best_configuration(&self) -> Option<&Configuration> {
        self.best_entry().map(|e| &e.configuration)
    }

    /// Flat index of the best configuration, when its technique proposed one.
    pub fn index_of_min_cost(&self) -> Option<Index> {
        match self.best_entry()?.proposal {
            Proposal::Index(i) => Some(i),
            Proposal::Coordinates(_) => None,
        }
    }

    /// Coordinates of the best configuration, when its technique proposed them.
    pub fn coordinates_of_min_cost(&self) -> Option<&Coordinates> {
        match &self.best_entry()?.proposal {
            Proposal::Coordinates(c) => Some(c),
            Proposal::Index(_) => None,
        }
    }

    pub fn timestamp_of_min_cost(&self) -> Option<DateTime<Utc>> {
        self.best_entry().map(|e| e.timestamp)
    }

    /// Wall-clock time until the best configuration was first found.
    pub fn duration_to_min_cost(&self) -> Option<Duration> {
        self.best_entry().map(|e| e.elapsed)
    }

    /// Evaluation count at which the best configuration was first found.
    pub fn evaluations_to_min_cost(&self) -> Option<u64> {
        self.best_entry().map(|e| e.evaluations)
    }

    pub fn valid_evaluations_to_min_cost(&self) -> Option<u64> {
        self.best_entry().map(|e| e.valid_evaluations)
    }
}
