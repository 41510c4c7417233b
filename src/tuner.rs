//! The tuner: builder surface and the request/report tuning loop.
//!
//! A run alternates between the search technique (proposing coordinates or
//! indices), the search space (mapping proposals to configurations), and the
//! user's cost function. The orchestrator owns all bookkeeping: history and
//! best-so-far tracking, per-index deduplication, penalty costs for invalid
//! configurations, the abort condition, and the run log. The loop is
//! single-threaded and cooperative; cost-function calls block it for their
//! entire duration.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::abort::{AbortCondition, Evaluations};
use crate::data::{Configuration, Coordinates, Cost, Index, Proposal, TuningData};
use crate::error::{CostError, CostResult, Result, TuningError};
use crate::logging::RunLog;
use crate::param::TuningParam;
use crate::space::SearchSpace;
use crate::technique::{IndexTechnique, RandomSearch, SearchTechnique};

/// Recorded outcome for one flat index.
#[derive(Debug, Clone, Copy)]
enum Outcome {
    Valid(Cost),
    Invalid,
}

/// Either shape of search technique, adapted to a single proposal stream.
enum AnyTechnique {
    Coordinates(Box<dyn SearchTechnique>),
    Indices(Box<dyn IndexTechnique>),
}

impl AnyTechnique {
    fn initialize(&mut self, space: &SearchSpace) {
        match self {
            AnyTechnique::Coordinates(t) => t.initialize(space.num_params()),
            AnyTechnique::Indices(t) => t.initialize(space.constrained_size()),
        }
    }

    fn finalize(&mut self) {
        match self {
            AnyTechnique::Coordinates(t) => t.finalize(),
            AnyTechnique::Indices(t) => t.finalize(),
        }
    }

    fn name(&self) -> String {
        match self {
            AnyTechnique::Coordinates(t) => t.name(),
            AnyTechnique::Indices(t) => t.name(),
        }
    }

    fn next_proposals(&mut self) -> Vec<Proposal> {
        match self {
            AnyTechnique::Coordinates(t) => t
                .next_coordinates()
                .into_iter()
                .map(Proposal::Coordinates)
                .collect(),
            AnyTechnique::Indices(t) => {
                t.next_indices().into_iter().map(Proposal::Index).collect()
            }
        }
    }

    /// Report a finished batch; invalid outcomes carry the penalty cost.
    fn report(&mut self, batch: &[(Proposal, Option<Cost>)], penalty: Cost) {
        match self {
            AnyTechnique::Coordinates(t) => {
                let costs: Vec<(Coordinates, Cost)> = batch
                    .iter()
                    .filter_map(|(p, c)| match p {
                        Proposal::Coordinates(x) => Some((x.clone(), c.unwrap_or(penalty))),
                        Proposal::Index(_) => None,
                    })
                    .collect();
                t.report_costs(&costs);
            }
            AnyTechnique::Indices(t) => {
                let costs: Vec<(Index, Cost)> = batch
                    .iter()
                    .filter_map(|(p, c)| match p {
                        Proposal::Index(i) => Some((*i, c.unwrap_or(penalty))),
                        Proposal::Coordinates(_) => None,
                    })
                    .collect();
                t.report_costs(&costs);
            }
        }
    }
}

struct TuningRun {
    space: SearchSpace,
    technique: AnyTechnique,
    abort: Box<dyn AbortCondition>,
    data: TuningData,
    /// Proposals of the current batch not yet taken, in reverse order.
    pending: Vec<Proposal>,
    /// Outcomes of the current batch, reported back before the next batch.
    batch: Vec<(Proposal, Option<Cost>)>,
    /// Recorded outcome per flat index; drives dedup and exhaustion.
    outcomes: HashMap<Index, Outcome>,
    max_valid_cost: Option<Cost>,
    log: Option<RunLog>,
    silent: bool,
    terminated: bool,
}

impl TuningRun {
    /// Take one proposal, resolve it, evaluate it if it has no recorded valid
    /// cost, and record the outcome. Terminates the run in place when the
    /// index space is exhausted.
    fn step<F>(&mut self, cost_fn: &mut F) -> Result<()>
    where
        F: FnMut(&Configuration) -> CostResult,
    {
        if self.pending.is_empty() {
            self.flush_report();
            let mut proposals = self.technique.next_proposals();
            if proposals.is_empty() {
                return Err(TuningError::Configuration(
                    "search technique proposed no candidates".into(),
                ));
            }
            proposals.reverse();
            self.pending = proposals;
        }
        let proposal = match self.pending.pop() {
            Some(p) => p,
            None => return Ok(()),
        };

        let (config, index) = match &proposal {
            Proposal::Index(i) => (self.space.configuration_at(*i)?, *i),
            Proposal::Coordinates(c) => self.space.locate_coordinates(c)?,
        };

        if let Some(Outcome::Valid(cost)) = self.outcomes.get(&index) {
            // already evaluated with a recorded cost: answer from the cache
            // without touching history (invalid outcomes are re-queried)
            self.batch.push((proposal, Some(*cost)));
            return Ok(());
        }

        match cost_fn(&config) {
            Ok(cost) => {
                let improved = self.data.record_evaluation(config, Some(cost), proposal.clone());
                self.outcomes.insert(index, Outcome::Valid(cost));
                self.data.distinct_evaluations = self.outcomes.len() as u64;
                if self.max_valid_cost.map_or(true, |m| cost > m) {
                    self.max_valid_cost = Some(cost);
                }
                self.log_last()?;
                if improved && !self.silent {
                    if let Some(entry) = self.data.history.last() {
                        println!(
                            "evaluation {}: new best cost {cost} with {}",
                            entry.evaluations, entry.configuration
                        );
                    }
                }
                self.batch.push((proposal, Some(cost)));
            }
            Err(CostError::InvalidConfiguration(_)) => {
                self.data.record_evaluation(config, None, proposal.clone());
                self.outcomes.insert(index, Outcome::Invalid);
                self.data.distinct_evaluations = self.outcomes.len() as u64;
                self.log_last()?;
                self.batch.push((proposal, None));
            }
            Err(CostError::Failed(message)) => {
                self.data.record_evaluation(config, None, proposal);
                self.outcomes.insert(index, Outcome::Invalid);
                self.data.distinct_evaluations = self.outcomes.len() as u64;
                self.log_last()?;
                self.finalize(true);
                return Err(TuningError::CostFunction(message));
            }
        }

        if self.outcomes.len() as u64 >= self.space.constrained_size() {
            // every index has an outcome; nothing left to explore
            self.finalize(false);
        }
        Ok(())
    }

    fn log_last(&mut self) -> Result<()> {
        if let Some(log) = &mut self.log {
            if let Some(entry) = self.data.history.last() {
                log.record(entry)?;
            }
        }
        Ok(())
    }

    fn flush_report(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let penalty = self.max_valid_cost.unwrap_or(f64::INFINITY);
        let batch = std::mem::take(&mut self.batch);
        self.technique.report(&batch, penalty);
    }

    fn finalize(&mut self, terminated_early: bool) {
        if self.terminated {
            return;
        }
        // report the last batch only when it is complete, preserving the
        // proposal/report pairing the technique contract requires
        if self.pending.is_empty() {
            self.flush_report();
        }
        self.technique.finalize();
        self.data.record_finished(terminated_early);
        self.terminated = true;
        if !self.silent {
            println!(
                "finished tuning after {} evaluations ({} valid)",
                self.data.evaluations, self.data.valid_evaluations
            );
            if let (Some(config), Some(cost)) = (self.data.best_configuration(), self.data.min_cost())
            {
                println!("best configuration: {config}");
                println!("min cost: {cost}");
            }
        }
    }
}

/// Generic auto-tuner over interdependent parameters.
///
/// Configure with the builder methods, then either run to completion with
/// [`tune`](Tuner::tune) or drive the loop one proposal at a time with
/// [`make_step`](Tuner::make_step) (program-guided tuning). Tuning data stays
/// queryable after the run, including after a failed one.
pub struct Tuner {
    params: Option<Vec<TuningParam>>,
    space: Option<SearchSpace>,
    technique: Option<AnyTechnique>,
    silent: bool,
    log_file: Option<PathBuf>,
    run: Option<TuningRun>,
    finished: Option<TuningData>,
}

impl Tuner {
    pub fn new() -> Self {
        Self {
            params: None,
            space: None,
            technique: None,
            silent: false,
            log_file: None,
            run: None,
            finished: None,
        }
    }

    /// Define the search space by its parameters (declaration order matters).
    pub fn tuning_parameters<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = TuningParam>,
    {
        self.params = Some(params.into_iter().collect());
        self.space = None;
        self
    }

    /// Use a pre-generated search space instead of raw parameters.
    pub fn search_space(mut self, space: SearchSpace) -> Self {
        self.space = Some(space);
        self.params = None;
        self
    }

    /// Explore through the coordinate cube with this technique.
    pub fn search_technique<T>(mut self, technique: T) -> Self
    where
        T: SearchTechnique + 'static,
    {
        self.technique = Some(AnyTechnique::Coordinates(Box::new(technique)));
        self
    }

    /// Explore through the flat index space with this technique.
    pub fn index_technique<T>(mut self, technique: T) -> Self
    where
        T: IndexTechnique + 'static,
    {
        self.technique = Some(AnyTechnique::Indices(Box::new(technique)));
        self
    }

    /// Suppress progress output.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Append a line per evaluation to this file.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Run the tuning loop until the abort condition fires, the search space
    /// is exhausted, or the cost function fails fatally. Without an abort
    /// condition the run stops after `|SP|` evaluations.
    pub fn tune<F>(
        &mut self,
        mut cost_fn: F,
        abort: Option<Box<dyn AbortCondition>>,
    ) -> Result<TuningData>
    where
        F: FnMut(&Configuration) -> CostResult,
    {
        if self.run.is_some() {
            return Err(TuningError::Configuration(
                "a program-guided tuning run is in progress; call finish() first".into(),
            ));
        }
        let mut run = self.build_run(abort)?;
        let outcome = loop {
            if run.terminated {
                break Ok(());
            }
            if run.abort.stop(&run.data) {
                run.finalize(true);
                break Ok(());
            }
            if let Err(e) = run.step(&mut cost_fn) {
                if !run.terminated {
                    run.finalize(true);
                }
                break Err(e);
            }
        };
        let TuningRun {
            technique, data, ..
        } = run;
        self.technique = Some(technique);
        self.finished = Some(data.clone());
        outcome.map(|()| data)
    }

    /// Advance the tuning loop by exactly one proposal. The first call
    /// creates the run (with the default abort behavior); interleave freely
    /// with host code and end the run with [`finish`](Tuner::finish). The run
    /// also ends by itself once the search space is exhausted; stepping a
    /// terminated run is an error.
    pub fn make_step<F>(&mut self, mut cost_fn: F) -> Result<()>
    where
        F: FnMut(&Configuration) -> CostResult,
    {
        if self.run.is_none() {
            self.run = Some(self.build_run(None)?);
        }
        let run = match self.run.as_mut() {
            Some(run) => run,
            None => return Err(TuningError::Configuration("no tuning run".into())),
        };
        if run.terminated {
            return Err(TuningError::Configuration(
                "tuning run already terminated".into(),
            ));
        }
        if let Err(e) = run.step(&mut cost_fn) {
            if !run.terminated {
                run.finalize(true);
            }
            return Err(e);
        }
        Ok(())
    }

    /// End a program-guided run and return its tuning data. Ending a run that
    /// is still live counts as early termination.
    pub fn finish(&mut self) -> Result<TuningData> {
        let mut run = self.run.take().ok_or_else(|| {
            TuningError::Configuration("no tuning run in progress".into())
        })?;
        if !run.terminated {
            run.finalize(true);
        }
        let TuningRun {
            technique, data, ..
        } = run;
        self.technique = Some(technique);
        self.finished = Some(data.clone());
        Ok(data)
    }

    /// Tuning data of the current run, or of the last finished one.
    pub fn tuning_data(&self) -> Option<&TuningData> {
        self.run.as_ref().map(|r| &r.data).or(self.finished.as_ref())
    }

    fn build_run(&mut self, abort: Option<Box<dyn AbortCondition>>) -> Result<TuningRun> {
        let space = if let Some(space) = &self.space {
            space.clone()
        } else if let Some(params) = &self.params {
            SearchSpace::new(params.clone())?
        } else {
            return Err(TuningError::Configuration(
                "no tuning parameters defined".into(),
            ));
        };
        let log = match &self.log_file {
            Some(path) => Some(RunLog::create(path)?),
            None => None,
        };
        let mut technique = self
            .technique
            .take()
            .unwrap_or_else(|| AnyTechnique::Coordinates(Box::new(RandomSearch::new())));
        technique.initialize(&space);
        let abort =
            abort.unwrap_or_else(|| Box::new(Evaluations::new(space.constrained_size())));
        if !self.silent {
            println!(
                "search space size: {} ({} unconstrained)",
                space.constrained_size(),
                space.unconstrained_size()
            );
        }
        let data = TuningData::new(
            space.descriptors(),
            space.constrained_size(),
            space.unconstrained_size(),
            space.generation_time(),
            technique.name(),
            abort.describe(),
        );
        Ok(TuningRun {
            space,
            technique,
            abort,
            data,
            pending: Vec::new(),
            batch: Vec::new(),
            outcomes: HashMap::new(),
            max_valid_cost: None,
            log,
            silent: self.silent,
            terminated: false,
        })
    }
}

impl Default for Tuner {
    fn default() -> Self {
        Self::new()
    }
}
