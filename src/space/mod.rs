//! Constraint-aware search-space generation and index/coordinate mapping.
//!
//! The ordered parameter list is partitioned into maximal contiguous groups of
//! interdependent parameters; each group gets a prefix tree over its valid
//! assignments (see [`tree`]) and the full space is the Cartesian product of
//! one leaf per group. Search techniques address the space either through a
//! flat index in `[0, |SP|)` (mixed-radix over group leaf counts,
//! most-significant group first) or through a point in the continuous cube
//! `(0,1]^D`. Both mappings only ever produce valid configurations.

mod tree;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::data::{Configuration, Index};
use crate::error::{Result, TuningError};
use crate::param::{ParamDescriptor, TuningParam};
use tree::{build_group_tree, ArgSource, GroupTree, Node};

/// How a constraint formal resolves against the declared parameter list.
#[derive(Debug, Clone, Copy)]
enum FormalRef {
    /// The constraint's own parameter (receives the candidate value).
    Own,
    /// An earlier parameter at this global position.
    Pos(usize),
}

#[derive(Debug, Clone)]
struct ParamGroup {
    /// Global position of the group's first parameter.
    start: usize,
    len: usize,
    tree: GroupTree,
}

/// The set of valid configurations, stored as a chain of group trees.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    params: Vec<TuningParam>,
    groups: Vec<ParamGroup>,
    constrained_size: u64,
    unconstrained_size: u64,
    generation_time: Duration,
}

impl SearchSpace {
    /// Generate the search space for the given parameters.
    ///
    /// Fails with [`TuningError::Configuration`] on duplicate names, empty
    /// ranges, or constraints whose formals are not the parameter itself plus
    /// earlier-declared parameters, and with [`TuningError::EmptySearchSpace`]
    /// when the constraints prune every configuration.
    pub fn new(params: Vec<TuningParam>) -> Result<Self> {
        let started = Instant::now();
        let formals = validate(&params)?;
        let groups = detect_groups(&params, &formals);

        let mut built = Vec::with_capacity(groups.len());
        let mut constrained_size: u64 = 1;
        for (start, end) in groups {
            let sources: Vec<Vec<ArgSource>> = formals[start..end]
                .iter()
                .map(|refs| {
                    refs.iter()
                        .map(|r| match r {
                            FormalRef::Own => ArgSource::Candidate,
                            FormalRef::Pos(p) => ArgSource::Bound(p - start),
                        })
                        .collect()
                })
                .collect();
            let tree = build_group_tree(&params[start..end], &sources);
            if tree.leaf_count() == 0 {
                return Err(TuningError::EmptySearchSpace);
            }
            constrained_size = constrained_size.saturating_mul(tree.leaf_count());
            built.push(ParamGroup {
                start,
                len: end - start,
                tree,
            });
        }

        let unconstrained_size = params
            .iter()
            .map(|p| p.range().size())
            .fold(1u64, u64::saturating_mul);

        Ok(Self {
            params,
            groups: built,
            constrained_size,
            unconstrained_size,
            generation_time: started.elapsed(),
        })
    }

    /// Number of parameters, i.e. the dimensionality of the coordinate cube.
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[TuningParam] {
        &self.params
    }

    /// Number of valid configurations.
    pub fn constrained_size(&self) -> u64 {
        self.constrained_size
    }

    /// Size of the unconstrained Cartesian product of all ranges.
    pub fn unconstrained_size(&self) -> u64 {
        self.unconstrained_size
    }

    /// Wall-clock time spent generating the space.
    pub fn generation_time(&self) -> Duration {
        self.generation_time
    }

    pub(crate) fn descriptors(&self) -> Vec<ParamDescriptor> {
        self.params.iter().map(TuningParam::descriptor).collect()
    }

    #[cfg(test)]
    pub(crate) fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// The configuration at a flat index in `[0, |SP|)`.
    pub fn configuration_at(&self, index: Index) -> Result<Configuration> {
        if index >= self.constrained_size {
            return Err(TuningError::IndexOutOfBounds {
                index,
                size: self.constrained_size,
            });
        }

        // mixed-radix decomposition, last group least significant
        let mut locals = vec![0u64; self.groups.len()];
        let mut rem = index;
        for (i, group) in self.groups.iter().enumerate().rev() {
            let leaves = group.tree.leaf_count();
            locals[i] = rem % leaves;
            rem /= leaves;
        }

        let mut entries = Vec::with_capacity(self.params.len());
        for (group, local) in self.groups.iter().zip(locals) {
            match &group.tree {
                GroupTree::Flat { .. } => {
                    let param = &self.params[group.start];
                    entries.push((param.name().to_string(), param.range().at(local)));
                }
                GroupTree::Nodes { roots, .. } => {
                    let mut nodes: &[Node] = roots;
                    let mut rem = local;
                    for level in 0..group.len {
                        let mut child = 0;
                        while rem >= nodes[child].leaf_count {
                            rem -= nodes[child].leaf_count;
                            child += 1;
                        }
                        let node = &nodes[child];
                        let name = self.params[group.start + level].name().to_string();
                        entries.push((name, node.value.clone()));
                        nodes = &node.children;
                    }
                }
            }
        }
        Ok(Configuration::from_entries(entries))
    }

    /// The configuration selected by a point in `(0,1]^D`, together with its
    /// flat index. Coordinate `k` picks the `⌈c·n⌉`-th of the `n` valid
    /// children at its level, so the result is valid by construction.
    pub fn locate_coordinates(&self, coords: &[f64]) -> Result<(Configuration, Index)> {
        if coords.len() != self.params.len() {
            return Err(TuningError::Coordinates(format!(
                "expecting {} coordinates, got {}",
                self.params.len(),
                coords.len()
            )));
        }
        if let Some(c) = coords.iter().find(|c| !(**c > 0.0 && **c <= 1.0)) {
            return Err(TuningError::Coordinates(format!(
                "coordinate {c} outside (0,1]"
            )));
        }

        let mut entries = Vec::with_capacity(self.params.len());
        let mut index: u64 = 0;
        for group in &self.groups {
            let local = match &group.tree {
                GroupTree::Flat { size } => {
                    let param = &self.params[group.start];
                    let i = pick(coords[group.start], *size);
                    entries.push((param.name().to_string(), param.range().at(i)));
                    i
                }
                GroupTree::Nodes { roots, .. } => {
                    let mut nodes: &[Node] = roots;
                    let mut local = 0u64;
                    for level in 0..group.len {
                        let k = pick(coords[group.start + level], nodes.len() as u64) as usize;
                        local += nodes[..k].iter().map(|n| n.leaf_count).sum::<u64>();
                        let node = &nodes[k];
                        let name = self.params[group.start + level].name().to_string();
                        entries.push((name, node.value.clone()));
                        nodes = &node.children;
                    }
                    local
                }
            };
            index = index * group.tree.leaf_count() + local;
        }
        Ok((Configuration::from_entries(entries), index))
    }

    /// The configuration selected by a point in `(0,1]^D`.
    pub fn configuration_at_coordinates(&self, coords: &[f64]) -> Result<Configuration> {
        self.locate_coordinates(coords).map(|(config, _)| config)
    }

    /// Flat index of a configuration, or `None` if it is not in the space.
    pub fn index_of(&self, config: &Configuration) -> Option<Index> {
        if config.len() != self.params.len() {
            return None;
        }
        let mut index: u64 = 0;
        for group in &self.groups {
            let local = match &group.tree {
                GroupTree::Flat { .. } => {
                    let param = &self.params[group.start];
                    let wanted = config.get(param.name())?;
                    let range = param.range();
                    (0..range.size()).find(|i| range.at(*i) == *wanted)?
                }
                GroupTree::Nodes { roots, .. } => {
                    let mut nodes: &[Node] = roots;
                    let mut local = 0u64;
                    for level in 0..group.len {
                        let wanted = config.get(self.params[group.start + level].name())?;
                        let mut chosen: Option<&Node> = None;
                        for node in nodes {
                            if node.value == *wanted {
                                chosen = Some(node);
                                break;
                            }
                            local += node.leaf_count;
                        }
                        let node = chosen?;
                        nodes = &node.children;
                    }
                    local
                }
            };
            index = index * group.tree.leaf_count() + local;
        }
        Some(index)
    }
}

/// Child picked by coordinate `c` among `n` candidates: `⌈c·n⌉ − 1`, clamped.
fn pick(c: f64, n: u64) -> u64 {
    let k = (c * n as f64).ceil() as i64 - 1;
    k.clamp(0, n as i64 - 1) as u64
}

/// Check names, ranges, and constraint formals; resolve each formal against
/// the declared order.
fn validate(params: &[TuningParam]) -> Result<Vec<Vec<FormalRef>>> {
    if params.is_empty() {
        return Err(TuningError::Configuration(
            "no tuning parameters defined".into(),
        ));
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let mut formals = Vec::with_capacity(params.len());
    for (pos, param) in params.iter().enumerate() {
        if !seen.insert(param.name()) {
            return Err(TuningError::Configuration(format!(
                "duplicate parameter name: {}",
                param.name()
            )));
        }
        if param.name().is_empty() {
            return Err(TuningError::Configuration(
                "parameter name must not be empty".into(),
            ));
        }
        if param.range().is_empty() {
            return Err(TuningError::Configuration(format!(
                "empty range for parameter {}",
                param.name()
            )));
        }
        let mut refs = Vec::new();
        if let Some(constraint) = param.constraint() {
            let mut has_own = false;
            for formal in constraint.params() {
                if formal == param.name() {
                    has_own = true;
                    refs.push(FormalRef::Own);
                    continue;
                }
                match params[..pos].iter().position(|q| q.name() == formal) {
                    Some(p) => refs.push(FormalRef::Pos(p)),
                    None => {
                        return Err(TuningError::Configuration(format!(
                            "constraint for {} references {formal}, \
                             which is not declared earlier",
                            param.name()
                        )))
                    }
                }
            }
            if !has_own {
                return Err(TuningError::Configuration(format!(
                    "constraint for {} has to take {} itself as a formal",
                    param.name(),
                    param.name()
                )));
            }
        }
        formals.push(refs);
    }
    Ok(formals)
}

/// Split the parameter sequence into maximal contiguous groups: a new group
/// starts at position `k` iff no parameter at position `≥ k` has a constraint
/// referring to a position `< k`. Returns half-open `(start, end)` spans.
fn detect_groups(params: &[TuningParam], formals: &[Vec<FormalRef>]) -> Vec<(usize, usize)> {
    let n = params.len();
    let earliest_dep: Vec<usize> = formals
        .iter()
        .map(|refs| {
            refs.iter()
                .filter_map(|r| match r {
                    FormalRef::Pos(p) => Some(*p),
                    FormalRef::Own => None,
                })
                .min()
                .unwrap_or(usize::MAX)
        })
        .collect();

    // suffix_min[k] = earliest position referenced by any parameter at >= k
    let mut suffix_min = vec![usize::MAX; n + 1];
    for k in (0..n).rev() {
        suffix_min[k] = suffix_min[k + 1].min(earliest_dep[k]);
    }

    let mut spans = Vec::new();
    let mut start = 0;
    for k in 1..n {
        if suffix_min[k] >= k {
            spans.push((start, k));
            start = k;
        }
    }
    spans.push((start, n));
    spans
}
