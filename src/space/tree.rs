//! Per-group prefix trees over valid parameter assignments.
//!
//! Each group of interdependent parameters gets one tree: level `k` holds the
//! valid values for the group's `k`-th parameter given the path above it, and
//! every node caches the number of complete assignments in its subtree. A
//! group made of a single unconstrained parameter needs no tree at all; its
//! range stands in directly.

use crate::param::TuningParam;
use crate::value::Value;

/// Where a constraint formal gets its value during tree construction.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ArgSource {
    /// The candidate value of the parameter under test.
    Candidate,
    /// The value bound at the given in-group level of the current path.
    Bound(usize),
}

/// A value node; `leaf_count` is the number of valid complete assignments in
/// this subtree.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub value: Value,
    pub children: Vec<Node>,
    pub leaf_count: u64,
}

/// Dense storage of one group's valid assignments.
#[derive(Debug, Clone)]
pub(crate) enum GroupTree {
    /// Single unconstrained parameter: every range value is a leaf, so the
    /// range itself is the storage.
    Flat { size: u64 },
    /// General case: one level per parameter in the group.
    Nodes { roots: Vec<Node>, leaf_count: u64 },
}

impl GroupTree {
    pub fn leaf_count(&self) -> u64 {
        match self {
            GroupTree::Flat { size } => *size,
            GroupTree::Nodes { leaf_count, .. } => *leaf_count,
        }
    }
}

/// Build the tree for one parameter group. `sources[k]` resolves the formals
/// of the `k`-th parameter's constraint against the current path.
pub(crate) fn build_group_tree(params: &[TuningParam], sources: &[Vec<ArgSource>]) -> GroupTree {
    if params.len() == 1 && params[0].constraint().is_none() {
        return GroupTree::Flat {
            size: params[0].range().size(),
        };
    }
    let mut path: Vec<Value> = Vec::with_capacity(params.len());
    let roots = expand(params, sources, 0, &mut path);
    let leaf_count = roots.iter().map(|n| n.leaf_count).sum();
    GroupTree::Nodes { roots, leaf_count }
}

/// Depth-first enumeration of level `level`: keep a candidate value iff its
/// constraint holds under the current path and it leads to at least one
/// complete assignment.
fn expand(
    params: &[TuningParam],
    sources: &[Vec<ArgSource>],
    level: usize,
    path: &mut Vec<Value>,
) -> Vec<Node> {
    let param = &params[level];
    let last = level + 1 == params.len();
    let mut nodes = Vec::new();
    for value in param.range().iter() {
        if let Some(constraint) = param.constraint() {
            let args: Vec<Value> = sources[level]
                .iter()
                .map(|s| match s {
                    ArgSource::Candidate => value.clone(),
                    ArgSource::Bound(k) => path[*k].clone(),
                })
                .collect();
            if !constraint.eval(&args) {
                continue;
            }
        }
        if last {
            nodes.push(Node {
                value,
                children: Vec::new(),
                leaf_count: 1,
            });
        } else {
            path.push(value.clone());
            let children = expand(params, sources, level + 1, path);
            path.pop();
            let leaf_count: u64 = children.iter().map(|n| n.leaf_count).sum();
            if leaf_count > 0 {
                nodes.push(Node {
                    value,
                    children,
                    leaf_count,
                });
            }
        }
    }
    nodes
}
