//! Tuning parameters and their constraints.
//!
//! Parameter order is significant: a constraint may only reference the
//! parameter it belongs to and parameters declared before it. Dependencies are
//! declared explicitly as a formal-name list next to the predicate; the
//! predicate receives the named values in list order, with the parameter's own
//! name bound to the candidate value under test.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::range::Range;
use crate::value::Value;

type Predicate = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;

/// A predicate pruning a parameter's candidate values based on earlier
/// parameters.
#[derive(Clone)]
pub struct Constraint {
    params: Vec<String>,
    predicate: Predicate,
}

impl Constraint {
    /// Create a constraint over the named parameters. `params` must contain
    /// the owning parameter's name; every other entry must name a parameter
    /// declared earlier. The predicate receives values in `params` order.
    pub fn new<I, S, F>(params: I, predicate: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            predicate: Arc::new(predicate),
        }
    }

    /// The formal-name list, i.e. the dependency set plus the owning
    /// parameter itself.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub(crate) fn eval(&self, args: &[Value]) -> bool {
        (self.predicate)(args)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A named tuning parameter: finite range plus optional constraint.
#[derive(Debug, Clone)]
pub struct TuningParam {
    name: String,
    range: Range,
    constraint: Option<Constraint>,
}

impl TuningParam {
    pub fn new(name: impl Into<String>, range: Range) -> Self {
        Self {
            name: name.into(),
            range,
            constraint: None,
        }
    }

    /// Attach a constraint (see [`Constraint::new`] for the formal contract).
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn range(&self) -> &Range {
        &self.range
    }

    #[must_use]
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    pub(crate) fn descriptor(&self) -> ParamDescriptor {
        ParamDescriptor {
            name: self.name.clone(),
            range: self.range.to_string(),
            range_size: self.range.size(),
            constrained: self.constraint.is_some(),
        }
    }
}

/// Serializable summary of a declared parameter, recorded in tuning data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub range: String,
    pub range_size: u64,
    pub constrained: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_accessors() {
        let p = TuningParam::new("threads", Range::interval(1, 8));
        assert_eq!(p.name(), "threads");
        assert_eq!(p.range().size(), 8);
        assert!(p.constraint().is_none());
    }

    #[test]
    fn test_constraint_eval_order() {
        // predicate sees values in formal-list order: own candidate first here
        let c = Constraint::new(["tile", "block"], |v: &[Value]| {
            let tile = v[0].as_int().unwrap_or(0);
            let block = v[1].as_int().unwrap_or(0);
            block % tile == 0
        });
        assert_eq!(c.params(), ["tile".to_string(), "block".to_string()]);
        assert!(c.eval(&[Value::Int(4), Value::Int(16)]));
        assert!(!c.eval(&[Value::Int(3), Value::Int(16)]));
    }

    #[test]
    fn test_with_constraint() {
        let p = TuningParam::new("tile", Range::interval(1, 16))
            .with_constraint(Constraint::new(["tile"], |v: &[Value]| {
                v[0].as_int().is_some_and(|t| 16 % t == 0)
            }));
        assert!(p.constraint().is_some());
    }

    #[test]
    fn test_descriptor() {
        let d = TuningParam::new("cache", Range::set([1, 2, 4])).descriptor();
        assert_eq!(d.name, "cache");
        assert_eq!(d.range_size, 3);
        assert!(!d.constrained);
    }
}
