//! Boolean constraints and the model they are posted to

use super::objective::Objective;
use super::variables::VarId;
use crate::error::SolveError;
use std::ops::Not;

/// A relation over boolean decision variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The number of true variables in `vars` equals `target`
    SumEquals { vars: Vec<VarId>, target: usize },
    /// At least one side holds
    Or(Box<Constraint>, Box<Constraint>),
    /// The inner constraint does not hold
    Not(Box<Constraint>),
    /// `then` holds when `guard` is true, `otherwise` when it is false
    IfThenElse {
        guard: VarId,
        then: Box<Constraint>,
        otherwise: Box<Constraint>,
    },
}

impl Constraint {
    pub fn sum_equals(vars: Vec<VarId>, target: usize) -> Self {
        Constraint::SumEquals { vars, target }
    }

    pub fn or(self, other: Constraint) -> Self {
        Constraint::Or(Box::new(self), Box::new(other))
    }

    pub fn if_then_else(guard: VarId, then: Constraint, otherwise: Constraint) -> Self {
        Constraint::IfThenElse {
            guard,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Sum of `vars` is one of `counts`. An empty `counts` yields a
    /// constraint that can never hold.
    pub fn sum_in(vars: &[VarId], counts: &[usize]) -> Self {
        counts
            .iter()
            .map(|&k| Constraint::sum_equals(vars.to_vec(), k))
            .reduce(Constraint::or)
            .unwrap_or_else(|| Constraint::sum_equals(vars.to_vec(), vars.len() + 1))
    }

    /// Evaluate under a total assignment indexed by [`VarId::index`]
    pub fn evaluate(&self, values: &[bool]) -> bool {
        match self {
            Constraint::SumEquals { vars, target } => {
                vars.iter().filter(|v| values[v.index()]).count() == *target
            }
            Constraint::Or(a, b) => a.evaluate(values) || b.evaluate(values),
            Constraint::Not(inner) => !inner.evaluate(values),
            Constraint::IfThenElse {
                guard,
                then,
                otherwise,
            } => {
                if values[guard.index()] {
                    then.evaluate(values)
                } else {
                    otherwise.evaluate(values)
                }
            }
        }
    }

    /// Every variable mentioned, guards included, possibly with repeats
    pub fn collect_variables(&self, out: &mut Vec<VarId>) {
        match self {
            Constraint::SumEquals { vars, .. } => out.extend_from_slice(vars),
            Constraint::Or(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
            Constraint::Not(inner) => inner.collect_variables(out),
            Constraint::IfThenElse {
                guard,
                then,
                otherwise,
            } => {
                out.push(*guard);
                then.collect_variables(out);
                otherwise.collect_variables(out);
            }
        }
    }

    /// Sorted, deduplicated variables of this constraint
    pub fn variables(&self) -> Vec<VarId> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort_unstable();
        vars.dedup();
        vars
    }
}

impl Not for Constraint {
    type Output = Constraint;

    fn not(self) -> Constraint {
        Constraint::Not(Box::new(self))
    }
}

/// A conjunction of constraints over `variable_count` booleans with an
/// optional objective to minimise. Built fresh for each solve.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    variable_count: usize,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl Model {
    pub fn new(name: impl Into<String>, variable_count: usize) -> Self {
        Self {
            name: name.into(),
            variable_count,
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn post(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn minimize(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Every constraint holds under the total assignment `values`
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        values.len() == self.variable_count && self.constraints.iter().all(|c| c.evaluate(values))
    }

    /// Objective value of `values`, zero when the model has no objective
    pub fn objective_value(&self, values: &[bool]) -> usize {
        self.objective.as_ref().map_or(0, |o| o.value(values))
    }

    /// Reject models that mention variables beyond `variable_count`
    pub fn validate(&self) -> Result<(), SolveError> {
        let objective_vars = self.objective.iter().flat_map(|o| o.variables().iter().copied());
        let constraint_vars = self.constraints.iter().flat_map(|c| c.variables());

        match objective_vars
            .chain(constraint_vars)
            .find(|v| v.index() >= self.variable_count)
        {
            Some(var) => Err(SolveError::UnknownVariable {
                var: var.index(),
                count: self.variable_count,
            }),
            None => Ok(()),
        }
    }
}
