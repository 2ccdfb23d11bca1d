//! Local consistency rules for posted constraints.
//!
//! Before search each [`Constraint`] is lowered into a [`Propagator`]. Sums over
//! one variable list combined through `Or`/`Not` collapse into a single
//! [`Propagator::Count`] holding the set of admissible totals, so
//! `sum == 2 ∨ sum == 3` propagates as one unit instead of two.

use super::constraints::Constraint;

/// Three-valued truth of a constraint under a partial assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    fn from_bool(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }

    fn negate(self) -> Self {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    /// The constraint can still come out as `polarity`
    fn permits(self, polarity: bool) -> bool {
        self != Truth::from_bool(!polarity)
    }
}

/// The partial assignment cannot be extended to satisfy a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict;

/// Solver-side form of a [`Constraint`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propagator {
    /// The number of true variables lies in `allowed` (indexed by total)
    Count { vars: Vec<usize>, allowed: Vec<bool> },
    Or(Box<Propagator>, Box<Propagator>),
    Not(Box<Propagator>),
    IfThenElse {
        guard: usize,
        then: Box<Propagator>,
        otherwise: Box<Propagator>,
    },
}

impl Propagator {
    pub fn compile(constraint: &Constraint) -> Self {
        if let Some((vars, allowed)) = count_form(constraint) {
            return Propagator::Count { vars, allowed };
        }

        match constraint {
            // Always has a count form
            Constraint::SumEquals { vars, target } => Propagator::Count {
                vars: vars.iter().map(|v| v.index()).collect(),
                allowed: (0..=vars.len()).map(|s| s == *target).collect(),
            },
            Constraint::Or(a, b) => {
                Propagator::Or(Box::new(Self::compile(a)), Box::new(Self::compile(b)))
            }
            Constraint::Not(inner) => Propagator::Not(Box::new(Self::compile(inner))),
            Constraint::IfThenElse {
                guard,
                then,
                otherwise,
            } => Propagator::IfThenElse {
                guard: guard.index(),
                then: Box::new(Self::compile(then)),
                otherwise: Box::new(Self::compile(otherwise)),
            },
        }
    }

    /// Variables whose assignment can change this propagator's outcome
    pub fn watched_variables(&self, out: &mut Vec<usize>) {
        match self {
            Propagator::Count { vars, .. } => out.extend_from_slice(vars),
            Propagator::Or(a, b) => {
                a.watched_variables(out);
                b.watched_variables(out);
            }
            Propagator::Not(inner) => inner.watched_variables(out),
            Propagator::IfThenElse {
                guard,
                then,
                otherwise,
            } => {
                out.push(*guard);
                then.watched_variables(out);
                otherwise.watched_variables(out);
            }
        }
    }

    pub fn status(&self, values: &[Option<bool>]) -> Truth {
        match self {
            Propagator::Count { vars, allowed } => {
                let (set, open) = tally(vars, values);
                let mut reachable = (set..=set + open).map(|s| admits(allowed, s));
                let first = reachable.next().unwrap_or(false);
                if reachable.all(|a| a == first) {
                    Truth::from_bool(first)
                } else {
                    Truth::Unknown
                }
            }
            Propagator::Or(a, b) => match (a.status(values), b.status(values)) {
                (Truth::True, _) | (_, Truth::True) => Truth::True,
                (Truth::False, Truth::False) => Truth::False,
                _ => Truth::Unknown,
            },
            Propagator::Not(inner) => inner.status(values).negate(),
            Propagator::IfThenElse {
                guard,
                then,
                otherwise,
            } => match values[*guard] {
                Some(true) => then.status(values),
                Some(false) => otherwise.status(values),
                None => {
                    let (t, o) = (then.status(values), otherwise.status(values));
                    if t == o {
                        t
                    } else {
                        Truth::Unknown
                    }
                }
            },
        }
    }

    /// Require this propagator to evaluate to `polarity`, pushing forced
    /// `(variable, value)` pairs to `forced`.
    ///
    /// Forced values are not applied here; the caller assigns them and
    /// re-runs every propagator watching those variables.
    pub fn propagate(
        &self,
        polarity: bool,
        values: &[Option<bool>],
        forced: &mut Vec<(usize, bool)>,
    ) -> Result<(), Conflict> {
        match self {
            Propagator::Count { vars, allowed } => {
                let (set, open) = tally(vars, values);
                let mut feasible = (set..=set + open).filter(|&s| admits(allowed, s) == polarity);
                let low = feasible.next().ok_or(Conflict)?;
                let high = feasible.last().unwrap_or(low);

                if open > 0 {
                    if high == set {
                        force_unassigned(vars, values, false, forced);
                    } else if low == set + open {
                        force_unassigned(vars, values, true, forced);
                    }
                }
                Ok(())
            }
            Propagator::Not(inner) => inner.propagate(!polarity, values, forced),
            Propagator::Or(a, b) if polarity => match (a.status(values), b.status(values)) {
                (Truth::True, _) | (_, Truth::True) => Ok(()),
                (Truth::False, Truth::False) => Err(Conflict),
                (Truth::False, Truth::Unknown) => b.propagate(true, values, forced),
                (Truth::Unknown, Truth::False) => a.propagate(true, values, forced),
                (Truth::Unknown, Truth::Unknown) => Ok(()),
            },
            Propagator::Or(a, b) => {
                a.propagate(false, values, forced)?;
                b.propagate(false, values, forced)
            }
            Propagator::IfThenElse {
                guard,
                then,
                otherwise,
            } => match values[*guard] {
                Some(true) => then.propagate(polarity, values, forced),
                Some(false) => otherwise.propagate(polarity, values, forced),
                None => {
                    let then_ok = then.status(values).permits(polarity);
                    let otherwise_ok = otherwise.status(values).permits(polarity);
                    match (then_ok, otherwise_ok) {
                        (false, false) => Err(Conflict),
                        (false, true) => {
                            forced.push((*guard, false));
                            Ok(())
                        }
                        (true, false) => {
                            forced.push((*guard, true));
                            Ok(())
                        }
                        (true, true) => Ok(()),
                    }
                }
            },
        }
    }
}

/// `(assigned true, unassigned)` counts over `vars`
fn tally(vars: &[usize], values: &[Option<bool>]) -> (usize, usize) {
    vars.iter().fold((0, 0), |(set, open), &v| match values[v] {
        Some(true) => (set + 1, open),
        Some(false) => (set, open),
        None => (set, open + 1),
    })
}

#[inline]
fn admits(allowed: &[bool], total: usize) -> bool {
    allowed.get(total).copied().unwrap_or(false)
}

fn force_unassigned(
    vars: &[usize],
    values: &[Option<bool>],
    value: bool,
    forced: &mut Vec<(usize, bool)>,
) {
    forced.extend(
        vars.iter()
            .filter(|&&v| values[v].is_none())
            .map(|&v| (v, value)),
    );
}

/// Admissible-total form of a sum constraint tree, when it has one
fn count_form(constraint: &Constraint) -> Option<(Vec<usize>, Vec<bool>)> {
    match constraint {
        Constraint::SumEquals { vars, target } => Some((
            vars.iter().map(|v| v.index()).collect(),
            (0..=vars.len()).map(|s| s == *target).collect(),
        )),
        Constraint::Not(inner) => {
            count_form(inner).map(|(vars, allowed)| (vars, allowed.into_iter().map(|a| !a).collect()))
        }
        Constraint::Or(a, b) => {
            let (vars_a, allowed_a) = count_form(a)?;
            let (vars_b, allowed_b) = count_form(b)?;
            if vars_a != vars_b {
                return None;
            }
            let allowed = allowed_a.iter().zip(&allowed_b).map(|(x, y)| *x || *y).collect();
            Some((vars_a, allowed))
        }
        Constraint::IfThenElse { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::VarId;

    fn vars(ids: &[usize]) -> Vec<VarId> {
        ids.iter().copied().map(VarId).collect()
    }

    fn run(p: &Propagator, polarity: bool, values: &[Option<bool>]) -> Result<Vec<(usize, bool)>, Conflict> {
        let mut forced = Vec::new();
        p.propagate(polarity, values, &mut forced).map(|_| forced)
    }

    #[test]
    fn test_sum_or_collapses_to_count() {
        let c = Constraint::sum_in(&vars(&[0, 1, 2]), &[2, 3]);
        let p = Propagator::compile(&c);
        assert_eq!(
            p,
            Propagator::Count {
                vars: vec![0, 1, 2],
                allowed: vec![false, false, true, true],
            }
        );

        let negated = Propagator::compile(&!c);
        assert_eq!(
            negated,
            Propagator::Count {
                vars: vec![0, 1, 2],
                allowed: vec![true, true, false, false],
            }
        );
    }

    #[test]
    fn test_sum_equals_rules() {
        let p = Propagator::compile(&Constraint::sum_equals(vars(&[0, 1, 2]), 1));

        // Already at k: rest forced false
        assert_eq!(run(&p, true, &[Some(true), None, None]), Ok(vec![(1, false), (2, false)]));
        // Only way to reach k is all unassigned true
        assert_eq!(run(&p, true, &[Some(false), Some(false), None]), Ok(vec![(2, true)]));
        // Overshoot
        assert_eq!(run(&p, true, &[Some(true), Some(true), None]), Err(Conflict));
        // Fully assigned and wrong
        assert_eq!(run(&p, true, &[Some(false), Some(false), Some(false)]), Err(Conflict));
        // Nothing to deduce yet
        assert_eq!(run(&p, true, &[None, None, None]), Ok(vec![]));
    }

    #[test]
    fn test_sum_not_equals_rules() {
        let p = Propagator::compile(&Constraint::sum_equals(vars(&[0, 1]), 1));

        assert_eq!(run(&p, false, &[Some(true), None]), Ok(vec![(1, true)]));
        assert_eq!(run(&p, false, &[Some(false), None]), Ok(vec![(1, false)]));
        assert_eq!(run(&p, false, &[Some(true), Some(false)]), Err(Conflict));
    }

    #[test]
    fn test_if_then_else_forces_guard() {
        // if v0 then sum(v1,v2)==2 else sum(v1,v2)==0
        let c = Constraint::if_then_else(
            VarId(0),
            Constraint::sum_equals(vars(&[1, 2]), 2),
            Constraint::sum_equals(vars(&[1, 2]), 0),
        );
        let p = Propagator::compile(&c);

        // v1 true rules out the else branch
        assert_eq!(run(&p, true, &[None, Some(true), None]), Ok(vec![(0, true)]));
        // Guard set: only the chosen branch propagates
        assert_eq!(run(&p, true, &[Some(false), None, None]), Ok(vec![(1, false), (2, false)]));
        // Neither branch possible
        assert_eq!(run(&p, true, &[None, Some(true), Some(false)]), Err(Conflict));
    }

    #[test]
    fn test_or_of_unrelated_constraints() {
        let c = Constraint::sum_equals(vars(&[0]), 1).or(Constraint::sum_equals(vars(&[1]), 1));
        let p = Propagator::compile(&c);
        assert!(matches!(p, Propagator::Or(_, _)));

        assert_eq!(run(&p, true, &[Some(false), None]), Ok(vec![(1, true)]));
        assert_eq!(run(&p, true, &[Some(false), Some(false)]), Err(Conflict));
        assert_eq!(run(&p, false, &[None, None]), Ok(vec![(0, false), (1, false)]));
        assert_eq!(p.status(&[Some(true), None]), Truth::True);
        assert_eq!(p.status(&[None, None]), Truth::Unknown);
    }
}
