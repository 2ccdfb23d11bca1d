//! Backtracking search with propagation and branch-and-bound

use super::cancel::CancelToken;
use super::constraints::Model;
use super::propagator::Propagator;
use crate::error::SolveError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ops::AddAssign;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// At most 2^16 parallel subtrees
const MAX_SPLIT_DEPTH: usize = 16;

/// Which value a branching variable tries first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrder {
    #[default]
    FalseFirst,
    TrueFirst,
}

impl ValueOrder {
    fn values(self) -> [bool; 2] {
        match self {
            ValueOrder::FalseFirst => [false, true],
            ValueOrder::TrueFirst => [true, false],
        }
    }
}

/// Configuration options for the constraint solver
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    pub value_order: ValueOrder,
    /// Number of leading unassigned variables to split on for parallel
    /// search; 0 searches sequentially
    pub parallel_split_depth: usize,
    pub cancel: CancelToken,
}

/// A total assignment satisfying every constraint of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSolution {
    /// Indexed by [`VarId::index`](super::VarId::index)
    pub assignment: Vec<bool>,
    pub objective_value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Best assignment after the whole tree was explored
    Optimal(SolverSolution),
    /// No assignment satisfies the model
    Infeasible,
}

impl SolveOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }

    pub fn solution(&self) -> Option<&SolverSolution> {
        match self {
            SolveOutcome::Optimal(solution) => Some(solution),
            SolveOutcome::Infeasible => None,
        }
    }

    pub fn into_solution(self) -> Option<SolverSolution> {
        match self {
            SolveOutcome::Optimal(solution) => Some(solution),
            SolveOutcome::Infeasible => None,
        }
    }
}

/// Statistics about the solving process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStatistics {
    pub variable_count: usize,
    pub constraint_count: usize,
    pub nodes: u64,
    pub failures: u64,
    pub propagations: u64,
    /// Improving solutions found on the way to the optimum
    pub solutions: u64,
    pub solve_time: Duration,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub statistics: SolverStatistics,
}

#[derive(Debug, Clone, Copy, Default)]
struct SearchCounters {
    nodes: u64,
    failures: u64,
    propagations: u64,
    solutions: u64,
}

impl AddAssign for SearchCounters {
    fn add_assign(&mut self, other: Self) {
        self.nodes += other.nodes;
        self.failures += other.failures;
        self.propagations += other.propagations;
        self.solutions += other.solutions;
    }
}

/// Best solution seen so far, shared by every branch of one solve
trait Incumbent {
    /// Objective value a new solution has to beat
    fn bound(&self) -> Option<usize>;
    /// Record `assignment` if it is strictly better; returns whether it was kept
    fn offer(&self, assignment: Vec<bool>, objective_value: usize) -> bool;
}

#[derive(Default)]
struct LocalIncumbent {
    best: RefCell<Option<SolverSolution>>,
}

impl Incumbent for LocalIncumbent {
    fn bound(&self) -> Option<usize> {
        self.best.borrow().as_ref().map(|s| s.objective_value)
    }

    fn offer(&self, assignment: Vec<bool>, objective_value: usize) -> bool {
        let mut best = self.best.borrow_mut();
        if best.as_ref().is_some_and(|b| b.objective_value <= objective_value) {
            return false;
        }
        *best = Some(SolverSolution {
            assignment,
            objective_value,
        });
        true
    }
}

/// Incumbent slot for parallel subtrees: the mutex owns the solution, the
/// atomic mirrors its objective so bound checks stay lock-free.
struct SharedIncumbent {
    best: Mutex<Option<SolverSolution>>,
    bound: AtomicUsize,
}

impl SharedIncumbent {
    const NO_BOUND: usize = usize::MAX;

    fn new() -> Self {
        Self {
            best: Mutex::new(None),
            bound: AtomicUsize::new(Self::NO_BOUND),
        }
    }

    fn into_inner(self) -> Option<SolverSolution> {
        self.best.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Incumbent for SharedIncumbent {
    fn bound(&self) -> Option<usize> {
        let bound = self.bound.load(Ordering::Acquire);
        (bound != Self::NO_BOUND).then_some(bound)
    }

    fn offer(&self, assignment: Vec<bool>, objective_value: usize) -> bool {
        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        if best.as_ref().is_some_and(|b| b.objective_value <= objective_value) {
            return false;
        }
        *best = Some(SolverSolution {
            assignment,
            objective_value,
        });
        self.bound.store(objective_value, Ordering::Release);
        true
    }
}

/// Propagators plus the variable → propagator index
struct CompiledModel<'m> {
    model: &'m Model,
    propagators: Vec<Propagator>,
    watchers: Vec<Vec<usize>>,
    objective: Vec<usize>,
}

impl<'m> CompiledModel<'m> {
    fn new(model: &'m Model) -> Self {
        let propagators: Vec<Propagator> =
            model.constraints().iter().map(Propagator::compile).collect();

        let mut watchers = vec![Vec::new(); model.variable_count()];
        let mut scratch = Vec::new();
        for (idx, propagator) in propagators.iter().enumerate() {
            scratch.clear();
            propagator.watched_variables(&mut scratch);
            scratch.sort_unstable();
            scratch.dedup();
            for &var in &scratch {
                watchers[var].push(idx);
            }
        }

        let objective: Vec<usize> = model
            .objective()
            .map(|o| o.variables().iter().map(|v| v.index()).collect())
            .unwrap_or_default();

        Self {
            model,
            propagators,
            watchers,
            objective,
        }
    }
}

/// Depth-first search state: the partial assignment, the trail used to undo
/// it, and the queue of propagators awaiting re-examination.
#[derive(Clone)]
struct Engine<'a> {
    compiled: &'a CompiledModel<'a>,
    cancel: &'a CancelToken,
    order: [bool; 2],
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    queue: VecDeque<usize>,
    queued: Vec<bool>,
    forced: Vec<(usize, bool)>,
    counters: SearchCounters,
}

impl<'a> Engine<'a> {
    fn new(compiled: &'a CompiledModel<'a>, options: &'a SolverOptions) -> Self {
        let constraint_count = compiled.propagators.len();
        Self {
            compiled,
            cancel: &options.cancel,
            order: options.value_order.values(),
            values: vec![None; compiled.model.variable_count()],
            trail: Vec::new(),
            queue: (0..constraint_count).collect(),
            queued: vec![true; constraint_count],
            forced: Vec::new(),
            counters: SearchCounters::default(),
        }
    }

    fn assign(&mut self, var: usize, value: bool) {
        let compiled = self.compiled;
        self.values[var] = Some(value);
        self.trail.push(var);
        for &c in &compiled.watchers[var] {
            if !self.queued[c] {
                self.queued[c] = true;
                self.queue.push_back(c);
            }
        }
    }

    /// Assign unless already set; false when it is set the other way
    fn force(&mut self, var: usize, value: bool) -> bool {
        match self.values[var] {
            Some(current) => current == value,
            None => {
                self.assign(var, value);
                true
            }
        }
    }

    fn backtrack(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(var) = self.trail.pop() {
                self.values[var] = None;
            }
        }
        self.clear_queue();
    }

    fn clear_queue(&mut self) {
        while let Some(c) = self.queue.pop_front() {
            self.queued[c] = false;
        }
    }

    /// Objective variables already true; no descendant can do better
    fn lower_bound(&self) -> usize {
        self.compiled
            .objective
            .iter()
            .filter(|&&v| self.values[v] == Some(true))
            .count()
    }

    /// Run queued propagators to a fixed point. Returns false on conflict.
    fn propagate(&mut self, bound: Option<usize>) -> bool {
        let compiled = self.compiled;
        loop {
            while let Some(c) = self.queue.pop_front() {
                self.queued[c] = false;
                self.counters.propagations += 1;

                self.forced.clear();
                if compiled.propagators[c]
                    .propagate(true, &self.values, &mut self.forced)
                    .is_err()
                {
                    self.clear_queue();
                    return false;
                }

                let forced = std::mem::take(&mut self.forced);
                let consistent = forced.iter().all(|&(var, value)| self.force(var, value));
                self.forced = forced;
                if !consistent {
                    self.clear_queue();
                    return false;
                }
            }

            if !self.enforce_bound(bound) {
                return false;
            }
            if self.queue.is_empty() {
                return true;
            }
        }
    }

    /// Branch-and-bound cut: a solution must score strictly below `bound`.
    /// One short of the bound, every open objective variable is forced false.
    fn enforce_bound(&mut self, bound: Option<usize>) -> bool {
        let Some(bound) = bound else {
            return true;
        };

        let lower = self.lower_bound();
        if lower >= bound {
            return false;
        }
        if lower + 1 == bound {
            let compiled = self.compiled;
            for &var in &compiled.objective {
                if self.values[var].is_none() {
                    self.assign(var, false);
                }
            }
        }
        true
    }

    /// Explore the subtree below the current partial assignment. Variables
    /// before `from` are known to be assigned.
    fn search(&mut self, from: usize, incumbent: &dyn Incumbent) -> Result<(), SolveError> {
        if self.cancel.is_cancelled() {
            return Err(SolveError::Interrupted {
                incumbent: incumbent.bound(),
            });
        }
        self.counters.nodes += 1;

        if !self.propagate(incumbent.bound()) {
            self.counters.failures += 1;
            return Ok(());
        }

        let Some(var) = (from..self.values.len()).find(|&v| self.values[v].is_none()) else {
            let assignment: Vec<bool> = self.values.iter().map(|v| *v == Some(true)).collect();
            debug_assert!(self.compiled.model.is_satisfied(&assignment));

            let objective_value = self.lower_bound();
            if incumbent.offer(assignment, objective_value) {
                self.counters.solutions += 1;
                trace!(objective_value, nodes = self.counters.nodes, "improved incumbent");
            }
            return Ok(());
        };

        for value in self.order {
            let mark = self.trail.len();
            self.assign(var, value);
            self.search(var + 1, incumbent)?;
            self.backtrack(mark);
        }
        Ok(())
    }
}

/// Finds an objective-minimal satisfying assignment of a [`Model`], or proves
/// there is none
pub struct ConstraintSolver<'m> {
    model: &'m Model,
    options: SolverOptions,
}

impl<'m> ConstraintSolver<'m> {
    pub fn new(model: &'m Model, options: SolverOptions) -> Self {
        Self { model, options }
    }

    /// Search the whole tree. Without an objective the first feasible
    /// assignment ends the search.
    pub fn solve(&self) -> Result<SolveReport, SolveError> {
        let start = Instant::now();
        self.model.validate()?;
        let compiled = CompiledModel::new(self.model);

        debug!(
            model = self.model.name(),
            variables = self.model.variable_count(),
            constraints = self.model.constraints().len(),
            split_depth = self.options.parallel_split_depth,
            "starting search"
        );

        let searched = if self.options.parallel_split_depth > 0 {
            self.search_parallel(&compiled)
        } else {
            self.search_sequential(&compiled)
        };
        let (best, counters) = searched.inspect_err(|e| warn!(error = %e, "search aborted"))?;

        let statistics = SolverStatistics {
            variable_count: self.model.variable_count(),
            constraint_count: self.model.constraints().len(),
            nodes: counters.nodes,
            failures: counters.failures,
            propagations: counters.propagations,
            solutions: counters.solutions,
            solve_time: start.elapsed(),
        };

        debug!(
            feasible = best.is_some(),
            objective = ?best.as_ref().map(|s| s.objective_value),
            nodes = statistics.nodes,
            elapsed_ms = statistics.solve_time.as_millis() as u64,
            "search finished"
        );

        let outcome = match best {
            Some(solution) => SolveOutcome::Optimal(solution),
            None => SolveOutcome::Infeasible,
        };
        Ok(SolveReport {
            outcome,
            statistics,
        })
    }

    fn search_sequential(
        &self,
        compiled: &CompiledModel<'_>,
    ) -> Result<(Option<SolverSolution>, SearchCounters), SolveError> {
        let incumbent = LocalIncumbent::default();
        let mut engine = Engine::new(compiled, &self.options);
        engine.search(0, &incumbent)?;
        Ok((incumbent.best.into_inner(), engine.counters))
    }

    /// Propagate at the root, then fan the first unassigned variables out
    /// into independent subtrees sharing one incumbent.
    fn search_parallel(
        &self,
        compiled: &CompiledModel<'_>,
    ) -> Result<(Option<SolverSolution>, SearchCounters), SolveError> {
        let mut root = Engine::new(compiled, &self.options);
        root.counters.nodes += 1;
        if !root.propagate(None) {
            root.counters.failures += 1;
            return Ok((None, root.counters));
        }

        let depth = self.options.parallel_split_depth.min(MAX_SPLIT_DEPTH);
        let split: Vec<usize> = (0..root.values.len())
            .filter(|&v| root.values[v].is_none())
            .take(depth)
            .collect();

        let incumbent = SharedIncumbent::new();
        let subtrees = (0..1usize << split.len())
            .into_par_iter()
            .map(|mask| {
                let mut engine = root.clone();
                engine.counters = SearchCounters::default();
                for (bit, &var) in split.iter().enumerate() {
                    engine.assign(var, engine.order[(mask >> bit) & 1]);
                }
                engine.search(0, &incumbent).map(|()| engine.counters)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut counters = root.counters;
        for subtree in subtrees {
            counters += subtree;
        }
        Ok((incumbent.into_inner(), counters))
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Constraints: {}", self.constraint_count)?;
        writeln!(f, "  Nodes: {}", self.nodes)?;
        writeln!(f, "  Failures: {}", self.failures)?;
        writeln!(f, "  Propagations: {}", self.propagations)?;
        writeln!(f, "  Improving solutions: {}", self.solutions)?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        Ok(())
    }
}
