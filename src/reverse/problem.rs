//! Predecessor search and the repeated backward-stepping run

use super::{Solution, SolutionValidator};
use crate::config::Settings;
use crate::csp::{CancelToken, ConstraintSolver, PredecessorEncoder, SolverOptions};
use crate::error::ReverseError;
use crate::game_of_life::{load_grid_from_file, GameOfLifeRules, Grid};
use anyhow::Context;
use tracing::{debug, info};

/// Border-minimal predecessor of `target` on the same canvas, or `None` when
/// no grid steps forward to it.
pub fn find_predecessor(
    target: &Grid,
    options: &SolverOptions,
) -> Result<Option<Solution>, ReverseError> {
    let encoded = PredecessorEncoder::new().encode(target)?;
    let report = ConstraintSolver::new(&encoded.model, options.clone()).solve()?;

    let Some(found) = report.outcome.into_solution() else {
        debug!(size = target.size(), nodes = report.statistics.nodes, "target has no predecessor");
        return Ok(None);
    };

    let predecessor = encoded.decode(&found.assignment);
    let validation = SolutionValidator::new().validate(&predecessor, target);
    if !validation.is_valid {
        return Err(ReverseError::Validation(
            validation.error_message.unwrap_or_default(),
        ));
    }

    let solution = Solution::new(predecessor, target.clone(), report.statistics);
    if solution.border_score != found.objective_value {
        return Err(ReverseError::Validation(format!(
            "solver reported border {} but the predecessor has {}",
            found.objective_value, solution.border_score
        )));
    }
    debug!(
        size = target.size(),
        border = solution.border_score,
        living = solution.metadata.predecessor_living_cells,
        "predecessor found"
    );
    Ok(Some(solution))
}

/// Everything a backward run produced
#[derive(Debug, Clone)]
pub struct ReverseRun {
    pub target: Grid,
    /// One entry per successful backward step, latest generation first
    pub steps: Vec<Solution>,
    /// The run stopped early on a grid without predecessor
    pub exhausted: bool,
    /// Forward evolution of the earliest grid, starting with that grid
    pub forward: Vec<Grid>,
}

impl ReverseRun {
    /// The oldest grid reached, or the target when no step succeeded
    pub fn earliest(&self) -> &Grid {
        self.steps
            .last()
            .map_or(&self.target, |solution| &solution.predecessor)
    }
}

/// A target grid plus the settings driving the backward run
pub struct ReverseProblem {
    settings: Settings,
    target_grid: Grid,
    cancel: CancelToken,
}

impl ReverseProblem {
    /// Load the target grid named by the settings
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let target_grid =
            load_grid_from_file(&settings.input.target_state_file, settings.input.grid_size)
                .context("Failed to load target state file")?;

        Ok(Self::with_target_grid(settings, target_grid))
    }

    pub fn with_target_grid(settings: Settings, target_grid: Grid) -> Self {
        Self {
            settings,
            target_grid,
            cancel: CancelToken::new(),
        }
    }

    pub fn target_grid(&self) -> &Grid {
        &self.target_grid
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle that aborts any search started by this problem
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Options for one backward step; the deadline restarts per step
    pub fn solver_options(&self) -> SolverOptions {
        let cancel = match self.settings.timeout() {
            Some(timeout) => self.cancel.with_timeout(timeout),
            None => self.cancel.clone(),
        };

        SolverOptions {
            value_order: self.settings.solver.value_order,
            parallel_split_depth: self.settings.solver.parallel_split_depth,
            cancel,
        }
    }

    pub fn run(&self) -> Result<ReverseRun, ReverseError> {
        self.run_with(|_, _| {})
    }

    /// Pad, solve and repeat `backward_steps` times, then evolve the earliest
    /// grid forward. `on_step` sees each step number with its result as soon
    /// as it is known.
    pub fn run_with<F>(&self, mut on_step: F) -> Result<ReverseRun, ReverseError>
    where
        F: FnMut(usize, Option<&Solution>),
    {
        let simulation = &self.settings.simulation;
        let mut current = self.target_grid.clone();
        let mut steps: Vec<Solution> = Vec::new();
        let mut exhausted = false;

        for step in 1..=simulation.backward_steps {
            let padded = current.pad(simulation.padding);
            match find_predecessor(&padded, &self.solver_options())? {
                Some(solution) => {
                    info!(
                        step,
                        size = padded.size(),
                        border = solution.border_score,
                        elapsed_ms = solution.solve_time().as_millis() as u64,
                        "backward step complete"
                    );
                    on_step(step, Some(&solution));
                    current = solution.predecessor.clone();
                    steps.push(solution);
                }
                None => {
                    info!(step, size = padded.size(), "no predecessor, stopping");
                    on_step(step, None);
                    exhausted = true;
                    break;
                }
            }
        }

        let forward = GameOfLifeRules::trajectory(&current, simulation.forward_steps);
        Ok(ReverseRun {
            target: self.target_grid.clone(),
            steps,
            exhausted,
            forward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolveError;

    fn settings(backward_steps: usize, padding: usize) -> Settings {
        let mut settings = Settings::default();
        settings.simulation.backward_steps = backward_steps;
        settings.simulation.forward_steps = 2;
        settings.simulation.padding = padding;
        settings
    }

    #[test]
    fn test_find_predecessor_of_blinker() {
        let target = Grid::load(&[".....", ".....", ".OOO.", ".....", "....."], 5).unwrap();
        let solution = find_predecessor(&target, &SolverOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(GameOfLifeRules::step(&solution.predecessor), target);
        assert_eq!(solution.border_score, 0);
    }

    #[test]
    fn test_border_score_is_solver_objective() {
        let target = Grid::load(&["O..O", "....", "....", "O..O"], 4).unwrap();
        let options = SolverOptions::default();

        let encoded = PredecessorEncoder::new().encode(&target).unwrap();
        let report = ConstraintSolver::new(&encoded.model, options.clone())
            .solve()
            .unwrap();
        let objective = report.outcome.solution().map(|s| s.objective_value);

        let solution = find_predecessor(&target, &options).unwrap();
        assert_eq!(solution.as_ref().map(|s| s.border_score), objective);
        if let Some(solution) = solution {
            assert_eq!(solution.border_score, solution.predecessor.border_living_count());
        }
    }

    #[test]
    fn test_lone_cell_has_no_predecessor() {
        let target = Grid::load(&["O"], 1).unwrap();
        assert!(find_predecessor(&target, &SolverOptions::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_run_grows_canvas_each_step() {
        let target = Grid::load(&["....", ".OO.", ".OO.", "...."], 4).unwrap();
        let problem = ReverseProblem::with_target_grid(settings(2, 1), target.clone());

        let mut seen = Vec::new();
        let run = problem
            .run_with(|step, solution| seen.push((step, solution.map(|s| s.predecessor.size()))))
            .unwrap();

        assert!(!run.exhausted);
        assert_eq!(seen, vec![(1, Some(6)), (2, Some(8))]);
        assert_eq!(run.earliest().size(), 8);
        assert_eq!(run.forward.len(), 3);
        assert_eq!(&run.forward[0], run.earliest());
    }

    #[test]
    fn test_run_stops_when_exhausted() {
        let target = Grid::load(&["O"], 1).unwrap();
        let problem = ReverseProblem::with_target_grid(settings(3, 0), target.clone());

        let run = problem.run().unwrap();
        assert!(run.exhausted);
        assert!(run.steps.is_empty());
        assert_eq!(run.earliest(), &target);
        // Forward demonstration starts from the target itself
        assert_eq!(run.forward[1], Grid::new(1).unwrap());
    }

    #[test]
    fn test_cancelled_run() {
        let target = Grid::new(3).unwrap();
        let problem = ReverseProblem::with_target_grid(settings(1, 0), target);
        problem.cancel_token().cancel();

        assert!(matches!(
            problem.run(),
            Err(ReverseError::Solve(SolveError::Interrupted { .. }))
        ));
    }
}
