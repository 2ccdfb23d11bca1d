//! Reverse Game of Life
//!
//! Finds a previous generation of a Game of Life board: each cell of the
//! unknown predecessor becomes a boolean variable, the transition rule is run
//! backwards as one constraint per target cell, and a branch-and-bound search
//! returns the predecessor with the fewest live cells on its border.

pub mod config;
pub mod csp;
pub mod error;
pub mod game_of_life;
pub mod reverse;
pub mod utils;

pub use config::Settings;
pub use csp::SolverOptions;
pub use error::{GridError, ReverseError, SolveError};
pub use game_of_life::{GameOfLifeRules, Grid};
pub use reverse::{ReverseProblem, ReverseRun, Solution};

/// Build an `n`×`n` grid from text rows, `'O'` alive and anything else dead
pub fn load_grid<S: AsRef<str>>(rows: &[S], n: usize) -> Result<Grid, GridError> {
    Grid::load(rows, n)
}

/// A border-minimal predecessor of `grid` on the same canvas, or `None` when
/// the grid has no predecessor
pub fn previous(grid: &Grid) -> Result<Option<Grid>, ReverseError> {
    previous_with(grid, &SolverOptions::default())
}

/// [`previous`] with explicit solver options (cancellation, value order,
/// parallel split)
pub fn previous_with(grid: &Grid, options: &SolverOptions) -> Result<Option<Grid>, ReverseError> {
    Ok(reverse::find_predecessor(grid, options)?.map(|solution| solution.predecessor))
}

/// One forward generation
pub fn step(grid: &Grid) -> Grid {
    GameOfLifeRules::step(grid)
}

pub fn pad(grid: &Grid, amount: usize) -> Grid {
    grid.pad(amount)
}

/// Load the configured target and run the backward search
pub fn solve_reverse(settings: Settings) -> anyhow::Result<ReverseRun> {
    let problem = ReverseProblem::new(settings)?;
    Ok(problem.run()?)
}
