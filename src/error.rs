//! Error types shared by the grid, model and solver layers

use thiserror::Error;

/// Failures while constructing or addressing a [`Grid`](crate::game_of_life::Grid)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The source text has fewer rows or columns than the declared size
    #[error("malformed input: expected {expected} rows of at least {expected} cells, row {row} has {found}")]
    MalformedInput {
        expected: usize,
        row: usize,
        found: usize,
    },

    #[error("grid size must be at least 1")]
    Empty,

    #[error("coordinates ({row}, {col}) out of bounds for {size}x{size} grid")]
    OutOfBounds { row: usize, col: usize, size: usize },
}

/// Abnormal termination of a search. Infeasibility is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The cancellation token fired or the deadline passed before the search
    /// finished. `incumbent` is the best objective value seen at that point.
    #[error("search interrupted before completion (best objective so far: {incumbent:?})")]
    Interrupted { incumbent: Option<usize> },

    #[error("model references variable {var} but only {count} variables exist")]
    UnknownVariable { var: usize, count: usize },
}

/// Errors surfaced by the reverse-evolution entry points
#[derive(Debug, Error)]
pub enum ReverseError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    /// The solver returned an assignment that does not step forward to the target
    #[error("predecessor failed validation: {0}")]
    Validation(String),
}
