//! Constraint modelling and search for reverse Game of Life

pub mod cancel;
pub mod constraints;
pub mod encoder;
pub mod objective;
pub mod propagator;
pub mod solver;
pub mod variables;

pub use cancel::CancelToken;
pub use constraints::{Constraint, Model};
pub use encoder::{EncodedModel, PredecessorEncoder};
pub use objective::{border_objective, Objective};
pub use propagator::{Propagator, Truth};
pub use solver::{
    ConstraintSolver, SolveOutcome, SolveReport, SolverOptions, SolverSolution, SolverStatistics,
    ValueOrder,
};
pub use variables::{VarId, VariableManager, VariableType};
