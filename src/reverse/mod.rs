//! Reverse Game of Life: finding and checking predecessors

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::{find_predecessor, ReverseProblem, ReverseRun};
pub use solution::{Solution, SolutionMetadata, SolutionSummary};
pub use validator::{RuleViolation, SolutionValidator, ValidationResult};
