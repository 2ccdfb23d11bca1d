//! Terminal output and export helpers

pub mod display;

pub use display::{Color, ColorOutput, SolutionFormatter};
