//! Configuration management for the reverse Game of Life run

pub mod settings;

pub use settings::{
    CliOverrides, InputConfig, OutputConfig, OutputFormat, Settings, SimulationConfig,
    SolverConfig,
};
