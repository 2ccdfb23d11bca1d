//! Configuration settings for the reverse Game of Life run

use crate::csp::ValueOrder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub simulation: SimulationConfig,
    pub solver: SolverConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// How many predecessors to search for, each one generation earlier
    pub backward_steps: usize,
    /// Generations to step forward from the earliest predecessor
    pub forward_steps: usize,
    /// Dead cells added on every side before each backward step
    pub padding: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Per-step deadline; unbounded when absent
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub value_order: ValueOrder,
    /// Split the search on this many variables and explore in parallel
    #[serde(default)]
    pub parallel_split_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub target_state_file: PathBuf,
    /// Side length to read; the number of lines in the file when absent
    #[serde(default)]
    pub grid_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub save_intermediate: bool,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                backward_steps: 5,
                forward_steps: 5,
                padding: 1,
            },
            solver: SolverConfig {
                timeout_seconds: None,
                value_order: ValueOrder::FalseFirst,
                parallel_split_depth: 0,
            },
            input: InputConfig {
                target_state_file: PathBuf::from("input/target_states/glider.txt"),
                grid_size: None,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                save_intermediate: false,
                output_directory: PathBuf::from("output/solutions"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Checks that need the final, merged settings
    pub fn validate(&self) -> Result<()> {
        if self.input.grid_size == Some(0) {
            anyhow::bail!("Grid size must be positive");
        }

        if !self.input.target_state_file.exists() {
            anyhow::bail!(
                "Target state file does not exist: {}",
                self.input.target_state_file.display()
            );
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.solver.timeout_seconds.map(Duration::from_secs)
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(steps) = cli_overrides.backward_steps {
            self.simulation.backward_steps = steps;
        }
        if let Some(steps) = cli_overrides.forward_steps {
            self.simulation.forward_steps = steps;
        }
        if let Some(padding) = cli_overrides.padding {
            self.simulation.padding = padding;
        }
        if let Some(timeout) = cli_overrides.timeout_seconds {
            self.solver.timeout_seconds = Some(timeout);
        }
        if let Some(depth) = cli_overrides.parallel_split_depth {
            self.solver.parallel_split_depth = depth;
        }
        if let Some(ref target_file) = cli_overrides.target_file {
            self.input.target_state_file = target_file.clone();
        }
        if let Some(size) = cli_overrides.grid_size {
            self.input.grid_size = Some(size);
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if cli_overrides.save {
            self.output.save_intermediate = true;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub backward_steps: Option<usize>,
    pub forward_steps: Option<usize>,
    pub padding: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub parallel_split_depth: Option<usize>,
    pub target_file: Option<PathBuf>,
    pub grid_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub save: bool,
}
