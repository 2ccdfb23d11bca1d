//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::game_of_life::{grid_to_string, Grid};
use crate::reverse::{ReverseRun, Solution};
use anyhow::{Context, Result};
use std::path::Path;

/// Renders grids, solutions and whole runs
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// A grid framed by blank lines, in the `O`/`.` text format
    pub fn format_board(grid: &Grid) -> String {
        format!("\n{}\n", grid_to_string(grid))
    }

    pub fn format_solution(solution: &Solution) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Predecessor {} ===\n", solution.metadata.id));
        output.push_str(&format!(
            "Size: {0}x{0}\n",
            solution.predecessor.size()
        ));
        output.push_str(&format!("Border score: {}\n", solution.border_score));
        output.push_str(&format!(
            "Living cells: {} → {}\n",
            solution.metadata.predecessor_living_cells, solution.metadata.target_living_cells
        ));
        if solution.metadata.is_still_life {
            output.push_str("Type: Still Life\n");
        }
        output.push_str(&format!(
            "Search: {} nodes, {} failures in {:.3}s\n",
            solution.statistics.nodes,
            solution.statistics.failures,
            solution.solve_time().as_secs_f64()
        ));
        output.push_str(&Self::format_board(&solution.predecessor));

        output
    }

    /// Table of every backward step of a run
    pub fn format_run_summary(run: &ReverseRun) -> String {
        let mut output = String::new();

        output.push_str("Backward Steps:\n");
        output.push_str("Step | Size | Border | Living | Nodes    | Time(ms)\n");
        output.push_str("-----|------|--------|--------|----------|---------\n");
        for (i, solution) in run.steps.iter().enumerate() {
            output.push_str(&format!(
                "{:4} | {:4} | {:6} | {:6} | {:8} | {}\n",
                i + 1,
                solution.predecessor.size(),
                solution.border_score,
                solution.metadata.predecessor_living_cells,
                solution.statistics.nodes,
                solution.solve_time().as_millis()
            ));
        }
        if run.exhausted {
            output.push_str(&format!(
                "Step {} has no predecessor.\n",
                run.steps.len() + 1
            ));
        }

        output
    }

    /// Write every grid of a run to `output_dir` in the chosen format
    pub fn save_run<P: AsRef<Path>>(
        run: &ReverseRun,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        match format {
            OutputFormat::Text => {
                std::fs::write(output_dir.join("target.txt"), grid_to_string(&run.target))?;
                for (i, solution) in run.steps.iter().enumerate() {
                    let filepath = output_dir.join(format!("previous_{:03}.txt", i + 1));
                    std::fs::write(filepath, grid_to_string(&solution.predecessor))?;
                }
                for (i, grid) in run.forward.iter().enumerate() {
                    let filepath = output_dir.join(format!("forward_{:03}.txt", i));
                    std::fs::write(filepath, grid_to_string(grid))?;
                }
                std::fs::write(output_dir.join("summary.txt"), Self::format_run_summary(run))?;
            }
            OutputFormat::Json => {
                for (i, solution) in run.steps.iter().enumerate() {
                    let filepath = output_dir.join(format!("previous_{:03}.json", i + 1));
                    solution.save_to_file(filepath)?;
                }

                let summaries: Vec<_> = run.steps.iter().map(|s| s.summary()).collect();
                let summary_json = serde_json::to_string_pretty(&summaries)?;
                std::fs::write(output_dir.join("summary.json"), summary_json)?;

                let forward_json = serde_json::to_string_pretty(&run.forward)?;
                std::fs::write(output_dir.join("forward.json"), forward_json)?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
