//! One backward step: a predecessor together with how it was found

use crate::csp::SolverStatistics;
use crate::game_of_life::Grid;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A predecessor grid that steps forward to `target`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The earlier grid
    pub predecessor: Grid,
    /// The grid it steps forward to
    pub target: Grid,
    /// Live cells on the predecessor's outer ring, minimised by the solver
    pub border_score: usize,
    pub statistics: SolverStatistics,
    pub metadata: SolutionMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionMetadata {
    /// Stable identifier derived from the predecessor's cells
    pub id: String,
    pub predecessor_living_cells: usize,
    pub target_living_cells: usize,
    /// Fraction of live cells in the predecessor (0.0 to 1.0)
    pub predecessor_density: f64,
    /// Predecessor equals target, so the pattern is stable
    pub is_still_life: bool,
}

impl Solution {
    pub fn new(predecessor: Grid, target: Grid, statistics: SolverStatistics) -> Self {
        let metadata = SolutionMetadata::analyze(&predecessor, &target);
        let border_score = predecessor.border_living_count();

        Self {
            predecessor,
            target,
            border_score,
            statistics,
            metadata,
        }
    }

    pub fn solve_time(&self) -> Duration {
        self.statistics.solve_time
    }

    pub fn summary(&self) -> SolutionSummary {
        SolutionSummary {
            id: self.metadata.id.clone(),
            size: self.predecessor.size(),
            predecessor_living_cells: self.metadata.predecessor_living_cells,
            target_living_cells: self.metadata.target_living_cells,
            border_score: self.border_score,
            nodes: self.statistics.nodes,
            solve_time_ms: self.statistics.solve_time.as_millis() as u64,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

impl SolutionMetadata {
    pub fn analyze(predecessor: &Grid, target: &Grid) -> Self {
        let predecessor_living_cells = predecessor.living_count();
        let total_cells = predecessor.size() * predecessor.size();

        Self {
            id: Self::generate_id(predecessor),
            predecessor_living_cells,
            target_living_cells: target.living_count(),
            predecessor_density: predecessor_living_cells as f64 / total_cells as f64,
            is_still_life: predecessor == target,
        }
    }

    fn generate_id(predecessor: &Grid) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        predecessor.hash(&mut hasher);
        format!("pred_{:x}", hasher.finish())
    }
}

/// One-line view of a solution for logs and reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionSummary {
    pub id: String,
    pub size: usize,
    pub predecessor_living_cells: usize,
    pub target_living_cells: usize,
    pub border_score: usize,
    pub nodes: u64,
    pub solve_time_ms: u64,
}

impl std::fmt::Display for SolutionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}x{}): {} → {} cells, border {}, {} nodes, {}ms",
            self.id,
            self.size,
            self.size,
            self.predecessor_living_cells,
            self.target_living_cells,
            self.border_score,
            self.nodes,
            self.solve_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn block() -> Grid {
        Grid::load(&["....", ".OO.", ".OO.", "...."], 4).unwrap()
    }

    #[test]
    fn test_solution_creation() {
        let solution = Solution::new(block(), block(), SolverStatistics::default());

        assert_eq!(solution.border_score, 0);
        assert_eq!(solution.metadata.predecessor_living_cells, 4);
        assert_eq!(solution.metadata.predecessor_density, 0.25);
        assert!(solution.metadata.is_still_life);
        assert!(solution.metadata.id.starts_with("pred_"));
    }

    #[test]
    fn test_id_depends_on_cells() {
        let mut other = block();
        other.set(0, 0, true).unwrap();

        let a = SolutionMetadata::analyze(&block(), &block());
        let b = SolutionMetadata::analyze(&other, &block());
        assert_ne!(a.id, b.id);
        assert!(!b.is_still_life);
        assert_eq!(a, SolutionMetadata::analyze(&block(), &block()));
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("solution.json");

        let statistics = SolverStatistics {
            nodes: 12,
            solve_time: Duration::from_millis(7),
            ..SolverStatistics::default()
        };
        let solution = Solution::new(block(), block(), statistics);
        solution.save_to_file(&path).unwrap();

        let loaded = Solution::load_from_file(&path).unwrap();
        assert_eq!(loaded.predecessor, solution.predecessor);
        assert_eq!(loaded.statistics, solution.statistics);
        assert_eq!(loaded.metadata, solution.metadata);
    }

    #[test]
    fn test_summary_display() {
        let summary = Solution::new(block(), block(), SolverStatistics::default()).summary();
        let line = summary.to_string();
        assert!(line.contains("(4x4)"));
        assert!(line.contains("border 0"));
    }
}
