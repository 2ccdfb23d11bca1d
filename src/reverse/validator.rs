//! Independent check that a predecessor really steps to its target

use crate::game_of_life::{Cell, GameOfLifeRules, Grid};
use std::time::Instant;

/// Re-derives each target cell from the predecessor with the forward rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionValidator;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub final_state_matches: bool,
    pub rule_violations: Vec<RuleViolation>,
    pub error_message: Option<String>,
    pub validation_time_ms: u64,
}

/// A target cell that disagrees with the rule applied to the predecessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Position in the chain of grids, 0 for a single step
    pub generation: usize,
    pub cell: Cell,
    pub expected_state: bool,
    pub actual_state: bool,
    pub neighbor_count: u8,
}

impl SolutionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Step `predecessor` once and compare it with `target` cell by cell
    pub fn validate(&self, predecessor: &Grid, target: &Grid) -> ValidationResult {
        self.validate_chain(&[predecessor.clone(), target.clone()])
    }

    /// Check every consecutive pair of `chain` is one forward step apart
    pub fn validate_chain(&self, chain: &[Grid]) -> ValidationResult {
        let start = Instant::now();

        if let Some(pair) = chain.windows(2).find(|w| w[0].size() != w[1].size()) {
            return ValidationResult {
                is_valid: false,
                final_state_matches: false,
                rule_violations: Vec::new(),
                error_message: Some(format!(
                    "Grid dimension mismatch: {}x{} vs {}x{}",
                    pair[0].size(),
                    pair[0].size(),
                    pair[1].size(),
                    pair[1].size()
                )),
                validation_time_ms: start.elapsed().as_millis() as u64,
            };
        }

        let rule_violations: Vec<RuleViolation> = chain
            .windows(2)
            .enumerate()
            .flat_map(|(generation, w)| Self::transition_violations(&w[0], &w[1], generation))
            .collect();

        let final_state_matches = match chain {
            [.., before, last] => GameOfLifeRules::is_predecessor(before, last),
            _ => true,
        };
        let is_valid = rule_violations.is_empty();

        ValidationResult {
            is_valid,
            final_state_matches,
            error_message: (!is_valid).then(|| Self::describe(&rule_violations)),
            rule_violations,
            validation_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn transition_violations(current: &Grid, next: &Grid, generation: usize) -> Vec<RuleViolation> {
        (0..current.size() * current.size())
            .filter_map(|idx| {
                let cell = current.cell_at(idx);
                let neighbor_count = current.count_neighbors(cell.row, cell.col);
                let expected_state =
                    GameOfLifeRules::next_state(current.get(cell.row, cell.col), neighbor_count);
                let actual_state = next.get(cell.row, cell.col);

                (expected_state != actual_state).then_some(RuleViolation {
                    generation,
                    cell,
                    expected_state,
                    actual_state,
                    neighbor_count,
                })
            })
            .collect()
    }

    fn describe(violations: &[RuleViolation]) -> String {
        let mut message = format!("{} cells disagree with the rules", violations.len());
        for v in violations.iter().take(3) {
            message.push_str(&format!("; {}", v));
        }
        if violations.len() > 3 {
            message.push_str(&format!("; ... and {} more", violations.len() - 3));
        }
        message
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = |alive: bool| if alive { "alive" } else { "dead" };
        write!(
            f,
            "cell ({}, {}) at generation {} should be {} but is {} ({} neighbours)",
            self.cell.row,
            self.cell.col,
            self.generation + 1,
            state(self.expected_state),
            state(self.actual_state),
            self.neighbor_count
        )
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Validation Result: {}", if self.is_valid { "VALID" } else { "INVALID" })?;
        if let Some(ref error) = self.error_message {
            writeln!(f, "Error: {}", error)?;
        }
        writeln!(f, "Final state matches: {}", self.final_state_matches)?;
        writeln!(f, "Rule violations: {}", self.rule_violations.len())?;
        writeln!(f, "Validation time: {}ms", self.validation_time_ms)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_blinker_step() {
        let predecessor = Grid::load(&[".O.", ".O.", ".O."], 3).unwrap();
        let target = Grid::load(&["...", "OOO", "..."], 3).unwrap();

        let result = SolutionValidator::new().validate(&predecessor, &target);
        assert!(result.is_valid);
        assert!(result.final_state_matches);
        assert!(result.rule_violations.is_empty());
        assert!(GameOfLifeRules::is_predecessor(&predecessor, &target));
    }

    #[test]
    fn test_lonely_cell_violation() {
        let current = Grid::load(&["...", ".O.", "..."], 3).unwrap();

        let result = SolutionValidator::new().validate(&current, &current);
        assert!(!result.is_valid);
        assert_eq!(
            result.rule_violations,
            vec![RuleViolation {
                generation: 0,
                cell: Cell::new(1, 1),
                expected_state: false,
                actual_state: true,
                neighbor_count: 0,
            }]
        );
        assert!(result.error_message.unwrap().contains("cell (1, 1)"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = SolutionValidator::new()
            .validate(&Grid::new(3).unwrap(), &Grid::new(4).unwrap());
        assert!(!result.is_valid);
        assert!(result.error_message.unwrap().contains("dimension mismatch"));
    }

    #[test]
    fn test_chain_reports_generation() {
        let vertical = Grid::load(&[".O.", ".O.", ".O."], 3).unwrap();
        let horizontal = Grid::load(&["...", "OOO", "..."], 3).unwrap();

        let good = SolutionValidator::new().validate_chain(&[
            vertical.clone(),
            horizontal.clone(),
            vertical.clone(),
        ]);
        assert!(good.is_valid);

        let bad = SolutionValidator::new().validate_chain(&[
            vertical.clone(),
            horizontal.clone(),
            horizontal,
        ]);
        assert!(!bad.is_valid);
        assert!(!bad.final_state_matches);
        assert!(bad.rule_violations.iter().all(|v| v.generation == 1));
    }
}
