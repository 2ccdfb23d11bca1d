//! Game of Life transition rule and forward stepping

use super::Grid;
use rayon::prelude::*;

/// Live-neighbour counts that keep a live cell alive
pub const SURVIVAL_COUNTS: [u8; 2] = [2, 3];
/// Live-neighbour counts that bring a dead cell to life
pub const BIRTH_COUNTS: [u8; 1] = [3];

/// Game of Life rules engine
pub struct GameOfLifeRules;

impl GameOfLifeRules {
    /// The B3/S23 update law for a single cell.
    ///
    /// Both the forward stepper and the reverse constraint model are built
    /// from this function.
    pub fn next_state(current: bool, live_neighbors: u8) -> bool {
        if current {
            SURVIVAL_COUNTS.contains(&live_neighbors)
        } else {
            BIRTH_COUNTS.contains(&live_neighbors)
        }
    }

    /// Evolve the grid one generation forward, clipping at the boundary
    pub fn step(current: &Grid) -> Grid {
        let size = current.size();
        let cells: Vec<bool> = (0..size * size)
            .into_par_iter()
            .map(|idx| {
                let (row, col) = (idx / size, idx % size);
                Self::next_state(current.get(row, col), current.count_neighbors(row, col))
            })
            .collect();

        Grid::from_parts(size, cells)
    }

    /// Every generation from `grid` through `generations` steps, inclusive
    pub fn trajectory(grid: &Grid, generations: usize) -> Vec<Grid> {
        let mut path = Vec::with_capacity(generations + 1);
        let mut current = grid.clone();
        for _ in 0..generations {
            let next = Self::step(&current);
            path.push(current);
            current = next;
        }
        path.push(current);
        path
    }

    /// Whether `predecessor` steps to exactly `target`
    pub fn is_predecessor(predecessor: &Grid, target: &Grid) -> bool {
        predecessor.size() == target.size() && Self::step(predecessor) == *target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::load(rows, rows.len()).unwrap()
    }

    #[test]
    fn test_still_life_block() {
        let block = grid(&["....", ".OO.", ".OO.", "...."]);
        assert_eq!(GameOfLifeRules::step(&block), block);
    }

    #[test]
    fn test_oscillator_blinker() {
        let horizontal = grid(&["...", "OOO", "..."]);
        let vertical = grid(&[".O.", ".O.", ".O."]);

        assert_eq!(GameOfLifeRules::step(&horizontal), vertical);
        assert_eq!(GameOfLifeRules::step(&vertical), horizontal);
        assert_eq!(GameOfLifeRules::trajectory(&horizontal, 2)[2], horizontal);
    }

    #[test]
    fn test_rule_logic() {
        assert!(GameOfLifeRules::next_state(true, 2));
        assert!(GameOfLifeRules::next_state(true, 3));
        assert!(GameOfLifeRules::next_state(false, 3));
        assert!(!GameOfLifeRules::next_state(true, 1));
        assert!(!GameOfLifeRules::next_state(true, 4));
        assert!(!GameOfLifeRules::next_state(false, 2));
        assert!(!GameOfLifeRules::next_state(false, 0));
    }

    #[test]
    fn test_boundary_is_clipped() {
        // Under wrapping the corner cells would see each other; clipped they die.
        let corners = grid(&["O..O", "....", "....", "O..O"]);
        assert!(GameOfLifeRules::step(&corners).is_empty());
    }

    #[test]
    fn test_trajectory_and_predecessor() {
        let horizontal = grid(&["...", "OOO", "..."]);
        let vertical = grid(&[".O.", ".O.", ".O."]);

        let path = GameOfLifeRules::trajectory(&horizontal, 2);
        assert_eq!(path.len(), 3);
        assert_eq!(path[1], vertical);
        assert!(GameOfLifeRules::is_predecessor(&vertical, &horizontal));
        assert!(!GameOfLifeRules::is_predecessor(&horizontal, &horizontal));
    }
}
