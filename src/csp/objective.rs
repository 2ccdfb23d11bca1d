//! Linear objective terms and the border-cost builder

use super::variables::{VarId, VariableManager};
use crate::error::GridError;
use crate::game_of_life::Grid;

/// Sum of a set of boolean variables, to be minimised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    vars: Vec<VarId>,
}

impl Objective {
    pub fn sum_of(vars: Vec<VarId>) -> Self {
        Self { vars }
    }

    pub fn variables(&self) -> &[VarId] {
        &self.vars
    }

    /// Value under a total assignment
    pub fn value(&self, values: &[bool]) -> usize {
        self.vars.iter().filter(|v| values[v.index()]).count()
    }

    /// Largest value the objective can take
    pub fn upper_bound(&self) -> usize {
        self.vars.len()
    }
}

/// Objective counting live cells on the border of the predecessor grid.
///
/// Among equally valid predecessors this prefers the one least likely to need
/// cells beyond the canvas, keeping repeated backward steps well behaved.
pub fn border_objective(variables: &VariableManager, target: &Grid) -> Result<Objective, GridError> {
    let vars = target
        .border_cells()
        .into_iter()
        .map(|cell| {
            variables
                .lookup_cell(cell.row, cell.col)
                .ok_or(GridError::OutOfBounds {
                    row: cell.row,
                    col: cell.col,
                    size: variables.size(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Objective::sum_of(vars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_objective_covers_ring() {
        let target = Grid::new(4).unwrap();
        let mut variables = VariableManager::new(4);
        variables.all_cell_variables().unwrap();

        let objective = border_objective(&variables, &target).unwrap();
        assert_eq!(objective.upper_bound(), 12);

        // Only the centre 2x2 alive: border cost zero
        let mut values = vec![false; 16];
        for idx in [5, 6, 9, 10] {
            values[idx] = true;
        }
        assert_eq!(objective.value(&values), 0);

        values[0] = true;
        values[15] = true;
        assert_eq!(objective.value(&values), 2);
    }

    #[test]
    fn test_border_objective_requires_variables() {
        let target = Grid::new(3).unwrap();
        let variables = VariableManager::new(3);
        assert!(border_objective(&variables, &target).is_err());
    }

    #[test]
    fn test_single_cell_objective_is_empty() {
        let target = Grid::new(1).unwrap();
        let mut variables = VariableManager::new(1);
        variables.all_cell_variables().unwrap();

        let objective = border_objective(&variables, &target).unwrap();
        assert_eq!(objective.upper_bound(), 0);
        assert_eq!(objective.value(&[true]), 0);
    }
}
