//! Encodes "find a predecessor of this grid" as a constraint model

use super::constraints::{Constraint, Model};
use super::objective::border_objective;
use super::variables::{VarId, VariableManager};
use crate::error::GridError;
use crate::game_of_life::{Cell, GameOfLifeRules, Grid};
use tracing::debug;

/// Largest Moore neighbourhood
const MAX_NEIGHBORS: u8 = 8;

/// Model plus the variable bookkeeping needed to read a grid back out of it
#[derive(Debug, Clone)]
pub struct EncodedModel {
    pub model: Model,
    pub variables: VariableManager,
    /// Cell variables in row-major order
    pub cells: Vec<VarId>,
    size: usize,
}

impl EncodedModel {
    /// Predecessor grid described by a total assignment
    pub fn decode(&self, assignment: &[bool]) -> Grid {
        let cells = self.cells.iter().map(|v| assignment[v.index()]).collect();
        Grid::from_parts(self.size, cells)
    }
}

/// Builds predecessor models from target grids
pub struct PredecessorEncoder {
    survival: Vec<usize>,
    birth: Vec<usize>,
}

impl Default for PredecessorEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PredecessorEncoder {
    /// Neighbour counts are read off [`GameOfLifeRules::next_state`] so the
    /// model always agrees with the forward stepper.
    pub fn new() -> Self {
        let counts = |current: bool| -> Vec<usize> {
            (0..=MAX_NEIGHBORS)
                .filter(|&k| GameOfLifeRules::next_state(current, k))
                .map(usize::from)
                .collect()
        };

        Self {
            survival: counts(true),
            birth: counts(false),
        }
    }

    /// One variable per cell of the unknown predecessor, one constraint per
    /// target cell, and the border objective.
    pub fn encode(&self, target: &Grid) -> Result<EncodedModel, GridError> {
        let size = target.size();
        let mut variables = VariableManager::new(size);
        let cells = variables.all_cell_variables()?;

        let mut model = Model::new("efil", variables.variable_count());
        for (idx, &alive) in target.cells().iter().enumerate() {
            let cell = target.cell_at(idx);
            let neighbors: Vec<VarId> = target
                .neighbors(cell)
                .into_iter()
                .map(|Cell { row, col }| cells[target.index(row, col)])
                .collect();

            model.post(self.cell_constraint(cells[idx], &neighbors, alive));
        }

        model.minimize(border_objective(&variables, target)?);

        debug!(
            size,
            variables = model.variable_count(),
            constraints = model.constraints().len(),
            "encoded predecessor model"
        );

        Ok(EncodedModel {
            model,
            variables,
            cells,
            size,
        })
    }

    /// The transition rule run backwards for one cell:
    /// `if E[c] then survives(N) else born(N)`, negated on both branches when
    /// the target cell is dead.
    pub fn cell_constraint(&self, current: VarId, neighbors: &[VarId], alive: bool) -> Constraint {
        let survives = Constraint::sum_in(neighbors, &self.survival);
        let born = Constraint::sum_in(neighbors, &self.birth);

        if alive {
            Constraint::if_then_else(current, survives, born)
        } else {
            Constraint::if_then_else(current, !survives, !born)
        }
    }
}
