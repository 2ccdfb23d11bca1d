//! Decision variable management for the predecessor model

use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Index of a boolean decision variable within one [`Model`](super::Model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// What a variable stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// State of a predecessor cell
    Cell { row: usize, col: usize },
}

/// Allocates variables and maps them back to the cells they describe
#[derive(Debug, Clone)]
pub struct VariableManager {
    variable_map: HashMap<VariableType, VarId>,
    types: Vec<VariableType>,
    size: usize,
}

impl VariableManager {
    pub fn new(size: usize) -> Self {
        Self {
            variable_map: HashMap::new(),
            types: Vec::new(),
            size,
        }
    }

    /// Get or create the variable for `var_type`
    pub fn get_variable(&mut self, var_type: VariableType) -> Result<VarId, GridError> {
        if let Some(&id) = self.variable_map.get(&var_type) {
            return Ok(id);
        }

        self.validate_variable(&var_type)?;

        let id = VarId(self.types.len());
        self.types.push(var_type);
        self.variable_map.insert(var_type, id);
        Ok(id)
    }

    pub fn cell_variable(&mut self, row: usize, col: usize) -> Result<VarId, GridError> {
        self.get_variable(VariableType::Cell { row, col })
    }

    /// Cell variables of the whole grid in row-major order.
    ///
    /// On a fresh manager the ids come out as `0..n²`, matching
    /// [`Grid::index`](crate::game_of_life::Grid::index).
    pub fn all_cell_variables(&mut self) -> Result<Vec<VarId>, GridError> {
        let mut variables = Vec::with_capacity(self.size * self.size);
        for row in 0..self.size {
            for col in 0..self.size {
                variables.push(self.cell_variable(row, col)?);
            }
        }
        Ok(variables)
    }

    /// Cell variable lookup without allocation
    pub fn lookup_cell(&self, row: usize, col: usize) -> Option<VarId> {
        self.variable_map.get(&VariableType::Cell { row, col }).copied()
    }

    pub fn variable_count(&self) -> usize {
        self.types.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn validate_variable(&self, var_type: &VariableType) -> Result<(), GridError> {
        match *var_type {
            VariableType::Cell { row, col } => {
                if row >= self.size || col >= self.size {
                    return Err(GridError::OutOfBounds {
                        row,
                        col,
                        size: self.size,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_creation() {
        let mut vm = VariableManager::new(3);

        let var1 = vm.cell_variable(0, 0).unwrap();
        let var2 = vm.cell_variable(1, 1).unwrap();
        assert_eq!(var1, VarId(0));
        assert_eq!(var2, VarId(1));

        assert_eq!(vm.cell_variable(0, 0).unwrap(), var1);
        assert_eq!(vm.variable_count(), 2);
    }

    #[test]
    fn test_variable_bounds() {
        let mut vm = VariableManager::new(2);
        assert!(vm.cell_variable(1, 1).is_ok());
        assert!(vm.cell_variable(2, 0).is_err());
        assert!(vm.cell_variable(0, 2).is_err());
    }

    #[test]
    fn test_all_cell_variables_row_major() {
        let mut vm = VariableManager::new(3);
        let vars = vm.all_cell_variables().unwrap();
        assert_eq!(vars, (0..9).map(VarId).collect::<Vec<_>>());
        assert_eq!(vm.lookup_cell(2, 1), Some(VarId(7)));
        assert_eq!(vm.variable_count(), 9);
    }
}
