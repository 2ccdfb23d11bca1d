//! Square grid representation for Game of Life boards

use crate::error::GridError;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character used for a live cell in the text format
pub const ALIVE_CHAR: char = 'O';
/// Character used for a dead cell when rendering
pub const DEAD_CHAR: char = '.';

/// A position in a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// An n×n board of live/dead cells, stored row-major.
///
/// Cells outside `[0, n)` are treated as permanently dead: neighbourhoods are
/// clipped at the edge, never wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-dead grid
    pub fn new(size: usize) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            size,
            cells: vec![false; size * size],
        })
    }

    /// Create a grid from a square 2D boolean array
    pub fn from_cells(cells: Vec<Vec<bool>>) -> Result<Self, GridError> {
        let size = cells.len();
        if size == 0 {
            return Err(GridError::Empty);
        }

        for (row, values) in cells.iter().enumerate() {
            if values.len() != size {
                return Err(GridError::MalformedInput {
                    expected: size,
                    row,
                    found: values.len(),
                });
            }
        }

        Ok(Self {
            size,
            cells: cells.into_iter().flatten().collect(),
        })
    }

    /// Build an n×n grid from text rows.
    ///
    /// Only the first `n` rows and the first `n` characters of each row are
    /// read. `'O'` is alive; every other character is dead.
    pub fn load<S: AsRef<str>>(rows: &[S], size: usize) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::Empty);
        }
        if rows.len() < size {
            return Err(GridError::MalformedInput {
                expected: size,
                row: rows.len(),
                found: 0,
            });
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, line) in rows.iter().take(size).enumerate() {
            let before = cells.len();
            cells.extend(line.as_ref().chars().take(size).map(|ch| ch == ALIVE_CHAR));
            let found = cells.len() - before;
            if found < size {
                return Err(GridError::MalformedInput {
                    expected: size,
                    row,
                    found,
                });
            }
        }

        Ok(Self { size, cells })
    }

    /// Caller guarantees `cells.len() == size * size` and `size >= 1`
    pub(crate) fn from_parts(size: usize, cells: Vec<bool>) -> Self {
        debug_assert!(size >= 1 && cells.len() == size * size);
        Self { size, cells }
    }

    /// Side length n
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cell states
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// Inverse of [`Grid::index`]
    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.size, index % self.size)
    }

    /// Get cell value at coordinates; out-of-range cells read as dead
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<(), GridError> {
        if row >= self.size || col >= self.size {
            return Err(GridError::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        let idx = self.index(row, col);
        self.cells[idx] = value;
        Ok(())
    }

    /// Moore neighbourhood of `cell`, clipped at the boundary, in row-major order.
    ///
    /// Corners have 3 neighbours, edges 5, interior cells 8 (a 1×1 grid has none).
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let n = self.size as isize;
        let (row, col) = (cell.row as isize, cell.col as isize);

        iproduct!(-1isize..=1, -1isize..=1)
            .filter(|&(dr, dc)| dr != 0 || dc != 0)
            .map(|(dr, dc)| (row + dr, col + dc))
            .filter(|&(r, c)| r >= 0 && r < n && c >= 0 && c < n)
            .map(|(r, c)| Cell::new(r as usize, c as usize))
            .collect()
    }

    /// Count living neighbours of a cell
    pub fn count_neighbors(&self, row: usize, col: usize) -> u8 {
        let n = self.size as isize;
        let (row, col) = (row as isize, col as isize);

        iproduct!(-1isize..=1, -1isize..=1)
            .filter(|&(dr, dc)| dr != 0 || dc != 0)
            .map(|(dr, dc)| (row + dr, col + dc))
            .filter(|&(r, c)| r >= 0 && r < n && c >= 0 && c < n)
            .filter(|&(r, c)| self.cells[self.index(r as usize, c as usize)])
            .count() as u8
    }

    /// A new grid of side `n + 2 * amount` with this grid centred and the
    /// surrounding margin dead
    pub fn pad(&self, amount: usize) -> Grid {
        let size = self.size + 2 * amount;
        let mut cells = vec![false; size * size];
        for row in 0..self.size {
            let src = self.index(row, 0);
            let dst = (row + amount) * size + amount;
            cells[dst..dst + self.size].copy_from_slice(&self.cells[src..src + self.size]);
        }
        Self::from_parts(size, cells)
    }

    /// The outermost ring, clockwise from the top-left corner, each cell once.
    ///
    /// `4(n-1)` cells, so a 1×1 grid has an empty border.
    pub fn border_cells(&self) -> Vec<Cell> {
        let last = self.size - 1;
        let top = (0..last).map(|col| Cell::new(0, col));
        let right = (0..last).map(|row| Cell::new(row, last));
        let bottom = (1..=last).rev().map(|col| Cell::new(last, col));
        let left = (1..=last).rev().map(|row| Cell::new(row, 0));
        top.chain(right).chain(bottom).chain(left).collect()
    }

    /// Number of live cells on the outermost ring
    pub fn border_living_count(&self) -> usize {
        self.border_cells()
            .into_iter()
            .filter(|c| self.get(c.row, c.col))
            .count()
    }

    /// Coordinates of all living cells, row-major
    pub fn living_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &alive)| alive)
            .map(|(idx, _)| self.cell_at(idx))
            .collect()
    }

    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// True when no cell is alive
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| !cell)
    }
}

/// Renders one row per line, `'O'` for alive and `'.'` for dead
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            for &cell in row {
                write!(f, "{}", if cell { ALIVE_CHAR } else { DEAD_CHAR })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
