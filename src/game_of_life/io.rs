//! File I/O operations for Game of Life grids

use super::Grid;
use crate::error::GridError;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a grid from a text file.
///
/// Format: one row per line, `'O'` for alive cells and anything else for dead
/// cells. With `size = None` the side length is the number of lines.
pub fn load_grid_from_file<P: AsRef<Path>>(path: P, size: Option<usize>) -> Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read grid file: {}", path.as_ref().display()))?;

    parse_grid_from_string(&content, size)
        .with_context(|| format!("Failed to parse grid from file: {}", path.as_ref().display()))
}

/// Parse a grid from its text representation
pub fn parse_grid_from_string(content: &str, size: Option<usize>) -> Result<Grid, GridError> {
    let lines: Vec<&str> = content.lines().collect();
    let size = size.unwrap_or_else(|| {
        lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |last| last + 1)
    });
    Grid::load(&lines, size)
}

/// Save a grid to a text file
pub fn save_grid_to_file<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, grid_to_string(grid))
        .with_context(|| format!("Failed to write grid to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Convert a grid to its text representation
pub fn grid_to_string(grid: &Grid) -> String {
    grid.to_string()
}

/// Create example grid files for testing
pub fn create_example_grids<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let examples = [
        ("glider.txt", "..O..\nO.O..\n.OO..\n.....\n.....\n"),
        ("blinker.txt", "...\nOOO\n...\n"),
        ("block.txt", "....\n.OO.\n.OO.\n....\n"),
        ("beacon.txt", "OO....\nOO....\n..OO..\n..OO..\n......\n......\n"),
    ];

    for (name, content) in examples {
        std::fs::write(dir.join(name), content)
            .with_context(|| format!("Failed to write {}", name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_of_life::Cell;
    use tempfile::tempdir;

    #[test]
    fn test_parse_grid_from_string() {
        let grid = parse_grid_from_string(".O.\nO.O\n.O.\n", None).unwrap();

        assert_eq!(grid.size(), 3);
        assert_eq!(grid.living_count(), 4);
        assert!(grid.get(0, 1));
        assert!(grid.get(1, 0));
        assert!(grid.get(1, 2));
        assert!(grid.get(2, 1));
    }

    #[test]
    fn test_parse_with_explicit_size() {
        let grid = parse_grid_from_string("O...\n.O..\n..O.\n...O\n", Some(2)).unwrap();
        assert_eq!(grid.size(), 2);
        assert_eq!(grid.living_cells(), vec![Cell::new(0, 0), Cell::new(1, 1)]);
    }

    #[test]
    fn test_round_trip() {
        let original = ".O.\nO.O\n.O.\n";
        let grid = parse_grid_from_string(original, None).unwrap();
        assert_eq!(grid_to_string(&grid), original);
    }

    #[test]
    fn test_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nested/test_grid.txt");

        let original = Grid::from_cells(vec![vec![true, false], vec![false, true]]).unwrap();
        save_grid_to_file(&original, &file_path).unwrap();

        let loaded = load_grid_from_file(&file_path, None).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_invalid_input() {
        // Unknown characters are read as dead, not rejected
        let lenient = parse_grid_from_string("O.O\n1X1\nO.O\n", None).unwrap();
        assert_eq!(lenient.living_count(), 4);

        assert!(matches!(
            parse_grid_from_string("O.O\nOO\nO.O\n", None),
            Err(GridError::MalformedInput { row: 1, found: 2, .. })
        ));
        assert!(parse_grid_from_string("...\n...\n", Some(3)).is_err());
        assert_eq!(parse_grid_from_string("", None), Err(GridError::Empty));
    }

    #[test]
    fn test_create_example_grids() {
        let temp_dir = tempdir().unwrap();
        create_example_grids(temp_dir.path()).unwrap();

        for name in ["glider.txt", "blinker.txt", "block.txt", "beacon.txt"] {
            assert!(temp_dir.path().join(name).exists());
        }

        let glider = load_grid_from_file(temp_dir.path().join("glider.txt"), None).unwrap();
        assert_eq!(glider.size(), 5);
        assert_eq!(glider.living_count(), 5);
    }
}
