//! Row-major 2D grids for map terrain, buildability and visibility data.

use serde::{Deserialize, Serialize};

/// Terrain height sentinel for walk tiles with no data.
pub const UNKNOWN_TERRAIN: u8 = 255;

/// Fixed-size 2D grid stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Grid<T> {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Cell data stored in row-major order.
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![value; cell_count],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap existing row-major cell data.
    ///
    /// Returns `None` if `cells` does not hold exactly `width * height` entries.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, cells: Vec<T>) -> Option<Self> {
        if cells.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `[width, height]`, the order the engine reports sizes in.
    #[must_use]
    pub const fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// Whether the grid holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell count expected for the declared size.
    #[must_use]
    pub fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Whether the backing buffer matches the declared size.
    ///
    /// Grids built through [`Grid::from_cells`] always match; deserialized
    /// grids may not.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.expected_len()
    }

    /// Cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Raw row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

impl Grid<u8> {
    /// Whether the terrain cell at `(x, y)` has data.
    #[must_use]
    pub fn is_known(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some_and(|&v| v != UNKNOWN_TERRAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_checks_size() {
        assert!(Grid::from_cells(2, 2, vec![0u8; 4]).is_some());
        assert!(Grid::from_cells(2, 2, vec![0u8; 3]).is_none());
    }

    #[test]
    fn test_row_major_lookup() {
        let grid = Grid::from_cells(3, 2, vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(0, 0), Some(&0));
        assert_eq!(grid.get(2, 0), Some(&2));
        assert_eq!(grid.get(0, 1), Some(&3));
        assert_eq!(grid.get(2, 1), Some(&5));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
        assert_eq!(grid.size(), [3, 2]);
    }

    #[test]
    fn test_unknown_terrain() {
        let grid = Grid::from_cells(2, 1, vec![UNKNOWN_TERRAIN, 2]).unwrap();
        assert!(!grid.is_known(0, 0));
        assert!(grid.is_known(1, 0));
        assert!(!grid.is_known(5, 5));
    }

    #[test]
    fn test_deserialized_grid_consistency() {
        let grid: Grid<bool> =
            serde_json::from_str(r#"{"width":2,"height":2,"cells":[true,false]}"#).unwrap();
        assert!(!grid.is_consistent());
        assert_eq!(grid.expected_len(), 4);
    }
}
