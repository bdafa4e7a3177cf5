//! Rectangular cell storage shared by every session and system.

use crate::{CellType, Coordinate, Direction};

/// Row-major rectangular collection of [`CellType`] cells.
///
/// Dimensions are fixed for the lifetime of the grid; a session that needs a
/// different size replaces the grid wholesale. All accessors are
/// bounds-checked, and out-of-range writes are silent no-ops because they are
/// routine outcomes of interactive editing rather than faults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellType>,
}

impl Grid {
    /// Creates a grid with every cell set to the provided type.
    #[must_use]
    pub fn filled(width: u32, height: u32, cell: CellType) -> Self {
        let capacity = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![cell; capacity],
        }
    }

    /// Builds a grid from row-major cells, or `None` on a size mismatch.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, cells: Vec<CellType>) -> Option<Self> {
        if cells.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, at: Coordinate) -> bool {
        at.x() >= 0 && at.x() < self.width as i32 && at.y() >= 0 && at.y() < self.height as i32
    }

    /// Cell stored at the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn get(&self, at: Coordinate) -> Option<CellType> {
        self.index(at).map(|index| self.cells[index])
    }

    /// Writes a cell at the coordinate; out-of-bounds writes are ignored.
    pub fn set(&mut self, at: Coordinate, cell: CellType) {
        if let Some(index) = self.index(at) {
            self.cells[index] = cell;
        }
    }

    /// In-bounds orthogonal neighbors of the coordinate.
    pub fn neighbors(&self, at: Coordinate) -> impl Iterator<Item = Coordinate> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |direction| at.step(direction))
            .filter(|candidate| self.in_bounds(*candidate))
    }

    /// Iterator over every coordinate/cell pair in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, CellType)> + '_ {
        self.cells.iter().enumerate().map(|(index, cell)| {
            let x = (index % self.width as usize) as i32;
            let y = (index / self.width as usize) as i32;
            (Coordinate::new(x, y), *cell)
        })
    }

    /// First coordinate holding the provided cell type, in row-major order.
    #[must_use]
    pub fn find(&self, cell: CellType) -> Option<Coordinate> {
        self.iter()
            .find(|(_, candidate)| *candidate == cell)
            .map(|(at, _)| at)
    }

    /// Number of cells holding the provided cell type.
    #[must_use]
    pub fn count(&self, cell: CellType) -> usize {
        self.cells
            .iter()
            .filter(|candidate| **candidate == cell)
            .count()
    }

    const fn index(&self, at: Coordinate) -> Option<usize> {
        if self.in_bounds(at) {
            Some(at.y() as usize * self.width as usize + at.x() as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_and_writes_are_rejected() {
        let mut grid = Grid::filled(3, 2, CellType::Empty);
        let outside = Coordinate::new(3, 0);

        assert_eq!(grid.get(outside), None);
        grid.set(outside, CellType::Wall);
        assert_eq!(grid.count(CellType::Wall), 0);

        let negative = Coordinate::new(-1, 1);
        assert!(!grid.in_bounds(negative));
        assert_eq!(grid.get(negative), None);
    }

    #[test]
    fn neighbors_clip_at_edges() {
        let grid = Grid::filled(3, 3, CellType::Empty);
        let corner: Vec<Coordinate> = grid.neighbors(Coordinate::new(0, 0)).collect();
        assert_eq!(corner.len(), 2);

        let center: Vec<Coordinate> = grid.neighbors(Coordinate::new(1, 1)).collect();
        assert_eq!(center.len(), 4);
    }

    #[test]
    fn find_scans_in_row_major_order() {
        let mut grid = Grid::filled(3, 3, CellType::Empty);
        grid.set(Coordinate::new(2, 0), CellType::KeyRed);
        grid.set(Coordinate::new(0, 2), CellType::KeyRed);

        assert_eq!(grid.find(CellType::KeyRed), Some(Coordinate::new(2, 0)));
        assert_eq!(grid.find(CellType::KeyBlue), None);
        assert_eq!(grid.count(CellType::KeyRed), 2);
    }

    #[test]
    fn from_cells_rejects_size_mismatch() {
        assert!(Grid::from_cells(2, 2, vec![CellType::Empty; 3]).is_none());
        let grid = Grid::from_cells(2, 2, vec![CellType::Empty; 4]).expect("grid builds");
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
    }
}
