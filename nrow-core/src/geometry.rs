//! Dimension-derived tables: cell count, full-board mask and winning lines.

use crate::{Dim, MoveSet, Result, MAX_LINES};

/// Tables derived from the board dimension: cell count, full-board mask and
/// the winning-line masks.
///
/// Built once per dimension and shared by the game and the solver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Geometry {
    dim: Dim,
    cells: u32,
    all: MoveSet,
    lines: [MoveSet; MAX_LINES],
    num_lines: u8,
}

impl Geometry {
    /// Compute the tables for a dimension.
    pub fn new(dim: Dim) -> Geometry {
        let d = dim.get() as u32;
        let cells = d * d;
        let all = ((1u32 << cells) - 1) as MoveSet;

        let mut lines = [0 as MoveSet; MAX_LINES];
        let row: MoveSet = (1 << d) - 1;
        let mut first_col: MoveSet = 0;
        let mut main_diagonal: MoveSet = 0;
        let mut anti_diagonal: MoveSet = 0;
        for i in 0..d {
            first_col |= 1 << (i * d);
            main_diagonal |= 1 << (i * (d + 1));
            anti_diagonal |= 1 << ((i + 1) * (d - 1));
            lines[i as usize] = row << (i * d);
        }
        for i in 0..d {
            lines[(d + i) as usize] = first_col << i;
        }
        lines[(2 * d) as usize] = main_diagonal;
        lines[(2 * d + 1) as usize] = anti_diagonal;

        Geometry {
            dim,
            cells,
            all,
            lines,
            num_lines: (2 * d + 2) as u8,
        }
    }

    /// Validate `dim` and compute its tables.
    pub fn for_dim(dim: usize) -> Result<Geometry> {
        Ok(Geometry::new(Dim::new(dim)?))
    }

    #[inline]
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// Number of cells (N).
    #[inline]
    pub fn cells(&self) -> usize {
        self.cells as usize
    }

    /// Mask with every cell set.
    #[inline]
    pub fn all(&self) -> MoveSet {
        self.all
    }

    /// The winning-line masks: rows, then columns, then main and anti diagonal.
    #[inline]
    pub fn lines(&self) -> &[MoveSet] {
        &self.lines[..self.num_lines as usize]
    }

    /// Check whether `moves` covers at least one winning line.
    #[inline]
    pub fn is_winning(&self, moves: MoveSet) -> bool {
        self.lines().iter().any(|&line| moves & line == line)
    }

    /// First winning line covered by `moves`, if any.
    pub fn winning_line(&self, moves: MoveSet) -> Option<MoveSet> {
        self.lines().iter().copied().find(|&line| moves & line == line)
    }

    /// Check whether every cell is occupied.
    #[inline]
    pub fn is_full(&self, occupied: MoveSet) -> bool {
        occupied == self.all
    }

    /// Check whether `cell` is on the board.
    #[inline]
    pub fn contains(&self, cell: usize) -> bool {
        cell < self.cells()
    }

    /// Single-cell mask.
    #[inline]
    pub fn bit(cell: usize) -> MoveSet {
        1 << cell
    }

    /// Empty cells in increasing index order.
    pub fn empty_cells(&self, occupied: MoveSet) -> impl Iterator<Item = usize> {
        let cells = self.cells();
        (0..cells).filter(move |&cell| occupied & Self::bit(cell) == 0)
    }

    /// The four corner cells.
    pub fn corners(&self) -> [usize; 4] {
        let d = self.dim.get();
        [0, d - 1, d * (d - 1), d * d - 1]
    }

    /// Cell index from row and column.
    #[inline]
    pub fn from_row_col(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.dim.get() && col < self.dim.get());
        row * self.dim.get() + col
    }

    /// Row of a cell.
    #[inline]
    pub fn row(&self, cell: usize) -> usize {
        cell / self.dim.get()
    }

    /// Column of a cell.
    #[inline]
    pub fn col(&self, cell: usize) -> usize {
        cell % self.dim.get()
    }

    /// Cells set in a mask, in increasing order.
    pub fn cells_of(&self, moves: MoveSet) -> Vec<usize> {
        (0..self.cells()).filter(|&cell| moves & Self::bit(cell) != 0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_3x3_lines() {
        let g = Geometry::new(Dim::THREE);
        assert_eq!(g.cells(), 9);
        assert_eq!(g.all(), 0b111_111_111);
        assert_eq!(
            g.lines(),
            &[
                0b000_000_111, // Row 0
                0b000_111_000, // Row 1
                0b111_000_000, // Row 2
                0b001_001_001, // Col 0
                0b010_010_010, // Col 1
                0b100_100_100, // Col 2
                0b100_010_001, // Main diagonal
                0b001_010_100, // Anti-diagonal
            ]
        );
    }

    #[test]
    fn test_geometry_4x4_lines() {
        let g = Geometry::new(Dim::FOUR);
        assert_eq!(g.cells(), 16);
        assert_eq!(g.all(), 0xFFFF);
        assert_eq!(g.lines().len(), 10);
        assert_eq!(g.lines()[0], 0x000F);
        assert_eq!(g.lines()[3], 0xF000);
        assert_eq!(g.lines()[4], 0x1111);
        assert_eq!(g.lines()[7], 0x8888);
        assert_eq!(g.lines()[8], 0x8421);
        assert_eq!(g.lines()[9], 0x1248);
    }

    #[test]
    fn test_every_line_has_dim_cells() {
        for dim in [Dim::THREE, Dim::FOUR] {
            let g = Geometry::new(dim);
            assert_eq!(g.lines().len(), 2 * dim.get() + 2);
            for &line in g.lines() {
                assert_eq!(line.count_ones() as usize, dim.get());
                assert_eq!(line & !g.all(), 0);
            }
        }
    }

    #[test]
    fn test_is_winning_row_zero() {
        let g = Geometry::new(Dim::THREE);
        assert!(!g.is_winning(0b000_000_011));
        assert!(g.is_winning(0b000_000_111));
    }

    #[test]
    fn test_is_winning_lines_and_proper_subsets() {
        for dim in [Dim::THREE, Dim::FOUR] {
            let g = Geometry::new(dim);
            for &line in g.lines() {
                assert!(g.is_winning(line));
                assert_eq!(g.winning_line(line), Some(line));
                // Drop one cell at a time: no other line can be complete.
                for cell in g.cells_of(line) {
                    let subset = line & !Geometry::bit(cell);
                    assert!(!g.is_winning(subset), "{:#x} should not win", subset);
                }
            }
        }
    }

    #[test]
    fn test_empty_cells_order() {
        let g = Geometry::new(Dim::THREE);
        let empty: Vec<usize> = g.empty_cells(0b100_010_001).collect();
        assert_eq!(empty, vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(g.empty_cells(g.all()).count(), 0);
    }

    #[test]
    fn test_corners() {
        assert_eq!(Geometry::new(Dim::THREE).corners(), [0, 2, 6, 8]);
        assert_eq!(Geometry::new(Dim::FOUR).corners(), [0, 3, 12, 15]);
    }

    #[test]
    fn test_row_col_roundtrip() {
        let g = Geometry::new(Dim::FOUR);
        for cell in 0..16 {
            assert_eq!(g.from_row_col(g.row(cell), g.col(cell)), cell);
        }
    }
}
