//! Fixed-size glyph grid
//!
//! Row-major storage; dimensions are fixed at construction.

use serde::{Deserialize, Serialize};

/// A grid address (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Contents of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Horizontal,
    Vertical,
    Cross,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Single-character form used by text views
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Horizontal => 'H',
            Cell::Vertical => 'V',
            Cell::Cross => 'C',
        }
    }
}

/// The placeable glyph kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Glyph {
    Horizontal,
    Vertical,
    Cross,
}

impl From<Glyph> for Cell {
    fn from(glyph: Glyph) -> Self {
        match glyph {
            Glyph::Horizontal => Cell::Horizontal,
            Glyph::Vertical => Cell::Vertical,
            Glyph::Cross => Cell::Cross,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    #[inline]
    fn index(&self, pos: CellPos) -> usize {
        assert!(
            self.contains(pos),
            "cell ({}, {}) outside {}x{} grid",
            pos.row,
            pos.col,
            self.rows,
            self.cols
        );
        pos.row * self.cols + pos.col
    }

    /// Read a cell. Panics if `pos` is out of bounds.
    #[inline]
    pub fn get(&self, pos: CellPos) -> Cell {
        self.cells[self.index(pos)]
    }

    /// Bounds-checked read
    pub fn try_get(&self, pos: CellPos) -> Option<Cell> {
        self.contains(pos)
            .then(|| self.cells[pos.row * self.cols + pos.col])
    }

    /// Overwrite a cell. Panics if `pos` is out of bounds.
    pub fn set(&mut self, pos: CellPos, cell: Cell) {
        let i = self.index(pos);
        self.cells[i] = cell;
    }

    /// Clear every cell back to Empty
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Row-major view of all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate `(pos, cell)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (CellPos::new(i / cols, i % cols), cell))
    }

    /// Number of non-empty cells
    pub fn glyph_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}
