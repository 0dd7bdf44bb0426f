//! One region's ragged rectangle of classified cells.

use crate::cell::{Cell, CellKind};

/// A ragged two-dimensional array of [`Cell`]s, indexed `(x, y)`.
///
/// Rows keep the length of their source line; a coordinate past the
/// end of a shorter row is outside the grid, exactly like a negative
/// one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Wrap already-classified rows.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Classify text with the fixed symbol table only (no directives,
    /// literals or operators). Mostly useful for tests and renderers.
    pub fn plain(text: &str) -> Self {
        Self {
            rows: text
                .lines()
                .map(|line| line.chars().map(Cell::plain).collect())
                .collect(),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Length of row `y`, or 0 when the row does not exist.
    pub fn row_len(&self, y: usize) -> usize {
        self.rows.get(y).map_or(0, Vec::len)
    }

    /// Cell at `(x, y)`, or `None` outside the ragged bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.rows.get(y)?.get(x)
    }

    /// Mutable cell at `(x, y)`.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.rows.get_mut(y)?.get_mut(x)
    }

    /// Kind at `(x, y)`, [`CellKind::Outside`] when out of bounds.
    pub fn kind(&self, x: i32, y: i32) -> CellKind {
        self.get(x, y).map_or(CellKind::Outside, |c| c.kind)
    }

    /// All cells in row-major order as `(x, y, cell)`.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, &Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, cell)| (x as i32, y as i32, cell))
        })
    }

    /// Row-major coordinates of every cell whose kind satisfies `pred`.
    pub fn find(&self, pred: impl Fn(CellKind) -> bool) -> Vec<(i32, i32)> {
        self.cells()
            .filter(|(_, _, c)| pred(c.kind))
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Row `y` as the original source text.
    pub fn row_text(&self, y: usize) -> String {
        self.rows
            .get(y)
            .map(|row| row.iter().map(|c| c.glyph).collect())
            .unwrap_or_default()
    }
}
