//! Gravity-fed grid of counters.
//!
//! Columns are addressed `0..columns` from the left, rows `0..rows` from the
//! bottom. Each column only ever fills upwards, so the occupied cells of a
//! column are always a contiguous run starting at row 0.

use crate::error::{ConfigError, MoveError};
use crate::{DEFAULT_COLUMNS, DEFAULT_ROWS, MAX_DIMENSION};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    PlayerA,
    PlayerB,
}

impl Color {
    /// Get the opposing color
    pub fn other(self) -> Color {
        match self {
            Color::PlayerA => Color::PlayerB,
            Color::PlayerB => Color::PlayerA,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Color::PlayerA => Cell::PlayerA,
            Color::PlayerB => Cell::PlayerB,
        }
    }

    /// Display name, matching the counter colors on screen
    pub fn name(self) -> &'static str {
        match self {
            Color::PlayerA => "Red",
            Color::PlayerB => "Blue",
        }
    }

    fn symbol(self) -> char {
        match self {
            Color::PlayerA => 'R',
            Color::PlayerB => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    PlayerA,
    PlayerB,
}

impl Cell {
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::PlayerA => Some(Color::PlayerA),
            Cell::PlayerB => Some(Color::PlayerB),
        }
    }
}

/// Where a dropped counter came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub column: usize,
    pub row: usize,
    pub color: Color,
}

/// Both dimensions must lie in `1..=MAX_DIMENSION`
pub fn check_dimensions(columns: usize, rows: usize) -> Result<(), ConfigError> {
    if !(1..=MAX_DIMENSION).contains(&columns) {
        return Err(ConfigError::Validation(format!(
            "columns must be in 1..={MAX_DIMENSION}, got {columns}"
        )));
    }
    if !(1..=MAX_DIMENSION).contains(&rows) {
        return Err(ConfigError::Validation(format!(
            "rows must be in 1..={MAX_DIMENSION}, got {rows}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: usize,
    rows: usize,
    /// Column-major, `column * rows + row`
    cells: Vec<Cell>,
    /// Number of counters stacked in each column
    heights: Vec<usize>,
}

impl Board {
    /// Create an empty board with the canonical 7x6 geometry
    pub fn new() -> Self {
        Self::empty(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }

    /// Create an empty board with custom geometry.
    ///
    /// Both dimensions must lie in `1..=MAX_DIMENSION` so that any column
    /// index fits in a single byte on the wire.
    pub fn with_dimensions(columns: usize, rows: usize) -> Result<Self, ConfigError> {
        check_dimensions(columns, rows)?;
        Ok(Self::empty(columns, rows))
    }

    fn empty(columns: usize, rows: usize) -> Self {
        Board {
            columns,
            rows,
            cells: vec![Cell::Empty; columns * rows],
            heights: vec![0; columns],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn check_column(&self, column: usize) -> Result<(), MoveError> {
        if column >= self.columns {
            return Err(MoveError::OutOfRange {
                column,
                columns: self.columns,
            });
        }
        Ok(())
    }

    /// True iff the topmost cell of `column` is still empty
    pub fn column_has_space(&self, column: usize) -> Result<bool, MoveError> {
        self.check_column(column)?;
        Ok(self.heights[column] < self.rows)
    }

    /// Number of counters already stacked in `column`
    pub fn column_height(&self, column: usize) -> Result<usize, MoveError> {
        self.check_column(column)?;
        Ok(self.heights[column])
    }

    /// Drop a counter into `column`, returns the row where it landed
    pub fn drop_counter(&mut self, column: usize, color: Color) -> Result<usize, MoveError> {
        if !self.column_has_space(column)? {
            return Err(MoveError::ColumnFull { column });
        }

        let row = self.heights[column];
        self.cells[column * self.rows + row] = color.to_cell();
        self.heights[column] += 1;
        Ok(row)
    }

    /// Read-only lookup of a single cell
    pub fn cell_at(&self, column: usize, row: usize) -> Result<Cell, MoveError> {
        if column >= self.columns || row >= self.rows {
            return Err(MoveError::CellOutOfRange {
                column,
                row,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(self.cells[column * self.rows + row])
    }

    /// Check if every column is full
    pub fn is_full(&self) -> bool {
        self.heights.iter().all(|&height| height == self.rows)
    }

    /// Number of counters of `color` on the board
    pub fn count(&self, color: Color) -> usize {
        let cell = color.to_cell();
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Columns that can still take a counter, left to right
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..self.columns)
            .filter(|&column| self.heights[column] < self.rows)
            .collect()
    }

    /// Positions `(column, row)` occupied by `color`, bottom-up per column
    pub fn occupied_by(&self, color: Color) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cell = color.to_cell();
        (0..self.columns).flat_map(move |column| {
            (0..self.heights[column])
                .filter(move |&row| self.cells[column * self.rows + row] == cell)
                .map(move |row| (column, row))
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the top row first, with 1-based column labels underneath.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            for column in 0..self.columns {
                if column > 0 {
                    f.write_str(" ")?;
                }
                let symbol = self.cells[column * self.rows + row]
                    .color()
                    .map_or('.', Color::symbol);
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        for column in 0..self.columns {
            if column > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", (column + 1) % 10)?;
        }
        Ok(())
    }
}
