//! Four-in-a-row detection.

use crate::board::{Board, Color};
use crate::CONNECT;

/// Horizontal, vertical, diagonal-ascending, diagonal-descending
pub const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// True iff `color` has four consecutive counters in any direction.
pub fn evaluate(board: &Board, color: Color) -> bool {
    winning_line(board, color).is_some()
}

/// Returns the first complete line of `color`, as `(column, row)` pairs
/// starting from the cell the line was found from.
pub fn winning_line(board: &Board, color: Color) -> Option<[(usize, usize); CONNECT]> {
    if board.count(color) < CONNECT {
        return None;
    }

    let cell = color.to_cell();
    for (column, row) in board.occupied_by(color) {
        for (dc, dr) in DIRECTIONS {
            let mut line = [(column, row); CONNECT];
            let complete = (1..CONNECT).all(|step| {
                match offset(board, (column, row), (dc, dr), step) {
                    Some(position) if board.cell_at(position.0, position.1) == Ok(cell) => {
                        line[step] = position;
                        true
                    }
                    _ => false,
                }
            });
            if complete {
                return Some(line);
            }
        }
    }

    None
}

/// Position `step` cells away along `direction`, if it is on the board
fn offset(
    board: &Board,
    (column, row): (usize, usize),
    (dc, dr): (isize, isize),
    step: usize,
) -> Option<(usize, usize)> {
    let step = step as isize;
    let column = column.checked_add_signed(dc * step)?;
    let row = row.checked_add_signed(dr * step)?;
    (column < board.columns() && row < board.rows()).then_some((column, row))
}
