use crate::board::{Board, Color, Placement};
use crate::error::{ConfigError, MoveError};
use crate::win;
use crate::CONNECT;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    InProgress { awaiting: Color },
    Won(Color),
    Drawn,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::InProgress { .. })
    }

    /// Color expected to move next, `None` once the game is over
    pub fn awaiting(self) -> Option<Color> {
        match self {
            Status::InProgress { awaiting } => Some(awaiting),
            Status::Won(_) | Status::Drawn => None,
        }
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            Status::Won(color) => Some(color),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InProgress { awaiting } => write!(f, "{awaiting} to move"),
            Status::Won(color) => write!(f, "{color} won"),
            Status::Drawn => f.write_str("draw"),
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub placement: Placement,
    /// Status after the move was applied
    pub status: Status,
}

/// The turn controller for a single match.
///
/// Owns the board exclusively. Every mutation goes through [`submit_move`],
/// which validates turn order, drops the counter, checks for a win and then
/// for a full board, in that order.
///
/// [`submit_move`]: GameSession::submit_move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    status: Status,
    moves_played: usize,
}

impl GameSession {
    /// Start a match on the canonical board. PlayerA always moves first.
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    pub fn with_dimensions(columns: usize, rows: usize) -> Result<Self, ConfigError> {
        Ok(Self::from_board(Board::with_dimensions(columns, rows)?))
    }

    fn from_board(board: Board) -> Self {
        GameSession {
            board,
            status: Status::InProgress {
                awaiting: Color::PlayerA,
            },
            moves_played: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn awaiting(&self) -> Option<Color> {
        self.status.awaiting()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    /// The completed line, once the game has been won
    pub fn winning_line(&self) -> Option<[(usize, usize); CONNECT]> {
        match self.status {
            Status::Won(color) => win::winning_line(&self.board, color),
            _ => None,
        }
    }

    /// Drop a counter for `acting` into `column`.
    ///
    /// On error nothing changes: not the board, not whose turn it is.
    pub fn submit_move(&mut self, column: usize, acting: Color) -> Result<MoveOutcome, MoveError> {
        let awaiting = match self.status {
            Status::InProgress { awaiting } => awaiting,
            status => return Err(MoveError::TerminalState { status }),
        };
        if acting != awaiting {
            return Err(MoveError::OutOfTurn {
                expected: awaiting,
                actual: acting,
            });
        }

        let row = self.board.drop_counter(column, acting)?;
        self.moves_played += 1;

        self.status = if win::evaluate(&self.board, acting) {
            Status::Won(acting)
        } else if self.board.is_full() {
            Status::Drawn
        } else {
            Status::InProgress {
                awaiting: acting.other(),
            }
        };

        debug!(
            "Move {}: {} dropped into column {} (row {}), {}",
            self.moves_played, acting, column, row, self.status
        );

        Ok(MoveOutcome {
            placement: Placement {
                column,
                row,
                color: acting,
            },
            status: self.status,
        })
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
