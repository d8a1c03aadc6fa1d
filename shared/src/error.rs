use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use crate::board::Color;
use crate::session::Status;

/// Reasons a move is refused by the board or the turn controller.
///
/// None of these change any state: the board and the session look exactly as
/// they did before the rejected call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {column} is outside the board (0..{columns})")]
    OutOfRange { column: usize, columns: usize },

    #[error("cell ({column}, {row}) is outside the {columns}x{rows} board")]
    CellOutOfRange {
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },

    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("it is {expected}'s turn, not {actual}'s")]
    OutOfTurn { expected: Color, actual: Color },

    #[error("the game is over ({status})")]
    TerminalState { status: Status },
}

/// Errors raised while setting up or running the relay connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to resolve {addr}: {source}")]
    Resolve { addr: String, source: io::Error },

    #[error("no IPv4 address found for {0}")]
    NoAddress(String),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: SocketAddr, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode packet: {0}")]
    Encode(#[source] bincode::Error),

    #[error("malformed packet: {0}")]
    Malformed(#[source] bincode::Error),

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("unexpected packet: {0}")]
    UnexpectedPacket(String),

    #[error("peer disconnected: {0}")]
    PeerDisconnected(String),

    #[error("no move received from peer within {0:?}")]
    Timeout(Duration),

    #[error("connection closed")]
    Closed,
}

/// Errors that can occur when validating match configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config validation error: {0}")]
    Validation(String),
}
