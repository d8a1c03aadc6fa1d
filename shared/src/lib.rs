//! # Shared Game Library
//!
//! Everything both sides of a Connect Four match need: the board and its
//! rules, the move relay protocol, and the event loop that ties a local
//! player and a remote peer to a single game session.
//!
//! ## Module Organization
//!
//! - `board`: grid storage and gravity. Counters stack from row 0 upwards.
//! - `win`: four-in-a-row detection along the four line directions.
//! - `session`: the turn controller. The only way to change a board.
//! - `protocol`: length-prefixed `bincode` frames and the [`Packet`] set.
//! - `relay`: receive and send tasks for a connected peer.
//! - `coordinator`: the per-match `select!` loop owning the session.
//! - `console`: stdin column reader and text presenter used by the binaries.
//! - `config` / `error`: settings and typed errors.
//!
//! ## Usage Example
//!
//! ```rust
//! use shared::{Color, GameSession, Status};
//!
//! let mut session = GameSession::new();
//! for _ in 0..3 {
//!     session.submit_move(3, Color::PlayerA).unwrap();
//!     session.submit_move(4, Color::PlayerB).unwrap();
//! }
//! let outcome = session.submit_move(3, Color::PlayerA).unwrap();
//! assert_eq!(outcome.status, Status::Won(Color::PlayerA));
//! ```

use std::time::Duration;

pub mod board;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod session;
pub mod win;

pub use board::{Board, Cell, Color, Placement};
pub use config::MatchConfig;
pub use coordinator::{AbortReason, Coordinator, MatchEvent, MatchOutcome, MatchReport};
pub use error::{ConfigError, MoveError, TransportError};
pub use protocol::Packet;
pub use relay::{RelayEvent, RemoteEndpoint};
pub use session::{GameSession, MoveOutcome, Status};

pub const DEFAULT_COLUMNS: usize = 7;
pub const DEFAULT_ROWS: usize = 6;
/// Upper bound for either board dimension; columns must fit a `u8` on the wire
pub const MAX_DIMENSION: usize = 32;
/// Counters in a row needed to win
pub const CONNECT: usize = 4;

pub const DEFAULT_PORT: u16 = 8080;
pub const PROTOCOL_VERSION: u32 = 1;
/// Time allowed for the Connect/Connected exchange
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
