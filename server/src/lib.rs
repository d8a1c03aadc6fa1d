//! # Game Server Library
//!
//! The hosting side of a two-player Connect Four match. The server binds a
//! TCP listener, waits for exactly one guest to complete the handshake and
//! then plays as Red against it, relaying moves in both directions.
//!
//! ## Match Lifecycle
//!
//! 1. [`Server::bind`] resolves and binds the listening address.
//! 2. [`Server::accept_peer`] accepts connections until one sends a
//!    `Connect` with a matching protocol version. The guest is told its
//!    color and the board geometry in the `Connected` reply.
//! 3. [`Server::run`] closes the listener and hands the stream to the shared
//!    relay and coordinator, which own the session until the match ends.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use shared::GameSession;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("0.0.0.0:8080", GameSession::new()).await?;
//!
//!     let (moves_tx, moves_rx) = mpsc::channel(8);
//!     let (events_tx, mut events_rx) = mpsc::unbounded_channel();
//!     tokio::spawn(async move {
//!         while let Some(event) = events_rx.recv().await {
//!             println!("{:?}", event);
//!         }
//!     });
//!
//!     moves_tx.send(3).await?;
//!     let report = server.run(moves_rx, events_tx).await?;
//!     println!("{:?}", report.outcome);
//!     Ok(())
//! }
//! ```
//!
//! [`Server::bind`]: network::Server::bind
//! [`Server::accept_peer`]: network::Server::accept_peer
//! [`Server::run`]: network::Server::run

pub mod network;
