//! # Game Client Library
//!
//! The joining side of a two-player Connect Four match. The client connects
//! to a host, announces its protocol version and receives its color and the
//! board geometry in return. From then on the guest runs the same relay and
//! coordinator as the host, so both sides hold an identical session and
//! validate every move locally.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("127.0.0.1:8080").await?;
//!     println!("Playing as {}", client.color());
//!
//!     let (_moves_tx, moves_rx) = mpsc::channel(8);
//!     let (events_tx, _events_rx) = mpsc::unbounded_channel();
//!     let report = client.run(moves_rx, events_tx).await;
//!     println!("{:?}", report.outcome);
//!     Ok(())
//! }
//! ```

pub mod network;
