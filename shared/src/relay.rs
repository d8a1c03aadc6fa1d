//! Relay tasks for an established peer connection.
//!
//! Once the handshake is done the stream is split: a receive task decodes
//! frames and forwards them as [`RelayEvent`]s, a send task drains the
//! outbound queue. Neither task touches game state; the coordinator owns it.

use crate::board::Color;
use crate::error::TransportError;
use crate::protocol::{read_packet, write_packet, Packet};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How long shutdown waits for queued packets to reach the socket
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Messages sent from the receive task to the coordinator
#[derive(Debug)]
pub enum RelayEvent {
    MoveReceived { column: usize, color: Color },
    PeerDisconnected { reason: String },
    Failed(TransportError),
}

/// A connected peer playing `remote_color`.
///
/// Dropping the endpoint aborts both relay tasks; [`shutdown`] flushes the
/// outbound queue first.
///
/// [`shutdown`]: RemoteEndpoint::shutdown
pub struct RemoteEndpoint {
    peer_addr: SocketAddr,
    remote_color: Color,
    outbound_tx: Option<mpsc::UnboundedSender<Packet>>,
    sender: Option<JoinHandle<()>>,
    receiver: Option<JoinHandle<()>>,
}

impl RemoteEndpoint {
    /// Split `stream` and start the relay tasks.
    ///
    /// Returns the endpoint and the channel the receive task reports on.
    pub fn spawn<S>(
        stream: S,
        peer_addr: SocketAddr,
        remote_color: Color,
    ) -> (Self, mpsc::UnboundedReceiver<RelayEvent>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let receiver = Self::spawn_network_receiver(reader, peer_addr, event_tx);
        let sender = Self::spawn_network_sender(writer, peer_addr, outbound_rx);

        info!("Relay started for {} playing {}", peer_addr, remote_color);

        let endpoint = RemoteEndpoint {
            peer_addr,
            remote_color,
            outbound_tx: Some(outbound_tx),
            sender: Some(sender),
            receiver: Some(receiver),
        };
        (endpoint, event_rx)
    }

    /// Spawns task that continuously reads frames from the peer
    fn spawn_network_receiver<R>(
        mut reader: R,
        peer_addr: SocketAddr,
        event_tx: mpsc::UnboundedSender<RelayEvent>,
    ) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            loop {
                let (event, last) = match read_packet(&mut reader).await {
                    Ok(Some(Packet::Move { column, color })) => (
                        RelayEvent::MoveReceived {
                            column: column as usize,
                            color,
                        },
                        false,
                    ),
                    Ok(Some(Packet::Disconnect { reason })) => {
                        (RelayEvent::PeerDisconnected { reason }, true)
                    }
                    Ok(Some(other)) => (
                        RelayEvent::Failed(TransportError::UnexpectedPacket(format!(
                            "{} during a match",
                            other.kind()
                        ))),
                        true,
                    ),
                    Ok(None) => (
                        RelayEvent::PeerDisconnected {
                            reason: "connection closed".to_string(),
                        },
                        true,
                    ),
                    Err(e) => {
                        warn!("Failed to read from {}: {}", peer_addr, e);
                        (RelayEvent::Failed(e), true)
                    }
                };

                if let Err(e) = event_tx.send(event) {
                    debug!("Relay event for {} dropped: {}", peer_addr, e);
                    break;
                }
                if last {
                    break;
                }
            }
        })
    }

    /// Spawns task that writes queued packets to the peer
    fn spawn_network_sender<W>(
        mut writer: W,
        peer_addr: SocketAddr,
        mut outbound_rx: mpsc::UnboundedReceiver<Packet>,
    ) -> JoinHandle<()>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            while let Some(packet) = outbound_rx.recv().await {
                if let Err(e) = write_packet(&mut writer, &packet).await {
                    error!("Failed to send {} to {}: {}", packet.kind(), peer_addr, e);
                    break;
                }
            }
            let _ = writer.shutdown().await;
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn remote_color(&self) -> Color {
        self.remote_color
    }

    fn queue(&self, packet: Packet) -> Result<(), TransportError> {
        let tx = self.outbound_tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(packet).map_err(|_| TransportError::Closed)
    }

    /// Queue a move for the peer. Columns beyond `u8::MAX` never come from a
    /// valid board and are refused.
    pub fn send_move(&self, column: usize, color: Color) -> Result<(), TransportError> {
        let column = u8::try_from(column).map_err(|_| {
            TransportError::UnexpectedPacket(format!("column {column} does not fit a frame"))
        })?;
        self.queue(Packet::Move { column, color })
    }

    pub fn send_disconnect(&self, reason: &str) -> Result<(), TransportError> {
        self.queue(Packet::Disconnect {
            reason: reason.to_string(),
        })
    }

    /// Flush queued packets, close the write side and stop the receive task.
    pub async fn shutdown(mut self) {
        // Closing the queue lets the send task finish once it is drained
        self.outbound_tx.take();
        if let Some(mut sender) = self.sender.take() {
            if tokio::time::timeout(FLUSH_TIMEOUT, &mut sender).await.is_err() {
                warn!("Timed out flushing packets to {}", self.peer_addr);
                sender.abort();
            }
        }
        if let Some(receiver) = self.receiver.take() {
            receiver.abort();
        }
        info!("Relay to {} closed", self.peer_addr);
    }
}

impl Drop for RemoteEndpoint {
    fn drop(&mut self) {
        for handle in [self.sender.take(), self.receiver.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}
