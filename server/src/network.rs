//! Host side of the relay: listens for one guest and runs the match

use log::{info, warn};
use shared::console;
use shared::protocol::{read_packet, resolve_ipv4, write_packet, Packet};
use shared::{
    Color, Coordinator, GameSession, MatchEvent, MatchReport, RemoteEndpoint, TransportError,
    HANDSHAKE_TIMEOUT, PROTOCOL_VERSION,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// The host always opens the match
pub const HOST_COLOR: Color = Color::PlayerA;

/// Listening host for a single match.
pub struct Server {
    listener: TcpListener,
    session: GameSession,
    move_timeout: Option<Duration>,
}

impl Server {
    /// Bind the listener. `session` is the board the guest will be offered.
    pub async fn bind(addr: &str, session: GameSession) -> Result<Self, TransportError> {
        let addr = resolve_ipv4(addr).await?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        info!("Server listening on {}", addr);

        Ok(Server {
            listener,
            session,
            move_timeout: None,
        })
    }

    pub fn with_move_timeout(mut self, move_timeout: Option<Duration>) -> Self {
        self.move_timeout = move_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait for a guest that completes the handshake.
    ///
    /// Connections that fail or stall the handshake are dropped and the
    /// listener keeps waiting.
    pub async fn accept_peer(&self) -> Result<(TcpStream, SocketAddr), TransportError> {
        loop {
            let (mut stream, addr) = self
                .listener
                .accept()
                .await
                .map_err(TransportError::Accept)?;
            info!("Connection from {}", addr);

            match timeout(HANDSHAKE_TIMEOUT, self.handshake(&mut stream)).await {
                Ok(Ok(())) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
                    }
                    info!("Guest {} joined the match", addr);
                    return Ok((stream, addr));
                }
                Ok(Err(e)) => warn!("Dropping {}: {}", addr, e),
                Err(_) => warn!("Dropping {}: handshake timed out", addr),
            }
        }
    }

    async fn handshake(&self, stream: &mut TcpStream) -> Result<(), TransportError> {
        match read_packet(stream).await? {
            Some(Packet::Connect { client_version }) if client_version == PROTOCOL_VERSION => {
                let board = self.session.board();
                let (columns, rows) = u8::try_from(board.columns())
                    .ok()
                    .zip(u8::try_from(board.rows()).ok())
                    .ok_or_else(|| {
                        TransportError::Handshake(format!(
                            "{}x{} board does not fit the protocol",
                            board.columns(),
                            board.rows()
                        ))
                    })?;

                let reply = Packet::Connected {
                    color: HOST_COLOR.other(),
                    columns,
                    rows,
                };
                write_packet(stream, &reply).await
            }
            Some(Packet::Connect { client_version }) => {
                let reply = Packet::Disconnect {
                    reason: "protocol version mismatch".to_string(),
                };
                write_packet(stream, &reply).await?;
                Err(TransportError::Handshake(format!(
                    "client version {client_version}, expected {PROTOCOL_VERSION}"
                )))
            }
            Some(other) => Err(TransportError::UnexpectedPacket(format!(
                "{} before Connect",
                other.kind()
            ))),
            None => Err(TransportError::PeerDisconnected(
                "closed during handshake".to_string(),
            )),
        }
    }

    /// Accept a guest, close the listener and play the match out.
    pub async fn run(
        self,
        local_rx: mpsc::Receiver<usize>,
        events: mpsc::UnboundedSender<MatchEvent>,
    ) -> Result<MatchReport, TransportError> {
        let (stream, peer_addr) = self.accept_peer().await?;

        let Server {
            listener,
            session,
            move_timeout,
        } = self;
        drop(listener);

        let (endpoint, relay_rx) = RemoteEndpoint::spawn(stream, peer_addr, HOST_COLOR.other());
        let report = Coordinator::new(session, HOST_COLOR, endpoint, relay_rx, local_rx)
            .with_move_timeout(move_timeout)
            .with_events(events)
            .run()
            .await;

        Ok(report)
    }
}

/// Host a match with a stdin player and a printed board
pub async fn host_console_match(server: Server) -> Result<MatchReport, TransportError> {
    let columns = server.session.board().columns();
    let local_rx = console::spawn_stdin_reader(columns);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let presenter = console::spawn_presenter(HOST_COLOR, events_rx);

    let result = server.run(local_rx, events_tx).await;
    // The sender is gone once the match ends, so the presenter drains and stops
    let _ = presenter.await;
    result
}
