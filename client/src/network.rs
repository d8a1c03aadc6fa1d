//! Guest side of the relay: connects to a host and joins its match

use log::{info, warn};
use shared::console;
use shared::protocol::{read_packet, resolve_ipv4, write_packet, Packet};
use shared::{
    Color, Coordinator, GameSession, MatchEvent, MatchReport, RemoteEndpoint, TransportError,
    HANDSHAKE_TIMEOUT, PROTOCOL_VERSION,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// The host opens the match, so the guest always plays second
pub const GUEST_COLOR: Color = Color::PlayerB;

/// A guest that has completed the handshake with a host.
pub struct Client {
    stream: TcpStream,
    server_addr: SocketAddr,
    color: Color,
    session: GameSession,
    move_timeout: Option<Duration>,
}

impl Client {
    /// Connect to `server_addr` and join the match on offer.
    ///
    /// The session is built from the geometry the host sends back.
    pub async fn connect(server_addr: &str) -> Result<Self, TransportError> {
        let server_addr = resolve_ipv4(server_addr).await?;
        let mut stream =
            TcpStream::connect(server_addr)
                .await
                .map_err(|source| TransportError::Connect {
                    addr: server_addr,
                    source,
                })?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }
        info!("Connected to {}", server_addr);

        let (color, columns, rows) = timeout(HANDSHAKE_TIMEOUT, Self::handshake(&mut stream))
            .await
            .map_err(|_| TransportError::Handshake("timed out waiting for the host".to_string()))??;

        let session = GameSession::with_dimensions(columns, rows).map_err(|e| {
            TransportError::Handshake(format!("host offered an unusable board: {e}"))
        })?;
        info!(
            "Joined match as {} on a {}x{} board",
            color, columns, rows
        );

        Ok(Client {
            stream,
            server_addr,
            color,
            session,
            move_timeout: None,
        })
    }

    async fn handshake(stream: &mut TcpStream) -> Result<(Color, usize, usize), TransportError> {
        write_packet(
            stream,
            &Packet::Connect {
                client_version: PROTOCOL_VERSION,
            },
        )
        .await?;

        match read_packet(stream).await? {
            Some(Packet::Connected {
                color: GUEST_COLOR,
                columns,
                rows,
            }) => Ok((GUEST_COLOR, columns as usize, rows as usize)),
            Some(Packet::Connected { color, .. }) => Err(TransportError::Handshake(format!(
                "host assigned {color}, the guest always plays {GUEST_COLOR}"
            ))),
            Some(Packet::Disconnect { reason }) => Err(TransportError::Handshake(format!(
                "host refused the connection: {reason}"
            ))),
            Some(other) => Err(TransportError::UnexpectedPacket(format!(
                "{} before Connected",
                other.kind()
            ))),
            None => Err(TransportError::PeerDisconnected(
                "closed during handshake".to_string(),
            )),
        }
    }

    pub fn with_move_timeout(mut self, move_timeout: Option<Duration>) -> Self {
        self.move_timeout = move_timeout;
        self
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Color assigned by the host
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Play the match out against the host.
    pub async fn run(
        self,
        local_rx: mpsc::Receiver<usize>,
        events: mpsc::UnboundedSender<MatchEvent>,
    ) -> MatchReport {
        let (endpoint, relay_rx) =
            RemoteEndpoint::spawn(self.stream, self.server_addr, self.color.other());

        Coordinator::new(self.session, self.color, endpoint, relay_rx, local_rx)
            .with_move_timeout(self.move_timeout)
            .with_events(events)
            .run()
            .await
    }
}

/// Join a match with a stdin player and a printed board
pub async fn join_console_match(client: Client) -> MatchReport {
    let local_rx = console::spawn_stdin_reader(client.session.board().columns());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let presenter = console::spawn_presenter(client.color, events_rx);

    let report = client.run(local_rx, events_tx).await;
    let _ = presenter.await;
    report
}
