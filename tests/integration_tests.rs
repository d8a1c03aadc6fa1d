//! Integration tests for networked matches
//!
//! These tests run real loopback TCP matches between the host and guest
//! libraries, and against a hand-driven peer speaking the raw wire format.

use bincode::{deserialize, serialize};
use client::network::Client;
use server::network::Server;
use shared::{
    AbortReason, Color, GameSession, MatchEvent, MatchOutcome, MatchReport, MoveError,
    MoveOutcome, Packet, Status, TransportError, PROTOCOL_VERSION,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// One side of a match driven by the test
struct Player {
    moves: mpsc::Sender<usize>,
    events: mpsc::UnboundedReceiver<MatchEvent>,
}

impl Player {
    fn channels() -> (
        Self,
        mpsc::Receiver<usize>,
        mpsc::UnboundedSender<MatchEvent>,
    ) {
        let (moves, moves_rx) = mpsc::channel(8);
        let (events_tx, events) = mpsc::unbounded_channel();
        (Player { moves, events }, moves_rx, events_tx)
    }

    async fn play(&self, column: usize) {
        self.moves.send(column).await.unwrap();
    }

    /// Next applied move, skipping everything else
    async fn applied(&mut self) -> MoveOutcome {
        timeout(TEST_TIMEOUT, async {
            loop {
                match self.events.recv().await {
                    Some(MatchEvent::MoveApplied { outcome, .. }) => return outcome,
                    Some(_) => continue,
                    None => panic!("Match ended while waiting for a move"),
                }
            }
        })
        .await
        .expect("Timed out waiting for a move")
    }
}

async fn start_host(
    session: GameSession,
    move_timeout: Option<Duration>,
) -> (Player, SocketAddr, JoinHandle<MatchReport>) {
    let server = Server::bind("127.0.0.1:0", session)
        .await
        .unwrap()
        .with_move_timeout(move_timeout);
    let addr = server.local_addr().unwrap();

    let (player, moves_rx, events_tx) = Player::channels();
    let handle = tokio::spawn(async move { server.run(moves_rx, events_tx).await.unwrap() });
    (player, addr, handle)
}

async fn start_guest(addr: SocketAddr) -> (Player, JoinHandle<MatchReport>) {
    let client = Client::connect(&addr.to_string()).await.unwrap();
    assert_eq!(client.color(), Color::PlayerB);

    let (player, moves_rx, events_tx) = Player::channels();
    let handle = tokio::spawn(client.run(moves_rx, events_tx));
    (player, handle)
}

async fn finish(handle: JoinHandle<MatchReport>) -> MatchReport {
    timeout(TEST_TIMEOUT, handle)
        .await
        .expect("Match did not end")
        .unwrap()
}

/// Encode a frame by hand: big-endian length, then the bincode payload
fn frame(packet: &Packet) -> Vec<u8> {
    let payload = serialize(packet).unwrap();
    let mut frame = (payload.len() as u32).to_be_bytes().to_vec();
    frame.extend_from_slice(&payload);
    frame
}

/// A guest speaking the wire format directly
struct RawPeer {
    stream: TcpStream,
}

impl RawPeer {
    async fn connect(addr: SocketAddr, version: u32) -> (Self, Packet) {
        let mut peer = RawPeer {
            stream: TcpStream::connect(addr).await.unwrap(),
        };
        peer.send(&Packet::Connect {
            client_version: version,
        })
        .await;
        let reply = peer.recv().await.expect("Host closed during handshake");
        (peer, reply)
    }

    async fn send(&mut self, packet: &Packet) {
        self.stream.write_all(&frame(packet)).await.unwrap();
    }

    async fn send_move(&mut self, column: u8) {
        self.send(&Packet::Move {
            column,
            color: Color::PlayerB,
        })
        .await;
    }

    /// Next packet, or `None` once the host hangs up
    async fn recv(&mut self) -> Option<Packet> {
        let mut header = [0u8; 4];
        timeout(TEST_TIMEOUT, self.stream.read_exact(&mut header))
            .await
            .expect("Timed out waiting for a frame")
            .ok()?;
        let mut payload = vec![0u8; u32::from_be_bytes(header) as usize];
        self.stream.read_exact(&mut payload).await.unwrap();
        Some(deserialize(&payload).unwrap())
    }
}

/// FULL MATCH TESTS
mod match_tests {
    use super::*;

    /// Host and guest play in lockstep until Red completes a column
    #[tokio::test]
    async fn host_and_guest_play_to_a_win() {
        let (mut host, addr, host_match) = start_host(GameSession::new(), None).await;
        let (mut guest, guest_match) = start_guest(addr).await;

        for _ in 0..3 {
            host.play(3).await;
            assert_eq!(host.applied().await.placement.column, 3);
            assert_eq!(guest.applied().await.placement.color, Color::PlayerA);

            guest.play(4).await;
            assert_eq!(guest.applied().await.placement.column, 4);
            assert_eq!(host.applied().await.placement.color, Color::PlayerB);
        }
        host.play(3).await;

        let host_report = finish(host_match).await;
        let guest_report = finish(guest_match).await;

        assert!(matches!(
            host_report.outcome,
            MatchOutcome::Finished(Status::Won(Color::PlayerA))
        ));
        assert!(matches!(
            guest_report.outcome,
            MatchOutcome::Finished(Status::Won(Color::PlayerA))
        ));
        assert_eq!(host_report.session, guest_report.session);
        assert_eq!(host_report.session.moves_played(), 7);
        assert_eq!(
            guest_report.session.winning_line(),
            Some([(3, 0), (3, 1), (3, 2), (3, 3)])
        );
    }

    /// The guest plays on the board the host chose
    #[tokio::test]
    async fn guest_adopts_host_geometry() {
        let (mut host, addr, host_match) =
            start_host(GameSession::with_dimensions(4, 1).unwrap(), None).await;
        let (mut guest, guest_match) = start_guest(addr).await;

        for column in 0..4 {
            if column % 2 == 0 {
                host.play(column).await;
            } else {
                guest.play(column).await;
            }
            host.applied().await;
            guest.applied().await;
        }

        let host_report = finish(host_match).await;
        let guest_report = finish(guest_match).await;
        assert!(matches!(
            host_report.outcome,
            MatchOutcome::Finished(Status::Drawn)
        ));
        assert!(matches!(
            guest_report.outcome,
            MatchOutcome::Finished(Status::Drawn)
        ));
        assert_eq!(guest_report.session.board().columns(), 4);
        assert_eq!(guest_report.session.board().rows(), 1);
    }

    /// A guest quitting tells the host why
    #[tokio::test]
    async fn guest_quit_is_reported_to_host() {
        let (mut host, addr, host_match) = start_host(GameSession::new(), None).await;
        let (guest, guest_match) = start_guest(addr).await;

        host.play(0).await;
        host.applied().await;
        drop(guest);

        let guest_report = finish(guest_match).await;
        assert!(matches!(
            guest_report.outcome,
            MatchOutcome::Aborted(AbortReason::LocalQuit)
        ));

        let host_report = finish(host_match).await;
        match host_report.outcome {
            MatchOutcome::Aborted(AbortReason::Transport(TransportError::PeerDisconnected(
                reason,
            ))) => assert_eq!(reason, "local player left the match"),
            other => panic!("Unexpected outcome: {:?}", other),
        }
        assert_eq!(host_report.session.moves_played(), 1);
    }
}

/// MISBEHAVING PEER TESTS
mod raw_peer_tests {
    use super::*;

    #[tokio::test]
    async fn handshake_assigns_blue_and_geometry() {
        let (_host, addr, _host_match) = start_host(GameSession::new(), None).await;
        let (_peer, reply) = RawPeer::connect(addr, PROTOCOL_VERSION).await;

        assert_eq!(
            reply,
            Packet::Connected {
                color: Color::PlayerB,
                columns: 7,
                rows: 6
            }
        );
    }

    #[tokio::test]
    async fn version_mismatch_is_refused() {
        let (_host, addr, host_match) = start_host(GameSession::new(), None).await;

        let (mut peer, reply) = RawPeer::connect(addr, PROTOCOL_VERSION + 1).await;
        assert_eq!(
            reply,
            Packet::Disconnect {
                reason: "protocol version mismatch".to_string()
            }
        );
        assert_eq!(peer.recv().await, None);

        // Still waiting for a real opponent
        assert!(!host_match.is_finished());
        let (_peer, reply) = RawPeer::connect(addr, PROTOCOL_VERSION).await;
        assert!(matches!(reply, Packet::Connected { .. }));
    }

    /// Scenario: a remote move into a full column aborts without touching the session
    #[tokio::test]
    async fn remote_move_into_full_column_aborts() {
        let (mut host, addr, host_match) = start_host(GameSession::new(), None).await;
        let (mut peer, _) = RawPeer::connect(addr, PROTOCOL_VERSION).await;

        for _ in 0..3 {
            host.play(0).await;
            assert_eq!(
                peer.recv().await,
                Some(Packet::Move {
                    column: 0,
                    color: Color::PlayerA
                })
            );
            peer.send_move(0).await;
            host.applied().await;
            host.applied().await;
        }
        host.play(1).await;
        host.applied().await;
        assert!(matches!(peer.recv().await, Some(Packet::Move { column: 1, .. })));

        peer.send_move(0).await;

        let report = finish(host_match).await;
        assert!(matches!(
            report.outcome,
            MatchOutcome::Aborted(AbortReason::RemoteMove(MoveError::ColumnFull { column: 0 }))
        ));
        assert_eq!(report.session.moves_played(), 7);
        assert_eq!(report.session.awaiting(), Some(Color::PlayerB));
        assert!(!report.session.board().column_has_space(0).unwrap());

        assert!(matches!(
            peer.recv().await,
            Some(Packet::Disconnect { .. })
        ));
        assert_eq!(peer.recv().await, None);
    }

    #[tokio::test]
    async fn remote_move_out_of_range_aborts() {
        let (mut host, addr, host_match) = start_host(GameSession::new(), None).await;
        let (mut peer, _) = RawPeer::connect(addr, PROTOCOL_VERSION).await;

        host.play(2).await;
        host.applied().await;
        peer.recv().await;
        peer.send_move(7).await;

        let report = finish(host_match).await;
        assert!(matches!(
            report.outcome,
            MatchOutcome::Aborted(AbortReason::RemoteMove(MoveError::OutOfRange {
                column: 7,
                columns: 7
            }))
        ));
        assert_eq!(report.session.moves_played(), 1);
    }

    #[tokio::test]
    async fn garbage_frame_aborts() {
        let (_host, addr, host_match) = start_host(GameSession::new(), None).await;
        let (mut peer, _) = RawPeer::connect(addr, PROTOCOL_VERSION).await;

        let mut garbage = 3u32.to_be_bytes().to_vec();
        garbage.extend_from_slice(&[0xEE, 0xEE, 0xEE]);
        peer.stream.write_all(&garbage).await.unwrap();

        let report = finish(host_match).await;
        assert!(matches!(
            report.outcome,
            MatchOutcome::Aborted(AbortReason::Transport(TransportError::Malformed(_)))
        ));
        assert_eq!(report.session, GameSession::new());
    }

    #[tokio::test]
    async fn peer_disconnect_aborts_match() {
        let (mut host, addr, host_match) = start_host(GameSession::new(), None).await;
        let (peer, _) = RawPeer::connect(addr, PROTOCOL_VERSION).await;

        host.play(5).await;
        host.applied().await;
        drop(peer);

        let report = finish(host_match).await;
        assert!(matches!(
            report.outcome,
            MatchOutcome::Aborted(AbortReason::Transport(TransportError::PeerDisconnected(_)))
        ));
        assert_eq!(report.session.moves_played(), 1);
    }

    #[tokio::test]
    async fn silent_peer_forfeits_after_timeout() {
        let move_timeout = Duration::from_millis(200);
        let (mut host, addr, host_match) =
            start_host(GameSession::new(), Some(move_timeout)).await;
        let (mut peer, _) = RawPeer::connect(addr, PROTOCOL_VERSION).await;

        host.play(3).await;
        host.applied().await;

        let report = finish(host_match).await;
        match report.outcome {
            MatchOutcome::Aborted(AbortReason::Transport(TransportError::Timeout(waited))) => {
                assert_eq!(waited, move_timeout)
            }
            other => panic!("Unexpected outcome: {:?}", other),
        }

        assert!(matches!(peer.recv().await, Some(Packet::Move { column: 3, .. })));
        assert!(matches!(
            peer.recv().await,
            Some(Packet::Disconnect { .. })
        ));
    }
}
