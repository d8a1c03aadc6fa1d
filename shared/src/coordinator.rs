//! The match event loop.
//!
//! The coordinator is the only owner of the [`GameSession`]. Local input and
//! relayed remote moves both arrive as channel messages and are applied one at
//! a time inside a single `select!` loop, so a keypress and a network move can
//! never race on `submit_move`.

use crate::board::{Board, Color};
use crate::error::{MoveError, TransportError};
use crate::relay::{RelayEvent, RemoteEndpoint};
use crate::session::{GameSession, MoveOutcome, Status};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Updates for the presentation layer
#[derive(Debug, Clone)]
pub enum MatchEvent {
    Started {
        local: Color,
        board: Board,
    },
    MoveApplied {
        outcome: MoveOutcome,
        board: Board,
        local: bool,
    },
    /// A local move was refused; the player should pick again
    MoveRejected {
        column: usize,
        error: MoveError,
    },
    Finished(Status),
    Aborted(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AbortReason {
    #[error("remote move rejected: {0}")]
    RemoteMove(#[source] MoveError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("local player left the match")]
    LocalQuit,
}

#[derive(Debug)]
pub enum MatchOutcome {
    Finished(Status),
    Aborted(AbortReason),
}

/// Final state of a match, returned once the relay has been torn down.
#[derive(Debug)]
pub struct MatchReport {
    pub outcome: MatchOutcome,
    pub session: GameSession,
}

enum Step {
    Continue,
    Done(MatchOutcome),
}

pub struct Coordinator {
    session: GameSession,
    local_color: Color,
    endpoint: RemoteEndpoint,
    relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
    local_rx: mpsc::Receiver<usize>,
    events: Option<mpsc::UnboundedSender<MatchEvent>>,
    move_timeout: Option<Duration>,
}

impl Coordinator {
    pub fn new(
        session: GameSession,
        local_color: Color,
        endpoint: RemoteEndpoint,
        relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
        local_rx: mpsc::Receiver<usize>,
    ) -> Self {
        Coordinator {
            session,
            local_color,
            endpoint,
            relay_rx,
            local_rx,
            events: None,
            move_timeout: None,
        }
    }

    /// Forward match updates to the presentation layer
    pub fn with_events(mut self, events: mpsc::UnboundedSender<MatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Forfeit the match if the peer takes longer than `timeout` to move
    pub fn with_move_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.move_timeout = timeout;
        self
    }

    fn emit(&self, event: MatchEvent) {
        if let Some(events) = &self.events {
            // Presentation going away must not end the match
            let _ = events.send(event);
        }
    }

    /// Deadline for the peer's move, armed only while it is their turn
    fn remote_deadline(&self) -> Option<Instant> {
        let timeout = self.move_timeout?;
        (self.session.awaiting() == Some(self.endpoint.remote_color()))
            .then(|| Instant::now() + timeout)
    }

    /// Run the match to completion and tear down the relay.
    pub async fn run(mut self) -> MatchReport {
        info!(
            "Match started against {}: local {}, remote {}",
            self.endpoint.peer_addr(),
            self.local_color,
            self.endpoint.remote_color()
        );
        self.emit(MatchEvent::Started {
            local: self.local_color,
            board: self.session.board().clone(),
        });

        let mut deadline = self.remote_deadline();

        let outcome = loop {
            let expiry = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            let step = tokio::select! {
                event = self.relay_rx.recv() => self.handle_relay_event(event),
                column = self.local_rx.recv() => self.handle_local_input(column),
                _ = expiry => {
                    // The deadline is only armed with a timeout configured
                    let waited = self.move_timeout.unwrap_or_default();
                    warn!("{} did not move within {:?}", self.endpoint.remote_color(), waited);
                    Step::Done(MatchOutcome::Aborted(AbortReason::Transport(
                        TransportError::Timeout(waited),
                    )))
                }
            };

            match step {
                Step::Continue => {}
                Step::Done(outcome) => break outcome,
            }

            // Re-arm on turn changes only; rejected input keeps the deadline
            if deadline.is_none() || self.session.awaiting() != Some(self.endpoint.remote_color()) {
                deadline = self.remote_deadline();
            }
        };

        self.finish(outcome).await
    }

    async fn finish(self, outcome: MatchOutcome) -> MatchReport {
        match &outcome {
            MatchOutcome::Finished(status) => {
                info!("Match finished: {}", status);
                self.emit(MatchEvent::Finished(*status));
            }
            MatchOutcome::Aborted(reason) => {
                error!("Match aborted: {}", reason);
                if !matches!(reason, AbortReason::Transport(TransportError::PeerDisconnected(_))) {
                    let _ = self.endpoint.send_disconnect(&reason.to_string());
                }
                self.emit(MatchEvent::Aborted(reason.to_string()));
            }
        }

        let Coordinator {
            session, endpoint, ..
        } = self;
        endpoint.shutdown().await;

        MatchReport { outcome, session }
    }

    fn handle_relay_event(&mut self, event: Option<RelayEvent>) -> Step {
        let remote = self.endpoint.remote_color();
        match event {
            Some(RelayEvent::MoveReceived { column, color }) => {
                if color != remote {
                    return Step::Done(MatchOutcome::Aborted(AbortReason::Transport(
                        TransportError::UnexpectedPacket(format!(
                            "move tagged {color} from the {remote} player"
                        )),
                    )));
                }
                match self.session.submit_move(column, remote) {
                    Ok(outcome) => self.applied(outcome, false),
                    Err(e) => {
                        warn!("Rejected remote move into column {}: {}", column, e);
                        Step::Done(MatchOutcome::Aborted(AbortReason::RemoteMove(e)))
                    }
                }
            }
            Some(RelayEvent::PeerDisconnected { reason }) => Step::Done(MatchOutcome::Aborted(
                AbortReason::Transport(TransportError::PeerDisconnected(reason)),
            )),
            Some(RelayEvent::Failed(e)) => {
                Step::Done(MatchOutcome::Aborted(AbortReason::Transport(e)))
            }
            None => Step::Done(MatchOutcome::Aborted(AbortReason::Transport(
                TransportError::Closed,
            ))),
        }
    }

    fn handle_local_input(&mut self, column: Option<usize>) -> Step {
        let Some(column) = column else {
            return Step::Done(MatchOutcome::Aborted(AbortReason::LocalQuit));
        };

        match self.session.submit_move(column, self.local_color) {
            Ok(outcome) => {
                if let Err(e) = self.endpoint.send_move(column, self.local_color) {
                    return Step::Done(MatchOutcome::Aborted(AbortReason::Transport(e)));
                }
                self.applied(outcome, true)
            }
            Err(error) => {
                debug!("Rejected local move into column {}: {}", column, error);
                self.emit(MatchEvent::MoveRejected { column, error });
                Step::Continue
            }
        }
    }

    fn applied(&self, outcome: MoveOutcome, local: bool) -> Step {
        self.emit(MatchEvent::MoveApplied {
            outcome,
            board: self.session.board().clone(),
            local,
        });

        if outcome.status.is_terminal() {
            Step::Done(MatchOutcome::Finished(outcome.status))
        } else {
            Step::Continue
        }
    }
}
