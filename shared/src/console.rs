//! Terminal front end shared by both binaries.
//!
//! Reads column choices from stdin and prints match events. Holds no game
//! state of its own.

use crate::board::Color;
use crate::coordinator::MatchEvent;
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Map a typed column number (`1` for the leftmost) to a column index
pub fn parse_column(input: &str, columns: usize) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    (1..=columns).contains(&number).then(|| number - 1)
}

fn is_quit(input: &str) -> bool {
    matches!(input.trim(), "q" | "quit")
}

/// Spawns task that turns stdin lines into column choices.
///
/// The returned channel closes on EOF or when the player types `q`.
pub fn spawn_stdin_reader(columns: usize) -> mpsc::Receiver<usize> {
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_quit(&line) {
                break;
            }
            match parse_column(&line, columns) {
                Some(column) => {
                    if tx.send(column).await.is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => println!("Enter a column between 1 and {columns}, or q to quit"),
            }
        }
        debug!("Stdin reader finished");
    });

    rx
}

/// Render one event as the text shown to the player
pub fn describe(event: &MatchEvent, local: Color) -> String {
    match event {
        MatchEvent::Started { board, .. } => {
            let mut text = format!("{board}\nYou are {local}. {} moves first.", Color::PlayerA);
            if local == Color::PlayerA {
                text.push_str("\nYour move:");
            }
            text
        }
        MatchEvent::MoveApplied {
            outcome,
            board,
            local: is_local,
        } => {
            let who = if *is_local { "You" } else { "Opponent" };
            let mut text = format!(
                "{who} ({}) dropped into column {}\n{board}",
                outcome.placement.color,
                outcome.placement.column + 1
            );
            if outcome.status.awaiting() == Some(local) {
                text.push_str("\nYour move:");
            }
            text
        }
        MatchEvent::MoveRejected { column, error } => {
            format!("Column {} refused: {error}. Try again:", column + 1)
        }
        MatchEvent::Finished(status) => match status.winner() {
            Some(winner) if winner == local => "You win!".to_string(),
            Some(_) => "You lose.".to_string(),
            None => format!("Game over: {status}"),
        },
        MatchEvent::Aborted(reason) => format!("Match aborted: {reason}"),
    }
}

/// Spawns task that prints every match event until the channel closes
pub fn spawn_presenter(
    local: Color,
    mut events: mpsc::UnboundedReceiver<MatchEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", describe(&event, local));
        }
    })
}
