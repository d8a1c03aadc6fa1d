use clap::Parser;
use client::network::{join_console_match, Client};
use log::{error, info};
use shared::{MatchConfig, MatchOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Seconds to wait for the opponent's move before forfeiting (0 waits forever)
    #[arg(long, default_value = "120")]
    move_timeout_secs: u64,

    /// Pause in milliseconds before exiting once the match is over
    #[arg(long, default_value = "3000")]
    grace_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    // Geometry comes from the host; only the timings are ours
    let defaults = MatchConfig::default();
    let config = MatchConfig::from_args(
        defaults.columns,
        defaults.rows,
        args.move_timeout_secs,
        args.grace_ms,
    )?;

    info!("Connecting to: {}", args.server);
    let client = Client::connect(&args.server)
        .await
        .map_err(|e| {
            error!("Failed to join match: {}", e);
            e
        })?
        .with_move_timeout(config.move_timeout);

    println!(
        "Joined {} as {}. Enter a column number to play, q to quit.",
        client.server_addr(),
        client.color()
    );

    tokio::select! {
        report = join_console_match(client) => match report.outcome {
            MatchOutcome::Finished(status) => {
                info!("Match over after {} moves: {}", report.session.moves_played(), status)
            }
            MatchOutcome::Aborted(reason) => info!("Match aborted: {}", reason),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    tokio::time::sleep(config.grace_period).await;

    // Stdin is read on a blocking thread the runtime would wait for
    std::process::exit(0);
}

