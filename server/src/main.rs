use clap::Parser;
use log::{error, info};
use server::network::{host_console_match, Server};
use shared::{GameSession, MatchConfig, MatchOutcome, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// IP address to listen on
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Board width
    #[arg(short, long, default_value = "7")]
    columns: usize,

    /// Board height
    #[arg(short, long, default_value = "6")]
    rows: usize,

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

    let config =
        MatchConfig::from_args(args.columns, args.rows, args.move_timeout_secs, args.grace_ms)
            .map_err(|e| {
                error!("Invalid configuration: {}", e);
                e
            })?;
    let session = GameSession::with_dimensions(config.columns, config.rows)?;

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, session)
        .await
        .map_err(|e| {
            error!("Failed to start server: {}", e);
            e
        })?
        .with_move_timeout(config.move_timeout);

    println!(
        "Waiting for an opponent on {}. Enter a column number to play, q to quit.",
        server.local_addr()?
    );

    tokio::select! {
        result = host_console_match(server) => match result {
            Ok(report) => match report.outcome {
                MatchOutcome::Finished(status) => {
                    info!("Match over after {} moves: {}", report.session.moves_played(), status)
                }
                MatchOutcome::Aborted(reason) => info!("Match aborted: {}", reason),
            },
            Err(e) => error!("Failed to host match: {}", e),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    tokio::time::sleep(config.grace_period).await;

    // Stdin is read on a blocking thread the runtime would wait for
    std::process::exit(0);
}
