//! ip-watchlist
//!
//! Evaluates remote addresses against file-backed IP lists that reload
//! themselves when their files change.
//!
//! ```text
//!   watchlist.toml ──▶ config ──▶ Guard ──▶ BanMatcher / RemoteIpListMatcher
//!                                              │
//!                                              ▼
//!   stdin / args ──▶ remote address ──▶ IpList::is_matched ◀── watcher (notify)
//!                                              │
//!                                              ▼
//!                                   "<remote> <list> allow|deny"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use ip_watchlist::lifecycle::{signals, startup, Shutdown};
use ip_watchlist::matcher::Guard;

#[derive(Parser)]
#[command(name = "ip-watchlist")]
#[command(about = "Match remote addresses against self-refreshing IP lists", long_about = None)]
struct Cli {
    /// Path to the TOML configuration.
    #[arg(short, long, global = true, default_value = "watchlist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the given addresses once and exit
    Check {
        /// Remote addresses, with or without port
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Read remote addresses from stdin, one per line, until EOF or a signal
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = startup::init(&cli.config)?;
    let shutdown = Shutdown::new();
    let guard = startup::provision(&config, &shutdown)?;

    match cli.command {
        Commands::Check { addresses } => {
            for remote in &addresses {
                print_verdicts(&guard, remote);
            }
        }
        Commands::Watch => {
            signals::spawn_signal_handler(shutdown.clone());
            watch_stdin(&guard, &shutdown).await;
        }
    }

    shutdown.trigger();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn watch_stdin(guard: &Guard, shutdown: &Shutdown) {
    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) => {
                    let remote = line.trim();
                    if !remote.is_empty() {
                        print_verdicts(guard, remote);
                    }
                }
                None => return,
            },
            _ = shutdown.wait() => return,
        }
    }
}

/// Read stdin on a plain thread; a blocking read must not hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_verdicts(guard: &Guard, remote: &str) {
    for verdict in guard.evaluate(remote) {
        println!("{} {} {}", remote, verdict.list, verdict.decision);
    }
}
