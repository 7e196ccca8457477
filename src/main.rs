//! Chatterm - terminal chat client
//!
//! A thin terminal front-end over the `chatterm_core` session: stdin lines
//! go to the server, inbound chunks and status lines go to the terminal.

use anyhow::{anyhow, Context};
use chatterm_core::{AppConfig, Session, SessionEvent, SessionState};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

/// Chatterm - terminal chat client
#[derive(Parser, Debug)]
#[command(name = "chatterm", version, about = "Terminal chat client", long_about = None)]
struct Cli {
    /// Display name to register with the server
    #[arg(short, long)]
    name: Option<String>,

    /// Chat server host
    #[arg(long)]
    host: Option<String>,

    /// Chat server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let name = cli
        .name
        .or_else(|| config.name.clone())
        .ok_or_else(|| anyhow!("no display name: pass --name or set one in the config file"))?;

    let (session, mut events) = match Session::connect(&config.tcp_config(), &name).await {
        Ok(connected) => connected,
        Err(e) => {
            // The error display is the operator-facing status line
            eprintln!("* {e}");
            std::process::exit(1);
        }
    };

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                match line? {
                    Some(line) if line.trim() == "/quit" => break,
                    Some(line) => {
                        // A failed send already surfaces as a status event
                        let _ = session.send(&line).await;
                    }
                    None => break,
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if print_event(&event)? {
                            return Ok(());
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    shutdown(&session, &mut events).await;
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let path = cli.config.clone().or_else(chatterm_core::config::config_file);
    let mut config = match path {
        Some(path) => AppConfig::load(&path)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("could not read config file {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    Ok(config)
}

/// Print a session event. Returns true when the session reached its
/// terminal state and the client should exit.
fn print_event(event: &SessionEvent) -> anyhow::Result<bool> {
    match event {
        // Chunks are pre-formatted display text; print them verbatim
        SessionEvent::MessageChunk(text) => {
            print!("{text}");
            std::io::stdout().flush()?;
        }
        SessionEvent::Status(status) => eprintln!("* {status}"),
        SessionEvent::StateChanged(SessionState::Disconnected) => return Ok(true),
        SessionEvent::StateChanged(_) => {}
    }
    Ok(false)
}

/// Best-effort shutdown: disconnect, wait bounded for the receive loop to
/// acknowledge, then exit regardless.
async fn shutdown(session: &Session, events: &mut broadcast::Receiver<SessionEvent>) {
    session.disconnect().await;

    let _ = tokio::time::timeout(Duration::from_millis(500), async {
        while let Ok(event) = events.recv().await {
            if matches!(print_event(&event), Ok(true)) {
                break;
            }
        }
    })
    .await;
}
