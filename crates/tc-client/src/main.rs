//! Timecode-Over-IP terminal client — entry point.
//!
//! Connects to the server, then runs a single dispatch loop that interleaves
//! two streams:
//!
//! - lines typed on stdin, parsed into commands and forwarded as protocol
//!   requests, and
//! - protocol messages from the server, rendered to the terminal.
//!
//! A reader task decodes server lines and forwards them over an `mpsc`
//! channel, so the dispatch loop is the only place that touches terminal
//! state.
//!
//! # Usage
//!
//! ```text
//! tc-client [--host <HOST>] [--port <PORT>]
//! ```

use std::io::Write as _;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tc_client::commands::{parse_command, Command, HELP_TEXT};
use tc_client::ui::{handle_server_message, status_text, SessionView};
use tc_core::protocol::framing::{decode_message, encode_request};
use tc_core::ServerMessage;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Interactive terminal client for the Timecode-Over-IP server.
#[derive(Debug, Parser)]
#[command(name = "tc-client", about = "Interactive timecode session client", version)]
struct Cli {
    /// Server hostname or IP address.
    #[arg(long, default_value = "127.0.0.1", env = "TC_HOST")]
    host: String,

    /// Server TCP port.
    #[arg(long, default_value_t = 8080, env = "TC_PORT")]
    port: u16,
}

/// Events delivered by the network reader task to the dispatch loop.
#[derive(Debug)]
enum NetworkEvent {
    Message(ServerMessage),
    Disconnected,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging goes to stderr via tracing; the protocol conversation itself
    // is printed on stdout. Level overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to server at {addr}"))?;
    println!("Connected to Timecode-Over-IP Server at {addr}");

    let (read_half, mut write_half) = stream.into_split();
    let (event_tx, mut event_rx) = mpsc::channel(128);
    tokio::spawn(read_server_messages(read_half, event_tx));

    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session: Option<SessionView> = None;

    // ── Dispatch loop ─────────────────────────────────────────────────────────
    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(NetworkEvent::Message(msg)) => {
                    print!("{}", handle_server_message(&msg, &mut session));
                    std::io::stdout().flush().ok();
                }
                Some(NetworkEvent::Disconnected) | None => {
                    println!("\nDisconnected from server");
                    break;
                }
            },

            line = stdin_lines.next_line() => {
                let Ok(Some(line)) = line else {
                    break; // stdin closed
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match parse_command(line) {
                    Ok(Command::Request(request)) => {
                        if matches!(request, tc_core::ClientRequest::LeaveSession) {
                            session = None;
                        }
                        let encoded = encode_request(&request)?;
                        if write_half.write_all(encoded.as_bytes()).await.is_err() {
                            println!("\nDisconnected from server");
                            break;
                        }
                    }
                    Ok(Command::Status) => print!("{}", status_text(session.as_ref(), true)),
                    Ok(Command::Help) => println!("\n{HELP_TEXT}"),
                    Ok(Command::Quit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Err(e) => println!("{e}"),
                }
            },
        }
    }

    Ok(())
}

/// Reads server lines, decodes them, and forwards them to the dispatch
/// loop. Exits (sending `Disconnected`) when the server goes away.
async fn read_server_messages(read_half: OwnedReadHalf, events: mpsc::Sender<NetworkEvent>) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match decode_message(line) {
                    Ok(msg) => {
                        if events.send(NetworkEvent::Message(msg)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!("ignoring undecodable server line: {e}"),
                }
            }
            Ok(None) | Err(_) => {
                let _ = events.send(NetworkEvent::Disconnected).await;
                break;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_point_at_local_server() {
        let cli = Cli::parse_from(["tc-client"]);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn test_cli_host_and_port_overrides() {
        let cli = Cli::parse_from(["tc-client", "--host", "10.0.0.5", "--port", "9000"]);
        assert_eq!(cli.host, "10.0.0.5");
        assert_eq!(cli.port, 9000);
    }
}
