//! TCP transport: accept loop and per-connection reader/writer tasks.
//!
//! Each connection gets:
//!
//! - a **reader loop** (this task) that reads newline-delimited JSON,
//!   decodes requests, and submits them to the registry, and
//! - a **writer task** that drains the connection's outbound channel into
//!   the socket.
//!
//! The split means the registry never blocks on a slow socket: it hands
//! messages to the channel and moves on. When either side of the socket
//! dies, the reader submits the disconnect and the registry drops the sink,
//! which ends the writer once the queue drains.
//!
//! A malformed line is answered with a protocol `error` message and the
//! connection stays open; connection teardown is driven only by transport
//! EOF/errors.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tc_core::protocol::framing::{decode_request, encode_message, WireError};
use tc_core::ServerMessage;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::broadcast::ChannelSink;
use crate::config::ServerConfig;
use crate::registry::{run_registry, RegistryHandle, SessionRegistry};
use crate::session::ClientId;
use crate::status::run_status_reporter;

/// The bound server: listener plus the registry task behind it.
pub struct Server {
    config: ServerConfig,
    listener: TcpListener,
    local_addr: SocketAddr,
    handle: RegistryHandle,
    registry_task: JoinHandle<()>,
}

impl Server {
    /// Binds the listener and starts the registry task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot be bound (port in use,
    /// missing permission, unresolvable host).
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let bind_to = (config.network.host.as_str(), config.network.port);
        let listener = TcpListener::bind(bind_to).await.with_context(|| {
            format!(
                "failed to bind listener on {}:{}",
                config.network.host, config.network.port
            )
        })?;
        let local_addr = listener.local_addr()?;

        let (registry, commands_rx) = SessionRegistry::new();
        let handle = registry.handle();
        let registry_task = tokio::spawn(run_registry(registry, commands_rx, local_addr));

        info!("timecode server listening on {local_addr}");
        Ok(Self {
            config,
            listener,
            local_addr,
            handle,
            registry_task,
        })
    }

    /// The address the listener actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A handle for submitting registry commands (status queries, tests).
    pub fn registry(&self) -> RegistryHandle {
        self.handle.clone()
    }

    /// Accepts connections until `running` is cleared, then shuts the
    /// registry down and waits for it to finish.
    pub async fn run(self, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        if self.config.status.enabled {
            tokio::spawn(run_status_reporter(
                self.handle.clone(),
                self.config.status.period(),
                Arc::clone(&running),
            ));
        }

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            // Short timeout on accept so the loop observes the shutdown flag
            // even when no clients are connecting.
            match timeout(Duration::from_millis(200), self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    let registry = self.handle.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, peer_addr, registry).await;
                    });
                }
                Ok(Err(e)) => {
                    // Transient accept failure (e.g. fd exhaustion); keep
                    // serving the clients we have.
                    error!("accept error: {e}");
                }
                Err(_) => {} // timeout; re-check the flag
            }
        }

        self.handle.shutdown().await;
        self.registry_task
            .await
            .context("registry task panicked")?;
        Ok(())
    }
}

// ── Per-connection handling ───────────────────────────────────────────────────

/// Runs one client connection to completion and reports its disconnect.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, registry: RegistryHandle) {
    let client_id = Uuid::new_v4();
    info!(client = %client_id, %peer_addr, "connection accepted");

    let (read_half, write_half) = stream.into_split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Register before reading so the welcome message is queued first; the
    // registry task processes commands in submission order.
    registry.connect(client_id, peer_addr, Box::new(ChannelSink::new(outbound_tx.clone())));

    let writer = tokio::spawn(write_outbound(write_half, outbound_rx, client_id));

    run_reader(read_half, client_id, &registry, &outbound_tx).await;

    // EOF or I/O error: run the implicit-leave path and let the writer end
    // once the registry drops its sink and the queue drains.
    registry.disconnect(client_id);
    drop(outbound_tx);
    if let Err(e) = writer.await {
        debug!(client = %client_id, "writer task ended abnormally: {e}");
    }
    info!(client = %client_id, "connection closed");
}

/// Reads protocol lines until the peer goes away.
async fn run_reader(
    read_half: tokio::net::tcp::OwnedReadHalf,
    client_id: ClientId,
    registry: &RegistryHandle,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match decode_request(line) {
                    Ok(request) => registry.request(client_id, request),
                    Err(e) => {
                        debug!(client = %client_id, "rejected line: {e}");
                        // Answered directly on this connection's channel;
                        // framing failures are per-connection, not session
                        // state, so they skip the registry queue.
                        let _ = outbound.send(ServerMessage::error(protocol_error_text(&e)));
                    }
                }
            }
            Ok(None) => {
                debug!(client = %client_id, "peer closed the connection");
                break;
            }
            Err(e) => {
                warn!(client = %client_id, "read error: {e}");
                break;
            }
        }
    }
}

/// Drains the outbound channel into the socket until the channel closes or
/// the socket dies.
async fn write_outbound(
    mut write_half: tokio::net::tcp::OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
    client_id: ClientId,
) {
    while let Some(msg) = outbound.recv().await {
        let line = match encode_message(&msg) {
            Ok(line) => line,
            Err(e) => {
                error!(client = %client_id, "failed to encode outbound message: {e}");
                continue;
            }
        };
        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            debug!(client = %client_id, "write failed: {e}");
            break;
        }
    }
}

/// Maps a framing failure to the protocol's canonical error text.
fn protocol_error_text(e: &WireError) -> &'static str {
    match e {
        WireError::UnknownCommand => "Unknown command",
        WireError::InvalidJson(_) | WireError::InvalidPayload { .. } | WireError::Serialize(_) => {
            "Invalid JSON message"
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
