//! The session registry: the single owner of all sessions and client
//! connection records.
//!
//! Every mutation flows through one registry task that drains a command
//! queue in arrival order — the Rust rendition of a single cooperative
//! scheduler. Connection handlers, clock drivers, and the status reporter
//! are separate tasks that only *submit* commands, so no two operations on
//! a session ever interleave mid-update and the maps need no lock.
//!
//! ```text
//! connection reader ─┐
//! clock driver ──────┼─► command queue ─► registry task ─► sinks/writer tasks
//! status reporter ───┘        (processed one at a time, in arrival order)
//! ```
//!
//! Ordering guarantees fall out of the queue: requests from different
//! clients against one session apply in submission order, and a tick is
//! applied either entirely before or entirely after any other operation.

use std::collections::HashMap;
use std::net::SocketAddr;

use tc_core::{ClientRequest, FrameRate, ServerMessage, Timecode, TimecodeError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use uuid::Uuid;

use crate::broadcast::{broadcast, MessageSink};
use crate::clock::spawn_clock;
use crate::session::{ClientId, Session, SessionId};
use crate::status::{SessionStatus, StatusReport};

// ── Errors ────────────────────────────────────────────────────────────────────

/// A session operation failed. The `Display` form is the exact message
/// surfaced to the offending client; no variant ever terminates the
/// connection or the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unsupported framerate")]
    UnsupportedFramerate,

    #[error("Invalid timecode format: {0}")]
    MalformedTimecode(TimecodeError),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Not in a session")]
    NotInSession,

    #[error("Timecode already running")]
    AlreadyRunning,

    #[error("Timecode not running")]
    NotRunning,
}

// ── Client connection record ──────────────────────────────────────────────────

/// Per-connection record tracked by the registry.
///
/// The registry never writes to the socket itself; `sink` hands messages to
/// the connection's writer task.
pub struct ClientConnection {
    pub id: ClientId,
    pub addr: SocketAddr,
    /// The session this client is subscribed to, if any. A client belongs
    /// to at most one session at a time.
    pub session_id: Option<SessionId>,
    pub(crate) sink: Box<dyn MessageSink>,
}

impl ClientConnection {
    pub fn new(id: ClientId, addr: SocketAddr, sink: Box<dyn MessageSink>) -> Self {
        Self {
            id,
            addr,
            session_id: None,
            sink,
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Commands processed by the registry task.
pub enum RegistryCommand {
    /// A transport connection was established.
    Connect {
        client_id: ClientId,
        addr: SocketAddr,
        sink: Box<dyn MessageSink>,
    },
    /// A transport connection went away (EOF, I/O error, or write failure).
    Disconnect { client_id: ClientId },
    /// A decoded request from a connected client.
    Request {
        client_id: ClientId,
        request: ClientRequest,
    },
    /// One frame advance from a session's clock driver.
    Tick { session_id: SessionId, epoch: u64 },
    /// Snapshot request from the status surface.
    Status {
        reply: oneshot::Sender<StatusReport>,
    },
    /// Stop all clocks and end the registry task.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Cloneable submission handle to the registry task.
#[derive(Clone)]
pub struct RegistryHandle {
    tx: mpsc::UnboundedSender<RegistryCommand>,
}

impl RegistryHandle {
    pub fn connect(&self, client_id: ClientId, addr: SocketAddr, sink: Box<dyn MessageSink>) {
        let _ = self.tx.send(RegistryCommand::Connect {
            client_id,
            addr,
            sink,
        });
    }

    pub fn disconnect(&self, client_id: ClientId) {
        let _ = self.tx.send(RegistryCommand::Disconnect { client_id });
    }

    pub fn request(&self, client_id: ClientId, request: ClientRequest) {
        let _ = self.tx.send(RegistryCommand::Request { client_id, request });
    }

    /// Fetches a status snapshot. Returns `None` if the registry task is gone.
    pub async fn status(&self) -> Option<StatusReport> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::Status { reply }).ok()?;
        rx.await.ok()
    }

    /// Stops every session clock and ends the registry task, waiting until
    /// it has acknowledged.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(RegistryCommand::Shutdown { reply }).is_ok() {
            let _ = rx.await;
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Owns the session map and the client map; mediates every session
/// operation.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    clients: HashMap<ClientId, ClientConnection>,
    /// Sender side of the command queue, cloned into each clock driver.
    commands: mpsc::UnboundedSender<RegistryCommand>,
    /// Monotonic counter distinguishing clock incarnations per start.
    next_epoch: u64,
}

impl SessionRegistry {
    /// Creates the registry together with the receiving end of its command
    /// queue (drained by [`run_registry`]).
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RegistryCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Self {
            sessions: HashMap::new(),
            clients: HashMap::new(),
            commands: tx,
            next_epoch: 0,
        };
        (registry, rx)
    }

    /// A handle for submitting commands to this registry's queue.
    pub fn handle(&self) -> RegistryHandle {
        RegistryHandle {
            tx: self.commands.clone(),
        }
    }

    // ── Connection lifecycle ──────────────────────────────────────────────────

    /// Registers a new connection and greets it.
    pub fn handle_connect(&mut self, client_id: ClientId, addr: SocketAddr, sink: Box<dyn MessageSink>) {
        info!(client = %client_id, %addr, "client connected");
        self.clients
            .insert(client_id, ClientConnection::new(client_id, addr, sink));
        self.send_to(
            client_id,
            ServerMessage::Welcome {
                message: "Connected to Timecode-Over-IP Server".to_string(),
                supported_framerates: FrameRate::supported_labels(),
            },
        );
    }

    /// Removes a connection, implicitly leaving its session.
    pub fn handle_disconnect(&mut self, client_id: ClientId) {
        let Some(client) = self.clients.remove(&client_id) else {
            return;
        };
        if let Some(session_id) = client.session_id {
            self.remove_subscriber(session_id, client_id);
        }
        info!(client = %client_id, "client disconnected");
    }

    // ── Request dispatch ──────────────────────────────────────────────────────

    /// Applies one client request, replying with an `error` message on
    /// failure.
    pub fn handle_request(&mut self, client_id: ClientId, request: ClientRequest) {
        let result = match request {
            ClientRequest::CreateSession {
                framerate,
                initial_timecode,
            } => self.create_session(client_id, &framerate, &initial_timecode),
            ClientRequest::JoinSession { session_id } => {
                self.join_session(client_id, &session_id)
            }
            ClientRequest::LeaveSession => {
                self.leave_session(client_id);
                Ok(())
            }
            ClientRequest::StartTimecode => self.start_clock(client_id),
            ClientRequest::StopTimecode => self.stop_clock(client_id),
            ClientRequest::ResetTimecode { timecode } => {
                self.reset_clock(client_id, &timecode)
            }
        };

        if let Err(e) = result {
            self.send_to(client_id, ServerMessage::error(e.to_string()));
        }
    }

    // ── Session operations ────────────────────────────────────────────────────

    fn create_session(
        &mut self,
        client_id: ClientId,
        framerate: &str,
        initial_timecode: &str,
    ) -> Result<(), RegistryError> {
        let framerate: FrameRate = framerate
            .parse()
            .map_err(|_| RegistryError::UnsupportedFramerate)?;
        let timecode: Timecode = initial_timecode
            .parse()
            .map_err(RegistryError::MalformedTimecode)?;

        // A client is in at most one session; creating implies leaving.
        self.leave_session(client_id);

        let session_id = Uuid::new_v4();
        let session = Session::new(session_id, framerate, timecode, client_id);
        self.sessions.insert(session_id, session);
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.session_id = Some(session_id);
        }

        self.send_to(
            client_id,
            ServerMessage::SessionCreated {
                session_id: session_id.to_string(),
                framerate: framerate.label().to_string(),
                initial_timecode: timecode.to_string(),
            },
        );
        info!(session = %session_id, %framerate, "session created");
        Ok(())
    }

    fn join_session(&mut self, client_id: ClientId, session_id: &str) -> Result<(), RegistryError> {
        let session_id: SessionId = session_id
            .parse()
            .map_err(|_| RegistryError::SessionNotFound)?;
        if !self.sessions.contains_key(&session_id) {
            return Err(RegistryError::SessionNotFound);
        }

        // Re-joining the current session would otherwise leave first and
        // destroy a solo session out from under the requester.
        let already_member = self
            .clients
            .get(&client_id)
            .is_some_and(|c| c.session_id == Some(session_id));
        if !already_member {
            self.leave_session(client_id);
            if let Some(session) = self.sessions.get_mut(&session_id) {
                session.add_subscriber(client_id);
            }
            if let Some(client) = self.clients.get_mut(&client_id) {
                client.session_id = Some(session_id);
            }
        }

        let session = self
            .sessions
            .get(&session_id)
            .ok_or(RegistryError::SessionNotFound)?;
        let reply = ServerMessage::SessionJoined {
            session_id: session_id.to_string(),
            framerate: session.framerate.label().to_string(),
            current_timecode: session.timecode.to_string(),
            running: session.running,
        };
        self.send_to(client_id, reply);
        info!(client = %client_id, session = %session_id, "client joined session");
        Ok(())
    }

    /// Leaves the current session, if any. Removing the last subscriber
    /// stops the clock and deletes the session in the same step, so an
    /// empty session can never outlive the leave that emptied it.
    fn leave_session(&mut self, client_id: ClientId) {
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };
        let Some(session_id) = client.session_id.take() else {
            return;
        };
        self.remove_subscriber(session_id, client_id);
    }

    fn start_clock(&mut self, client_id: ClientId) -> Result<(), RegistryError> {
        let session_id = self.current_session_id(client_id)?;

        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let commands = self.commands.clone();

        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(RegistryError::SessionNotFound)?;
        if session.running {
            return Err(RegistryError::AlreadyRunning);
        }

        session.clock = Some(spawn_clock(
            session_id,
            epoch,
            session.framerate.frame_interval(),
            commands,
        ));
        session.running = true;

        let started = ServerMessage::TimecodeStarted {
            timecode: session.timecode.to_string(),
        };
        self.broadcast_to_session(session_id, &started);
        info!(session = %session_id, "timecode started");
        Ok(())
    }

    fn stop_clock(&mut self, client_id: ClientId) -> Result<(), RegistryError> {
        let session_id = self.current_session_id(client_id)?;
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(RegistryError::SessionNotFound)?;
        if !session.running {
            return Err(RegistryError::NotRunning);
        }

        if let Some(clock) = session.clock.take() {
            clock.stop();
        }
        session.running = false;

        let stopped = ServerMessage::TimecodeStopped {
            timecode: session.timecode.to_string(),
        };
        self.broadcast_to_session(session_id, &stopped);
        info!(session = %session_id, "timecode stopped");
        Ok(())
    }

    fn reset_clock(&mut self, client_id: ClientId, timecode: &str) -> Result<(), RegistryError> {
        let session_id = self.current_session_id(client_id)?;
        let timecode: Timecode = timecode.parse().map_err(RegistryError::MalformedTimecode)?;

        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(RegistryError::SessionNotFound)?;
        // Replacement is valid in both states; a running clock simply keeps
        // ticking from the new value.
        session.timecode = timecode;

        let reset = ServerMessage::TimecodeReset {
            timecode: timecode.to_string(),
        };
        self.broadcast_to_session(session_id, &reset);
        info!(session = %session_id, %timecode, "timecode reset");
        Ok(())
    }

    // ── Clock ticks ───────────────────────────────────────────────────────────

    /// Applies one frame advance, provided the tick belongs to the session's
    /// current clock incarnation. A tick queued before a stop carries a
    /// stale epoch and is discarded here, so state can never move after the
    /// stop was applied.
    pub fn handle_tick(&mut self, session_id: SessionId, epoch: u64) {
        let timecode = {
            let Some(session) = self.sessions.get_mut(&session_id) else {
                return;
            };
            if !session.running {
                return;
            }
            let current_epoch = session.clock.as_ref().map(|c| c.epoch());
            if current_epoch != Some(epoch) {
                return;
            }
            session.timecode.increment(session.framerate.max_frames());
            session.timecode.to_string()
        };

        self.broadcast_to_session(session_id, &ServerMessage::TimecodeUpdate { timecode });
    }

    // ── Status ────────────────────────────────────────────────────────────────

    /// Snapshot of the whole registry for the status surface.
    pub fn status(&self, listen_addr: SocketAddr) -> StatusReport {
        let sessions = self
            .sessions
            .values()
            .map(|session| SessionStatus {
                id: session.id.to_string(),
                framerate: session.framerate.label().to_string(),
                timecode: session.timecode.to_string(),
                running: session.running,
                client_count: session.subscribers.len(),
                created_at: session.created_at,
            })
            .collect();

        StatusReport {
            host: listen_addr.ip().to_string(),
            port: listen_addr.port(),
            active_sessions: self.sessions.len(),
            connected_clients: self.clients.len(),
            sessions,
        }
    }

    /// Stops every clock; used on server shutdown.
    pub fn shutdown(&mut self) {
        for session in self.sessions.values_mut() {
            if let Some(clock) = session.clock.take() {
                clock.stop();
            }
            session.running = false;
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn current_session_id(&self, client_id: ClientId) -> Result<SessionId, RegistryError> {
        self.clients
            .get(&client_id)
            .and_then(|c| c.session_id)
            .ok_or(RegistryError::NotInSession)
    }

    /// Removes a subscriber; deletes the session when it empties.
    fn remove_subscriber(&mut self, session_id: SessionId, client_id: ClientId) {
        let now_empty = match self.sessions.get_mut(&session_id) {
            Some(session) => {
                session.remove_subscriber(client_id);
                session.is_empty()
            }
            None => false,
        };

        if now_empty {
            if let Some(mut session) = self.sessions.remove(&session_id) {
                if let Some(clock) = session.clock.take() {
                    clock.stop();
                }
                info!(session = %session_id, "session cleaned up, no subscribers remaining");
            }
        }
    }

    /// Sends a message to one client; a dead sink triggers its disconnect.
    fn send_to(&mut self, client_id: ClientId, msg: ServerMessage) {
        let delivered = match self.clients.get(&client_id) {
            Some(client) => client.sink.deliver(msg),
            None => return,
        };
        if delivered.is_err() {
            warn!(client = %client_id, "send failed, disconnecting client");
            self.handle_disconnect(client_id);
        }
    }

    /// Broadcasts to the session's current subscriber set and disconnects
    /// every client whose delivery failed.
    fn broadcast_to_session(&mut self, session_id: SessionId, msg: &ServerMessage) {
        let failed = match self.sessions.get(&session_id) {
            Some(session) => broadcast(&session.subscribers, &self.clients, msg),
            None => return,
        };
        for client_id in failed {
            warn!(client = %client_id, "delivery failed, disconnecting client");
            self.handle_disconnect(client_id);
        }
    }
}

// ── Registry task ─────────────────────────────────────────────────────────────

/// Drains the command queue until shutdown. This is the single place where
/// registry state is touched.
pub async fn run_registry(
    mut registry: SessionRegistry,
    mut commands: mpsc::UnboundedReceiver<RegistryCommand>,
    listen_addr: SocketAddr,
) {
    while let Some(command) = commands.recv().await {
        match command {
            RegistryCommand::Connect {
                client_id,
                addr,
                sink,
            } => registry.handle_connect(client_id, addr, sink),
            RegistryCommand::Disconnect { client_id } => registry.handle_disconnect(client_id),
            RegistryCommand::Request { client_id, request } => {
                registry.handle_request(client_id, request)
            }
            RegistryCommand::Tick { session_id, epoch } => {
                registry.handle_tick(session_id, epoch)
            }
            RegistryCommand::Status { reply } => {
                let _ = reply.send(registry.status(listen_addr));
            }
            RegistryCommand::Shutdown { reply } => {
                registry.shutdown();
                let _ = reply.send(());
                break;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
