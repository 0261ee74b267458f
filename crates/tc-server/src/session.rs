//! Session state: one shared timecode counter and its subscriber set.
//!
//! A `Session` is reachable only through the registry's session map; the
//! registry exclusively owns it and serializes every mutation. Subscribers
//! are tracked by client id — the session never owns connections, it only
//! references them, so removing a connection can never dangle.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tc_core::{FrameRate, Timecode};
use uuid::Uuid;

use crate::clock::ClockHandle;

/// Identifies a session for its whole lifetime.
pub type SessionId = Uuid;

/// Identifies a client connection for its whole lifetime.
pub type ClientId = Uuid;

/// A timecode session shared by a group of subscribed clients.
///
/// Invariants, maintained by the registry:
/// - `running == true` iff `clock` holds a live driver handle.
/// - `subscribers` is never empty while the session exists; the registry
///   destroys the session the moment the last subscriber is removed.
pub struct Session {
    pub id: SessionId,
    pub framerate: FrameRate,
    pub timecode: Timecode,
    pub running: bool,
    pub subscribers: HashSet<ClientId>,
    pub created_by: ClientId,
    pub created_at: DateTime<Utc>,
    /// Handle to the active tick driver, present only while running.
    pub clock: Option<ClockHandle>,
}

impl Session {
    /// Creates a stopped session with the creator as its first subscriber.
    pub fn new(
        id: SessionId,
        framerate: FrameRate,
        timecode: Timecode,
        created_by: ClientId,
    ) -> Self {
        Self {
            id,
            framerate,
            timecode,
            running: false,
            subscribers: HashSet::from([created_by]),
            created_by,
            created_at: Utc::now(),
            clock: None,
        }
    }

    pub fn add_subscriber(&mut self, client_id: ClientId) {
        self.subscribers.insert(client_id);
    }

    pub fn remove_subscriber(&mut self, client_id: ClientId) {
        self.subscribers.remove(&client_id);
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
