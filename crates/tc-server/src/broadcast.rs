//! Fan-out delivery to a session's subscribers.
//!
//! Delivery goes through the [`MessageSink`] trait so the registry can be
//! exercised in tests with recording or failing sinks. The production sink
//! is a non-blocking send into the connection's writer-task channel, so a
//! slow socket never stalls the registry.
//!
//! Failure isolation: a sink that fails marks only that client for the
//! disconnect path. The failure list is returned to the caller and handled
//! after the iteration completes, so removing a dead client can never
//! invalidate the subscriber set being walked, and no failure is ever
//! surfaced to the caller as an error.

use std::collections::{HashMap, HashSet};

use tc_core::ServerMessage;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::registry::ClientConnection;
use crate::session::ClientId;

/// A client's outbound channel could not accept the message.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("client outbound channel closed")]
pub struct DeliveryError;

/// Outbound message channel of one client connection.
pub trait MessageSink: Send {
    /// Queues a message for delivery to the client.
    fn deliver(&self, msg: ServerMessage) -> Result<(), DeliveryError>;
}

/// Production sink: hands the message to the connection's writer task.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { tx }
    }
}

impl MessageSink for ChannelSink {
    fn deliver(&self, msg: ServerMessage) -> Result<(), DeliveryError> {
        self.tx.send(msg).map_err(|_| DeliveryError)
    }
}

/// Delivers `msg` to every subscriber, returning the clients whose delivery
/// failed so the caller can run their disconnect path.
pub fn broadcast(
    subscribers: &HashSet<ClientId>,
    clients: &HashMap<ClientId, ClientConnection>,
    msg: &ServerMessage,
) -> Vec<ClientId> {
    let mut failed = Vec::new();

    for client_id in subscribers {
        let Some(client) = clients.get(client_id) else {
            // Subscriber without a live connection record; nothing to deliver
            // to, and nothing to clean up here.
            continue;
        };
        if client.sink.deliver(msg.clone()).is_err() {
            debug!(client = %client_id, "delivery failed, scheduling disconnect");
            failed.push(*client_id);
        }
    }

    failed
}

// ── Tests ─────────────────────────────────────────────────────────────────────
