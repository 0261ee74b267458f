//! Line-oriented JSON framing for the wire protocol.
//!
//! Wire format, both directions: one UTF-8 JSON object per line, terminated
//! by `\n`. Decoding distinguishes three failure classes so the server can
//! answer with the right protocol error while keeping the connection open:
//!
//! - the line is not valid JSON at all ([`WireError::InvalidJson`]),
//! - the `type` tag is missing or not a known command
//!   ([`WireError::UnknownCommand`]),
//! - the tag is known but a field has the wrong shape
//!   ([`WireError::InvalidPayload`]).

use thiserror::Error;

use crate::protocol::messages::{ClientRequest, ServerMessage};

/// The `type` tags of every client command.
///
/// Kept in sync with [`ClientRequest`] by
/// `test_command_types_match_request_variants` below.
const COMMAND_TYPES: [&str; 6] = [
    "create_session",
    "join_session",
    "leave_session",
    "start_timecode",
    "stop_timecode",
    "reset_timecode",
];

/// Errors produced while framing or unframing protocol lines.
#[derive(Debug, Error)]
pub enum WireError {
    /// The line was not a valid JSON document.
    #[error("invalid JSON message: {0}")]
    InvalidJson(serde_json::Error),

    /// The JSON object had no `type` field, or a `type` outside the command set.
    #[error("unknown command")]
    UnknownCommand,

    /// A known command carried a field of the wrong shape.
    #[error("malformed {command} payload: {source}")]
    InvalidPayload {
        command: &'static str,
        source: serde_json::Error,
    },

    /// An outbound message could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialize(serde_json::Error),
}

/// Decodes one protocol line into a [`ClientRequest`].
///
/// # Errors
///
/// Returns [`WireError`] classifying the failure; see the module docs.
pub fn decode_request(line: &str) -> Result<ClientRequest, WireError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(WireError::InvalidJson)?;

    let command = value
        .get("type")
        .and_then(|t| t.as_str())
        .and_then(|t| COMMAND_TYPES.iter().copied().find(|known| *known == t))
        .ok_or(WireError::UnknownCommand)?;

    serde_json::from_value(value)
        .map_err(|source| WireError::InvalidPayload { command, source })
}

/// Encodes a [`ServerMessage`] as one newline-terminated protocol line.
///
/// # Errors
///
/// Returns [`WireError::Serialize`] if serialization fails.
pub fn encode_message(msg: &ServerMessage) -> Result<String, WireError> {
    let mut line = serde_json::to_string(msg).map_err(WireError::Serialize)?;
    line.push('\n');
    Ok(line)
}

/// Encodes a [`ClientRequest`] as one newline-terminated protocol line
/// (the client-side counterpart of [`encode_message`]).
///
/// # Errors
///
/// Returns [`WireError::Serialize`] if serialization fails.
pub fn encode_request(request: &ClientRequest) -> Result<String, WireError> {
    let mut line = serde_json::to_string(request).map_err(WireError::Serialize)?;
    line.push('\n');
    Ok(line)
}

/// Decodes one protocol line into a [`ServerMessage`] (the client-side
/// counterpart of [`decode_request`]).
///
/// # Errors
///
/// Returns [`WireError::InvalidJson`] when the line is not valid JSON and
/// [`WireError::UnknownCommand`] when it is not a known server message.
pub fn decode_message(line: &str) -> Result<ServerMessage, WireError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(WireError::InvalidJson)?;
    serde_json::from_value(value).map_err(|_| WireError::UnknownCommand)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
