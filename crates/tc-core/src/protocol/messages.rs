//! Wire message types for the client/server JSON protocol.
//!
//! Every message is one JSON object with a `"type"` field identifying the
//! variant; all other fields are flattened into the same object. Serde's
//! `#[serde(tag = "type")]` attribute handles this automatically:
//!
//! ```json
//! {"type":"create_session","framerate":"30","initial_timecode":"00:00:00:00"}
//! {"type":"timecode_update","timecode":"00:00:01:00"}
//! ```
//!
//! # Why separate request and server-message enums?
//!
//! The two directions carry different information: clients send session
//! commands, the server sends session state and timecode broadcasts. Two
//! distinct enums make it a compile-time error to send a server-only message
//! from a client, and vice versa.
//!
//! # Why are framerate and timecode fields plain strings?
//!
//! Validation belongs to the session registry, not the codec. Keeping the
//! fields as strings means `{"type":"create_session","framerate":"25"}`
//! decodes successfully and the registry answers with the protocol-level
//! `Unsupported framerate` error, rather than the transport rejecting the
//! whole line as malformed JSON. Missing fields default to values that fail
//! the same semantic checks, which is also how absent fields behave in the
//! protocol: an omitted `initial_timecode` means `"00:00:00:00"`.

use serde::{Deserialize, Serialize};

/// Default timecode value used when a request omits one.
fn default_timecode_field() -> String {
    "00:00:00:00".to_string()
}

// ── Client → Server ───────────────────────────────────────────────────────────

/// Commands a client may send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Create a new session and become its first subscriber.
    CreateSession {
        /// Canonical framerate label; validated by the registry.
        #[serde(default)]
        framerate: String,
        /// Starting counter value, `HH:MM:SS:FF`.
        #[serde(default = "default_timecode_field")]
        initial_timecode: String,
    },

    /// Join an existing session, implicitly leaving any current one.
    JoinSession {
        #[serde(default)]
        session_id: String,
    },

    /// Leave the current session (no-op when not in one).
    LeaveSession,

    /// Start the current session's clock.
    StartTimecode,

    /// Stop the current session's clock.
    StopTimecode,

    /// Replace the current session's counter value.
    ResetTimecode {
        #[serde(default = "default_timecode_field")]
        timecode: String,
    },
}

// ── Server → Client ───────────────────────────────────────────────────────────

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting sent once per connection, before any request is read.
    Welcome {
        message: String,
        supported_framerates: Vec<String>,
    },

    /// Reply to a successful `create_session`.
    SessionCreated {
        session_id: String,
        framerate: String,
        initial_timecode: String,
    },

    /// Reply to a successful `join_session`, carrying the live state.
    SessionJoined {
        session_id: String,
        framerate: String,
        current_timecode: String,
        running: bool,
    },

    /// Broadcast on every clock tick.
    TimecodeUpdate { timecode: String },

    /// Broadcast when the clock transitions to running.
    TimecodeStarted { timecode: String },

    /// Broadcast when the clock transitions to stopped.
    TimecodeStopped { timecode: String },

    /// Broadcast when the counter value is replaced.
    TimecodeReset { timecode: String },

    /// Per-client error reply; never terminates the connection.
    Error { message: String },
}

impl ServerMessage {
    /// Builds the standard error reply.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_deserializes_with_all_fields() {
        let json = r#"{"type":"create_session","framerate":"29.97","initial_timecode":"01:00:00:00"}"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            ClientRequest::CreateSession {
                framerate: "29.97".to_string(),
                initial_timecode: "01:00:00:00".to_string(),
            }
        );
    }

    #[test]
    fn test_create_session_initial_timecode_defaults_to_zero() {
        let json = r#"{"type":"create_session","framerate":"30"}"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            ClientRequest::CreateSession {
                framerate: "30".to_string(),
                initial_timecode: "00:00:00:00".to_string(),
            }
        );
    }

    #[test]
    fn test_create_session_missing_framerate_defaults_to_empty() {
        // The registry rejects the empty string as an unsupported framerate,
        // so an omitted field surfaces the right protocol error.
        let json = r#"{"type":"create_session"}"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req,
            ClientRequest::CreateSession { framerate, .. } if framerate.is_empty()
        ));
    }

    #[test]
    fn test_leave_session_is_a_bare_tag() {
        let req: ClientRequest = serde_json::from_str(r#"{"type":"leave_session"}"#).unwrap();
        assert_eq!(req, ClientRequest::LeaveSession);
    }

    #[test]
    fn test_reset_timecode_defaults_to_zero() {
        let req: ClientRequest = serde_json::from_str(r#"{"type":"reset_timecode"}"#).unwrap();
        assert_eq!(
            req,
            ClientRequest::ResetTimecode {
                timecode: "00:00:00:00".to_string(),
            }
        );
    }

    #[test]
    fn test_client_request_serializes_with_snake_case_tag() {
        let json = serde_json::to_string(&ClientRequest::StartTimecode).unwrap();
        assert_eq!(json, r#"{"type":"start_timecode"}"#);
    }

    #[test]
    fn test_timecode_update_serializes_expected_shape() {
        let msg = ServerMessage::TimecodeUpdate {
            timecode: "00:00:01:00".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"timecode_update","timecode":"00:00:01:00"}"#);
    }

    #[test]
    fn test_welcome_serializes_supported_framerates() {
        let msg = ServerMessage::Welcome {
            message: "hi".to_string(),
            supported_framerates: vec!["24".to_string(), "30".to_string()],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"welcome""#));
        assert!(json.contains(r#""supported_framerates":["24","30"]"#));
    }

    #[test]
    fn test_session_joined_round_trips() {
        let msg = ServerMessage::SessionJoined {
            session_id: "abc".to_string(),
            framerate: "59.94".to_string(),
            current_timecode: "00:10:00:00".to_string(),
            running: true,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_error_helper_builds_error_variant() {
        let msg = ServerMessage::error("Session not found");
        assert_eq!(
            msg,
            ServerMessage::Error {
                message: "Session not found".to_string(),
            }
        );
    }
}
