//! Terminal rendering of server messages and the local session view.
//!
//! Pure functions only: each server message is folded into the local
//! [`SessionView`] and turned into the text to print. `main.rs` owns the
//! actual stdout.

use tc_core::ServerMessage;

use crate::commands::HELP_TEXT;

/// What this client knows about the session it is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: String,
    pub framerate: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Creator,
    Participant,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Participant => "participant",
        }
    }
}

/// Applies one server message to the local view and returns the text to
/// print.
///
/// Timecode updates are prefixed with `\r` and carry no trailing newline so
/// the running counter overwrites itself in place; everything else starts
/// on a fresh line.
pub fn handle_server_message(msg: &ServerMessage, session: &mut Option<SessionView>) -> String {
    match msg {
        ServerMessage::Welcome {
            message,
            supported_framerates,
        } => format!(
            "\n{message}\nSupported framerates: {}\n\n{HELP_TEXT}\n",
            supported_framerates.join(", ")
        ),

        ServerMessage::SessionCreated {
            session_id,
            framerate,
            initial_timecode,
        } => {
            *session = Some(SessionView {
                id: session_id.clone(),
                framerate: framerate.clone(),
                role: Role::Creator,
            });
            format!(
                "\nSession created: {session_id}\nFramerate: {framerate} fps\nInitial timecode: {initial_timecode}\n"
            )
        }

        ServerMessage::SessionJoined {
            session_id,
            framerate,
            current_timecode,
            running,
        } => {
            *session = Some(SessionView {
                id: session_id.clone(),
                framerate: framerate.clone(),
                role: Role::Participant,
            });
            let state = if *running { "Running" } else { "Stopped" };
            format!(
                "\nJoined session: {session_id}\nFramerate: {framerate} fps\nCurrent timecode: {current_timecode}\nStatus: {state}\n"
            )
        }

        ServerMessage::TimecodeUpdate { timecode } => {
            let framerate = session
                .as_ref()
                .map(|s| s.framerate.as_str())
                .unwrap_or("");
            format!("\r{timecode} ({framerate} fps)")
        }

        ServerMessage::TimecodeStarted { timecode } => {
            format!("\nTimecode started: {timecode}\n")
        }
        ServerMessage::TimecodeStopped { timecode } => {
            format!("\nTimecode stopped: {timecode}\n")
        }
        ServerMessage::TimecodeReset { timecode } => {
            format!("\nTimecode reset to: {timecode}\n")
        }

        ServerMessage::Error { message } => format!("\nError: {message}\n"),
    }
}

/// The text printed by the local `status` command.
pub fn status_text(session: Option<&SessionView>, connected: bool) -> String {
    let mut out = match session {
        Some(s) => format!(
            "\nCurrent session: {}\nFramerate: {} fps\nRole: {}\n",
            s.id,
            s.framerate,
            s.role.label()
        ),
        None => "\nNot in a session\n".to_string(),
    };
    out.push_str(&format!("Connected: {connected}\n"));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
