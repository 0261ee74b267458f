//! Parses interactive input lines into protocol requests.
//!
//! The parser is pure: it maps a line of user input to either a wire
//! request, a local action (status/help/quit), or a usage error. Network
//! I/O stays in `main.rs`, which keeps every command form unit-testable.

use tc_core::ClientRequest;
use thiserror::Error;

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A request to forward to the server.
    Request(ClientRequest),
    /// Print the local session status.
    Status,
    /// Print the command overview.
    Help,
    /// Disconnect and exit.
    Quit,
}

/// The input line could not be turned into a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: create <framerate> [timecode]")]
    CreateUsage,

    #[error("Usage: join <session_id>")]
    JoinUsage,

    #[error("Unknown command. Type 'help' for available commands.")]
    Unknown,
}

/// Parses one input line.
///
/// # Errors
///
/// Returns [`CommandError`] with a user-facing usage message when the line
/// names a known command with missing arguments, or is no command at all.
pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some(command) = parts.first() else {
        return Err(CommandError::Unknown);
    };

    match command.to_ascii_lowercase().as_str() {
        "create" => {
            let framerate = parts.get(1).ok_or(CommandError::CreateUsage)?;
            let initial_timecode = parts.get(2).unwrap_or(&"00:00:00:00");
            Ok(Command::Request(ClientRequest::CreateSession {
                framerate: framerate.to_string(),
                initial_timecode: initial_timecode.to_string(),
            }))
        }
        "join" => {
            let session_id = parts.get(1).ok_or(CommandError::JoinUsage)?;
            Ok(Command::Request(ClientRequest::JoinSession {
                session_id: session_id.to_string(),
            }))
        }
        "leave" => Ok(Command::Request(ClientRequest::LeaveSession)),
        "start" => Ok(Command::Request(ClientRequest::StartTimecode)),
        "stop" => Ok(Command::Request(ClientRequest::StopTimecode)),
        "reset" => {
            let timecode = parts.get(1).unwrap_or(&"00:00:00:00");
            Ok(Command::Request(ClientRequest::ResetTimecode {
                timecode: timecode.to_string(),
            }))
        }
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown),
    }
}

/// The command overview printed by `help` and after the welcome message.
pub const HELP_TEXT: &str = "\
Available commands:
  create <framerate> [timecode]  - Create a new session
  join <session_id>              - Join an existing session
  leave                          - Leave current session
  start                          - Start timecode in current session
  stop                           - Stop timecode in current session
  reset [timecode]               - Reset timecode (default: 00:00:00:00)
  status                         - Show current status
  help                           - Show this help
  quit/exit                      - Disconnect and exit

Framerate examples: 24, 29.97, 30, 59.94, 60
Timecode format: HH:MM:SS:FF (e.g., 01:30:45:12)";

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_framerate_and_timecode() {
        let cmd = parse_command("create 29.97 01:00:00:00").unwrap();
        assert_eq!(
            cmd,
            Command::Request(ClientRequest::CreateSession {
                framerate: "29.97".to_string(),
                initial_timecode: "01:00:00:00".to_string(),
            })
        );
    }

    #[test]
    fn test_create_defaults_timecode_to_zero() {
        let cmd = parse_command("create 30").unwrap();
        assert_eq!(
            cmd,
            Command::Request(ClientRequest::CreateSession {
                framerate: "30".to_string(),
                initial_timecode: "00:00:00:00".to_string(),
            })
        );
    }

    #[test]
    fn test_create_without_framerate_reports_usage() {
        assert_eq!(parse_command("create"), Err(CommandError::CreateUsage));
    }

    #[test]
    fn test_join_requires_session_id() {
        assert_eq!(parse_command("join"), Err(CommandError::JoinUsage));
        assert_eq!(
            parse_command("join abc-123").unwrap(),
            Command::Request(ClientRequest::JoinSession {
                session_id: "abc-123".to_string(),
            })
        );
    }

    #[test]
    fn test_bare_commands_map_to_requests() {
        assert_eq!(
            parse_command("leave").unwrap(),
            Command::Request(ClientRequest::LeaveSession)
        );
        assert_eq!(
            parse_command("start").unwrap(),
            Command::Request(ClientRequest::StartTimecode)
        );
        assert_eq!(
            parse_command("stop").unwrap(),
            Command::Request(ClientRequest::StopTimecode)
        );
    }

    #[test]
    fn test_reset_accepts_optional_timecode() {
        assert_eq!(
            parse_command("reset").unwrap(),
            Command::Request(ClientRequest::ResetTimecode {
                timecode: "00:00:00:00".to_string(),
            })
        );
        assert_eq!(
            parse_command("reset 00:10:00:00").unwrap(),
            Command::Request(ClientRequest::ResetTimecode {
                timecode: "00:10:00:00".to_string(),
            })
        );
    }

    #[test]
    fn test_local_commands() {
        assert_eq!(parse_command("status").unwrap(), Command::Status);
        assert_eq!(parse_command("help").unwrap(), Command::Help);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        assert_eq!(parse_command("START").unwrap(), Command::Request(ClientRequest::StartTimecode));
        assert_eq!(parse_command("Quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_unknown_and_empty_input_are_rejected() {
        assert_eq!(parse_command("launch"), Err(CommandError::Unknown));
        assert_eq!(parse_command(""), Err(CommandError::Unknown));
        assert_eq!(parse_command("   "), Err(CommandError::Unknown));
    }

    #[test]
    fn test_extra_whitespace_is_tolerated() {
        let cmd = parse_command("  create   24  ").unwrap();
        assert!(matches!(
            cmd,
            Command::Request(ClientRequest::CreateSession { framerate, .. }) if framerate == "24"
        ));
    }
}
