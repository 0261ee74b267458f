//! # tc-client
//!
//! Interactive terminal client for Timecode-Over-IP. The library half holds
//! the pure pieces — command parsing and message rendering — so they stay
//! unit-testable; `main.rs` wires them to the socket and the terminal.

pub mod commands;
pub mod ui;
