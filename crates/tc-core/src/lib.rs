//! # tc-core
//!
//! Shared library for Timecode-Over-IP containing the timecode domain types
//! and the JSON wire protocol.
//!
//! This crate is used by both the server and the terminal client. It has
//! zero dependencies on network sockets or the async runtime.
//!
//! It defines:
//!
//! - **`timecode`** – The `Timecode` value type: `HH:MM:SS:FF` with
//!   framerate-aware increment/rollover and canonical string conversion.
//!
//! - **`framerate`** – The closed `FrameRate` enumeration over the supported
//!   professional video rates, with the per-rate frame-rollover threshold
//!   and tick interval.
//!
//! - **`protocol`** – The newline-delimited JSON messages exchanged between
//!   clients and the server, plus the framing codec.

pub mod framerate;
pub mod protocol;
pub mod timecode;

// Re-export the most-used types at the crate root so callers can write
// `tc_core::Timecode` instead of `tc_core::timecode::Timecode`.
pub use framerate::{FrameRate, UnsupportedFramerate};
pub use protocol::{
    decode_message, decode_request, encode_message, encode_request, ClientRequest, ServerMessage,
    WireError,
};
pub use timecode::{Timecode, TimecodeError};
