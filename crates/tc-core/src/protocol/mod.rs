//! The client/server wire protocol: message types and line framing.

pub mod framing;
pub mod messages;

pub use framing::{decode_message, decode_request, encode_message, encode_request, WireError};
pub use messages::{ClientRequest, ServerMessage};
