//! # tc-server
//!
//! The Timecode-Over-IP session server: accepts TCP clients speaking the
//! newline-delimited JSON protocol from `tc-core`, manages concurrent
//! timecode sessions, and fans out clock ticks to every subscriber.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Server::bind()         -- TCP listener + registry task
//!       ├─ accept loop       -- one reader loop + writer task per client
//!       ├─ SessionRegistry   -- single-task owner of sessions/clients
//!       │    ├─ clock driver -- one cancellable tick task per running session
//!       │    └─ broadcaster  -- per-subscriber fan-out, failure-isolated
//!       └─ status reporter   -- periodic summary log line
//! ```

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod net;
pub mod registry;
pub mod session;
pub mod status;
