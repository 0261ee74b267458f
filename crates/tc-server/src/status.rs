//! Process status surface: on-demand snapshots and the periodic log line.
//!
//! The report is a plain serializable snapshot so an outer surface (an
//! admin endpoint, a health check) could expose it without reaching into
//! registry internals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::interval;
use tracing::info;

use crate::registry::RegistryHandle;

/// Per-session entry in a [`StatusReport`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub id: String,
    pub framerate: String,
    pub timecode: String,
    pub running: bool,
    pub client_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of the whole process, as returned by the status query.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub host: String,
    pub port: u16,
    pub active_sessions: usize,
    pub connected_clients: usize,
    pub sessions: Vec<SessionStatus>,
}

/// Periodically logs a one-line summary while the server is running.
///
/// Quiet when idle: nothing is logged unless at least one client or session
/// exists. Exits when the shutdown flag clears or the registry goes away.
pub async fn run_status_reporter(
    registry: RegistryHandle,
    period: Duration,
    running: Arc<AtomicBool>,
) {
    let mut ticker = interval(period);
    // The first tick of a Tokio interval resolves immediately; skip it so
    // the first report comes one full period after startup.
    ticker.tick().await;

    while running.load(Ordering::Relaxed) {
        ticker.tick().await;

        let Some(report) = registry.status().await else {
            break;
        };
        if report.active_sessions > 0 || report.connected_clients > 0 {
            info!(
                clients = report.connected_clients,
                sessions = report.active_sessions,
                "status"
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
