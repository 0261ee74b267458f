//! Per-session tick driver.
//!
//! Each running session has exactly one driver: a Tokio task that sleeps one
//! frame interval, then submits a [`RegistryCommand::Tick`] to the registry
//! task. The driver never touches session state itself; increments and
//! broadcasts happen on the registry task, so a tick can never interleave
//! with another operation mid-update.
//!
//! Stopping is two-layered:
//!
//! - the task is aborted, so no further ticks are produced, and
//! - the registry discards any tick already queued before the stop, by
//!   comparing the tick's epoch against the session's current clock epoch.
//!
//! The sleep is wall-clock-relative (not absolute-deadline), so ticks drift
//! under scheduler jitter rather than bunching up to catch a missed
//! deadline.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::registry::RegistryCommand;
use crate::session::SessionId;

/// Handle to a session's running tick driver.
///
/// Dropping the handle aborts the driver, so a session that is destroyed
/// while running can never leave an orphaned task behind.
pub struct ClockHandle {
    epoch: u64,
    task: JoinHandle<()>,
}

impl ClockHandle {
    /// The epoch stamped on every tick this driver produces.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Stops the driver. No tick is produced after this returns.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the tick driver for a session.
///
/// The driver exits on its own if the registry side of the command channel
/// is gone.
pub fn spawn_clock(
    session_id: SessionId,
    epoch: u64,
    interval: Duration,
    commands: mpsc::UnboundedSender<RegistryCommand>,
) -> ClockHandle {
    let task = tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            if commands
                .send(RegistryCommand::Tick { session_id, epoch })
                .is_err()
            {
                break;
            }
        }
    });

    ClockHandle { epoch, task }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
