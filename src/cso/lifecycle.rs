//! Run lifecycle: state machine and cooperative pause/stop flags.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Granularity at which a paused run re-checks its flags.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Longest single wait while paused before the run loop re-enters.
pub const PAUSE_WAIT_LIMIT: Duration = Duration::from_millis(1000);

/// Lifecycle state of an optimizer.
///
/// `Init -> Running -> {Paused <-> Running} -> {Stopped | Completed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    /// No run has started, or the last one aborted with an error.
    #[default]
    Init,
    /// The competition loop is executing.
    Running,
    /// The loop is waiting for `resume` or `stop`.
    Paused,
    /// The run was stopped externally.
    Stopped,
    /// The stopping criterion ended the run.
    Completed,
}

impl RunState {
    /// Whether a run is in progress.
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

#[derive(Debug, Default)]
struct Flags {
    paused: bool,
    stopped: bool,
}

/// Pause and stop flags shared between the driver and controlling threads.
///
/// Setting a flag wakes a driver blocked in
/// [`wait_while_paused`](Self::wait_while_paused). All operations are
/// idempotent and never fail.
#[derive(Debug, Default)]
pub struct RunControl {
    flags: Mutex<Flags>,
    changed: Condvar,
}

impl RunControl {
    /// Creates a control block with both flags cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a pause.
    pub fn pause(&self) {
        self.flags.lock().paused = true;
        self.changed.notify_all();
    }

    /// Clears a pause request.
    pub fn resume(&self) {
        self.flags.lock().paused = false;
        self.changed.notify_all();
    }

    /// Requests a stop. Also clears any pause.
    pub fn stop(&self) {
        {
            let mut flags = self.flags.lock();
            flags.stopped = true;
            flags.paused = false;
        }
        self.changed.notify_all();
    }

    /// Whether a pause is requested.
    pub fn is_paused(&self) -> bool {
        self.flags.lock().paused
    }

    /// Whether a stop is requested.
    pub fn is_stopped(&self) -> bool {
        self.flags.lock().stopped
    }

    pub(crate) fn reset(&self) {
        let mut flags = self.flags.lock();
        flags.paused = false;
        flags.stopped = false;
    }

    /// Blocks while paused, for at most `limit`, re-checking every `poll`.
    ///
    /// Returns early as soon as the run is resumed or stopped. Returns
    /// whether the run is still paused.
    pub fn wait_while_paused(&self, limit: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + limit;
        let mut flags = self.flags.lock();
        while flags.paused && !flags.stopped {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            self.changed.wait_for(&mut flags, poll.min(deadline - now));
        }
        flags.paused && !flags.stopped
    }
}
