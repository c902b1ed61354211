// TestPath - JDB-driven test path analyzer
// Copyright (C) 2026 TestPath contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Timeout supervision for analyzer sessions.
//!
//! Each session registers a [`TimeoutHandle`]: a watchdog thread that fires
//! its callback once when the deadline passes, unless cancelled first. The
//! callback runs concurrently with the session's main loop, so everything it
//! touches is guarded by the shared shutdown lock the analyzer hands into
//! it.
//!
//! Separately, a process-wide timeout flag tells callers driving a batch of
//! sessions whether the last session timed out: it is set at session start
//! and cleared again at every clean session end, so it stays raised exactly
//! when a session was cut short.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

/// Default wall-clock bound on one `analyze()` call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

static TIMED_OUT: AtomicBool = AtomicBool::new(false);

/// Whether the process-wide timeout flag is raised.
pub fn check_timeout() -> bool {
    TIMED_OUT.load(Ordering::SeqCst)
}

/// Raise the process-wide timeout flag. Called at session start; a clean
/// session end lowers it again via [`disable_timeout`].
pub fn enable_timeout() {
    TIMED_OUT.store(true, Ordering::SeqCst);
}

/// Lower the process-wide timeout flag.
pub fn disable_timeout() {
    TIMED_OUT.store(false, Ordering::SeqCst);
}

struct WatchState {
    cancelled: Mutex<bool>,
    signal: Condvar,
    fired: AtomicBool,
}

/// Registration of a single deadline-triggered callback.
///
/// The callback fires at most once. Cancellation is idempotent, and
/// cancelling after the deadline fired is a no-op.
pub struct TimeoutHandle {
    state: Arc<WatchState>,
    watcher: Option<JoinHandle<()>>,
}

impl TimeoutHandle {
    /// Arm a watchdog that runs `callback` once `timeout` elapses.
    pub fn register<F>(timeout: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(WatchState {
            cancelled: Mutex::new(false),
            signal: Condvar::new(),
            fired: AtomicBool::new(false),
        });

        let watch = Arc::clone(&state);
        let watcher = std::thread::spawn(move || {
            let deadline = Instant::now() + timeout;
            let mut cancelled = watch.cancelled.lock();
            while !*cancelled {
                if watch.signal.wait_until(&mut cancelled, deadline).timed_out() {
                    break;
                }
            }
            if *cancelled {
                return;
            }
            drop(cancelled);

            warn!("analysis timeout of {timeout:?} expired, aborting session");
            watch.fired.store(true, Ordering::SeqCst);
            callback();
        });

        Self { state, watcher: Some(watcher) }
    }

    /// Whether the deadline passed and the callback ran.
    pub fn fired(&self) -> bool {
        self.state.fired.load(Ordering::SeqCst)
    }

    /// Cancel the watchdog. Idempotent; a no-op once the callback fired.
    pub fn cancel(&mut self) {
        {
            let mut cancelled = self.state.cancelled.lock();
            *cancelled = true;
            self.state.signal.notify_all();
        }
        if let Some(watcher) = self.watcher.take() {
            if watcher.join().is_err() {
                debug!("timeout watcher panicked during shutdown");
            }
        }
    }
}

impl Drop for TimeoutHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TimeoutHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutHandle").field("fired", &self.fired()).finish_non_exhaustive()
    }
}
