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

//! Debugger process interface.
//!
//! The analyzer drives the debugger synchronously through [`DebuggerDriver`]
//! and never looks past its textual protocol; the concrete JDB backend lives
//! in [`jdb`]. Tests drive the analyzer through a scripted in-memory
//! implementation of the same trait.

use std::{fmt, sync::Arc};

use eyre::Result;

pub mod jdb;

pub use jdb::{JdbConfig, JdbDriver};

/// Boundary to the external line-stepping debugger subprocess.
///
/// Reads block with an internal short retry while no output is available;
/// the hard session bound is the timeout supervisor's job, not the
/// driver's.
pub trait DebuggerDriver {
    /// Start the debugger subprocess attached to the test run.
    fn start(&mut self) -> Result<()>;

    /// Send one textual command (`stop at`, `run`, `step`, `next`, `cont`).
    fn send(&mut self, command: &str) -> Result<()>;

    /// Whether at least one output line is ready to be read.
    fn is_ready(&mut self) -> bool;

    /// Read one output line, blocking with a short bounded poll.
    fn read_line(&mut self) -> Result<String>;

    /// Graceful shutdown: exit command sequence, then wait for the process.
    fn quit(&mut self) -> Result<()>;

    /// Immediate, non-graceful termination. Used when the subprocess may be
    /// unresponsive.
    fn force_quit(&mut self) -> Result<()>;

    /// A cloneable handle that force-terminates the subprocess from another
    /// thread. Handed to the timeout supervisor at session start.
    fn kill_switch(&self) -> KillSwitch;
}

/// Thread-safe handle that force-terminates a debugger subprocess.
#[derive(Clone)]
pub struct KillSwitch(Arc<dyn Fn() + Send + Sync>);

impl KillSwitch {
    /// Wrap a termination action.
    pub fn new(action: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(action))
    }

    /// A handle that does nothing when fired.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Force-terminate the subprocess. Firing more than once is harmless.
    pub fn fire(&self) {
        (self.0)()
    }
}

impl fmt::Debug for KillSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KillSwitch").finish_non_exhaustive()
    }
}
