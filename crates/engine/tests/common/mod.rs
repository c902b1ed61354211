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

//! Scripted in-memory debugger driver shared by the integration tests.

// not every test binary uses every helper
#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use eyre::{bail, Result};
use parking_lot::Mutex;
use testpath_engine::{DebuggerDriver, KillSwitch};

/// Driver replaying a fixed script of output lines.
///
/// Commands are recorded instead of executed. An exhausted script behaves
/// like a closed output stream, unless the driver was built with
/// [`FakeDriver::stalling`], in which case reads block until the kill switch
/// fires, imitating a hung debuggee.
#[derive(Debug)]
pub struct FakeDriver {
    script: Arc<Mutex<VecDeque<String>>>,
    /// Lines released only once the kill switch has fired, imitating output
    /// still buffered in the pipe when the subprocess is terminated.
    after_kill: Arc<Mutex<VecDeque<String>>>,
    pub commands: Arc<Mutex<Vec<String>>>,
    pub killed: Arc<AtomicBool>,
    stall_when_empty: bool,
    started: bool,
}

impl FakeDriver {
    pub fn scripted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Arc::new(Mutex::new(lines.into_iter().map(Into::into).collect())),
            after_kill: Arc::new(Mutex::new(VecDeque::new())),
            commands: Arc::new(Mutex::new(Vec::new())),
            killed: Arc::new(AtomicBool::new(false)),
            stall_when_empty: false,
            started: false,
        }
    }

    pub fn stalling<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { stall_when_empty: true, ..Self::scripted(lines) }
    }

    /// A stalling driver that additionally releases `buffered` once the kill
    /// switch fires.
    pub fn gated<I, S>(lines: I, buffered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let driver = Self::stalling(lines);
        *driver.after_kill.lock() = buffered.into_iter().map(Into::into).collect();
        driver
    }
}

impl DebuggerDriver for FakeDriver {
    fn start(&mut self) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn send(&mut self, command: &str) -> Result<()> {
        if !self.started {
            bail!("driver not started");
        }
        self.commands.lock().push(command.to_string());
        Ok(())
    }

    fn is_ready(&mut self) -> bool {
        !self.script.lock().is_empty()
    }

    fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = self.script.lock().pop_front() {
                return Ok(line);
            }
            if self.killed.load(Ordering::SeqCst) {
                if let Some(line) = self.after_kill.lock().pop_front() {
                    return Ok(line);
                }
                bail!("Input stream closed");
            }
            if !self.stall_when_empty {
                bail!("Input stream closed");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn quit(&mut self) -> Result<()> {
        self.commands.lock().push("exit".to_string());
        Ok(())
    }

    fn force_quit(&mut self) -> Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn kill_switch(&self) -> KillSwitch {
        let killed = Arc::clone(&self.killed);
        KillSwitch::new(move || killed.store(true, Ordering::SeqCst))
    }
}

/// A `Step completed` descriptor line for `location` at `line`.
pub fn step_event(location: &str, line: usize) -> String {
    format!(r#"Step completed: "thread=main", {location}, line={line} bci=0"#)
}

/// A `Breakpoint hit` descriptor line for `location` at `line`.
pub fn breakpoint_event(location: &str, line: usize) -> String {
    format!(r#"Breakpoint hit: "thread=main", {location}, line={line} bci=0"#)
}
