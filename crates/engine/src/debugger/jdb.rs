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

//! JDB subprocess backend.
//!
//! Launches `jdb` over the instrumented test classes with the JUnit runner
//! as the debuggee main class, pipes all stdio, and funnels stdout/stderr
//! lines through a channel so [`JdbDriver::read_line`] can poll with a short
//! bounded sleep.

use std::{
    collections::VecDeque,
    io::{BufRead, BufReader, Write},
    path::PathBuf,
    process::{Child, ChildStdin, Command, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::JoinHandle,
    time::Duration,
};

use eyre::{bail, eyre, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{DebuggerDriver, KillSwitch};

/// How long one poll waits before checking the channel again.
const READ_POLL: Duration = Duration::from_millis(100);

/// JUnit entry point used as the debuggee main class.
const JUNIT_RUNNER: &str = "org.junit.runner.JUnitCore";

/// Launch configuration for a JDB session.
#[derive(Debug, Clone)]
pub struct JdbConfig {
    /// Classpath entries for the instrumented test and target classes.
    pub class_path: Vec<PathBuf>,
    /// Source path entries for the (instrumented) sources.
    pub source_path: Vec<PathBuf>,
    /// Qualified name of the test class to run under the debugger.
    pub test_class: String,
    /// The `jdb` binary to launch.
    pub jdb_bin: String,
}

impl JdbConfig {
    /// Configuration for running `test_class` under JDB.
    pub fn new(test_class: impl Into<String>) -> Self {
        Self {
            class_path: Vec::new(),
            source_path: Vec::new(),
            test_class: test_class.into(),
            jdb_bin: "jdb".into(),
        }
    }

    /// Add a classpath entry.
    pub fn with_class_path(mut self, entry: impl Into<PathBuf>) -> Self {
        self.class_path.push(entry.into());
        self
    }

    /// Add a source path entry.
    pub fn with_source_path(mut self, entry: impl Into<PathBuf>) -> Self {
        self.source_path.push(entry.into());
        self
    }

    /// Override the `jdb` binary.
    pub fn with_jdb_bin(mut self, bin: impl Into<String>) -> Self {
        self.jdb_bin = bin.into();
        self
    }

    fn path_list(entries: &[PathBuf]) -> String {
        let separator = if cfg!(windows) { ";" } else { ":" };
        entries.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(separator)
    }
}

/// The concrete JDB subprocess driver.
#[derive(Debug)]
pub struct JdbDriver {
    config: JdbConfig,
    child: Arc<Mutex<Option<Child>>>,
    stdin: Option<ChildStdin>,
    output: Option<Receiver<String>>,
    pending: VecDeque<String>,
    readers: Vec<JoinHandle<()>>,
}

impl JdbDriver {
    /// Create an unstarted driver for the given launch configuration.
    pub fn new(config: JdbConfig) -> Self {
        Self {
            config,
            child: Arc::new(Mutex::new(None)),
            stdin: None,
            output: None,
            pending: VecDeque::new(),
            readers: Vec::new(),
        }
    }

    fn spawn_reader<R>(reader: R, tx: Sender<String>) -> JoinHandle<()>
    where
        R: std::io::Read + Send + 'static,
    {
        std::thread::spawn(move || {
            let buffered = BufReader::new(reader);
            for line in buffered.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        debug!("debugger output stream ended: {err}");
                        break;
                    }
                }
            }
        })
    }

    fn poll_pending(&mut self) {
        let Some(rx) = &self.output else {
            return;
        };
        while let Ok(line) = rx.try_recv() {
            self.pending.push_back(line);
        }
    }
}

impl DebuggerDriver for JdbDriver {
    fn start(&mut self) -> Result<()> {
        let mut command = Command::new(&self.config.jdb_bin);
        if !self.config.class_path.is_empty() {
            command.arg("-classpath").arg(JdbConfig::path_list(&self.config.class_path));
        }
        if !self.config.source_path.is_empty() {
            command.arg("-sourcepath").arg(JdbConfig::path_list(&self.config.source_path));
        }
        command
            .arg(JUNIT_RUNNER)
            .arg(&self.config.test_class)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("launching debugger: {:?}", command);
        let mut child = command.spawn().map_err(|e| eyre!("failed to launch jdb: {e}"))?;

        let stdin = child.stdin.take().ok_or_else(|| eyre!("jdb stdin not piped"))?;
        let stdout = child.stdout.take().ok_or_else(|| eyre!("jdb stdout not piped"))?;
        let stderr = child.stderr.take().ok_or_else(|| eyre!("jdb stderr not piped"))?;

        let (tx, rx) = mpsc::channel();
        self.readers.push(Self::spawn_reader(stdout, tx.clone()));
        self.readers.push(Self::spawn_reader(stderr, tx));

        self.stdin = Some(stdin);
        self.output = Some(rx);
        *self.child.lock() = Some(child);

        Ok(())
    }

    fn send(&mut self, command: &str) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| eyre!("debugger not started"))?;
        debug!(command, "sending debugger command");
        writeln!(stdin, "{command}")?;
        stdin.flush()?;
        Ok(())
    }

    fn is_ready(&mut self) -> bool {
        self.poll_pending();
        !self.pending.is_empty()
    }

    fn read_line(&mut self) -> Result<String> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(line);
        }
        let rx = self.output.as_ref().ok_or_else(|| eyre!("debugger not started"))?;
        loop {
            match rx.recv_timeout(READ_POLL) {
                Ok(line) => return Ok(line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => bail!("Input stream closed"),
            }
        }
    }

    fn quit(&mut self) -> Result<()> {
        // best effort: the debuggee may already be gone. exit tears down
        // the whole VM, breakpoints included, so nothing is cleared first
        if let Err(err) = self.send("exit") {
            debug!("exit on shutdown failed: {err}");
        }
        if let Some(mut child) = self.child.lock().take() {
            match child.wait() {
                Ok(status) => debug!("debugger exited with {status}"),
                Err(err) => warn!("failed to wait for debugger: {err}"),
            }
        }
        Ok(())
    }

    fn force_quit(&mut self) -> Result<()> {
        if let Some(child) = self.child.lock().as_mut() {
            child.kill().map_err(|e| eyre!("failed to kill debugger: {e}"))?;
        }
        if let Some(mut child) = self.child.lock().take() {
            let _ = child.wait();
        }
        Ok(())
    }

    fn kill_switch(&self) -> KillSwitch {
        let child = Arc::clone(&self.child);
        KillSwitch::new(move || {
            if let Some(child) = child.lock().as_mut() {
                if let Err(err) = child.kill() {
                    warn!("kill switch could not terminate debugger: {err}");
                }
            }
        })
    }
}

impl Drop for JdbDriver {
    fn drop(&mut self) {
        if let Some(child) = self.child.lock().as_mut() {
            let _ = child.kill();
        }
    }
}
