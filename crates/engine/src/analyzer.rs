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

//! Execution path state machine.
//!
//! The analyzer owns one debugger driver, drives it synchronously through
//! the read/classify/command loop, and reconstructs the test paths of the
//! tested invoked from the debugger's textual event stream. One session
//! yields one test path per invocation of the tested invoked within the test
//! method run; invocations inside a loop body yield several.
//!
//! # Session lifecycle
//!
//! 1. Raise the process-wide timeout flag and start the debugger.
//! 2. Arm the timeout watchdog sharing the shutdown lock with this loop.
//! 3. Set the breakpoint at the invocation line and `run`.
//! 4. Loop: read one output line, classify it, step/continue accordingly,
//!    collecting line numbers while inside the tested invoked.
//! 5. On termination: shut the debugger down (gracefully unless forced),
//!    cancel the watchdog, lower the timeout flag on a clean end, and merge
//!    the call-record side channel.

use std::{
    collections::BTreeSet,
    env, fs,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use testpath_common::{
    env::{CALL_RECORD_FILE, TESTPATH_TIMEOUT_MS, TESTPATH_WORK_DIR},
    tp_assert,
    types::{Invoked, TestMethodRef, TestPath},
};

use crate::{
    calls::CallAggregator,
    classifier,
    debugger::{DebuggerDriver, JdbConfig, JdbDriver},
    error::AnalyzerError,
    event::{classify_output, DebuggerEvent, OutputKind},
    session::AnalysisSession,
    timeout::{self, TimeoutHandle, DEFAULT_TIMEOUT},
};

/// Delay after a forced termination, letting the killed subprocess settle
/// before the caller starts the next session.
const TIMEOUT_GRACE_DELAY: Duration = Duration::from_millis(500);

/// States of the read/act loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerState {
    /// Waiting for a breakpoint hit announcing an invocation of the tested
    /// invoked.
    AwaitingEntry,
    /// In the test method but not yet at the invocation line; stepping over.
    SteppingOverTestMethod,
    /// Step-into issued; draining internal frames until the tested invoked
    /// shows up.
    DescendingIntoInvoked,
    /// Inside the tested invoked; appending executed line numbers.
    CollectingPath,
    /// The current invocation ended; its path is being retired.
    ClosingIteration,
    /// The session is over.
    Terminated,
}

/// Configuration of one analyzer session.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Wall-clock bound on one `analyze()` call.
    pub timeout: Duration,
    /// Application work directory holding the call-record side channel.
    pub work_dir: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let timeout = env::var(TESTPATH_TIMEOUT_MS)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);
        let work_dir = env::var(TESTPATH_WORK_DIR)
            .map(PathBuf::from)
            .or_else(|_| env::current_dir())
            .unwrap_or_else(|_| PathBuf::from("."));
        Self { timeout, work_dir }
    }
}

impl AnalyzerConfig {
    /// Override the session timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the work directory.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Path of the call-record side channel for this configuration.
    pub fn call_record_path(&self) -> PathBuf {
        self.work_dir.join(CALL_RECORD_FILE)
    }
}

/// Results shared between the main loop and the timeout watchdog.
///
/// All compound mutations spanning "terminate the debugger" and "clear
/// accumulated results" happen under this struct's mutex, so the two
/// shutdown paths can never interleave partially.
#[derive(Debug, Default)]
struct SharedResults {
    completed_paths: Vec<TestPath>,
    stopped: bool,
    timed_out: bool,
    ended: bool,
}

/// Computes the test paths of one tested invoked by driving a debugger.
#[derive(Debug)]
pub struct PathAnalyzer<D: DebuggerDriver> {
    invoked: Invoked,
    test_method: TestMethodRef,
    debugger: D,
    config: AnalyzerConfig,
    session: AnalysisSession,
    state: AnalyzerState,
    results: Arc<Mutex<SharedResults>>,
    aggregator: CallAggregator,
}

impl PathAnalyzer<JdbDriver> {
    /// Analyzer over a freshly configured JDB subprocess.
    pub fn with_jdb(
        invoked: Invoked,
        test_method: TestMethodRef,
        jdb: JdbConfig,
        config: AnalyzerConfig,
    ) -> Self {
        Self::new(invoked, test_method, JdbDriver::new(jdb), config)
    }
}

impl<D: DebuggerDriver> PathAnalyzer<D> {
    /// Analyzer over an arbitrary debugger driver.
    pub fn new(
        invoked: Invoked,
        test_method: TestMethodRef,
        debugger: D,
        config: AnalyzerConfig,
    ) -> Self {
        let aggregator = CallAggregator::new(config.call_record_path());
        Self {
            invoked,
            test_method,
            debugger,
            config,
            session: AnalysisSession::new(),
            state: AnalyzerState::AwaitingEntry,
            results: Arc::new(Mutex::new(SharedResults::default())),
            aggregator,
        }
    }

    /// Run the session to completion or timeout.
    ///
    /// Returns `self` so queries can be chained. Fails with
    /// [`AnalyzerError::Configuration`] when the invocation line does not
    /// resolve to a breakpoint, and with [`AnalyzerError::DebuggerIo`] when
    /// the debugger stream reports an unrecoverable internal failure.
    /// Timeout is not an error: the session ends with cleared paths and the
    /// process-wide timeout flag raised.
    pub fn analyze(&mut self) -> Result<&mut Self, AnalyzerError> {
        info!(invoked = %self.invoked, test_method = %self.test_method, "starting analysis session");
        timeout::enable_timeout();

        self.debugger
            .start()
            .map_err(|err| AnalyzerError::DebuggerIo { detail: err.to_string() })?;

        let mut watchdog = self.arm_watchdog();
        let outcome = self.drive_session();

        let timed_out = {
            let mut guard = self.results.lock();
            guard.ended = true;
            if guard.timed_out {
                true
            } else {
                if outcome.is_err() {
                    if let Err(err) = self.debugger.force_quit() {
                        warn!("forced debugger shutdown failed: {err}");
                    }
                } else if let Err(err) = self.debugger.quit() {
                    warn!("graceful debugger shutdown failed: {err}");
                }
                false
            }
        };
        watchdog.cancel();

        if timed_out {
            info!("session timed out; test paths cleared");
            std::thread::sleep(TIMEOUT_GRACE_DELAY);
            return Ok(self);
        }
        timeout::disable_timeout();

        outcome?;

        self.trim_anonymous_constructor_paths();
        if let Err(err) = self.aggregator.merge_session_records() {
            warn!("call-record merge failed: {err}");
        }

        info!(paths = self.results.lock().completed_paths.len(), "analysis session complete");
        Ok(self)
    }

    /// The completed test paths, in invocation order. Empty when the tested
    /// invoked was never entered.
    pub fn test_paths(&self) -> Vec<TestPath> {
        self.results.lock().completed_paths.clone()
    }

    /// Whether the session produced at least one test path.
    pub fn has_test_paths(&self) -> bool {
        !self.results.lock().completed_paths.is_empty()
    }

    /// Whether the tested invoked was invoked more than once (e.g. inside a
    /// loop in the test method).
    pub fn was_obtained_in_a_loop(&self) -> bool {
        self.results.lock().completed_paths.len() > 1
    }

    /// The concrete signature of the tested invoked observed at runtime.
    ///
    /// Differs from the supplied signature only for anonymous-class targets,
    /// whose externally-supplied signature is approximate.
    pub fn analyzed_invoked_signature(&self) -> String {
        self.session
            .resolved_signature
            .clone()
            .unwrap_or_else(|| self.invoked.signature().to_string())
    }

    /// Signatures of the routines the tested invoked transitively called,
    /// aggregated across all merged sessions.
    pub fn methods_called_by_tested_invoked(&self) -> BTreeSet<String> {
        self.aggregator.methods_called_by(self.invoked.signature())
    }

    fn arm_watchdog(&self) -> TimeoutHandle {
        let results = Arc::clone(&self.results);
        let kill = self.debugger.kill_switch();
        let record_path = self.config.call_record_path();

        TimeoutHandle::register(self.config.timeout, move || {
            let mut guard = results.lock();
            if guard.ended {
                return;
            }
            if record_path.exists() {
                if let Err(err) = fs::remove_file(&record_path) {
                    warn!("could not delete pending call record on timeout: {err}");
                }
            }
            kill.fire();
            // a partially computed path must not be reported as complete
            guard.completed_paths.clear();
            guard.stopped = true;
            guard.timed_out = true;
            timeout::enable_timeout();
        })
    }

    fn drive_session(&mut self) -> Result<(), AnalyzerError> {
        let breakpoint = format!(
            "stop at {}:{}",
            self.test_method.class_signature(),
            self.invoked.invocation_line()
        );
        self.send(&breakpoint)?;
        self.send("run")?;

        loop {
            if self.results.lock().stopped {
                return Ok(());
            }
            let Some(line) = self.read_output()? else {
                return Ok(());
            };

            match classify_output(&line) {
                OutputKind::Other => continue,
                OutputKind::ConfigurationError => {
                    return Err(AnalyzerError::Configuration {
                        invoked: self.invoked.signature().to_string(),
                        test_method: self.test_method.signature().to_string(),
                        detail: line,
                    });
                }
                OutputKind::IoError => {
                    return Err(AnalyzerError::DebuggerIo { detail: line });
                }
                OutputKind::ProcessExited => {
                    debug!("debuggee exited");
                    self.close_current_iteration();
                    self.state = AnalyzerState::Terminated;
                    return Ok(());
                }
                OutputKind::TestFailure => {
                    debug!("test failure inside debuggee; keeping the collected path");
                    self.close_current_iteration();
                    self.state = AnalyzerState::Terminated;
                    return Ok(());
                }
                OutputKind::StepDescriptor => {
                    let Some(source) = self.read_output()? else {
                        return Ok(());
                    };
                    let event = DebuggerEvent::new(line, source);
                    self.handle_event(&event)?;

                    if self.state == AnalyzerState::ClosingIteration {
                        self.close_current_iteration();
                        if self.session.stopped {
                            self.state = AnalyzerState::Terminated;
                            return Ok(());
                        }
                        // look for a further invocation later in the test method
                        self.send("cont")?;
                        self.state = AnalyzerState::AwaitingEntry;
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: &DebuggerEvent) -> Result<(), AnalyzerError> {
        match self.state {
            AnalyzerState::AwaitingEntry => {
                if classifier::is_new_iteration_start(
                    &self.session,
                    event,
                    &self.invoked,
                    &self.test_method,
                ) {
                    self.state = AnalyzerState::DescendingIntoInvoked;
                    self.send("step")?;
                } else if event.frame.contains(self.test_method.name()) {
                    self.state = AnalyzerState::SteppingOverTestMethod;
                    self.send("next")?;
                } else {
                    self.send("cont")?;
                }
            }
            AnalyzerState::SteppingOverTestMethod => {
                if classifier::is_new_iteration_start(
                    &self.session,
                    event,
                    &self.invoked,
                    &self.test_method,
                ) {
                    self.state = AnalyzerState::DescendingIntoInvoked;
                    self.send("step")?;
                } else {
                    self.send("next")?;
                }
            }
            AnalyzerState::DescendingIntoInvoked => {
                if classifier::is_internal_frame(event, &self.invoked, &self.test_method) {
                    // drain internal frames until something of ours shows up
                    self.send("step")?;
                } else if classifier::is_inside_tested_invoked(
                    &self.session,
                    event,
                    &self.invoked,
                    &self.test_method,
                ) {
                    self.enter_tested_invoked(event);
                    self.collect_event(event);
                    self.session.last_raw_source_line = event.source.clone();
                    self.send("next")?;
                } else if classifier::has_returned_to_test_method(
                    &self.session,
                    event,
                    &self.test_method,
                ) {
                    self.session.finished = true;
                    self.state = AnalyzerState::ClosingIteration;
                } else {
                    self.send("step")?;
                }
            }
            AnalyzerState::CollectingPath => {
                if classifier::is_loop_repetition_artifact(&self.session, event) {
                    debug!("terminal line re-announced; stopping the whole session");
                    self.session.stopped = true;
                    self.state = AnalyzerState::ClosingIteration;
                } else if classifier::has_returned_to_test_method(
                    &self.session,
                    event,
                    &self.test_method,
                ) {
                    self.session.finished = true;
                    self.state = AnalyzerState::ClosingIteration;
                } else {
                    self.collect_event(event);
                    self.session.last_raw_source_line = event.source.clone();
                    self.send("next")?;
                }
            }
            AnalyzerState::ClosingIteration | AnalyzerState::Terminated => {}
        }
        Ok(())
    }

    fn enter_tested_invoked(&mut self, event: &DebuggerEvent) {
        self.state = AnalyzerState::CollectingPath;
        self.session.inside_tested_invoked = true;
        self.session.inside_constructor =
            self.invoked.is_constructor() || event.frame.contains(classifier::CONSTRUCTOR_ENTRY);

        // the supplied signature of an anonymous-class target is approximate;
        // the frame descriptor carries the compiler-assigned one
        if self.invoked.belongs_to_anonymous_class() && self.session.resolved_signature.is_none() {
            if let Some(location) = crate::event::extract_frame_location(&event.frame) {
                let resolved =
                    location.replace(classifier::CONSTRUCTOR_ENTRY, self.invoked.class_name());
                debug!(signature = %resolved, "resolved concrete invoked signature");
                self.session.resolved_signature = Some(resolved);
            }
        }
    }

    /// Apply the append rules of the collecting state to one event.
    fn collect_event(&mut self, event: &DebuggerEvent) {
        let Some(line) = event.line_number() else {
            return;
        };

        if classifier::is_declaration_anchor(&self.session, event, &self.invoked) {
            debug!(line, "anchored declaration line");
            self.session.declaration_line = line;
        }

        if self.session.inside_constructor_delegation
            && classifier::is_constructor_delegation_end(&self.session, event)
        {
            self.session.inside_constructor_delegation = false;
            self.session.delegation_start_line = None;
        }
        if classifier::is_constructor_delegation_start(&self.session, event, &self.invoked) {
            self.session.inside_constructor_delegation = true;
            self.session.delegation_start_line = Some(line);
            return;
        }

        // multi-line statements: suppress the opening and continuation
        // lines, append once when the statement closes
        let delta = classifier::paren_delta(&event.source);
        if let Some(balance) = self.session.open_paren_balance {
            let balance = balance + delta;
            if balance <= 0 {
                self.session.open_paren_balance = None;
                if !classifier::should_ignore_line(
                    &self.session,
                    event,
                    &self.invoked,
                    &self.test_method,
                ) {
                    self.session.append_line(line);
                }
            } else {
                self.session.open_paren_balance = Some(balance);
            }
            return;
        }
        if delta > 0 {
            self.session.open_paren_balance = Some(delta);
            return;
        }

        if classifier::should_ignore_line(&self.session, event, &self.invoked, &self.test_method) {
            self.session.last_frame_empty_body = classifier::is_empty_body_line(&event.source);
            return;
        }
        self.session.last_frame_empty_body = false;
        self.session.append_line(line);
    }

    fn close_current_iteration(&mut self) {
        if let Some(path) = self.session.close_iteration() {
            tp_assert!(!path.is_empty(), "only non-empty test paths are retained");
            let mut guard = self.results.lock();
            if guard.stopped {
                // the watchdog already cleared the results; an iteration
                // closing after that must not repopulate them
                debug!("discarding iteration closed after session stop");
                return;
            }
            debug!(?path, "completed one test path");
            guard.completed_paths.push(path);
        }
    }

    /// Anonymous-constructor paths start and end on the compiler-synthesized
    /// wrapper braces; drop them once the session is over. Single-line paths
    /// are left untouched.
    fn trim_anonymous_constructor_paths(&mut self) {
        if !(self.invoked.is_constructor() && self.invoked.belongs_to_anonymous_class()) {
            return;
        }
        let mut guard = self.results.lock();
        for path in &mut guard.completed_paths {
            if path.len() > 1 {
                path.remove(0);
                path.pop();
            }
        }
        guard.completed_paths.retain(|path| !path.is_empty());
    }

    fn send(&mut self, command: &str) -> Result<(), AnalyzerError> {
        self.debugger
            .send(command)
            .map_err(|err| AnalyzerError::DebuggerIo { detail: err.to_string() })
    }

    /// Read one output line; `None` means the session has been stopped by
    /// the watchdog and the loop should unwind without treating the closed
    /// stream as an error.
    fn read_output(&mut self) -> Result<Option<String>, AnalyzerError> {
        match self.debugger.read_line() {
            Ok(line) => Ok(Some(line)),
            Err(err) => {
                if self.results.lock().stopped {
                    return Ok(None);
                }
                Err(AnalyzerError::DebuggerIo { detail: err.to_string() })
            }
        }
    }
}
