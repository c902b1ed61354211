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

//! Classification of raw JDB output lines.
//!
//! JDB is a line-oriented text protocol: every breakpoint/step announcement
//! carries a thread identifier, the frame location, and a `line=N` field, and
//! is always followed by the echoed source line for that same event. Process
//! exit and internal failures are announced by recognizable banners. All of
//! those protocol facts live in this module so an alternate backend only has
//! to swap out the banner tables.

/// Step announcement prefix emitted after `step`/`next` commands.
pub const STEP_COMPLETED: &str = "Step completed";
/// Breakpoint announcement emitted when a `stop at` location is reached.
pub const BREAKPOINT_HIT: &str = "Breakpoint hit";
/// Banner announcing normal debuggee exit.
pub const APP_EXITED: &str = "The application exited";
/// Banner announcing the debuggee dropped the connection.
pub const APP_DISCONNECTED: &str = "The application has been disconnected";
/// JUnit's fatal test-failure banner, echoed through the debuggee's stdout.
pub const TEST_FAILURE: &str = "FAILURES!!!";

/// Banners indicating the requested breakpoint could not be resolved.
const CONFIG_ERROR_BANNERS: [&str; 2] =
    ["Unable to set breakpoint", "Unable to set deferred breakpoint"];

/// Banners indicating an unrecoverable debugger-internal failure.
const IO_ERROR_BANNERS: [&str; 3] =
    ["Internal exception:", "Input stream closed", "Exception occurred: java.io.IOException"];

/// Coarse classification of one raw debugger output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A breakpoint/step announcement; the next output line is the echoed
    /// source line for the same event.
    StepDescriptor,
    /// The debuggee exited normally.
    ProcessExited,
    /// JUnit reported a test failure; a clean termination point for the
    /// analyzer, not an error.
    TestFailure,
    /// The breakpoint could not be resolved (bad invocation line).
    ConfigurationError,
    /// The debugger reported an internal failure or a closed stream.
    IoError,
    /// Prompt echoes, thread banners and other noise.
    Other,
}

/// Classify one raw output line from the debugger.
pub fn classify_output(line: &str) -> OutputKind {
    if CONFIG_ERROR_BANNERS.iter().any(|b| line.contains(b)) {
        return OutputKind::ConfigurationError;
    }
    if IO_ERROR_BANNERS.iter().any(|b| line.contains(b)) {
        return OutputKind::IoError;
    }
    if line.contains(APP_EXITED) || line.contains(APP_DISCONNECTED) {
        return OutputKind::ProcessExited;
    }
    if line.contains(TEST_FAILURE) {
        return OutputKind::TestFailure;
    }
    if (line.contains(STEP_COMPLETED) || line.contains(BREAKPOINT_HIT)) && line.contains("line=") {
        return OutputKind::StepDescriptor;
    }
    OutputKind::Other
}

/// One classified debugger step: the raw event descriptor, the echoed source
/// text for that line, and the parsed line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerEvent {
    /// Raw event text: thread id, frame location, `line=N`.
    pub frame: String,
    /// The echoed source line for the event.
    pub source: String,
    /// Parsed line number, `-1` when unparseable.
    pub line: i64,
}

impl DebuggerEvent {
    /// Build an event from a descriptor line and its echoed source line.
    pub fn new(frame: impl Into<String>, source: impl Into<String>) -> Self {
        let frame = frame.into();
        let line = parse_line_number(&frame);
        Self { frame, source: source.into(), line }
    }

    /// The line number as a `usize`, when it parsed and is positive.
    pub fn line_number(&self) -> Option<usize> {
        (self.line > 0).then_some(self.line as usize)
    }
}

/// Extract the `line=N` field from an event descriptor.
///
/// JDB groups digits with commas for large files (`line=1,234`), so commas
/// inside the digit run are skipped. Returns `-1` when no parseable field is
/// present.
pub fn parse_line_number(frame: &str) -> i64 {
    let Some(idx) = frame.find("line=") else {
        return -1;
    };
    let digits: String = frame[idx + "line=".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(-1)
}

/// Extract the `pkg.Class.method(...)` location token from an event
/// descriptor, used to resolve the concrete signature of anonymous-class
/// targets.
pub fn extract_frame_location(frame: &str) -> Option<String> {
    frame
        .split(',')
        .map(str::trim)
        .find(|token| token.contains('(') && token.contains('.') && !token.starts_with('"'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_number() {
        let frame = r#"Step completed: "thread=main", com.app.Calc.sum(), line=42 bci=5"#;
        assert_eq!(parse_line_number(frame), 42);
    }

    #[test]
    fn test_parse_line_number_with_digit_grouping() {
        let frame = r#"Breakpoint hit: "thread=main", com.app.Big.run(), line=1,234 bci=0"#;
        assert_eq!(parse_line_number(frame), 1234);
    }

    #[test]
    fn test_parse_line_number_missing() {
        assert_eq!(parse_line_number("main[1] "), -1);
    }

    #[test]
    fn test_classify_step_and_breakpoint() {
        let step = r#"Step completed: "thread=main", com.app.Calc.sum(), line=10 bci=0"#;
        let hit = r#"Breakpoint hit: "thread=main", com.app.CalcTest.testSum(), line=20 bci=0"#;
        assert_eq!(classify_output(step), OutputKind::StepDescriptor);
        assert_eq!(classify_output(hit), OutputKind::StepDescriptor);
    }

    #[test]
    fn test_classify_banners() {
        assert_eq!(classify_output("The application exited"), OutputKind::ProcessExited);
        assert_eq!(classify_output("FAILURES!!!"), OutputKind::TestFailure);
        assert_eq!(
            classify_output("Unable to set deferred breakpoint com.app.CalcTest:999"),
            OutputKind::ConfigurationError
        );
        assert_eq!(
            classify_output("Internal exception: java.lang.NullPointerException"),
            OutputKind::IoError
        );
        assert_eq!(classify_output("main[1] "), OutputKind::Other);
    }

    #[test]
    fn test_extract_frame_location() {
        let frame = r#"Step completed: "thread=main", com.app.Outer$1.<init>(), line=31 bci=4"#;
        assert_eq!(extract_frame_location(frame).as_deref(), Some("com.app.Outer$1.<init>()"));
    }
}
