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

//! Error taxonomy surfaced by the analyzer.
//!
//! Only two conditions interrupt [`crate::PathAnalyzer::analyze`]: a
//! configuration problem (the supplied invocation line does not resolve to a
//! breakpoint) and an unrecoverable debugger I/O failure. Timeouts and
//! test-assertion failures inside the debuggee are normal end states and are
//! observable through flags and queries instead.

use thiserror::Error;

/// Failures that interrupt an analysis session.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The supplied invocation line does not correspond to a resolvable
    /// breakpoint. Never retried; the debugger subprocess has already been
    /// terminated when this is returned.
    #[error("cannot resolve breakpoint for {invoked} (test method {test_method}): {detail}")]
    Configuration {
        /// Signature of the tested invoked the session was analyzing.
        invoked: String,
        /// Signature of the test method driving the session.
        test_method: String,
        /// The debugger's own diagnostic text.
        detail: String,
    },

    /// The debugger stream reported an unrecoverable internal failure
    /// (exception banner, closed stream). Recoverable from the caller's
    /// perspective: retry policy belongs to whoever drives multiple
    /// sessions, not to the analyzer.
    #[error("debugger i/o failure: {detail}")]
    DebuggerIo {
        /// The offending output line or stream error.
        detail: String,
    },
}
