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

//! Mutable state of one debugger-driven analysis session.
//!
//! The session carries everything the classifier predicates need to answer
//! their questions and everything the state machine mutates while it runs.
//! One invocation of the tested invoked corresponds to one iteration; loop
//! bodies in the test method produce several iterations per session.

use testpath_common::{tp_assert, types::TestPath};

/// Mutable state of one analysis session.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    /// Ordered line numbers collected for the current invocation.
    pub current_path: Vec<usize>,
    /// Whether the last classified frame was inside the tested invoked.
    pub inside_tested_invoked: bool,
    /// Whether the tested invoked being tracked is a constructor frame.
    pub inside_constructor: bool,
    /// Whether a same-class constructor-delegation span is open.
    pub inside_constructor_delegation: bool,
    /// First line of the open delegation span, when one is open.
    pub delegation_start_line: Option<usize>,
    /// First confirmed source line of the tested invoked's body; `0` until
    /// anchored. Frames with `1 < line < anchor` carry stale line numbers
    /// and are discarded.
    pub declaration_line: usize,
    /// Guard against appending the same line twice in immediate succession.
    /// The same line may still reappear later in the path.
    pub last_line_appended: Option<usize>,
    /// Open-parenthesis balance of an in-progress multi-line statement;
    /// `None` while no statement is open.
    pub open_paren_balance: Option<i64>,
    /// The previous echoed source line, used to detect the debugger
    /// re-announcing the terminal line of a loop.
    pub last_raw_source_line: String,
    /// Whether the last frame inside the invoked was an empty-body line.
    pub last_frame_empty_body: bool,
    /// The current invocation has returned to the test method.
    pub finished: bool,
    /// The whole session is stopping (loop-repetition artifact or timeout).
    pub stopped: bool,
    /// No line has been collected yet for the upcoming invocation.
    pub new_iteration: bool,
    /// Concrete signature observed at runtime, resolved lazily; only differs
    /// from the supplied one for anonymous-class targets.
    pub resolved_signature: Option<String>,
}

impl AnalysisSession {
    /// Fresh session state, ready for the first iteration.
    pub fn new() -> Self {
        Self { new_iteration: true, ..Self::default() }
    }

    /// Append a line to the current path unless it equals the line appended
    /// immediately before it.
    pub fn append_line(&mut self, line: usize) {
        if self.last_line_appended == Some(line) {
            return;
        }
        self.current_path.push(line);
        tp_assert!(
            self.current_path.windows(2).all(|pair| pair[0] != pair[1]),
            "a test path never holds two consecutive equal lines"
        );
        self.last_line_appended = Some(line);
        self.new_iteration = false;
    }

    /// Close the current iteration, handing back its path when non-empty.
    ///
    /// Per-iteration fields are reset so a further invocation of the tested
    /// invoked later in the same test method starts clean. The declaration
    /// anchor survives: the invoked's body does not move between iterations.
    pub fn close_iteration(&mut self) -> Option<TestPath> {
        let path = std::mem::take(&mut self.current_path);

        self.inside_tested_invoked = false;
        self.inside_constructor = false;
        self.inside_constructor_delegation = false;
        self.delegation_start_line = None;
        self.last_line_appended = None;
        self.open_paren_balance = None;
        self.last_raw_source_line.clear();
        self.last_frame_empty_body = false;
        self.finished = false;
        self.new_iteration = true;

        (!path.is_empty()).then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_line_deduplicates_consecutive() {
        let mut session = AnalysisSession::new();
        session.append_line(10);
        session.append_line(10);
        session.append_line(11);
        session.append_line(10);

        assert_eq!(session.current_path, vec![10, 11, 10]);
    }

    #[test]
    fn test_close_iteration_discards_empty_path() {
        let mut session = AnalysisSession::new();
        assert_eq!(session.close_iteration(), None);
    }

    #[test]
    fn test_close_iteration_resets_per_iteration_state() {
        let mut session = AnalysisSession::new();
        session.append_line(10);
        session.inside_tested_invoked = true;
        session.declaration_line = 10;
        session.open_paren_balance = Some(2);

        let path = session.close_iteration();

        assert_eq!(path, Some(vec![10]));
        assert!(session.current_path.is_empty());
        assert!(!session.inside_tested_invoked);
        assert!(session.new_iteration);
        assert_eq!(session.open_paren_balance, None);
        assert_eq!(session.last_line_appended, None);
        // the anchor survives across iterations
        assert_eq!(session.declaration_line, 10);
    }
}
