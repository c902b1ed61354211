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

//! Line Classifier: decision logic over one `(event, source)` pair.
//!
//! JDB exposes no structured call-frame API, so every question about program
//! flow is answered by substring matching over the textual frame descriptor
//! and the echoed source line. That matching is inherently approximate: the
//! predicates here preserve a fixed, order-sensitive precedence of checks,
//! and the declaration-line anchor mitigates the remaining false positives.
//! Keep the ordering when changing anything.
//!
//! All JDB-specific quirks (the line-1 sentinel, the nested-class `$`
//! convention, the re-announced terminal line of a loop) are confined to this
//! module and [`crate::event`].

use testpath_common::types::{Invoked, TestMethodRef};

use crate::{event::BREAKPOINT_HIT, session::AnalysisSession, DebuggerEvent};

/// Namespaces whose frames are library/runtime internals, never part of a
/// test path. The collector namespace is the debuggee-side instrumentation.
pub const INTERNAL_NAMESPACES: [&str; 7] =
    ["java.", "jdk.", "sun.", "com.sun.", "org.junit.", "junit.", "org.testpath.runtime."];

/// Call-collection marker injected into the tested invoked's first body line
/// by the debuggee-side instrumentation.
pub const COLLECT_CALL_MARKER: &str = "CallCollector.record";

/// Constructor-entry marker in JDB frame descriptors.
pub const CONSTRUCTOR_ENTRY: &str = "<init>";

const CONTROL_KEYWORDS: [&str; 10] =
    ["if", "else", "for", "while", "do", "switch", "case", "catch", "try", "return"];

const DECLARATION_MODIFIERS: [&str; 9] = [
    "public",
    "protected",
    "private",
    "static",
    "final",
    "synchronized",
    "abstract",
    "native",
    "strictfp",
];

/// Whether the frame names `name` as a call target (`.name(`).
fn names_call_target(frame: &str, name: &str) -> bool {
    frame.contains(&format!(".{name}("))
}

/// Whether the frame is a constructor-entry frame.
fn is_constructor_entry(frame: &str) -> bool {
    frame.contains(CONSTRUCTOR_ENTRY)
}

/// Whether the frame references a *named* nested class (`$Inner`).
///
/// Anonymous classes carry a numeric suffix (`$1`) and are deliberately not
/// treated as a nested-class marker: anonymous-constructor frames are how
/// anonymous targets are entered.
fn has_named_nested_marker(frame: &str) -> bool {
    frame
        .char_indices()
        .filter(|&(_, c)| c == '$')
        .any(|(i, _)| matches!(frame[i + 1..].chars().next(), Some(c) if !c.is_ascii_digit()))
}

/// Whether the frame textually references the tested invoked at all: as a
/// call target, as a constructor entry of its class, or (for anonymous
/// targets) as any constructor entry.
fn frame_names_invoked(frame: &str, invoked: &Invoked) -> bool {
    if names_call_target(frame, invoked.name()) {
        return true;
    }
    if invoked.is_constructor()
        && is_constructor_entry(frame)
        && frame.contains(invoked.class_name())
    {
        return true;
    }
    invoked.belongs_to_anonymous_class() && is_constructor_entry(frame)
}

/// True when the event belongs to a library/runtime frame that must never
/// contribute to a test path.
///
/// The checks run in a fixed order: the escape hatch first (a frame that
/// already names the tested invoked, a constructor entry, or the test method
/// is never internal), then the namespace table, the synthetic line-1
/// sentinel, `package` statements, and finally nested-class frames whose
/// echoed source is not an opening brace.
pub fn is_internal_frame(event: &DebuggerEvent, invoked: &Invoked, test: &TestMethodRef) -> bool {
    let frame = &event.frame;

    if names_call_target(frame, invoked.name())
        || is_constructor_entry(frame)
        || frame.contains(test.name())
    {
        return false;
    }
    if INTERNAL_NAMESPACES.iter().any(|ns| frame.contains(ns)) {
        return true;
    }
    if event.line == 1 {
        return true;
    }
    if event.source.trim_start().starts_with("package ") {
        return true;
    }
    if frame.contains('$') && event.source.trim() != "{" {
        return true;
    }
    false
}

/// True when the event places control inside the tested invoked.
///
/// Anonymous targets are recognized by any constructor-entry frame without a
/// named-nested-class marker; everything else by the frame naming the
/// invoked as a call target or constructor entry. Never true once the
/// current invocation has finished or control has returned to the test
/// method.
pub fn is_inside_tested_invoked(
    session: &AnalysisSession,
    event: &DebuggerEvent,
    invoked: &Invoked,
    test: &TestMethodRef,
) -> bool {
    if session.finished || has_returned_to_test_method(session, event, test) {
        return false;
    }
    if invoked.belongs_to_anonymous_class()
        && is_constructor_entry(&event.frame)
        && !has_named_nested_marker(&event.frame)
    {
        return true;
    }
    names_call_target(&event.frame, invoked.name())
        || (invoked.is_constructor()
            && is_constructor_entry(&event.frame)
            && event.frame.contains(invoked.class_name()))
}

/// True when control is back in the test method.
///
/// Requires either at least one collected line (a normal return) or that the
/// invoked was an empty-bodied frame whose next event already names the test
/// method.
pub fn has_returned_to_test_method(
    session: &AnalysisSession,
    event: &DebuggerEvent,
    test: &TestMethodRef,
) -> bool {
    event.frame.contains(test.name())
        && (!session.current_path.is_empty() || session.last_frame_empty_body)
}

/// Strip the line-number prefix the debugger prepends to every echoed
/// source line.
fn strip_echo_prefix(source: &str) -> &str {
    source.trim().trim_start_matches(|c: char| c.is_ascii_digit()).trim()
}

/// True for echoed source lines that are never appended to a path: a lone
/// opening or closing brace, or a one-line declaration with an empty body.
pub fn is_empty_body_line(source: &str) -> bool {
    let trimmed = strip_echo_prefix(source);

    if trimmed == "{" || trimmed == "}" {
        return true;
    }
    if let (Some(open), Some(close)) = (trimmed.rfind('{'), trimmed.rfind('}')) {
        if close > open && trimmed.contains('(') && trimmed[open + 1..close].trim().is_empty() {
            return true;
        }
    }
    false
}

/// True while an unbalanced multi-line statement is in progress.
pub fn is_multi_line_continuation(session: &AnalysisSession) -> bool {
    matches!(session.open_paren_balance, Some(balance) if balance != 0)
}

/// Parenthesis balance contribution of one source line, ignoring characters
/// inside string and char literals.
pub fn paren_delta(source: &str) -> i64 {
    let mut delta = 0i64;
    let mut in_string = false;
    let mut in_char = false;
    let mut escaped = false;

    for c in source.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string || in_char => escaped = true,
            '"' if !in_char => in_string = !in_string,
            '\'' if !in_string => in_char = !in_char,
            '(' if !in_string && !in_char => delta += 1,
            ')' if !in_string && !in_char => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// True when a constructor frame's echoed source contains a same-class
/// delegating call (`this(...)`), opening a delegation span.
///
/// The span's lines belong to the other constructor, which is tracked
/// separately, so they are skipped for path collection.
pub fn is_constructor_delegation_start(
    session: &AnalysisSession,
    event: &DebuggerEvent,
    invoked: &Invoked,
) -> bool {
    invoked.is_constructor()
        && !session.inside_constructor_delegation
        && is_constructor_entry(&event.frame)
        && event.source.contains("this(")
}

/// True when an open delegation span ends: one line past where it started,
/// or earlier if an empty-body line shows up.
pub fn is_constructor_delegation_end(session: &AnalysisSession, event: &DebuggerEvent) -> bool {
    let Some(start) = session.delegation_start_line else {
        return false;
    };
    match event.line_number() {
        Some(line) => line > start + 1 || is_empty_body_line(&event.source),
        None => is_empty_body_line(&event.source),
    }
}

/// True the first time an event confirms a source line of the tested
/// invoked's body, anchoring the declaration line.
///
/// The confirmation is the debuggee-side call-collection marker showing up in
/// the echoed source of a frame that names the tested invoked (or, for
/// anonymous targets, any frame inside its constructor), at a line past the
/// synthetic line-1 sentinel.
pub fn is_declaration_anchor(
    session: &AnalysisSession,
    event: &DebuggerEvent,
    invoked: &Invoked,
) -> bool {
    session.declaration_line == 0
        && event.line > 1
        && event.source.contains(COLLECT_CALL_MARKER)
        && (frame_names_invoked(&event.frame, invoked)
            || (invoked.belongs_to_anonymous_class() && session.inside_constructor))
}

/// True for a frame belonging to an inner/anonymous class unrelated to the
/// tested invoked.
fn is_unrelated_nested_frame(event: &DebuggerEvent, invoked: &Invoked) -> bool {
    event.frame.contains('$')
        && !event.frame.contains(invoked.class_name())
        && !names_call_target(&event.frame, invoked.name())
}

/// Heuristic for a class declaration line.
fn is_class_declaration(source: &str) -> bool {
    let trimmed = source.trim();
    trimmed.starts_with("class ")
        || (trimmed.contains(" class ") && !trimmed.contains(".class"))
        || trimmed.starts_with("interface ")
        || trimmed.contains(" interface ")
}

/// Heuristic for a method/constructor declaration line.
///
/// Either an access-modifier-led line with a parameter list, or a
/// `Type name(args) {` shape: no statement terminator, no assignment, not
/// led by a control keyword.
fn is_method_declaration(source: &str) -> bool {
    let trimmed = strip_echo_prefix(source);
    let Some(first_token) = trimmed.split_whitespace().next() else {
        return false;
    };

    if DECLARATION_MODIFIERS.contains(&first_token) && trimmed.contains('(') {
        return true;
    }

    if CONTROL_KEYWORDS.contains(&first_token.trim_end_matches('(')) {
        return false;
    }
    let Some(paren) = trimmed.find('(') else {
        return false;
    };
    trimmed.ends_with('{')
        && !trimmed.contains(';')
        && !trimmed.contains('=')
        && trimmed[..paren].split_whitespace().count() >= 2
}

/// True when the event's line must not be appended to the current path.
///
/// The checks run in a fixed order, mirroring the precedence the rest of the
/// machine depends on: unrelated inner/anonymous frames, open delegation
/// spans, internal frames, pre-anchor stale lines, class and method
/// declarations, stray multi-line-argument continuations, and empty-body
/// lines.
pub fn should_ignore_line(
    session: &AnalysisSession,
    event: &DebuggerEvent,
    invoked: &Invoked,
    test: &TestMethodRef,
) -> bool {
    if is_unrelated_nested_frame(event, invoked) {
        return true;
    }
    if session.inside_constructor_delegation && !is_empty_body_line(&event.source) {
        return true;
    }
    if is_internal_frame(event, invoked, test) {
        return true;
    }
    if session.declaration_line > 0
        && event.line > 1
        && (event.line as usize) < session.declaration_line
    {
        return true;
    }
    if is_class_declaration(&event.source) {
        return true;
    }
    if is_method_declaration(&event.source) {
        return true;
    }
    if is_multi_line_continuation(session) {
        return true;
    }
    if is_empty_body_line(&event.source) {
        return true;
    }
    false
}

/// True when the debugger is re-announcing the terminal line of a loop: not
/// at the start of a new iteration, a lone closing brace, textually
/// identical to the previous retained echoed line. The whole session must
/// stop when this fires.
pub fn is_loop_repetition_artifact(session: &AnalysisSession, event: &DebuggerEvent) -> bool {
    !session.new_iteration
        && strip_echo_prefix(&event.source) == "}"
        && event.source == session.last_raw_source_line
}

/// True when the event marks a fresh invocation of the tested invoked:
/// either a breakpoint-hit banner, or the test class stopping exactly at the
/// configured invocation line.
pub fn is_new_iteration_start(
    session: &AnalysisSession,
    event: &DebuggerEvent,
    invoked: &Invoked,
    test: &TestMethodRef,
) -> bool {
    if session.inside_tested_invoked {
        return false;
    }
    event.frame.contains(BREAKPOINT_HIT)
        || (event.line_number() == Some(invoked.invocation_line())
            && event.frame.contains(test.class_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_invoked() -> Invoked {
        Invoked::new("com.app.Calc.sum(int, int)", "com.app.Calc")
            .with_package("com.app")
            .with_invocation_line(20)
    }

    fn anon_ctor() -> Invoked {
        Invoked::new("com.app.Outer$1()", "com.app.Outer$1")
            .with_constructor(true)
            .with_invocation_line(30)
    }

    fn test_method() -> TestMethodRef {
        TestMethodRef::new("com.app.CalcTest.testSum()", "com.app.CalcTest")
    }

    fn event(frame: &str, source: &str) -> DebuggerEvent {
        DebuggerEvent::new(frame, source)
    }

    #[test]
    fn test_internal_frame_namespaces() {
        let ev = event(
            r#"Step completed: "thread=main", java.util.ArrayList.add(), line=443 bci=0"#,
            "443        elementData[size++] = e;",
        );
        assert!(is_internal_frame(&ev, &sum_invoked(), &test_method()));
    }

    #[test]
    fn test_internal_frame_line_one_sentinel() {
        let ev = event(
            r#"Step completed: "thread=main", com.app.Helper.run(), line=1 bci=0"#,
            "1    package com.app;",
        );
        assert!(is_internal_frame(&ev, &sum_invoked(), &test_method()));
    }

    #[test]
    fn test_frame_naming_invoked_is_never_internal() {
        let ev = event(
            r#"Step completed: "thread=main", com.app.Calc.sum(), line=10 bci=0"#,
            "10        return a + b;",
        );
        assert!(!is_internal_frame(&ev, &sum_invoked(), &test_method()));
    }

    #[test]
    fn test_inside_tested_invoked_by_call_target() {
        let session = AnalysisSession::new();
        let ev = event(
            r#"Step completed: "thread=main", com.app.Calc.sum(), line=10 bci=0"#,
            "10        int total = a;",
        );
        assert!(is_inside_tested_invoked(&session, &ev, &sum_invoked(), &test_method()));
    }

    #[test]
    fn test_inside_tested_invoked_false_after_finish() {
        let mut session = AnalysisSession::new();
        session.finished = true;
        let ev = event(
            r#"Step completed: "thread=main", com.app.Calc.sum(), line=10 bci=0"#,
            "10        int total = a;",
        );
        assert!(!is_inside_tested_invoked(&session, &ev, &sum_invoked(), &test_method()));
    }

    #[test]
    fn test_inside_anonymous_constructor() {
        let session = AnalysisSession::new();
        let ev = event(
            r#"Step completed: "thread=main", com.app.Outer$1.<init>(), line=31 bci=0"#,
            "31            int x = 0;",
        );
        assert!(is_inside_tested_invoked(&session, &ev, &anon_ctor(), &test_method()));
    }

    #[test]
    fn test_named_nested_marker_blocks_anonymous_entry() {
        let session = AnalysisSession::new();
        let ev = event(
            r#"Step completed: "thread=main", com.app.Outer$Inner.<init>(), line=31 bci=0"#,
            "31            int x = 0;",
        );
        assert!(!is_inside_tested_invoked(&session, &ev, &anon_ctor(), &test_method()));
    }

    #[test]
    fn test_returned_to_test_method_requires_collected_lines() {
        let mut session = AnalysisSession::new();
        let ev = event(
            r#"Step completed: "thread=main", com.app.CalcTest.testSum(), line=21 bci=8"#,
            "21        assertEquals(3, result);",
        );
        assert!(!has_returned_to_test_method(&session, &ev, &test_method()));

        session.append_line(10);
        assert!(has_returned_to_test_method(&session, &ev, &test_method()));
    }

    #[test]
    fn test_returned_after_empty_body_frame() {
        let mut session = AnalysisSession::new();
        session.last_frame_empty_body = true;
        let ev = event(
            r#"Step completed: "thread=main", com.app.CalcTest.testSum(), line=21 bci=8"#,
            "21        assertEquals(3, result);",
        );
        assert!(has_returned_to_test_method(&session, &ev, &test_method()));
    }

    #[test]
    fn test_empty_body_lines() {
        assert!(is_empty_body_line("12        {"));
        assert!(is_empty_body_line("15        }"));
        assert!(is_empty_body_line("8     public Calc() {}"));
        assert!(is_empty_body_line("8     void noop() { }"));
        assert!(!is_empty_body_line("10        return a + b;"));
        assert!(!is_empty_body_line("9     if (a > b) {"));
    }

    #[test]
    fn test_paren_delta_skips_literals() {
        assert_eq!(paren_delta(r#"log.info("open ( paren");"#), 0);
        assert_eq!(paren_delta("calc.log("), 1);
        assert_eq!(paren_delta("    \"b\");"), -1);
        assert_eq!(paren_delta("char c = '(';"), 0);
        assert_eq!(paren_delta("if (a > b) {"), 0);
    }

    #[test]
    fn test_method_declaration_heuristic() {
        assert!(is_method_declaration("    public int sum(int a, int b) {"));
        assert!(is_method_declaration("    int helper(int a) {"));
        assert!(!is_method_declaration("    if (a > b) {"));
        assert!(!is_method_declaration("    Runnable r = new Runnable() {"));
        assert!(!is_method_declaration("    calc.sum(1, 2);"));
    }

    #[test]
    fn test_method_declaration_behind_echoed_line_number() {
        // the echo prefixes every line with its number
        assert!(is_method_declaration("8     public int sum(int a, int b)"));
        assert!(is_method_declaration("12    int helper(int a) {"));
        assert!(!is_method_declaration("9     if (a > b) {"));
        assert!(!is_method_declaration("10        calc.sum(1, 2);"));
    }

    #[test]
    fn test_class_declaration_heuristic() {
        assert!(is_class_declaration("public class Calc {"));
        assert!(is_class_declaration("class Calc {"));
        assert!(!is_class_declaration("Class<?> c = Calc.class;"));
    }

    #[test]
    fn test_should_ignore_pre_anchor_lines() {
        let mut session = AnalysisSession::new();
        session.declaration_line = 10;
        let ev = event(
            r#"Step completed: "thread=main", com.app.Calc.sum(), line=7 bci=0"#,
            "7        int stale = 0;",
        );
        assert!(should_ignore_line(&session, &ev, &sum_invoked(), &test_method()));
    }

    #[test]
    fn test_should_ignore_delegation_span() {
        let mut session = AnalysisSession::new();
        session.inside_constructor_delegation = true;
        session.delegation_start_line = Some(5);
        let ev = event(
            r#"Step completed: "thread=main", com.app.Calc.<init>(), line=6 bci=0"#,
            "6        this.value = 0;",
        );
        assert!(should_ignore_line(&session, &ev, &sum_invoked(), &test_method()));
    }

    #[test]
    fn test_delegation_span_open_close() {
        let mut session = AnalysisSession::new();
        let ctor = Invoked::new("com.app.Calc(int)", "com.app.Calc").with_constructor(true);
        let start = event(
            r#"Step completed: "thread=main", com.app.Calc.<init>(), line=5 bci=0"#,
            "5        this(value, 0);",
        );
        assert!(is_constructor_delegation_start(&session, &start, &ctor));

        session.inside_constructor_delegation = true;
        session.delegation_start_line = Some(5);

        let within = event(
            r#"Step completed: "thread=main", com.app.Calc.<init>(), line=6 bci=4"#,
            "6        this.value = v;",
        );
        assert!(!is_constructor_delegation_end(&session, &within));

        let past = event(
            r#"Step completed: "thread=main", com.app.Calc.<init>(), line=7 bci=9"#,
            "7        this.scale = s;",
        );
        assert!(is_constructor_delegation_end(&session, &past));
    }

    #[test]
    fn test_declaration_anchor() {
        let session = AnalysisSession::new();
        let ev = event(
            r#"Step completed: "thread=main", com.app.Calc.sum(), line=10 bci=0"#,
            r#"10        CallCollector.record("com.app.Calc.sum(int, int)"); int total = a;"#,
        );
        assert!(is_declaration_anchor(&session, &ev, &sum_invoked()));

        let mut anchored = AnalysisSession::new();
        anchored.declaration_line = 10;
        assert!(!is_declaration_anchor(&anchored, &ev, &sum_invoked()));
    }

    #[test]
    fn test_loop_repetition_artifact() {
        let mut session = AnalysisSession::new();
        session.append_line(14);
        session.last_raw_source_line = "15            }".to_string();

        let repeat = event(
            r#"Step completed: "thread=main", com.app.Calc.sum(), line=15 bci=20"#,
            "15            }",
        );
        assert!(is_loop_repetition_artifact(&session, &repeat));

        let different = event(
            r#"Step completed: "thread=main", com.app.Calc.sum(), line=16 bci=22"#,
            "16            }",
        );
        assert!(!is_loop_repetition_artifact(&session, &different));
    }

    #[test]
    fn test_new_iteration_start() {
        let session = AnalysisSession::new();
        let hit = event(
            r#"Breakpoint hit: "thread=main", com.app.CalcTest.testSum(), line=20 bci=0"#,
            "20        int result = calc.sum(1, 2);",
        );
        assert!(is_new_iteration_start(&session, &hit, &sum_invoked(), &test_method()));

        let at_invocation_line = event(
            r#"Step completed: "thread=main", com.app.CalcTest.testSum(), line=20 bci=0"#,
            "20        int result = calc.sum(1, 2);",
        );
        assert!(is_new_iteration_start(&session, &at_invocation_line, &sum_invoked(), &test_method()));

        let elsewhere = event(
            r#"Step completed: "thread=main", com.app.CalcTest.testSum(), line=25 bci=0"#,
            "25        assertEquals(3, result);",
        );
        assert!(!is_new_iteration_start(&session, &elsewhere, &sum_invoked(), &test_method()));
    }
}
