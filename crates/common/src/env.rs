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

//! Environment variable name constants for TestPath configuration.
//!
//! This module provides constant string names for all environment variables
//! used by TestPath. These constants ensure consistency across the codebase
//! and provide a single source of truth for environment variable names.

/// Environment variable for controlling selective runtime assertions.
///
/// This variable enables fine-grained control over which assertion macros are
/// active at runtime, similar to how `RUST_LOG` controls logging.
///
/// # Syntax
///
/// - `TESTPATH_ASSERT=*` or `TESTPATH_ASSERT=all` - Enable all assertions
/// - `TESTPATH_ASSERT=testpath_engine` - Enable assertions in the engine crate
///   and its submodules
/// - `TESTPATH_ASSERT=testpath_engine::classifier,testpath_common::types` -
///   Multiple targets (comma-separated)
///
/// # Default
///
/// When not set or empty, all assertions are **disabled**.
///
/// # Related
///
/// See [`crate::macros`] for the assertion macros that use this variable.
pub const TESTPATH_ASSERT: &str = "TESTPATH_ASSERT";

/// Environment variable overriding the per-session analysis timeout.
///
/// The value is interpreted as milliseconds and must parse as a `u64`;
/// invalid values are ignored and the built-in default (10 minutes) is kept.
///
/// # Examples
///
/// ```bash
/// # Abort analyzer sessions after 30 seconds
/// TESTPATH_TIMEOUT_MS=30000 cargo test
/// ```
pub const TESTPATH_TIMEOUT_MS: &str = "TESTPATH_TIMEOUT_MS";

/// Environment variable for the application work directory.
///
/// The call-record side channel (`mcti.json`, written by the instrumented
/// debuggee) is looked up relative to this directory. When not set, the
/// process current directory is used.
///
/// # Examples
///
/// ```bash
/// TESTPATH_WORK_DIR=/tmp/testpath-run cargo run
/// ```
pub const TESTPATH_WORK_DIR: &str = "TESTPATH_WORK_DIR";

/// File name of the call-record side channel within the work directory.
///
/// The debuggee's runtime instrumentation writes this file once per session;
/// the engine reads it exactly once at session end and deletes it.
pub const CALL_RECORD_FILE: &str = "mcti.json";
