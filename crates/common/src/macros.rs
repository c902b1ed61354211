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

//! Path-based conditional assertion macros for TestPath.
//!
//! Assertion macros that can be selectively enabled at runtime based on
//! module paths using the `TESTPATH_ASSERT` environment variable, similar to
//! how `RUST_LOG` controls logging.
//!
//! # Environment Variable Syntax
//!
//! - **Enable all assertions**: `TESTPATH_ASSERT=*` or `TESTPATH_ASSERT=all`
//! - **Enable specific crate**: `TESTPATH_ASSERT=testpath_engine`
//! - **Enable specific module**: `TESTPATH_ASSERT=testpath_engine::classifier`
//! - **Multiple targets**: comma-separated list of the above
//!
//! Patterns match by prefix, so `testpath_engine` also enables assertions in
//! every submodule of the engine crate. When `TESTPATH_ASSERT` is not set or
//! empty, all assertions are disabled.

use once_cell::sync::Lazy;
use std::env;

/// Global storage for assertion target patterns from the TESTPATH_ASSERT environment variable
static ASSERTION_TARGETS: Lazy<Vec<String>> = Lazy::new(|| match env::var("TESTPATH_ASSERT") {
    Ok(val) if !val.is_empty() => {
        val.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    }
    _ => Vec::new(),
});

/// Check if assertions are enabled for the given module path.
///
/// Used internally by the assertion macros. Returns `true` when any
/// configured target is a wildcard (`*`/`all`) or a prefix of `module_path`.
pub fn is_assertion_enabled(module_path: &str) -> bool {
    if ASSERTION_TARGETS.is_empty() {
        return false;
    }

    for target in ASSERTION_TARGETS.iter() {
        if target == "*" || target == "all" {
            return true;
        }
        if module_path.starts_with(target.as_str()) {
            return true;
        }
    }

    false
}

/// Helper marked with #[cold] to hint that assertion checks are rarely taken
#[cold]
#[inline(never)]
pub fn cold_path() {}

/// Assert a condition only when enabled via the `TESTPATH_ASSERT` environment variable.
///
/// # Examples
///
/// ```ignore
/// use testpath_common::tp_assert;
///
/// let value = 42;
/// tp_assert!(value == 42);
/// tp_assert!(value == 42, "value should be 42, got {}", value);
/// ```
#[macro_export]
macro_rules! tp_assert {
    ($($arg:tt)*) => {
        if $crate::macros::is_assertion_enabled(module_path!()) {
            $crate::macros::cold_path();
            assert!($($arg)*);
        }
    };
}

/// Assert two expressions are equal only when enabled via `TESTPATH_ASSERT`.
///
/// # Examples
///
/// ```ignore
/// use testpath_common::tp_assert_eq;
///
/// let a = 1 + 1;
/// tp_assert_eq!(a, 2);
/// ```
#[macro_export]
macro_rules! tp_assert_eq {
    ($($arg:tt)*) => {
        if $crate::macros::is_assertion_enabled(module_path!()) {
            $crate::macros::cold_path();
            assert_eq!($($arg)*);
        }
    };
}
