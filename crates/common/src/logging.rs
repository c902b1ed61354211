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

//! Logging setup and utilities for consistent logging across TestPath components.
//!
//! Logging is driven by `RUST_LOG` through tracing-subscriber's env-filter.
//! Binaries call [`init_logging`] once at startup; tests call
//! [`ensure_test_logging`], which is idempotent and safe to invoke from every
//! test function.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber for a TestPath process.
///
/// The filter is taken from `RUST_LOG`, falling back to `default_directive`
/// (or `"info"` when `None`). Calling this more than once is a no-op.
pub fn init_logging(default_directive: Option<&str>) {
    let directive = default_directive.unwrap_or("info").to_string();
    INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
        fmt().with_env_filter(filter).with_target(true).init();
    });
}

/// Initialize logging for tests.
///
/// Identical to [`init_logging`] but uses a test writer so output is captured
/// per test, and defaults to `"debug"` when `RUST_LOG` is unset. Idempotent;
/// every test can call it unconditionally as its first statement.
pub fn ensure_test_logging(default_directive: Option<&str>) {
    let directive = default_directive.unwrap_or("debug").to_string();
    INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}
