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

//! Analyzer configuration resolution.
//!
//! The environment-driven tests mutate process-wide state and are
//! serialized.

use std::{env, path::Path, time::Duration};

use serial_test::serial;
use testpath_common::env::{CALL_RECORD_FILE, TESTPATH_TIMEOUT_MS};
use testpath_engine::AnalyzerConfig;

#[test]
#[serial]
fn test_default_timeout_without_environment_override() {
    env::remove_var(TESTPATH_TIMEOUT_MS);
    let config = AnalyzerConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(600));
}

#[test]
#[serial]
fn test_timeout_environment_override() {
    env::set_var(TESTPATH_TIMEOUT_MS, "1500");
    let config = AnalyzerConfig::default();
    env::remove_var(TESTPATH_TIMEOUT_MS);

    assert_eq!(config.timeout, Duration::from_millis(1500));
}

#[test]
#[serial]
fn test_unparseable_timeout_falls_back_to_default() {
    env::set_var(TESTPATH_TIMEOUT_MS, "soon");
    let config = AnalyzerConfig::default();
    env::remove_var(TESTPATH_TIMEOUT_MS);

    assert_eq!(config.timeout, Duration::from_secs(600));
}

#[test]
fn test_builder_overrides() {
    let config = AnalyzerConfig::default()
        .with_timeout(Duration::from_secs(5))
        .with_work_dir("/tmp/testpath-work");

    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.work_dir, Path::new("/tmp/testpath-work"));
}

#[test]
fn test_call_record_path_is_inside_work_dir() {
    let config = AnalyzerConfig::default().with_work_dir("/tmp/testpath-work");
    assert_eq!(
        config.call_record_path(),
        Path::new("/tmp/testpath-work").join(CALL_RECORD_FILE)
    );
}
