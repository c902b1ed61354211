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

//! Call-record side channel.
//!
//! While the debuggee runs under the debugger, its runtime instrumentation
//! records which methods the tested invoked called and serializes the result
//! to a one-shot file in the application work directory. After every session
//! the aggregator reads that file (when present), unions it into the running
//! per-invoked aggregate, and deletes it so the next session cannot read
//! stale data. Absence of the file means the tested invoked called nothing,
//! or was never entered; that is not an error.

use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};

use eyre::Result;
use tracing::{debug, warn};

/// Normalize a signature into the identity key used by the aggregate.
///
/// The debuggee and the analyzer render parameter lists with different
/// spacing, so whitespace is stripped; keying by the normalized form makes
/// repeated entries for the same invoked accumulate rather than overwrite.
pub fn invoked_identity(signature: &str) -> String {
    signature.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Aggregates call records across the sessions of one analyzer run.
#[derive(Debug, Default)]
pub struct CallAggregator {
    record_path: PathBuf,
    aggregate: HashMap<String, BTreeSet<String>>,
}

impl CallAggregator {
    /// Aggregator reading its one-shot records from `record_path`.
    pub fn new(record_path: impl Into<PathBuf>) -> Self {
        Self { record_path: record_path.into(), aggregate: HashMap::new() }
    }

    /// Path of the one-shot record file.
    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    /// Merge the session's call-record file into the aggregate, then delete
    /// it.
    ///
    /// The file is deleted even when deserialization fails, to avoid a stale
    /// read by the next session; the failure itself is logged and swallowed,
    /// so a corrupt record simply contributes nothing.
    pub fn merge_session_records(&mut self) -> Result<()> {
        if !self.record_path.exists() {
            debug!("no call record at {}; tested invoked called nothing", self.record_path.display());
            return Ok(());
        }

        let contents = fs::read_to_string(&self.record_path);
        let parsed = contents
            .map_err(eyre::Report::from)
            .and_then(|raw| {
                serde_json::from_str::<HashMap<String, BTreeSet<String>>>(&raw)
                    .map_err(eyre::Report::from)
            });

        match parsed {
            Ok(records) => {
                for (signature, called) in records {
                    let entry = self.aggregate.entry(invoked_identity(&signature)).or_default();
                    entry.extend(called);
                }
            }
            Err(err) => {
                warn!("discarding unreadable call record {}: {err}", self.record_path.display());
            }
        }

        if let Err(err) = fs::remove_file(&self.record_path) {
            warn!("could not delete call record {}: {err}", self.record_path.display());
        }
        Ok(())
    }

    /// The set of signatures called by the invoked with the given signature,
    /// across all merged sessions.
    pub fn methods_called_by(&self, signature: &str) -> BTreeSet<String> {
        self.aggregate.get(&invoked_identity(signature)).cloned().unwrap_or_default()
    }

    /// Whether no session has contributed any call record yet.
    pub fn is_empty(&self) -> bool {
        self.aggregate.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_strips_whitespace() {
        assert_eq!(
            invoked_identity("com.app.Calc.sum(int, int)"),
            invoked_identity("com.app.Calc.sum(int,int)")
        );
    }

    #[test]
    fn test_missing_record_is_not_an_error() {
        let mut aggregator = CallAggregator::new("/nonexistent/dir/mcti.json");
        assert!(aggregator.merge_session_records().is_ok());
        assert!(aggregator.is_empty());
    }
}
