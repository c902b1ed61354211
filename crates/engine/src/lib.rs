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

//! TestPath engine: reconstructs the execution path a test exercises through
//! one method or constructor by driving a line-stepping debugger subprocess.
//!
//! The entry point is [`PathAnalyzer`]: give it the tested invoked, the test
//! method, a debugger driver and a configuration, call
//! [`PathAnalyzer::analyze`], and query the resulting test paths. One session
//! analyzes one (invoked, test method) pair; a test method that invokes the
//! target several times yields several paths.
//!
//! ```no_run
//! use testpath_common::types::{Invoked, TestMethodRef};
//! use testpath_engine::{AnalyzerConfig, JdbConfig, PathAnalyzer};
//!
//! # fn main() -> Result<(), testpath_engine::AnalyzerError> {
//! let invoked = Invoked::new("com.app.Calc.sum(int, int)", "com.app.Calc")
//!     .with_invocation_line(20);
//! let test = TestMethodRef::new("com.app.CalcTest.testSum()", "com.app.CalcTest");
//! let jdb = JdbConfig::new("com.app.CalcTest").with_class_path("target/test-classes");
//!
//! let mut analyzer =
//!     PathAnalyzer::with_jdb(invoked, test, jdb, AnalyzerConfig::default());
//! let paths = analyzer.analyze()?.test_paths();
//! # let _ = paths;
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod calls;
pub mod classifier;
pub mod debugger;
pub mod error;
pub mod event;
pub mod session;
pub mod timeout;

pub use analyzer::{AnalyzerConfig, AnalyzerState, PathAnalyzer};
pub use calls::CallAggregator;
pub use debugger::{DebuggerDriver, JdbConfig, JdbDriver, KillSwitch};
pub use error::AnalyzerError;
pub use event::{classify_output, DebuggerEvent, OutputKind};
pub use session::AnalysisSession;
pub use timeout::{check_timeout, disable_timeout, enable_timeout, TimeoutHandle};
