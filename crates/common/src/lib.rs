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

//! TestPath Common - Shared functionality for TestPath components
//!
//! This crate provides the types and utilities shared between the engine
//! crate and any downstream consumer: descriptors for tested invokeds and
//! test methods, environment variable names, logging setup, and the
//! selective runtime assertion macros.

/// Shared types describing the tested invoked and the test method driving it
pub mod types;

/// Environment variable name constants for TestPath configuration
pub mod env;
/// Logging setup and utilities for consistent logging across TestPath components
pub mod logging;
/// Path-based conditional assertion macros
pub mod macros;

pub use env::*;
pub use logging::*;
pub use types::*;
