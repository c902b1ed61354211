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

//! Shared types describing the subject of an analysis session.

mod invoked;

pub use invoked::*;

/// One test path: the ordered source line numbers of the tested invoked that
/// were executed during a single invocation.
pub type TestPath = Vec<usize>;
