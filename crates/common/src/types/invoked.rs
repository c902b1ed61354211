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

use std::{fmt::Display, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Descriptor of the method or constructor whose execution path is computed.
///
/// Instances are produced by the instrumentation/compilation stage with all
/// paths already resolved and are immutable afterwards. The signature is the
/// qualified Java signature as it appears in source, e.g.
/// `com.app.Calc.sum(int, int)`; for constructors it is the qualified class
/// name followed by the parameter list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Invoked {
    /// Qualified signature of the invoked (method or constructor).
    signature: String,
    /// Qualified signature of the declaring class.
    class_signature: String,
    /// Path to the source file declaring the invoked.
    source_path: PathBuf,
    /// Path to the compiled artifact (`.class` file) of the declaring class.
    binary_path: PathBuf,
    /// Package of the declaring class.
    package: String,
    /// Line in the test method at which the invoked is called (1-based).
    invocation_line: usize,
    /// Parameter types, in declaration order.
    parameter_types: Vec<String>,
    /// Whether the invoked is a constructor.
    constructor: bool,
}

impl Invoked {
    /// Create a descriptor with the mandatory identity fields; everything
    /// else is supplied through the `with_*` builder methods.
    pub fn new(signature: impl Into<String>, class_signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            class_signature: class_signature.into(),
            source_path: PathBuf::new(),
            binary_path: PathBuf::new(),
            package: String::new(),
            invocation_line: 0,
            parameter_types: Vec::new(),
            constructor: false,
        }
    }

    /// Set the source file path.
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Set the compiled artifact path.
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    /// Set the package of the declaring class.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Set the line in the test method at which the invoked is called.
    pub fn with_invocation_line(mut self, line: usize) -> Self {
        self.invocation_line = line;
        self
    }

    /// Set the parameter types.
    pub fn with_parameter_types(mut self, types: Vec<String>) -> Self {
        self.parameter_types = types;
        self
    }

    /// Mark the invoked as a constructor.
    pub fn with_constructor(mut self, constructor: bool) -> Self {
        self.constructor = constructor;
        self
    }

    /// Qualified signature of the invoked.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Qualified signature of the declaring class.
    pub fn class_signature(&self) -> &str {
        &self.class_signature
    }

    /// Source file declaring the invoked.
    pub fn source_path(&self) -> &PathBuf {
        &self.source_path
    }

    /// Compiled artifact of the declaring class.
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    /// Package of the declaring class.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Line in the test method at which the invoked is called.
    pub fn invocation_line(&self) -> usize {
        self.invocation_line
    }

    /// Parameter types, in declaration order.
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    /// Whether the invoked is a constructor.
    pub fn is_constructor(&self) -> bool {
        self.constructor
    }

    /// Simple (unqualified) name of the invoked.
    ///
    /// For constructors this is the simple class name.
    pub fn name(&self) -> &str {
        simple_name(&self.signature)
    }

    /// Simple (unqualified) name of the declaring class.
    pub fn class_name(&self) -> &str {
        last_segment(&self.class_signature)
    }

    /// Whether the declaring class is anonymous.
    ///
    /// Java compilers name anonymous classes with a numeric suffix after the
    /// enclosing class, e.g. `com.app.Outer$1`.
    pub fn belongs_to_anonymous_class(&self) -> bool {
        match self.class_signature.rsplit_once('$') {
            Some((_, suffix)) => !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    }
}

impl Display for Invoked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signature)
    }
}

/// Descriptor of the test method exercising the tested invoked.
///
/// Same shape as [`Invoked`] but identifies the test method itself, so there
/// is no invocation line and no parameter list (JUnit test methods take
/// none).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TestMethodRef {
    /// Qualified signature of the test method.
    signature: String,
    /// Qualified signature of the test class.
    class_signature: String,
    /// Path to the test source file.
    source_path: PathBuf,
    /// Path to the compiled test class.
    binary_path: PathBuf,
    /// Package of the test class.
    package: String,
}

impl TestMethodRef {
    /// Create a test method descriptor with the mandatory identity fields.
    pub fn new(signature: impl Into<String>, class_signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            class_signature: class_signature.into(),
            source_path: PathBuf::new(),
            binary_path: PathBuf::new(),
            package: String::new(),
        }
    }

    /// Set the test source file path.
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Set the compiled test class path.
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    /// Set the package of the test class.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Qualified signature of the test method.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Qualified signature of the test class.
    pub fn class_signature(&self) -> &str {
        &self.class_signature
    }

    /// Test source file.
    pub fn source_path(&self) -> &PathBuf {
        &self.source_path
    }

    /// Compiled test class.
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    /// Package of the test class.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Simple (unqualified) name of the test method.
    pub fn name(&self) -> &str {
        simple_name(&self.signature)
    }

    /// Simple (unqualified) name of the test class.
    pub fn class_name(&self) -> &str {
        last_segment(&self.class_signature)
    }
}

impl Display for TestMethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signature)
    }
}

/// Last dot-separated segment of a qualified name, with any parameter list
/// stripped first.
fn simple_name(signature: &str) -> &str {
    let without_params = signature.split('(').next().unwrap_or(signature);
    last_segment(without_params)
}

fn last_segment(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoked_simple_names() {
        let invoked = Invoked::new("com.app.Calc.sum(int, int)", "com.app.Calc")
            .with_package("com.app")
            .with_invocation_line(20);

        assert_eq!(invoked.name(), "sum");
        assert_eq!(invoked.class_name(), "Calc");
        assert_eq!(invoked.invocation_line(), 20);
        assert!(!invoked.is_constructor());
        assert!(!invoked.belongs_to_anonymous_class());
    }

    #[test]
    fn test_constructor_name_is_class_name() {
        let ctor = Invoked::new("com.app.Calc(int)", "com.app.Calc").with_constructor(true);

        assert_eq!(ctor.name(), "Calc");
        assert!(ctor.is_constructor());
    }

    #[test]
    fn test_anonymous_class_detection() {
        let anon = Invoked::new("com.app.Outer$1(", "com.app.Outer$1").with_constructor(true);
        let nested = Invoked::new("com.app.Outer$Inner.run()", "com.app.Outer$Inner");

        assert!(anon.belongs_to_anonymous_class());
        assert!(!nested.belongs_to_anonymous_class());
    }

    #[test]
    fn test_test_method_ref_names() {
        let test = TestMethodRef::new("com.app.CalcTest.testSum()", "com.app.CalcTest");

        assert_eq!(test.name(), "testSum");
        assert_eq!(test.class_name(), "CalcTest");
    }
}
