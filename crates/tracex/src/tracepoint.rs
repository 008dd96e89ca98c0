use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

/// A call site: file, line and enclosing function.
///
/// Usually captured with [`here!`](crate::here). Strings coming from `file!()`
/// and `function_name!` are static and are borrowed; locations supplied
/// by an embedding runtime are owned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    pub file: Cow<'static, str>,
    pub line: u32,
    pub function: Cow<'static, str>,
}

impl SourceLoc {
    #[must_use]
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32, function: impl Into<Cow<'static, str>>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} in {}", self.file, self.line, self.function)
    }
}

/// One propagation event of an exception: where it happened and what was said.
///
/// Created once per raise or rethrow and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tracepoint {
    file: Cow<'static, str>,
    line: u32,
    function: Cow<'static, str>,
    message: String,
}

impl Tracepoint {
    #[must_use]
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        line: u32,
        function: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
            message: message.into(),
        }
    }

    /// Creates a tracepoint at `loc`.
    #[must_use]
    pub fn at(loc: SourceLoc, message: impl Into<String>) -> Self {
        Self {
            file: loc.file,
            line: loc.line,
            function: loc.function,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Writes the two traceback lines for this tracepoint at position `index`.
    pub(crate) fn write_frame(&self, out: &mut dyn fmt::Write, index: usize) -> fmt::Result {
        writeln!(out, "  File \"{}\", line {}, in {}", self.file, self.line, self.function)?;
        writeln!(out, "    {} {{{index}}}", self.message)
    }
}
