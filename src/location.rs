//! Source-location tracking shared by every stage of the pipeline.

use std::cmp::Ordering;
use std::fmt;

/// A single point (or span) in an original source file, as seen *after*
/// `#line`-adjustment back to the file the user actually wrote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeLocation {
    pub source_file: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl CodeLocation {
    pub fn new(source_file: impl Into<String>, start_line: u32, start_column: u32) -> Self {
        let source_file = source_file.into();
        CodeLocation {
            start_line,
            start_column,
            end_line: start_line,
            end_column: start_column,
            source_file,
        }
    }

    pub fn with_end(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    fn cmp_tuple(&self) -> (&str, u32, u32, u32, u32) {
        (
            &self.source_file,
            self.start_line,
            self.start_column,
            self.end_line,
            self.end_column,
        )
    }
}

impl PartialOrd for CodeLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CodeLocation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_tuple().cmp(&other.cmp_tuple())
    }
}

impl fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.source_file, self.start_line, self.start_column
        )
    }
}
