use serde::{Deserialize, Serialize};

/// One located occurrence of a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Absolute or repo-relative path of the containing file.
    pub filename: String,
    /// 1-based line number as reported by the search tool.
    pub line_number: u64,
    /// 0-based byte offset of the match start within the line in JSON
    /// mode; the tool-reported column in legacy mode.
    pub column: u64,
    /// Byte length of the matched span. 0 in legacy mode, which does not
    /// encode a span.
    pub match_length: u64,
}

/// Ordered collection of match records from one search. Immutable once
/// published; indexable by position for navigation.
pub type ResultSet = Vec<MatchRecord>;

/// A confirmed search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    /// Absolute path or a path expression with environment variables.
    pub path: String,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            path: path.into(),
        }
    }
}

/// Wire format emitted by the search executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Newline-delimited JSON records, the preferred format.
    JsonLines,
    /// Colon-delimited plain text, kept for tools without JSON output.
    LegacyText,
}
