//! Diagnostic types and utilities for Kotlin linting

use serde::{Deserialize, Serialize};
use std::fmt;

/// A diagnostic message produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Identifier of the rule that generated this diagnostic
    pub rule_id: String,
    /// Severity level of the diagnostic
    pub severity: Severity,
    /// Human-readable message; downstream tooling matches on this text
    pub message: String,
    /// Location in the source file
    pub location: Location,
    /// Whether running the rule in format mode fixes this diagnostic
    pub auto_correctable: bool,
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages
    Info,
    /// Hints for improvements
    Hint,
    /// Warnings that should be addressed
    Warning,
    /// Errors that must be fixed
    Error,
}

/// Location information for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Byte offset in the file
    pub offset: usize,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location,
            auto_correctable: false,
        }
    }

    /// Mark whether the diagnostic can be fixed automatically
    pub fn with_auto_correct(mut self, auto_correctable: bool) -> Self {
        self.auto_correctable = auto_correctable;
        self
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {}",
            self.location.line, self.location.column, self.rule_id, self.message
        )?;
        if self.auto_correctable {
            write!(f, " (fixable)")?;
        }
        Ok(())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Hint => "hint",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

impl Location {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// Source map for byte offset to line/column conversion
///
/// Keeps a table of line start offsets so lookups are a binary search.
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Byte offset of each line start (line 1 first)
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Create a source map from source text
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|&(_, ch)| ch == '\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to 1-based `(line, column)`
    ///
    /// Columns count characters, not bytes. Offsets past the end clamp to
    /// the end of the source.
    pub fn offset_to_position(&self, offset: usize, source: &str) -> (usize, usize) {
        let offset = offset.min(source.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        let line_start = self.line_starts[line_idx];
        let column = source
            .get(line_start..offset)
            .map_or(1, |text| text.chars().count() + 1);

        (line_idx + 1, column)
    }

    /// Build a [`Location`] for a byte offset
    pub fn location(&self, offset: usize, source: &str) -> Location {
        let (line, column) = self.offset_to_position(offset, source);
        Location::new(line, column, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position() {
        let source = "fun main() {\n    x\n}";
        let map = SourceMap::new(source);
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.offset_to_position(0, source), (1, 1));
        assert_eq!(map.offset_to_position(13, source), (2, 1));
        assert_eq!(map.offset_to_position(17, source), (2, 5));
        assert_eq!(map.offset_to_position(19, source), (3, 1));
        assert_eq!(map.offset_to_position(1_000, source), (3, 2));
    }

    #[test]
    fn test_columns_count_characters() {
        let source = "val é = 1";
        let map = SourceMap::new(source);
        // `1` is at byte 9 but is the ninth character
        assert_eq!(map.offset_to_position(9, source), (1, 9));
    }

    #[test]
    fn test_display_and_serde() {
        let diagnostic = Diagnostic::new(
            "indent",
            Severity::Error,
            "Unexpected Tab character(s)",
            Location::new(2, 1, 13),
        )
        .with_auto_correct(true);

        insta::assert_snapshot!(
            diagnostic.to_string(),
            @"2:1 indent Unexpected Tab character(s) (fixable)"
        );

        let json = serde_json::to_value(&diagnostic).expect("serialize");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["location"]["line"], 2);
        assert_eq!(json["auto_correctable"], true);

        let back: Diagnostic = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, diagnostic);
    }
}
