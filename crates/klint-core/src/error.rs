//! Error types and handling for klint operations

use thiserror::Error;

use crate::cst::ParseError;

/// Main error type for klint operations
///
/// Style violations are never errors; they are reported as
/// [`crate::diagnostics::Diagnostic`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KlintError {
    /// A configuration property holds a value that cannot be used
    #[error("Invalid value '{value}' for configuration property '{key}'")]
    Config { key: String, value: String },

    /// Source text could not be parsed
    #[error("Parse error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },

    /// Rule setup or execution problems
    #[error("Rule error in '{rule_id}': {message}")]
    Rule { rule_id: String, message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Parse,
    Rule,
}

impl KlintError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            KlintError::Config { .. } => ErrorKind::Config,
            KlintError::Parse { .. } => ErrorKind::Parse,
            KlintError::Rule { .. } => ErrorKind::Rule,
        }
    }

    /// Check if this error is recoverable (processing of other sources can continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::Rule)
    }

    /// Create a configuration error
    pub fn config_error(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>, offset: usize) -> Self {
        Self::Parse {
            message: message.into(),
            offset,
        }
    }

    /// Create a rule error
    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }
}

impl From<ParseError> for KlintError {
    fn from(error: ParseError) -> Self {
        Self::parse_error(error.message, error.span.start)
    }
}
