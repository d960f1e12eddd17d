//! Error and warning types for dialect operations

use serde::Serialize;
use std::fmt;

/// Errors that can occur when selecting or registering dialects
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Dialect not found in registry
    DialectNotFound(String),
    /// Descriptor rejected at registration
    InvalidDialect(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::DialectNotFound(name) => write!(f, "Dialect '{name}' not found"),
            FormatError::InvalidDialect(msg) => write!(f, "Invalid dialect: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Errors from structured document edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::OutOfRange { index, len } => {
                write!(f, "Block index {index} out of range for document of {len} blocks")
            }
        }
    }
}

impl std::error::Error for EditError {}

/// Non-fatal conditions reported next to a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// 1-based source line, when the condition is tied to one.
    pub line: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Malformed input degraded to verbatim text.
    ParseRecovery,
    /// Invalid byte sequence replaced with U+FFFD.
    Encoding,
}

impl Warning {
    pub fn recovery(line: usize, message: impl Into<String>) -> Self {
        Warning {
            line: Some(line),
            kind: WarningKind::ParseRecovery,
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Warning {
            line: None,
            kind: WarningKind::Encoding,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            WarningKind::ParseRecovery => "parse recovery",
            WarningKind::Encoding => "encoding",
        };
        match self.line {
            Some(line) => write!(f, "line {line}: {kind}: {}", self.message),
            None => write!(f, "{kind}: {}", self.message),
        }
    }
}
