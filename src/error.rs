//! Error types for parsing and encoding.
//!
//! Every failure aborts the call that raised it; no partial document or partial
//! output is ever returned.
//!
//! ## Error Categories
//!
//! - **Lex errors**: characters the tokenizer cannot classify, unterminated quoted
//!   identifiers, and indentation widths with no matching open level
//! - **Parse errors**: tokens out of place, rows whose arity does not match their
//!   schema header, and declared row counts that disagree with the rows present
//! - **Encode errors**: documents whose root is not a mapping, or values with no
//!   representation in the notation
//!
//! Lex and parse errors carry the 1-based line and column of the offending input.
//!
//! ## Examples
//!
//! ```rust
//! use rtoon::{parse, ErrorKind};
//!
//! let err = parse("users[2]{id,name}:\n  1,Ada\n").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Parse);
//! assert!(err.to_string().contains("declared 2"));
//! ```

use std::fmt;
use thiserror::Error;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Encode,
    Io,
}

/// Represents all possible errors raised while tokenizing, parsing or encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A character that cannot start any token
    #[error("Unexpected character {ch:?} at line {line}, column {col}")]
    UnexpectedChar { line: usize, col: usize, ch: char },

    /// A quoted identifier whose closing quote is missing on its line
    #[error("Unterminated string at line {line}, column {col}")]
    UnterminatedString { line: usize, col: usize },

    /// A backslash at the very end of a line inside a quoted identifier
    #[error("Unterminated escape at line {line}, column {col}")]
    UnterminatedEscape { line: usize, col: usize },

    /// An indentation width that matches no level on the indent stack
    #[error("Inconsistent indentation at line {line}, column {col}:\n{context}\nFound {found} spaces, but no enclosing block is indented that far\nHelp: dedent back to the width of an enclosing block")]
    InconsistentIndent {
        line: usize,
        col: usize,
        found: usize,
        context: String,
    },

    /// A token the grammar does not allow at this point
    #[error("Unexpected {found} at line {line}, column {col}: expected {expected}")]
    UnexpectedToken {
        line: usize,
        col: usize,
        found: String,
        expected: String,
    },

    /// A schema row with a different number of cells than the header declares fields
    #[error("Row at line {line}, column {col} has {found} values, but the schema declares {expected} fields")]
    ArityMismatch {
        line: usize,
        col: usize,
        expected: usize,
        found: usize,
    },

    /// A sized schema header whose row count disagrees with the rows that follow
    #[error("Schema {name:?} at line {line}, column {col} declared {declared} rows, found {found}")]
    SizeMismatch {
        line: usize,
        col: usize,
        name: String,
        declared: usize,
        found: usize,
    },

    /// A key assigned twice within one mapping
    #[error("Duplicate key {key:?} at line {line}, column {col}")]
    DuplicateKey { line: usize, col: usize, key: String },

    /// A row built from nested entries that never assigned one of the header's fields
    #[error("Row starting at line {line}, column {col} is missing field {field:?}")]
    MissingField {
        line: usize,
        col: usize,
        field: String,
    },

    /// Nesting deeper than the configured maximum
    #[error("Nesting depth exceeds the limit of {limit} at line {line}, column {col}")]
    DepthLimitExceeded { line: usize, col: usize, limit: usize },

    /// The encoder was handed a document whose root is not a mapping
    #[error("Cannot encode document: root must be a mapping, found {found}")]
    RootNotMapping { found: String },

    /// A value with no representation in the notation
    #[error("Cannot encode value at {key:?}: {msg}")]
    UnsupportedValue { key: String, msg: String },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates an inconsistent-indentation error, keeping the offending source line as context.
    pub fn inconsistent_indent(line: usize, found: usize, context: &str) -> Self {
        Error::InconsistentIndent {
            line,
            col: found + 1,
            found,
            context: context.to_string(),
        }
    }

    /// Creates an unexpected-token error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtoon::Error;
    ///
    /// let err = Error::unexpected_token(3, 7, "','", "':'");
    /// assert!(err.to_string().contains("line 3, column 7"));
    /// ```
    pub fn unexpected_token(line: usize, col: usize, found: &str, expected: &str) -> Self {
        Error::UnexpectedToken {
            line,
            col,
            found: found.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Creates an unsupported-value error for the encoder.
    pub fn unsupported_value<T: fmt::Display>(key: &str, msg: T) -> Self {
        Error::UnsupportedValue {
            key: key.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates an I/O error for reading or writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the category this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedChar { .. }
            | Error::UnterminatedString { .. }
            | Error::UnterminatedEscape { .. }
            | Error::InconsistentIndent { .. } => ErrorKind::Lex,
            Error::UnexpectedToken { .. }
            | Error::ArityMismatch { .. }
            | Error::SizeMismatch { .. }
            | Error::DuplicateKey { .. }
            | Error::MissingField { .. }
            | Error::DepthLimitExceeded { .. } => ErrorKind::Parse,
            Error::RootNotMapping { .. } | Error::UnsupportedValue { .. } => ErrorKind::Encode,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns the 1-based `(line, column)` of the error, when it has a source position.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match *self {
            Error::UnexpectedChar { line, col, .. }
            | Error::UnterminatedString { line, col }
            | Error::UnterminatedEscape { line, col }
            | Error::InconsistentIndent { line, col, .. }
            | Error::UnexpectedToken { line, col, .. }
            | Error::ArityMismatch { line, col, .. }
            | Error::SizeMismatch { line, col, .. }
            | Error::DuplicateKey { line, col, .. }
            | Error::MissingField { line, col, .. }
            | Error::DepthLimitExceeded { line, col, .. } => Some((line, col)),
            Error::RootNotMapping { .. } | Error::UnsupportedValue { .. } | Error::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
