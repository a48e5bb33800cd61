//! Error types for hdftable.
//!
//! This module provides a unified error handling approach using `thiserror`.

use thiserror::Error;

/// Result type alias for hdftable operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors that can occur while accessing typed table data.
#[derive(Debug, Error)]
pub enum TableError {
    /// A strategy was asked to handle a datatype it does not support.
    #[error("{strategy}: datatype is not {expected}")]
    TypeMismatch {
        strategy: &'static str,
        expected: &'static str,
    },

    /// The compound index map came out empty.
    #[error("invalid {map} mapping of size 0 built")]
    EmptyIndexMap { map: &'static str },

    /// The raw buffer does not have the shape the datatype requires.
    #[error("unexpected buffer shape: expected {expected}, found {found}")]
    BufferShape {
        expected: &'static str,
        found: &'static str,
    },

    /// An element index fell outside the buffer.
    #[error("index {index} out of range for buffer of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A column index has no entry in the compound index map.
    #[error("column {0} is not mapped to any compound member")]
    UnmappedColumn(usize),

    /// Text could not be parsed into the element representation.
    #[error("cannot parse '{text}' as {target}")]
    Parse { text: String, target: &'static str },

    /// A proposed edit failed validation.
    #[error("Failed to update value at ({row}, {col}) to '{value}': {reason}")]
    Validation {
        row: usize,
        col: usize,
        value: String,
        reason: String,
    },

    /// The operation is not meaningful for this strategy.
    #[error("{0}")]
    Unsupported(String),

    /// The datatype expression could not be parsed.
    #[error("invalid datatype expression at offset {offset}: {message}")]
    TypeExpr { offset: usize, message: String },

    /// The external reference resolver failed.
    #[error("reference resolution failed: {0}")]
    Reference(String),

    /// The data source could not supply the requested frame.
    #[error("data source error: {0}")]
    Source(String),
}

impl TableError {
    /// Create a TypeMismatch error.
    pub fn type_mismatch(strategy: &'static str, expected: &'static str) -> Self {
        Self::TypeMismatch { strategy, expected }
    }

    /// Create a BufferShape error.
    pub fn buffer_shape(expected: &'static str, found: &'static str) -> Self {
        Self::BufferShape { expected, found }
    }

    /// Create a Parse error.
    pub fn parse(text: impl Into<String>, target: &'static str) -> Self {
        Self::Parse {
            text: text.into(),
            target,
        }
    }

    /// Create a Validation error.
    pub fn validation(
        row: usize,
        col: usize,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            row,
            col,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an Unsupported error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Create a TypeExpr error.
    pub fn type_expr(offset: usize, message: impl Into<String>) -> Self {
        Self::TypeExpr {
            offset,
            message: message.into(),
        }
    }

    /// The human readable reason of a validation rejection, or the full
    /// message for any other error.
    pub fn reason(&self) -> String {
        match self {
            Self::Validation { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}
