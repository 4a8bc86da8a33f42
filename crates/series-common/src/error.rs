//! Error types for point extraction.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using ExtractError.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors raised while reading or decoding a single raster source, or while
/// validating an extraction request.
#[derive(Debug, Error)]
pub enum ExtractError {
    // === Grid Errors ===
    #[error("coordinate axis '{0}' has no entries")]
    EmptyGrid(String),

    #[error("variable '{0}' not found in source")]
    MissingVariable(String),

    #[error("index (y={y_index}, x={x_index}) outside grid of {ny}x{nx}")]
    IndexOutOfRange {
        y_index: usize,
        x_index: usize,
        ny: usize,
        nx: usize,
    },

    // === Format Errors ===
    #[error("invalid file: {0}")]
    InvalidFile(String),

    #[error("shape mismatch for '{name}': expected {expected}, got {got}")]
    ShapeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    // === Time Errors ===
    #[error("invalid time units '{units}': {message}")]
    InvalidTimeUnits { units: String, message: String },

    #[error("unsupported calendar: {0}")]
    UnsupportedCalendar(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    // === Request Errors ===
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Create an InvalidFile error.
    pub fn invalid_file(msg: impl Into<String>) -> Self {
        Self::InvalidFile(msg.into())
    }

    /// Create an InvalidRequest error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create an InvalidTimeUnits error.
    pub fn invalid_time_units(units: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTimeUnits {
            units: units.into(),
            message: message.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        name: impl Into<String>,
        expected: impl fmt::Display,
        got: impl fmt::Display,
    ) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Classify this error into the per-source failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::EmptyGrid(_) => ErrorKind::EmptyGrid,
            ExtractError::MissingVariable(_) => ErrorKind::MissingVariable,
            ExtractError::InvalidFile(_)
            | ExtractError::ShapeMismatch { .. }
            | ExtractError::Io(_) => ErrorKind::InvalidFile,
            ExtractError::InvalidTimeUnits { .. }
            | ExtractError::UnsupportedCalendar(_)
            | ExtractError::InvalidDate(_) => ErrorKind::InvalidTime,
            ExtractError::IndexOutOfRange { .. } | ExtractError::InvalidRequest(_) => {
                ErrorKind::InvalidRequest
            }
        }
    }
}

/// Failure category attached to each per-source error entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A coordinate axis had no entries.
    EmptyGrid,
    /// The requested variable is absent from the source.
    MissingVariable,
    /// The source could not be opened or parsed as the expected format.
    InvalidFile,
    /// The time axis could not be decoded.
    InvalidTime,
    /// The request itself was malformed.
    InvalidRequest,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::EmptyGrid => "EmptyGridError",
            ErrorKind::MissingVariable => "MissingVariableError",
            ErrorKind::InvalidFile => "InvalidFileError",
            ErrorKind::InvalidTime => "InvalidTimeError",
            ErrorKind::InvalidRequest => "InvalidRequestError",
        };
        write!(f, "{}", name)
    }
}
