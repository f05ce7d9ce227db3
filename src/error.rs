//! Error types for record decoding and URI resolution.
//!
//! This module provides the [`MarcError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all library operations.
///
/// Malformed-record errors are fatal for a single record only: callers log
/// them (with the control number when known) and continue with the next one.
/// [`MarcError::UnknownScheme`] means "no URI can be produced" and should lead
/// to omitting the affected record or relation, not to aborting a batch.
#[derive(Error, Debug)]
pub enum MarcError {
    /// The record is malformed, e.g. it lacks a leader or a mandatory field.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Human readable description
        message: String,
        /// Control number (001) of the offending record, if known
        control_number: Option<String>,
    },

    /// No URI template is known for the vocabulary (or for the requested role).
    #[error("{}", unknown_scheme_message(.code.as_deref()))]
    UnknownScheme {
        /// Scheme code, `None` when the record did not name one
        code: Option<String>,
        /// Control number (001) of the record being processed, if known
        control_number: Option<String>,
    },

    /// Error indicating an invalid leader (24-character header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error during parsing of MARCXML data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A URI template could not be parsed or rendered.
    #[error("URI template error: {0}")]
    Template(String),

    /// The vocabulary configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn unknown_scheme_message(code: Option<&str>) -> String {
    match code {
        Some(code) => format!(
            "Cannot generate URIs for unknown classification scheme or subject vocabulary \"{code}\"."
        ),
        None => "Could not find classification scheme or subject vocabulary code.".to_string(),
    }
}

impl MarcError {
    /// Shorthand for an [`MarcError::InvalidRecord`] without a control number.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        MarcError::InvalidRecord {
            message: message.into(),
            control_number: None,
        }
    }

    /// Shorthand for an [`MarcError::UnknownScheme`] without a control number.
    #[must_use]
    pub fn unknown_scheme(code: Option<&str>) -> Self {
        MarcError::UnknownScheme {
            code: code.map(str::to_string),
            control_number: None,
        }
    }

    /// Control number attached to this error, if any.
    #[must_use]
    pub fn control_number(&self) -> Option<&str> {
        match self {
            MarcError::InvalidRecord { control_number, .. }
            | MarcError::UnknownScheme { control_number, .. } => control_number.as_deref(),
            _ => None,
        }
    }

    /// Attach a control number to a record-level error that has none yet.
    ///
    /// Errors that are not tied to a record are returned unchanged.
    #[must_use]
    pub fn with_control_number(self, number: Option<&str>) -> Self {
        match self {
            MarcError::InvalidRecord {
                message,
                control_number: None,
            } => MarcError::InvalidRecord {
                message,
                control_number: number.map(str::to_string),
            },
            MarcError::UnknownScheme {
                code,
                control_number: None,
            } => MarcError::UnknownScheme {
                code,
                control_number: number.map(str::to_string),
            },
            other => other,
        }
    }

    /// Whether this error means "no URI template available".
    #[must_use]
    pub fn is_unknown_scheme(&self) -> bool {
        matches!(self, MarcError::UnknownScheme { .. })
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
