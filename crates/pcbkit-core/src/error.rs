//! Error handling for PCBKit
//!
//! Provides the error taxonomy shared by the tool layer and the export
//! pipeline:
//! - Tool errors (dispatch sequencing, applicability)
//! - Validation errors (malformed settings records)
//! - Export errors (artifact generation, progress callback aborts)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::types::{ExportKind, ObjectType};
use thiserror::Error;

/// Tool layer error type
///
/// Raised by the tool dispatcher when the caller drives a tool out of
/// sequence. These are programming errors of the caller and are not meant
/// to be shown to the end user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// An operation was invoked in a state where it is not allowed.
    #[error("Precondition violated in {operation}: {reason}")]
    PreconditionViolation {
        /// The dispatcher operation that was called.
        operation: &'static str,
        /// Why the call is not allowed right now.
        reason: String,
    },

    /// The tool reported that it is not applicable in the current context.
    #[error("Tool {tool} cannot begin in the current context")]
    CannotBegin {
        /// The tool name.
        tool: String,
    },

    /// The document does not support the object type the tool creates.
    #[error("Document does not support {object_type} objects")]
    UnsupportedObjectType {
        /// The object type that is missing.
        object_type: ObjectType,
    },
}

impl ToolError {
    pub fn precondition(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            operation,
            reason: reason.into(),
        }
    }
}

/// Settings record validation error
///
/// Reported before an export starts; no file is touched when one of these
/// is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The record is not a mapping.
    #[error("{kind} settings must be a mapping, got {found}")]
    NotAMapping {
        /// The export kind the record was meant for.
        kind: ExportKind,
        /// The JSON type that was supplied instead.
        found: String,
    },

    /// A required field is absent.
    #[error("{kind} settings: missing required field '{field}'")]
    MissingField {
        /// The export kind the record was meant for.
        kind: ExportKind,
        /// The name of the missing field.
        field: String,
    },

    /// A field is present but has the wrong type or an invalid value.
    #[error("{kind} settings: invalid field '{field}': {reason}")]
    InvalidField {
        /// The export kind the record was meant for.
        kind: ExportKind,
        /// The name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The record could not be decoded for another reason.
    #[error("{kind} settings: {reason}")]
    Malformed {
        /// The export kind the record was meant for.
        kind: ExportKind,
        /// Decoder message.
        reason: String,
    },
}

impl ValidationError {
    pub fn missing(kind: ExportKind, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind,
            field: field.into(),
        }
    }

    pub fn invalid(kind: ExportKind, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            kind,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Maps a serde decoding error onto the taxonomy.
    ///
    /// serde reports missing fields as "missing field `name`"; that shape is
    /// recognised so callers can tell a missing field from a bad value.
    pub fn from_serde(kind: ExportKind, err: &serde_json::Error) -> Self {
        let msg = err.to_string();
        if let Some(rest) = msg.strip_prefix("missing field `") {
            if let Some(end) = rest.find('`') {
                return Self::missing(kind, &rest[..end]);
            }
        }
        Self::Malformed { kind, reason: msg }
    }

    /// The export kind the failing record belonged to.
    pub fn kind(&self) -> ExportKind {
        match self {
            Self::NotAMapping { kind, .. }
            | Self::MissingField { kind, .. }
            | Self::InvalidField { kind, .. }
            | Self::Malformed { kind, .. } => *kind,
        }
    }
}

/// Failure reported by a host progress callback.
///
/// Carries the host's own message and is propagated unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallbackAbort {
    pub message: String,
}

impl CallbackAbort {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Export pipeline error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The settings record was rejected before the export started.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Artifact generation failed (I/O, geometry, third-party library).
    #[error("Export failed: {message}")]
    Generation {
        /// Human readable description.
        message: String,
    },

    /// The progress callback asked to stop.
    #[error(transparent)]
    CallbackAbort(#[from] CallbackAbort),
}

impl ExportError {
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    pub fn is_callback_abort(&self) -> bool {
        matches!(self, Self::CallbackAbort(_))
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::generation(format!("I/O error: {}", err))
    }
}

/// Main error type for PCBKit
///
/// A unified error type that can represent any error from the core layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool error
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a tool error
    pub fn is_tool_error(&self) -> bool {
        matches!(self, Error::Tool(_))
    }

    /// Check if this is an export error
    pub fn is_export_error(&self) -> bool {
        matches!(self, Error::Export(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
