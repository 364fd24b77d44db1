//! Quarry error types.
//!
//! Every failure raised by the SQL generation layer, the type registry and
//! the query client is a variant of [`QuarryError`].

use std::fmt;
use thiserror::Error;

use crate::types::Value;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Invalid argument provided.
    InvalidArgument = 0x0000,
    /// Invalid configuration.
    InvalidConfig = 0x0001,

    // Query lifecycle errors (0x0100 - 0x01FF)
    /// The engine rejected a submission.
    Submission = 0x0100,
    /// The engine reported a state outside the known set.
    UnsupportedStatus = 0x0101,
    /// The query reached a terminal state other than success.
    QueryExecution = 0x0102,
    /// The status call to the engine failed.
    Transport = 0x0103,

    // SQL generation errors (0x0200 - 0x02FF)
    /// Unknown table format preset.
    UnsupportedFormat = 0x0200,
    /// Partition values missing or empty.
    PartitionValue = 0x0201,
    /// Table schema is inconsistent.
    InvalidSchema = 0x0202,

    // Type errors (0x0300 - 0x03FF)
    /// No serializer registered for a column type.
    UnsupportedType = 0x0300,
    /// Value not suitable for its serializer.
    TypeCoercion = 0x0301,

    // Storage errors (0x0400 - 0x04FF)
    /// Location URL does not match `scheme://bucket/key`.
    MalformedLocation = 0x0400,
    /// Object store call failed.
    Storage = 0x0401,
    /// Result file could not be decoded.
    OutputFormat = 0x0402,
    /// Local I/O error.
    Io = 0x0403,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Query",
            0x02 => "SQL",
            0x03 => "Type",
            0x04 => "Storage",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for Quarry.
///
/// # Example
///
/// ```rust
/// use quarry_common::error::{ErrorCode, QuarryError};
///
/// let err = QuarryError::QueryExecution {
///     reason: "SYNTAX_ERROR: line 1:8".to_string(),
/// };
/// assert_eq!(err.to_string(), "SYNTAX_ERROR: line 1:8");
/// assert_eq!(err.code(), ErrorCode::QueryExecution);
/// ```
#[derive(Debug, Error)]
pub enum QuarryError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Query Lifecycle Errors
    // ==========================================================================
    /// The engine rejected the submit call.
    #[error("query submission failed: {reason}")]
    Submission {
        /// Reason reported by the engine transport.
        reason: String,
    },

    /// The engine returned a raw state outside the known mapping.
    #[error("unsupported query status: {status}")]
    UnsupportedStatus {
        /// The raw state string.
        status: String,
    },

    /// The query finished in a state other than success.
    ///
    /// The message is exactly the reason reported by the engine.
    #[error("{reason}")]
    QueryExecution {
        /// The engine's state change reason.
        reason: String,
    },

    /// Fetching the execution status failed.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // SQL Generation Errors
    // ==========================================================================
    /// Unknown table format preset.
    #[error("unsupported table format: {format}")]
    UnsupportedFormat {
        /// The unrecognized format token.
        format: String,
    },

    /// Partition values are missing or empty.
    #[error("partition error: {message}")]
    PartitionValue {
        /// Error message.
        message: String,
    },

    /// Table schema is inconsistent.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Type Errors
    // ==========================================================================
    /// No serializer is registered for the column type.
    #[error("unsupported type: {column_type}")]
    UnsupportedType {
        /// The column type token.
        column_type: String,
    },

    /// The value cannot be handled by the serializer of its type.
    #[error("illegal {found} value '{value}' for type {type_name}")]
    TypeCoercion {
        /// Text form of the offending value.
        value: String,
        /// What was found: `text` for wire input, else the value's variant.
        found: &'static str,
        /// Name of the serializer's type.
        type_name: &'static str,
    },

    // ==========================================================================
    // Storage Errors
    // ==========================================================================
    /// The location URL does not match `scheme://bucket/key`.
    #[error("malformed location: {url}")]
    MalformedLocation {
        /// The offending URL.
        url: String,
    },

    /// An object store call failed.
    #[error("storage error: {message}")]
    Storage {
        /// Error message.
        message: String,
    },

    /// A result file could not be decoded.
    #[error("malformed query output: {message}")]
    OutputFormat {
        /// Error message.
        message: String,
    },

    /// Local I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl QuarryError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::Submission { .. } => ErrorCode::Submission,
            Self::UnsupportedStatus { .. } => ErrorCode::UnsupportedStatus,
            Self::QueryExecution { .. } => ErrorCode::QueryExecution,
            Self::Transport { .. } => ErrorCode::Transport,
            Self::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            Self::PartitionValue { .. } => ErrorCode::PartitionValue,
            Self::InvalidSchema { .. } => ErrorCode::InvalidSchema,
            Self::UnsupportedType { .. } => ErrorCode::UnsupportedType,
            Self::TypeCoercion { .. } => ErrorCode::TypeCoercion,
            Self::MalformedLocation { .. } => ErrorCode::MalformedLocation,
            Self::Storage { .. } => ErrorCode::Storage,
            Self::OutputFormat { .. } => ErrorCode::OutputFormat,
            Self::Io { .. } => ErrorCode::Io,
        }
    }

    /// Returns true if the error was reported by the remote engine rather
    /// than detected locally.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Submission { .. }
                | Self::UnsupportedStatus { .. }
                | Self::QueryExecution { .. }
                | Self::Transport { .. }
                | Self::Storage { .. }
        )
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a partition error.
    #[must_use]
    pub fn partition(message: impl Into<String>) -> Self {
        Self::PartitionValue {
            message: message.into(),
        }
    }

    /// Creates a type coercion error for wire text rejected by `type_name`.
    #[must_use]
    pub fn coercion(text: &str, type_name: &'static str) -> Self {
        Self::TypeCoercion {
            value: text.to_string(),
            found: "text",
            type_name,
        }
    }

    /// Creates a type coercion error for a value of the wrong variant.
    #[must_use]
    pub fn value_coercion(value: &Value, type_name: &'static str) -> Self {
        Self::TypeCoercion {
            value: value.to_string(),
            found: value.kind(),
            type_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = QuarryError::UnsupportedStatus {
            status: "PENDING".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::UnsupportedStatus);
        assert_eq!(err.code().category(), "Query");
        assert_eq!(ErrorCode::TypeCoercion.category(), "Type");
        assert_eq!(ErrorCode::MalformedLocation.as_u16(), 0x0400);
    }

    #[test]
    fn test_query_execution_message_is_reason() {
        let err = QuarryError::QueryExecution {
            reason: "Table not found".to_string(),
        };
        assert_eq!(err.to_string(), "Table not found");
    }

    #[test]
    fn test_error_display() {
        let err = QuarryError::coercion("maybe", "boolean");
        assert_eq!(err.to_string(), "illegal text value 'maybe' for type boolean");

        let err = QuarryError::value_coercion(&Value::from("12"), "integer");
        assert_eq!(err.to_string(), "illegal string value '12' for type integer");

        let err = QuarryError::MalformedLocation {
            url: "bucket-only".to_string(),
        };
        assert_eq!(err.to_string(), "malformed location: bucket-only");
    }

    #[test]
    fn test_remote() {
        assert!(QuarryError::Submission {
            reason: "throttled".to_string()
        }
        .is_remote());
        assert!(!QuarryError::partition("missing").is_remote());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: QuarryError = io_err.into();
        assert_eq!(err.code(), ErrorCode::Io);
    }
}
