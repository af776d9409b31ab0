//! Error types and exit codes for gazeta
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args)
//! - 3: Data error (missing critical index, invalid shard tree)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the gazeta CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing critical index, invalid shard tree (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during gazeta operations
#[derive(Error, Debug)]
pub enum GazetaError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data errors (exit code 3)
    #[error("critical index missing or empty: {path:?}")]
    MissingCriticalIndex { path: PathBuf },

    #[error("shard not found: {path:?}")]
    ShardNotFound { path: PathBuf },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("invalid shard tree: {reason}")]
    InvalidTree { reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation} {target}: {reason}")]
    WriteFailure {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl GazetaError {
    /// Create an error for a failed shard/manifest write
    pub fn write_failure(
        operation: &str,
        target: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        GazetaError::WriteFailure {
            operation: operation.to_string(),
            target: target.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        GazetaError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        GazetaError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            GazetaError::UnknownFormat(_)
            | GazetaError::UsageError(_)
            | GazetaError::InvalidValue { .. } => ExitCode::Usage,

            GazetaError::MissingCriticalIndex { .. }
            | GazetaError::ShardNotFound { .. }
            | GazetaError::NotFound { .. }
            | GazetaError::InvalidTree { .. } => ExitCode::Data,

            GazetaError::Io(_)
            | GazetaError::Json(_)
            | GazetaError::Toml(_)
            | GazetaError::WriteFailure { .. }
            | GazetaError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            GazetaError::UnknownFormat(_) => "unknown_format",
            GazetaError::UsageError(_) => "usage_error",
            GazetaError::InvalidValue { .. } => "invalid_value",
            GazetaError::MissingCriticalIndex { .. } => "missing_critical_index",
            GazetaError::ShardNotFound { .. } => "shard_not_found",
            GazetaError::NotFound { .. } => "not_found",
            GazetaError::InvalidTree { .. } => "invalid_tree",
            GazetaError::Io(_) => "io_error",
            GazetaError::Json(_) => "json_error",
            GazetaError::Toml(_) => "toml_error",
            GazetaError::WriteFailure { .. } => "write_failure",
            GazetaError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for gazeta operations
pub type Result<T> = std::result::Result<T, GazetaError>;
