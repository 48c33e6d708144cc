//! Error types for planboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad property, missing value, invalid config)
//! - 4: Operation failed (document unreadable/unwritable, lock timeout)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the planboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for planboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown property '{0}' (expected status or priority)")]
    UnknownProperty(String),

    #[error("Missing {0}")]
    MissingValue(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),

    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_)
            | Error::UnknownProperty(_)
            | Error::MissingValue(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::DocumentNotFound(_)
            | Error::InvalidUtf8(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::Watch(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// True for caller contract violations, which are rejected before the
    /// document is touched.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_) | Error::UnknownProperty(_) | Error::MissingValue(_)
        )
    }

    /// Stable machine-readable error class.
    pub fn kind(&self) -> &'static str {
        match self.exit_code() {
            exit_codes::USER_ERROR => "user_error",
            _ => "operation_failed",
        }
    }
}

/// Result type alias for planboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    pub kind: &'static str,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
        }
    }
}
