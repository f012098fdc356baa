//! Error types for control-plane operations.
//!
//! Errors are categorized so the reconciler can report a stable kind to the
//! caller and the gateway can decide whether an attempt is worth repeating.
//! No variant ever carries connection credentials: messages built from tool
//! output pass through [`crate::secret::redact`] first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Categories of failures surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing target identifier, identity or required attribute
    Configuration,
    /// Unknown or ill-typed attribute, unsafe identifier, policy-violating credential
    Validation,
    /// External process exited non-zero, timed out or could not be started
    Tool,
    /// Control plane reported a failure despite a zero exit status
    Domain,
    /// Filesystem access denied
    Permission,
    /// Target file absent
    NotFound,
}

impl ErrorKind {
    /// Whether failures of this kind are transient and worth retrying.
    ///
    /// Only process-level failures qualify; a domain error means the control
    /// plane understood and rejected the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Tool)
    }

    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Validation => "Validation error",
            Self::Tool => "Control tool failed",
            Self::Domain => "Database reported an error",
            Self::Permission => "Permission denied",
            Self::NotFound => "Not found",
        }
    }

    /// Get actionable advice for resolving this error kind.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Configuration => "Supply exactly one of sid or service_name and all required attributes",
            Self::Validation => "Check attribute names, types and allowed values",
            Self::Tool => "Check that sqlplus/rman are installed and the instance is reachable",
            Self::Domain => "Look up the reported error code in the database error reference",
            Self::Permission => "Run as the database software owner or fix file permissions",
            Self::NotFound => "Create the file first or correct the path",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "ConfigurationError",
            Self::Validation => "ValidationError",
            Self::Tool => "ToolError",
            Self::Domain => "DomainError",
            Self::Permission => "PermissionError",
            Self::NotFound => "NotFoundError",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while driving the control plane.
#[derive(Debug, Error)]
pub enum Error {
    /// Request cannot be executed as configured
    #[error("configuration error: {message}")]
    Configuration {
        /// What is missing or contradictory
        message: String,
    },

    /// Attribute or credential rejected before any command was built
    #[error("validation error: {message}")]
    Validation {
        /// Names the offending identity or parameter
        message: String,
    },

    /// External process failed at the process level
    #[error("{program} failed ({}): {stderr}", exit_label(.code))]
    Tool {
        /// Program that was invoked
        program: String,
        /// Exit code, `None` when killed, timed out or never started
        code: Option<i32>,
        /// Redacted standard error (or a description of the failure)
        stderr: String,
    },

    /// Control plane reported an error marker in otherwise successful output
    #[error("{program} reported {marker}: {detail}")]
    Domain {
        /// Program that was invoked
        program: String,
        /// Marker code, e.g. `ORA-01920`
        marker: String,
        /// Redacted line containing the marker
        detail: String,
    },

    /// Filesystem access denied
    #[error("permission denied: unable to {action} {}", .path.display())]
    Permission {
        /// What was being attempted ("create", "modify", ...)
        action: String,
        /// Path that could not be accessed
        path: PathBuf,
    },

    /// Target file absent
    #[error("{what} {} does not exist", .path.display())]
    NotFound {
        /// Human label for the missing thing ("file", "source file")
        what: String,
        /// Path that was expected
        path: PathBuf,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "no exit status".to_string(),
    }
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get the error kind reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Tool { .. } | Error::Io(_) => ErrorKind::Tool,
            Error::Domain { .. } => ErrorKind::Domain,
            Error::Permission { .. } => ErrorKind::Permission,
            Error::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Map a filesystem error on `path` to the matching error kind.
    ///
    /// `action` describes what was attempted and ends up in the message.
    pub fn from_fs(err: io::Error, action: &str, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Error::Permission {
                action: action.to_string(),
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotFound => Error::NotFound {
                what: "file".to_string(),
                path: path.to_path_buf(),
            },
            _ => Error::Io(err),
        }
    }
}

/// Result type for control-plane operations.
pub type Result<T> = std::result::Result<T, Error>;
