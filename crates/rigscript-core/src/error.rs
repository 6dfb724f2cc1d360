//! Unified error handling for rigscript
//!
//! Every stage of the export pipeline reports through this one error type so
//! the command-line front end can map failures to a stable exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all rigscript operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destination could not be created or replaced
    #[error("Cannot write to {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export cancelled (no destination path given)
    #[error("Export cancelled: no destination path")]
    Cancelled,

    // ==================== Input Errors ====================

    /// No eligible mesh in the current selection
    #[error("No eligible mesh selected: {message}")]
    SelectionInvalid {
        message: String,
    },

    /// Mesh or weight arrays are inconsistent
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    /// Scene document could not be decoded
    #[error("Invalid scene document: {message}")]
    InvalidDocument {
        message: String,
    },

    /// Root bone inference failed
    #[error("Root bone not found above mesh '{mesh}'")]
    RootNotFound {
        mesh: String,
    },

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes reported by the command-line front end
pub mod exit_code {
    /// Export finished
    pub const SUCCESS: u8 = 0;
    /// Destination unwritable or other I/O failure
    pub const IO_FAILURE: u8 = 1;
    /// Mesh, weight or document data rejected
    pub const INVALID_INPUT: u8 = 2;
    /// Nothing eligible to export
    pub const SELECTION_INVALID: u8 = 3;
    /// Skeleton required but no root bone found
    pub const ROOT_NOT_FOUND: u8 = 4;
    /// Empty destination path
    pub const CANCELLED: u8 = 5;
    /// Bad configuration or usage
    pub const USAGE: u8 = 64;
}

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a selection error
    pub fn selection_invalid(message: impl Into<String>) -> Self {
        Error::SelectionInvalid {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Exit code the front end reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Io(_) | Error::Unwritable { .. } => exit_code::IO_FAILURE,
            Error::Cancelled => exit_code::CANCELLED,
            Error::SelectionInvalid { .. } => exit_code::SELECTION_INVALID,
            Error::InvalidInput { .. } | Error::InvalidDocument { .. } => {
                exit_code::INVALID_INPUT
            }
            Error::RootNotFound { .. } => exit_code::ROOT_NOT_FOUND,
            Error::InvalidConfig { .. } => exit_code::USAGE,
            Error::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// Check if this is an I/O type failure (including cancellation)
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::Io(_) | Error::Unwritable { .. } | Error::Cancelled
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
