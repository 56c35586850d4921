//! # Sluice Core Errors
//!
//! Defines [`Error`], the framework-level error returned by the host side of
//! the crate: configuration loading, storage access, interceptor registration
//! and lifecycle enforcement. Failures raised *by* interceptors while
//! processing records are [`StageError`]s and are wrapped in
//! [`Error::Stage`] when they reach the host.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::interceptor::lifecycle::LifecycleState;
use crate::stage_error::StageError;
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// A processing step failed fatally
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Interceptor registry error for '{name}': {message}")]
    Registry { name: String, message: String },

    /// The host asked an interceptor to do something its state forbids.
    #[error("Interceptor '{interceptor}' cannot {operation} while {state}")]
    Lifecycle {
        interceptor: String,
        state: LifecycleState,
        operation: &'static str,
    },

    #[error("Configuration error for '{key}': {message}")]
    Config { key: String, message: String },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// I/O error with the operation and path that caused it
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: std::path::PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }
}
