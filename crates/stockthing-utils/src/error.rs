//! Error types for shared utilities

use std::path::PathBuf;
use thiserror::Error;

/// Result type for utility operations
pub type Result<T> = std::result::Result<T, UtilsError>;

/// Errors raised while preparing the process environment
#[derive(Debug, Error)]
pub enum UtilsError {
    /// The environment file exists but could not be parsed
    #[error("Failed to parse environment file {path}: {message}")]
    EnvFile {
        path: PathBuf,
        message: String,
    },
}
