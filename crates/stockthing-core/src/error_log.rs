//! Append-only log of failures the user should be able to look up later

use crate::error::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::error;

/// Default error log file name
pub const ERROR_LOG_FILE: &str = "error_log.txt";

/// Timestamped, append-only failure log.
///
/// The file is opened per entry so nothing is held open between symbols.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `"{timestamp} - {message}"` as one line
    pub fn append(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = message.replace('\n', " ");
        writeln!(file, "{} - {line}", Local::now().format("%Y-%m-%d %H:%M:%S%.6f"))?;
        Ok(())
    }

    /// Append, reporting a failed write through tracing instead of failing
    pub fn record(&self, message: &str) {
        if let Err(e) = self.append(message) {
            error!(path = %self.path.display(), "Failed to write error log: {e}");
        }
    }
}
