//! Environment file loading
//!
//! API keys live in a dotenv-style file (`api.env` by default). Loading it is
//! best effort: a missing file is reported to the caller but is not an error,
//! since the keys may already be exported in the shell.

use crate::error::{Result, UtilsError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load a dotenv-style file into the process environment.
///
/// A bare file name is searched for in the current directory and its
/// ancestors; anything with a directory component is loaded from exactly that
/// path. Variables already present in the environment are not overridden.
///
/// Returns the path that was loaded, or `None` when no such file exists.
pub fn load_env_file(name: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let name = name.as_ref();
    let is_bare_name = name.parent().is_none_or(|p| p.as_os_str().is_empty());

    let loaded = if is_bare_name {
        dotenvy::from_filename(name)
    } else {
        dotenvy::from_path(name).map(|()| name.to_path_buf())
    };

    match loaded {
        Ok(path) => {
            debug!("Loaded environment file {}", path.display());
            Ok(Some(path))
        }
        Err(e) if e.not_found() => {
            debug!("No environment file named {}", name.display());
            Ok(None)
        }
        Err(e) => Err(UtilsError::EnvFile {
            path: name.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Read an environment variable, trimmed; empty values count as unset.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
