//! Shared utilities for stockthing
//!
//! This crate provides common functionality used across the stockthing
//! workspace: tracing setup and dotenv-style environment file loading.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{env_var, load_env_file};
pub use error::{Result, UtilsError};
pub use logging::init_tracing;
