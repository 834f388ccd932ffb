//! Error handling for the keyclaimd binary.

use std::{io, path::PathBuf, result};

use ron::error::SpannedError;
use thiserror::Error;

/// Convenient result type for keyclaimd operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can stop the daemon.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the config file failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Wrapper for other I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid RON for our schema.
    #[error("Config parse error: {0}")]
    Parse(#[from] SpannedError),
    /// A hotkey or key name in the config did not parse.
    #[error("Invalid key spec {spec:?} in module {module:?}")]
    KeySpec {
        /// Module the spec belongs to.
        module: String,
        /// Offending text.
        spec: String,
    },
    /// Engine construction failed.
    #[error("Engine error: {0}")]
    Engine(#[from] keyclaim_engine::Error),
    /// Conflict report could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
