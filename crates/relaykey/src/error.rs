//! Error types and result alias for the relaykey crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Crate-local `Result` alias using the relay error type.
pub type Result<T> = StdResult<T, Error>;

/// Errors that can occur while synthesizing or posting events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The OS refused to queue the synthetic input.
    #[error("SendInput failed: {0}")]
    SendInput(String),
    /// No injection backend exists for this platform.
    #[error("Key injection is not supported on this platform")]
    Unsupported,
}
