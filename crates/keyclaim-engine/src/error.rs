use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the keyclaim engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Errors originating from the keyhook layer.
    #[error("Keyboard hook error: {0}")]
    Hook(#[from] keyhook::Error),

    /// Held-key timers need a tokio runtime and none was running.
    #[error("No tokio runtime available for held-key timers")]
    NoRuntime,
}
