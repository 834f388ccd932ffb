//! Error types and result alias for the keyhook crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Underlying OS provided an error.
    #[error("OS error: {0}")]
    OsError(String),
    /// The hook could not be installed.
    #[error("Keyboard hook failed to install: {0}")]
    HookInstall(String),
    /// Hooks are skipped while a debugger is attached; every keystroke would
    /// stall on a breakpoint and the OS would drop the hook.
    #[error("Keyboard hook disabled while a debugger is attached")]
    DebuggerAttached,
    /// A hook is already installed in this process.
    #[error("Keyboard hook already installed")]
    AlreadyInstalled,
    /// No hook backend exists for this platform.
    #[error("Keyboard hooks are not supported on this platform")]
    Unsupported,
}
