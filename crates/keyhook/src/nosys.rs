//! Fallback for platforms without a keyboard hook backend.
//!
//! Installation always fails with [`Error::Unsupported`], which the engine
//! treats as "no hotkeys fire". Key state reads as all-up and trial
//! registrations report an error so the probe stays permissive.
use std::sync::Arc;

use keycode::Hotkey;

use crate::{Error, KeySink, Result};

/// Placeholder guard; never constructed on this platform.
#[derive(Debug)]
pub struct HookGuard {
    /// Prevents construction outside this module.
    _private: (),
}

/// Always fails on this platform.
#[allow(clippy::needless_pass_by_value, reason = "matches the hooked platforms")]
pub fn install(_sink: Arc<dyn KeySink>) -> Result<HookGuard> {
    Err(Error::Unsupported)
}

/// Always fails on this platform.
pub fn trial_register(_hotkey: Hotkey) -> Result<bool> {
    Err(Error::Unsupported)
}

/// No key is ever reported down.
pub fn key_is_down(_key: u8) -> bool {
    false
}
