//! Posts synthetic keystrokes on behalf of the keyclaim hook.
//!
//! A `RelayKey` sends key down/up pairs through a platform `Poster`. Every
//! event is tagged with [`eventtag::DONT_TRIGGER_TAG`], so the hook that
//! injected it skips it on the way back in.
//!
//! The main use is [`RelayKey::suppress`]: after a hotkey fires, a press of
//! the non-existent key [`eventtag::SUPPRESS_KEY`] keeps the OS from acting on
//! a modifier released on its own.
#![warn(unsafe_op_in_unsafe_fn)]
use std::sync::Arc;

use tracing::{trace, warn};

mod error;
#[cfg(windows)]
mod sys;

pub use error::{Error, Result};

/// Platform seam for posting one key transition.
pub trait Poster: Send + Sync {
    /// Post a single key down (`down == true`) or key up for `key`.
    fn post_key(&self, key: u8, down: bool) -> Result<()>;
}

/// Poster used where no injection backend exists.
#[cfg(not(windows))]
struct UnsupportedPoster;

#[cfg(not(windows))]
impl Poster for UnsupportedPoster {
    fn post_key(&self, _key: u8, _down: bool) -> Result<()> {
        Err(Error::Unsupported)
    }
}

/// Stateless relayer for synthetic keystrokes.
#[derive(Clone)]
pub struct RelayKey {
    /// Backend that actually posts input.
    poster: Arc<dyn Poster>,
}

impl Default for RelayKey {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayKey {
    /// Create a relayer that tags every event it posts.
    pub fn new() -> Self {
        Self {
            poster: platform_poster(),
        }
    }

    /// Create a relayer around a custom poster.
    pub fn with_poster(poster: Arc<dyn Poster>) -> Self {
        Self { poster }
    }

    /// Post a full down/up pair for `key`.
    pub fn tap(&self, key: u8) -> Result<()> {
        trace!(key, "relay_tap");
        self.poster.post_key(key, true)?;
        self.poster.post_key(key, false)
    }

    /// Post the suppression keystroke. Failures are logged, not returned,
    /// because callers are on the hook path and cannot act on them.
    pub fn suppress(&self) {
        if let Err(e) = self.tap(eventtag::SUPPRESS_KEY) {
            warn!(error = %e, "suppress_keystroke_failed");
        }
    }
}

/// The injection backend for this platform.
#[cfg(windows)]
fn platform_poster() -> Arc<dyn Poster> {
    Arc::new(sys::WinPoster)
}

/// The injection backend for this platform.
#[cfg(not(windows))]
fn platform_poster() -> Arc<dyn Poster> {
    Arc::new(UnsupportedPoster)
}
