//! OS half of the keyclaim input hook.
//!
//! This crate owns everything that talks to the platform keyboard APIs:
//! - [`install`]: put a system-wide low-level keyboard hook in place and
//!   deliver each event to a [`KeySink`] on a dedicated hook thread.
//! - [`OsKeyState`]: direct "is this key physically down" queries.
//! - [`trial_register`]: claim a combination through the OS hotkey facility
//!   and release it again, to learn whether someone else already owns it.
//! - [`policy::classify`]: the swallow/pass decision shared with the engine.
//!
//! The sink runs synchronously inside the OS callback. It must return within
//! a few milliseconds or the OS silently removes the hook.
#![warn(unsafe_op_in_unsafe_fn)]

use keycode::{Modifiers, vk};

mod error;
pub mod policy;
#[cfg(windows)]
mod sys;
#[cfg(not(windows))]
#[path = "nosys.rs"]
mod sys;

pub use error::{Error, Result};
pub use sys::{HookGuard, install, trial_register};

/// Key transition carried by a [`KeyEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Key pressed (including OS auto-repeat).
    Down,
    /// Key released.
    Up,
}

/// One raw keyboard event as seen by the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Virtual key code.
    pub key: u8,
    /// Press or release.
    pub kind: KeyKind,
    /// The OS reports the event as synthesized rather than typed.
    pub injected: bool,
    /// The event carries [`eventtag::DONT_TRIGGER_TAG`].
    pub tagged: bool,
}

impl KeyEvent {
    /// A physical key press.
    pub fn down(key: u8) -> Self {
        Self {
            key,
            kind: KeyKind::Down,
            injected: false,
            tagged: false,
        }
    }

    /// A physical key release.
    pub fn up(key: u8) -> Self {
        Self {
            kind: KeyKind::Up,
            ..Self::down(key)
        }
    }

    /// Mark the event as injected by us.
    pub fn tagged(mut self) -> Self {
        self.injected = true;
        self.tagged = true;
        self
    }
}

/// Hook verdict for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the event on to the next hook and the focused window.
    PassThrough,
    /// Consume the event.
    Swallow,
}

/// Receiver of hook events. Called on the hook thread.
pub trait KeySink: Send + Sync {
    /// Decide what happens to `event`. Must not block.
    fn on_key(&self, event: KeyEvent) -> Verdict;
}

/// Point-in-time physical key state.
pub trait KeyState: Send + Sync {
    /// True while `key` is physically held.
    fn is_down(&self, key: u8) -> bool;

    /// Snapshot of the four modifier flags, folding left and right keys.
    fn modifiers(&self) -> Modifiers {
        let mut m = Modifiers::empty();
        m.set(
            Modifiers::WIN,
            self.is_down(vk::LWIN) || self.is_down(vk::RWIN),
        );
        m.set(Modifiers::CTRL, self.is_down(vk::CONTROL));
        m.set(Modifiers::SHIFT, self.is_down(vk::SHIFT));
        m.set(Modifiers::ALT, self.is_down(vk::MENU));
        m
    }
}

/// Key state read straight from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeyState;

impl KeyState for OsKeyState {
    fn is_down(&self, key: u8) -> bool {
        sys::key_is_down(key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Held(HashSet<u8>);

    impl KeyState for Held {
        fn is_down(&self, key: u8) -> bool {
            self.0.contains(&key)
        }
    }

    #[test]
    fn modifier_snapshot_folds_sides() {
        let held = Held([vk::RWIN, vk::SHIFT, 0x41].into_iter().collect());
        assert_eq!(held.modifiers(), Modifiers::WIN | Modifiers::SHIFT);
        let none = Held(HashSet::new());
        assert_eq!(none.modifiers(), Modifiers::empty());
    }

    #[test]
    fn tagged_constructor_marks_injection() {
        let e = KeyEvent::down(eventtag::SUPPRESS_KEY).tagged();
        assert!(e.injected && e.tagged);
        assert_eq!(KeyEvent::up(0x41).kind, KeyKind::Up);
    }
}
