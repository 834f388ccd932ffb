use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::vk;

bitflags! {
    /// Modifier flags held alongside the key of a [`crate::Hotkey`].
    ///
    /// The bit values are also the bit order inside a packed
    /// [`crate::HotkeyHandle`], shifted up by 8.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        /// Windows / super key (either side).
        const WIN = 1 << 0;
        /// Control (either side).
        const CTRL = 1 << 1;
        /// Shift (either side).
        const SHIFT = 1 << 2;
        /// Alt / menu (either side).
        const ALT = 1 << 3;
    }
}

impl Modifiers {
    /// Parse a single modifier spec word, case-insensitively.
    ///
    /// Accepts `win|super|meta|cmd`, `ctrl|control`, `alt|opt|option|menu`
    /// and `shift`.
    pub fn from_spec(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "win" | "super" | "meta" | "cmd" => Some(Self::WIN),
            "ctrl" | "control" => Some(Self::CTRL),
            "alt" | "opt" | "option" | "menu" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            _ => None,
        }
    }

    /// Canonical spec words for the set flags, in `win+ctrl+alt+shift` order.
    pub fn spec_words(self) -> Vec<&'static str> {
        let mut out = Vec::with_capacity(4);
        if self.contains(Self::WIN) {
            out.push("win");
        }
        if self.contains(Self::CTRL) {
            out.push("ctrl");
        }
        if self.contains(Self::ALT) {
            out.push("alt");
        }
        if self.contains(Self::SHIFT) {
            out.push("shift");
        }
        out
    }

    /// The modifier flag a physical modifier key folds into, if any.
    ///
    /// Both generic and side-specific virtual keys map to the same flag.
    pub fn for_key(key: u8) -> Option<Self> {
        match key {
            vk::LWIN | vk::RWIN => Some(Self::WIN),
            vk::CONTROL | vk::LCONTROL | vk::RCONTROL => Some(Self::CTRL),
            vk::SHIFT | vk::LSHIFT | vk::RSHIFT => Some(Self::SHIFT),
            vk::MENU | vk::LMENU | vk::RMENU => Some(Self::ALT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_aliases() {
        assert_eq!(Modifiers::from_spec("Super"), Some(Modifiers::WIN));
        assert_eq!(Modifiers::from_spec("control"), Some(Modifiers::CTRL));
        assert_eq!(Modifiers::from_spec("opt"), Some(Modifiers::ALT));
        assert_eq!(Modifiers::from_spec("SHIFT"), Some(Modifiers::SHIFT));
        assert_eq!(Modifiers::from_spec("hyper"), None);
    }

    #[test]
    fn canonical_word_order() {
        let m = Modifiers::SHIFT | Modifiers::WIN | Modifiers::ALT;
        assert_eq!(m.spec_words(), vec!["win", "alt", "shift"]);
    }

    #[test]
    fn side_specific_keys_fold() {
        assert_eq!(Modifiers::for_key(vk::RCONTROL), Some(Modifiers::CTRL));
        assert_eq!(Modifiers::for_key(vk::LMENU), Some(Modifiers::ALT));
        assert_eq!(Modifiers::for_key(vk::RWIN), Some(Modifiers::WIN));
        assert_eq!(Modifiers::for_key(0x41), None);
    }
}
