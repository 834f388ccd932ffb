use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Modifiers, vk};

/// A modifier set plus one 8-bit virtual key code.
///
/// Two hotkeys are equal iff their modifier flags and key code all match. A
/// key code of 0 marks a hotkey that cannot be claimed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "HotkeyRepr", into = "HotkeyRepr")]
pub struct Hotkey {
    /// Modifier flags that must be held.
    pub modifiers: Modifiers,
    /// Virtual key code of the non-modifier key.
    pub key: u8,
}

/// Wire shape consumed by the settings surface: four booleans and a code.
#[derive(Serialize, Deserialize)]
struct HotkeyRepr {
    /// Win flag.
    win: bool,
    /// Ctrl flag.
    ctrl: bool,
    /// Shift flag.
    shift: bool,
    /// Alt flag.
    alt: bool,
    /// Virtual key code.
    key: u8,
}

impl From<HotkeyRepr> for Hotkey {
    fn from(r: HotkeyRepr) -> Self {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::WIN, r.win);
        modifiers.set(Modifiers::CTRL, r.ctrl);
        modifiers.set(Modifiers::SHIFT, r.shift);
        modifiers.set(Modifiers::ALT, r.alt);
        Self { modifiers, key: r.key }
    }
}

impl From<Hotkey> for HotkeyRepr {
    fn from(h: Hotkey) -> Self {
        Self {
            win: h.win(),
            ctrl: h.ctrl(),
            shift: h.shift(),
            alt: h.alt(),
            key: h.key,
        }
    }
}

impl Hotkey {
    /// Build a hotkey from its parts.
    pub const fn new(modifiers: Modifiers, key: u8) -> Self {
        Self { modifiers, key }
    }

    /// Win flag.
    pub fn win(&self) -> bool {
        self.modifiers.contains(Modifiers::WIN)
    }

    /// Ctrl flag.
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Shift flag.
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Alt flag.
    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Parses a hotkey specification of the form "win+shift+s".
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by "+"; the last component is always the key.
    /// - The plus key cannot be spelled literally; use its hex code.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').collect();
        let key = vk::from_spec(parts.pop()?)?;
        let mut modifiers = Modifiers::empty();
        for p in parts {
            modifiers |= Modifiers::from_spec(p.trim())?;
        }
        Some(Self { modifiers, key })
    }

    /// Canonical string form: `win+ctrl+alt+shift+key`.
    ///
    /// Keys without a name print as a `0xNN` literal, which `parse` accepts.
    pub fn to_string_canonical(&self) -> String {
        let mut out: Vec<String> = self
            .modifiers
            .spec_words()
            .into_iter()
            .map(str::to_string)
            .collect();
        out.push(vk::name(self.key).unwrap_or_else(|| format!("{:#04x}", self.key)));
        out.join("+")
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_string_canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        let h = Hotkey::parse("shift+Win+s").expect("parse");
        assert!(h.win() && h.shift());
        assert!(!h.ctrl() && !h.alt());
        assert_eq!(h.key, 0x53);
        assert_eq!(h.to_string(), "win+shift+s");
    }

    #[test]
    fn parse_rejects_unknown_parts() {
        assert_eq!(Hotkey::parse("hyper+a"), None);
        assert_eq!(Hotkey::parse("ctrl+"), None);
        assert_eq!(Hotkey::parse("ctrl++a"), None);
        assert_eq!(Hotkey::parse(""), None);
    }

    #[test]
    fn display_reparses() {
        for s in ["ctrl+alt+delete", "win+l", "alt+f4", "ctrl+0xff", "esc"] {
            let h = Hotkey::parse(s).expect("parse");
            assert_eq!(Hotkey::parse(&h.to_string()), Some(h), "{s}");
        }
    }

    #[test]
    fn serializes_as_flag_struct() {
        let h = Hotkey::parse("ctrl+a").expect("parse");
        let json = serde_json::to_string(&h).expect("json");
        assert_eq!(
            json,
            r#"{"win":false,"ctrl":true,"shift":false,"alt":false,"key":65}"#
        );
        let back: Hotkey = serde_json::from_str(&json).expect("back");
        assert_eq!(back, h);
    }
}
