//! Virtual key codes and the key-spec name table.
//!
//! Codes follow the Windows virtual-key numbering, which every 8-bit key code
//! in this workspace uses.

/// Backspace.
pub const BACK: u8 = 0x08;
/// Tab.
pub const TAB: u8 = 0x09;
/// Enter / return.
pub const RETURN: u8 = 0x0D;
/// Generic shift.
pub const SHIFT: u8 = 0x10;
/// Generic control.
pub const CONTROL: u8 = 0x11;
/// Generic alt.
pub const MENU: u8 = 0x12;
/// Pause / break.
pub const PAUSE: u8 = 0x13;
/// Caps lock.
pub const CAPITAL: u8 = 0x14;
/// Escape.
pub const ESCAPE: u8 = 0x1B;
/// Space bar.
pub const SPACE: u8 = 0x20;
/// Page up.
pub const PRIOR: u8 = 0x21;
/// Page down.
pub const NEXT: u8 = 0x22;
/// End.
pub const END: u8 = 0x23;
/// Home.
pub const HOME: u8 = 0x24;
/// Left arrow.
pub const LEFT: u8 = 0x25;
/// Up arrow.
pub const UP: u8 = 0x26;
/// Right arrow.
pub const RIGHT: u8 = 0x27;
/// Down arrow.
pub const DOWN: u8 = 0x28;
/// Print screen.
pub const SNAPSHOT: u8 = 0x2C;
/// Insert.
pub const INSERT: u8 = 0x2D;
/// Delete.
pub const DELETE: u8 = 0x2E;
/// Letter A; letters run contiguously to Z.
pub const A: u8 = 0x41;
/// Letter L.
pub const L: u8 = 0x4C;
/// Letter Z.
pub const Z: u8 = 0x5A;
/// Left Windows key.
pub const LWIN: u8 = 0x5B;
/// Right Windows key.
pub const RWIN: u8 = 0x5C;
/// Applications / context menu key.
pub const APPS: u8 = 0x5D;
/// F1; function keys run contiguously to F24.
pub const F1: u8 = 0x70;
/// F24.
pub const F24: u8 = 0x87;
/// Left shift.
pub const LSHIFT: u8 = 0xA0;
/// Right shift.
pub const RSHIFT: u8 = 0xA1;
/// Left control.
pub const LCONTROL: u8 = 0xA2;
/// Right control.
pub const RCONTROL: u8 = 0xA3;
/// Left alt.
pub const LMENU: u8 = 0xA4;
/// Right alt.
pub const RMENU: u8 = 0xA5;

/// Named keys outside the letter, digit and function-key ranges.
const NAMED: &[(&str, u8)] = &[
    ("backspace", BACK),
    ("tab", TAB),
    ("enter", RETURN),
    ("pause", PAUSE),
    ("capslock", CAPITAL),
    ("esc", ESCAPE),
    ("space", SPACE),
    ("pgup", PRIOR),
    ("pgdn", NEXT),
    ("end", END),
    ("home", HOME),
    ("left", LEFT),
    ("up", UP),
    ("right", RIGHT),
    ("down", DOWN),
    ("printscreen", SNAPSHOT),
    ("insert", INSERT),
    ("delete", DELETE),
    ("apps", APPS),
];

/// Extra spellings accepted by [`from_spec`]; never produced by [`name`].
const ALIASES: &[(&str, u8)] = &[
    ("return", RETURN),
    ("escape", ESCAPE),
    ("pageup", PRIOR),
    ("pagedown", NEXT),
    ("del", DELETE),
    ("ins", INSERT),
    ("caps", CAPITAL),
];

/// Canonical lowercase spec name for `key`, if it has one.
pub fn name(key: u8) -> Option<String> {
    match key {
        b'0'..=b'9' => Some((key as char).to_string()),
        A..=Z => Some((key as char).to_ascii_lowercase().to_string()),
        F1..=F24 => Some(format!("f{}", key - F1 + 1)),
        _ => NAMED
            .iter()
            .find(|(_, code)| *code == key)
            .map(|(n, _)| (*n).to_string()),
    }
}

/// Parse a key spec into a virtual key code.
///
/// Accepts single letters and digits, `f1`..`f24`, the named keys, their
/// aliases, and `0xNN` hex literals. Matching is case-insensitive.
pub fn from_spec(s: &str) -> Option<u8> {
    let lower = s.trim().to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return u8::from_str_radix(hex, 16).ok();
    }
    let bytes = lower.as_bytes();
    if bytes.len() == 1 {
        let c = bytes[0];
        return match c {
            b'0'..=b'9' => Some(c),
            b'a'..=b'z' => Some(c.to_ascii_uppercase()),
            _ => None,
        };
    }
    if let Some(n) = lower.strip_prefix('f')
        && let Ok(n) = n.parse::<u8>()
        && (1..=24).contains(&n)
    {
        return Some(F1 + n - 1);
    }
    NAMED
        .iter()
        .chain(ALIASES)
        .find(|(n, _)| *n == lower)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_digits_and_function_keys() {
        assert_eq!(from_spec("a"), Some(A));
        assert_eq!(from_spec("Z"), Some(Z));
        assert_eq!(from_spec("7"), Some(b'7'));
        assert_eq!(from_spec("F12"), Some(0x7B));
        assert_eq!(from_spec("f25"), None);
        assert_eq!(name(0x7B).as_deref(), Some("f12"));
        assert_eq!(name(L).as_deref(), Some("l"));
    }

    #[test]
    fn named_keys_and_aliases() {
        assert_eq!(from_spec("Escape"), Some(ESCAPE));
        assert_eq!(from_spec("esc"), Some(ESCAPE));
        assert_eq!(name(ESCAPE).as_deref(), Some("esc"));
        assert_eq!(from_spec("pagedown"), Some(NEXT));
        assert_eq!(name(NEXT).as_deref(), Some("pgdn"));
    }

    #[test]
    fn hex_literals() {
        assert_eq!(from_spec("0x41"), Some(A));
        assert_eq!(from_spec("0xff"), Some(0xFF));
        assert_eq!(from_spec("0x100"), None);
        assert_eq!(name(0xFF), None);
    }
}
