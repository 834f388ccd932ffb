//! Shared markers for keyboard events we inject ourselves.
//!
//! Injected events carry [`DONT_TRIGGER_TAG`] in their extra-info field. The
//! hook passes any event carrying it straight through without matching, so a
//! suppression keystroke can never re-enter dispatch.

/// 'kclm' in ASCII bytes: 0x6b 0x63 0x6c 0x6d.
pub const DONT_TRIGGER_TAG: usize = 0x6b63_6c6d;

/// Virtual key code with no physical key behind it.
///
/// Sent as a down/up pair after a dispatched hotkey so the OS does not treat
/// the release of a lone modifier as its own shortcut (e.g. opening the Start
/// menu when the win key comes up).
pub const SUPPRESS_KEY: u8 = 0xFF;

/// True when an event's extra-info field carries our marker.
pub fn is_tagged(extra_info: usize) -> bool {
    extra_info == DONT_TRIGGER_TAG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_our_marker_counts() {
        assert!(is_tagged(DONT_TRIGGER_TAG));
        assert!(!is_tagged(0));
        assert!(!is_tagged(DONT_TRIGGER_TAG + 1));
    }
}
