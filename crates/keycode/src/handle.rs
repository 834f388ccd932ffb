use std::fmt;

use serde::Serialize;

use crate::{Hotkey, Modifiers};

/// Packed 16-bit form of a [`Hotkey`].
///
/// Layout: bits 0-7 hold the key code; bits 8, 9, 10 and 11 hold the win,
/// ctrl, shift and alt flags. Bits 12-15 are always zero. Handle 0 means "no
/// usable hotkey" and is what every key-less hotkey encodes to.
///
/// Handles are only produced by [`encode`]; there is no public constructor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HotkeyHandle(u16);

impl HotkeyHandle {
    /// The reserved sentinel handle.
    pub const NONE: Self = Self(0);

    /// True for the sentinel handle.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Raw packed value, for logging and hashing.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for HotkeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Pack a hotkey into its handle.
///
/// A hotkey with key code 0 always yields [`HotkeyHandle::NONE`], whatever
/// its modifiers.
pub fn encode(hotkey: Hotkey) -> HotkeyHandle {
    if hotkey.key == 0 {
        return HotkeyHandle::NONE;
    }
    HotkeyHandle((u16::from(hotkey.modifiers.bits()) << 8) | u16::from(hotkey.key))
}

/// Unpack a handle into the hotkey it was encoded from.
pub fn decode(handle: HotkeyHandle) -> Hotkey {
    let [key, mods] = handle.0.to_le_bytes();
    Hotkey {
        modifiers: Modifiers::from_bits_truncate(mods),
        key,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn documented_bit_order() {
        let h = Hotkey::new(Modifiers::CTRL, 0x41);
        assert_eq!(encode(h).get(), 0x0241);
        let h = Hotkey::new(Modifiers::WIN | Modifiers::ALT, 0x4C);
        assert_eq!(encode(h).get(), 0x094C);
        let all = Modifiers::all();
        assert_eq!(encode(Hotkey::new(all, 0xFF)).get(), 0x0FFF);
    }

    #[test]
    fn keyless_hotkeys_are_the_sentinel() {
        for bits in 0..16u8 {
            let h = Hotkey::new(Modifiers::from_bits_truncate(bits), 0);
            assert!(encode(h).is_none());
        }
        assert_eq!(decode(HotkeyHandle::NONE), Hotkey::default());
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(bits in 0u8..16, key in 1u8..=255) {
            let h = Hotkey::new(Modifiers::from_bits_truncate(bits), key);
            let handle = encode(h);
            prop_assert!(!handle.is_none());
            prop_assert_eq!(decode(handle), h);
        }

        #[test]
        fn distinct_hotkeys_get_distinct_handles(
            a in (0u8..16, 1u8..=255),
            b in (0u8..16, 1u8..=255),
        ) {
            let ha = Hotkey::new(Modifiers::from_bits_truncate(a.0), a.1);
            let hb = Hotkey::new(Modifiers::from_bits_truncate(b.0), b.1);
            prop_assert_eq!(ha == hb, encode(ha) == encode(hb));
        }
    }
}
