//! keycode: canonical hotkey values and their packed integer handles.
//!
//! - `Modifiers`: the four standard modifier flags (win, ctrl, shift, alt).
//! - `Hotkey`: modifiers plus one 8-bit virtual key code.
//! - `HotkeyHandle`: the 16-bit packed form used as a map key on the
//!   dispatch path, produced only by [`encode`] and read back by [`decode`].
//! - `vk`: virtual key constants and the key-spec name table used by
//!   `Hotkey::parse` and `Display`.
//!
//! Left/right physical modifier keys are not distinguished here; callers fold
//! them into the single flag before building a `Hotkey`.

mod handle;
mod hotkey;
mod modifiers;
pub mod vk;

pub use handle::{HotkeyHandle, decode, encode};
pub use hotkey::Hotkey;
pub use modifiers::Modifiers;
