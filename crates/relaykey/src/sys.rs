//! Windows `SendInput` backend.

use std::{io, mem};

use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP, SendInput,
    VIRTUAL_KEY,
};

use crate::{Error, Poster, Result};

/// Posts tagged keyboard input through `SendInput`.
pub struct WinPoster;

impl Poster for WinPoster {
    fn post_key(&self, key: u8, down: bool) -> Result<()> {
        let flags = if down {
            KEYBD_EVENT_FLAGS(0)
        } else {
            KEYEVENTF_KEYUP
        };
        let input = INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(u16::from(key)),
                    wScan: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: eventtag::DONT_TRIGGER_TAG,
                },
            },
        };
        // SAFETY: a single fully initialised INPUT with its correct size.
        let sent = unsafe { SendInput(&[input], mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            return Err(Error::SendInput(io::Error::last_os_error().to_string()));
        }
        Ok(())
    }
}
