//! Windows low-level keyboard hook (`WH_KEYBOARD_LL`) and trial registration.
//!
//! The hook lives on its own thread running a message loop; the OS calls
//! [`keyboard_proc`] on that thread for every key event in the session.
//! Returning a non-zero `LRESULT` swallows the event, anything from
//! `CallNextHookEx` passes it on.
//!
//! The callback cannot capture state, so the active sink sits in a static.
//! Only one hook may be installed per process.

use std::{
    sync::{
        Arc,
        atomic::{AtomicI32, Ordering},
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::Sender;
use keycode::{Hotkey, Modifiers};
use parking_lot::{RwLock, const_rwlock};
use tracing::{debug, info, trace, warn};
use windows::Win32::{
    Foundation::{ERROR_HOTKEY_ALREADY_REGISTERED, LPARAM, LRESULT, WPARAM},
    System::{Diagnostics::Debug::IsDebuggerPresent, Threading::GetCurrentThreadId},
    UI::{
        Input::KeyboardAndMouse::{
            GetAsyncKeyState, HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT, MOD_SHIFT,
            MOD_WIN, RegisterHotKey, UnregisterHotKey,
        },
        WindowsAndMessaging::{
            CallNextHookEx, DispatchMessageW, GetMessageW, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG,
            PostThreadMessageW, SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx,
            WH_KEYBOARD_LL, WM_KEYDOWN, WM_QUIT, WM_SYSKEYDOWN,
        },
    },
};

use crate::{Error, KeyEvent, KeyKind, KeySink, Result, Verdict};

/// Sink for the currently installed hook.
static SINK: RwLock<Option<Arc<dyn KeySink>>> = const_rwlock(None);

/// Counter for throwaway trial ids.
static NEXT_TRIAL_ID: AtomicI32 = AtomicI32::new(0);

/// First trial id; application hotkey ids must stay below 0xC000.
const TRIAL_ID_BASE: i32 = 0x8000;

/// Keeps the hook installed; dropping it unhooks and stops the hook thread.
#[derive(Debug)]
pub struct HookGuard {
    /// Win32 id of the hook thread, for posting `WM_QUIT`.
    thread_id: u32,
    /// Hook thread handle, joined on drop.
    handle: Option<JoinHandle<()>>,
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        // SAFETY: posting to a thread id we created; failure means it already exited.
        let _ignored = unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
        if let Some(h) = self.handle.take() {
            let _ignored = h.join();
        }
        SINK.write().take();
        info!("keyboard_hook_uninstalled");
    }
}

/// Install the process-wide keyboard hook, delivering events to `sink`.
pub fn install(sink: Arc<dyn KeySink>) -> Result<HookGuard> {
    // SAFETY: no preconditions.
    if unsafe { IsDebuggerPresent() }.as_bool() {
        return Err(Error::DebuggerAttached);
    }
    {
        let mut slot = SINK.write();
        if slot.is_some() {
            return Err(Error::AlreadyInstalled);
        }
        *slot = Some(sink);
    }

    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<u32>>(1);
    let handle = thread::Builder::new()
        .name("keyclaim-hook".into())
        .spawn(move || run_hook_loop(&ready_tx))
        .map_err(|e| {
            SINK.write().take();
            Error::OsError(e.to_string())
        })?;

    match ready_rx.recv() {
        Ok(Ok(thread_id)) => {
            info!(thread_id, "keyboard_hook_installed");
            Ok(HookGuard {
                thread_id,
                handle: Some(handle),
            })
        }
        Ok(Err(e)) => {
            let _ignored = handle.join();
            SINK.write().take();
            Err(e)
        }
        Err(_) => {
            SINK.write().take();
            Err(Error::HookInstall("hook thread exited before reporting".into()))
        }
    }
}

/// Hook thread body: install, report readiness, pump messages until `WM_QUIT`.
fn run_hook_loop(ready: &Sender<Result<u32>>) {
    debug!("creating_keyboard_hook");
    // SAFETY: keyboard_proc matches HOOKPROC; LL hooks need no module handle.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0) } {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "keyboard_hook_create_failed");
            let _ignored = ready.send(Err(Error::HookInstall(e.to_string())));
            return;
        }
    };

    // SAFETY: no preconditions.
    let thread_id = unsafe { GetCurrentThreadId() };
    let _ignored = ready.send(Ok(thread_id));

    let mut msg = MSG::default();
    // SAFETY: msg is a valid out-pointer; loop ends on WM_QUIT (0) or error (-1).
    while unsafe { GetMessageW(&mut msg, None, 0, 0) }.0 > 0 {
        // SAFETY: msg was filled by GetMessageW.
        unsafe {
            let _ignored = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    // SAFETY: hook came from SetWindowsHookExW on this thread.
    if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
        warn!(error = %e, "keyboard_hook_unhook_failed");
    }
    debug!("keyboard_hook_loop_exited");
}

/// `WH_KEYBOARD_LL` callback.
unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        // SAFETY: for HC_ACTION the OS passes a KBDLLHOOKSTRUCT in lparam.
        let kb = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        let msg = wparam.0 as u32;
        let kind = if msg == WM_KEYDOWN || msg == WM_SYSKEYDOWN {
            KeyKind::Down
        } else {
            KeyKind::Up
        };
        let event = KeyEvent {
            key: (kb.vkCode & 0xFF) as u8,
            kind,
            injected: kb.flags.0 & LLKHF_INJECTED.0 != 0,
            tagged: eventtag::is_tagged(kb.dwExtraInfo),
        };
        trace!(?event, "hook_event");
        let sink = SINK.read().clone();
        if let Some(sink) = sink
            && sink.on_key(event) == Verdict::Swallow
        {
            return LRESULT(1);
        }
    }
    // SAFETY: forwarding the unmodified hook arguments.
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}

/// High bit of `GetAsyncKeyState` is set while the key is down.
pub fn key_is_down(key: u8) -> bool {
    // SAFETY: no preconditions.
    unsafe { GetAsyncKeyState(i32::from(key)) < 0 }
}

/// Try to claim `hotkey` through `RegisterHotKey` and release it immediately.
///
/// Returns `Ok(true)` when the OS reports the combination as already
/// registered, `Ok(false)` when the trial claim succeeded (and was released),
/// and an error for any other failure.
pub fn trial_register(hotkey: Hotkey) -> Result<bool> {
    let id = TRIAL_ID_BASE + NEXT_TRIAL_ID.fetch_add(1, Ordering::Relaxed).rem_euclid(0x3FFF);
    let mods = hot_key_modifiers(hotkey.modifiers);
    // SAFETY: thread-associated registration (no window), released below.
    match unsafe { RegisterHotKey(None, id, mods, u32::from(hotkey.key)) } {
        Ok(()) => {
            // SAFETY: releasing the id registered just above on this thread.
            if let Err(e) = unsafe { UnregisterHotKey(None, id) } {
                warn!(id, error = %e, "trial_hotkey_release_failed");
            }
            Ok(false)
        }
        Err(e) if e.code() == ERROR_HOTKEY_ALREADY_REGISTERED.to_hresult() => Ok(true),
        Err(e) => Err(Error::OsError(e.to_string())),
    }
}

/// Map modifier flags onto `RegisterHotKey` modifiers.
fn hot_key_modifiers(m: Modifiers) -> HOT_KEY_MODIFIERS {
    let mut out = MOD_NOREPEAT;
    if m.contains(Modifiers::WIN) {
        out |= MOD_WIN;
    }
    if m.contains(Modifiers::CTRL) {
        out |= MOD_CONTROL;
    }
    if m.contains(Modifiers::SHIFT) {
        out |= MOD_SHIFT;
    }
    if m.contains(Modifiers::ALT) {
        out |= MOD_ALT;
    }
    out
}
