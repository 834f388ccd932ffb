//! Runs a matched claim's action behind a fault boundary.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};

use keycode::{HotkeyHandle, decode};
use tracing::{debug, error, warn};

use crate::claim::Claim;

/// Invokes hotkey actions on the hook thread.
///
/// Errors and panics raised by an action are logged here and never reach the
/// OS callback; the keystroke is still treated as handled.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// Actions running longer than this are reported.
    slow_warn: Duration,
}

impl Dispatcher {
    /// Create a dispatcher warning about actions slower than `slow_warn`.
    pub fn new(slow_warn: Duration) -> Self {
        Self { slow_warn }
    }

    /// Run `claim`'s action for `handle`. Returns true when the action asked
    /// for the OS side effects of the keystroke to be suppressed.
    pub fn invoke(&self, claim: &Claim, handle: HotkeyHandle) -> bool {
        let hotkey = decode(handle);
        let action = claim.action();
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| action(hotkey.modifiers, hotkey.key)));
        let elapsed = start.elapsed();
        if elapsed > self.slow_warn {
            warn!(
                owner = %claim.owner,
                %hotkey,
                elapsed_ms = elapsed.as_millis(),
                "slow_hotkey_action"
            );
        }
        match outcome {
            Ok(Ok(suppress)) => {
                debug!(owner = %claim.owner, %hotkey, suppress, "hotkey_dispatched");
                suppress
            }
            Ok(Err(e)) => {
                warn!(owner = %claim.owner, %hotkey, error = %e, "hotkey_action_failed");
                false
            }
            Err(payload) => {
                error!(
                    owner = %claim.owner,
                    %hotkey,
                    panic = panic_message(payload.as_ref()),
                    "hotkey_action_panicked"
                );
                false
            }
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic>"
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{
            Arc,
            atomic::{AtomicU8, Ordering},
        },
    };

    use keycode::{Hotkey, Modifiers, encode};

    use super::*;
    use crate::claim::ClaimOwner;

    fn claim_with(action: crate::claim::Action) -> (Claim, HotkeyHandle) {
        let hotkey = Hotkey::new(Modifiers::CTRL | Modifiers::ALT, 0x4B);
        (
            Claim::new(hotkey, ClaimOwner::new("Test", 1), action),
            encode(hotkey),
        )
    }

    #[test]
    fn passes_modifiers_and_key_through() {
        let seen = Arc::new(AtomicU8::new(0));
        let s = seen.clone();
        let (claim, handle) = claim_with(Arc::new(move |mods, key| {
            s.store(mods.bits() ^ key, Ordering::SeqCst);
            Ok(true)
        }));
        let d = Dispatcher::new(Duration::from_millis(5));
        assert!(d.invoke(&claim, handle));
        let want = (Modifiers::CTRL | Modifiers::ALT).bits() ^ 0x4B;
        assert_eq!(seen.load(Ordering::SeqCst), want);
    }

    #[test]
    fn errors_are_contained() {
        let (claim, handle) =
            claim_with(Arc::new(|_, _| Err(io::Error::other("boom").into())));
        assert!(!Dispatcher::new(Duration::from_millis(5)).invoke(&claim, handle));
    }

    #[test]
    fn panics_are_contained() {
        let (claim, handle) = claim_with(Arc::new(|_, _| panic!("module bug")));
        assert!(!Dispatcher::new(Duration::from_millis(5)).invoke(&claim, handle));
    }

    #[test]
    fn panic_payload_text() {
        let p: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(p.as_ref()), "owned");
        let p: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(p.as_ref()), "<non-string panic>");
    }
}
