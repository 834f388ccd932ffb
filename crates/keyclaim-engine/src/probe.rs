//! Detection of hotkeys already owned outside this process.

use keycode::Hotkey;
use tracing::{trace, warn};

/// Answers "does something outside this process already own `hotkey`?".
///
/// Implementations may have a short-lived, system-wide side effect (a trial
/// registration). Ambiguous answers must come back as `false` so a legitimate
/// claim is never suppressed by a probe failure.
pub trait SystemProbe: Send + Sync {
    /// True only when an external owner definitely holds `hotkey`.
    fn is_claimed_externally(&self, hotkey: Hotkey) -> bool;
}

/// Probe backed by a trial registration through the OS hotkey facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProbe;

impl SystemProbe for OsProbe {
    fn is_claimed_externally(&self, hotkey: Hotkey) -> bool {
        match keyhook::trial_register(hotkey) {
            Ok(claimed) => {
                trace!(%hotkey, claimed, "system_probe");
                claimed
            }
            Err(keyhook::Error::Unsupported) => false,
            Err(e) => {
                warn!(%hotkey, error = %e, "system_probe_ambiguous");
                false
            }
        }
    }
}
