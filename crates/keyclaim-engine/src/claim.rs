//! Claim owners, claims and the action callback type.

use std::{error::Error as StdError, fmt, result::Result as StdResult, sync::Arc};

use keycode::{Hotkey, HotkeyHandle, Modifiers, encode};
use serde::Serialize;

/// Error type a hotkey action may return.
pub type ActionError = Box<dyn StdError + Send + Sync>;

/// Outcome of a hotkey action: `Ok(true)` asks the hook to suppress the OS
/// side effects of the keystroke (e.g. the Start menu on win release).
pub type ActionResult = StdResult<bool, ActionError>;

/// Callback bound to a claim. Receives the modifier flags and key code of the
/// matched hotkey. Runs on the hook thread and must not block.
pub type Action = Arc<dyn Fn(Modifiers, u8) -> ActionResult + Send + Sync>;

/// Module name reported by [`ClaimOwner::system`].
pub const SYSTEM_OWNER: &str = "System";

/// Who made a claim: a module plus a per-module hotkey id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClaimOwner {
    /// Opaque module identifier.
    pub module: String,
    /// Distinguishes several claims made by one module.
    pub id: i32,
}

impl ClaimOwner {
    /// Build an owner.
    pub fn new(module: impl Into<String>, id: i32) -> Self {
        Self {
            module: module.into(),
            id,
        }
    }

    /// Synthetic owner standing in for an unenumerable external holder.
    pub fn system() -> Self {
        Self::new(SYSTEM_OWNER, 0)
    }

    /// True when this owner is `(module, id)`.
    pub fn is(&self, module: &str, id: i32) -> bool {
        self.module == module && self.id == id
    }
}

impl fmt::Display for ClaimOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.module, self.id)
    }
}

/// A hotkey bound to an owner and the action it triggers.
#[derive(Clone)]
pub struct Claim {
    /// Requested combination.
    pub hotkey: Hotkey,
    /// Claimant.
    pub owner: ClaimOwner,
    /// Callback run on dispatch.
    action: Action,
}

impl fmt::Debug for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claim")
            .field("hotkey", &self.hotkey.to_string())
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl Claim {
    /// Bind `hotkey` for `owner` to `action`.
    pub fn new(hotkey: Hotkey, owner: ClaimOwner, action: Action) -> Self {
        Self {
            hotkey,
            owner,
            action,
        }
    }

    /// Packed handle of the claimed hotkey.
    pub fn handle(&self) -> HotkeyHandle {
        encode(self.hotkey)
    }

    /// The bound action.
    pub fn action(&self) -> &Action {
        &self.action
    }
}
