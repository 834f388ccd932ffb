//! Keyclaim Engine
//!
//! The engine lets many modules claim global hotkeys in one process and
//! arbitrates between them:
//! - [`Registry`]: claims, in-app and system conflict tracking, promotion
//! - [`SystemProbe`]: detects combinations owned outside the process
//! - [`Dispatcher`]: runs a matched action behind an error/panic boundary
//! - [`HeldKeys`]: actions that fire after a key is held long enough
//! - [`InputHook`]: the swallow/pass decision for every raw key event
//!
//! [`Engine`] is the composition root: build one, register claims through
//! [`Engine::registry`], then call [`Engine::start_hook`].
use std::{sync::Arc, time::Duration};

mod claim;
mod dispatcher;
mod error;
mod held;
mod hook;
mod probe;
mod registry;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

use crossbeam_channel::Receiver;
use keycode::vk;
use keyhook::{HookGuard, KeySink, KeyState, OsKeyState};
use parking_lot::Mutex;
use relaykey::RelayKey;
use tokio::runtime::Handle;
use tracing::{info, warn};

pub use claim::{Action, ActionError, ActionResult, Claim, ClaimOwner, SYSTEM_OWNER};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use held::{HeldAction, HeldKeys};
pub use hook::{HookEvent, InputHook};
pub use probe::{OsProbe, SystemProbe};
pub use registry::{Conflict, ConflictGroup, ConflictReport, Registry};

/// Threshold for warning about actions that stall the hook.
pub const SLOW_ACTION_WARN_MS: u64 = 5;

/// Lifecycle events queued for [`Engine::hook_events`] before new ones are
/// dropped.
pub const HOOK_EVENT_CAPACITY: usize = 64;

/// Engine tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Actions slower than this are logged at warn.
    pub slow_action_warn: Duration,
    /// Key reported as [`HookEvent::EscapePressed`].
    pub escape_key: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slow_action_warn: Duration::from_millis(SLOW_ACTION_WARN_MS),
            escape_key: vk::ESCAPE,
        }
    }
}

/// Whether the OS hook is delivering events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    /// [`Engine::start_hook`] has not been called.
    NotStarted,
    /// Events are flowing through [`InputHook`].
    Installed,
    /// Installation failed; claims stay valid but never fire.
    Disabled {
        /// Why installation failed.
        reason: String,
    },
}

/// Composition root tying the registry, hook and held-key timers together.
pub struct Engine {
    /// Shared claim registry.
    registry: Arc<Registry>,
    /// Hook decision logic, shared with the OS hook thread.
    hook: Arc<InputHook>,
    /// Held-key registrations.
    held: HeldKeys,
    /// Lifecycle events from the hook.
    events: Receiver<HookEvent>,
    /// Guard keeping the OS hook alive.
    guard: Mutex<Option<HookGuard>>,
    /// Last install outcome.
    status: Mutex<HookStatus>,
}

impl Engine {
    /// Create an engine using the OS probe, key state and injector.
    ///
    /// Must be called inside a tokio runtime; held-key timers run on it.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self::with_parts(
            config,
            Arc::new(OsProbe),
            Arc::new(OsKeyState),
            RelayKey::new(),
            runtime,
        ))
    }

    /// Create an engine from explicit collaborators.
    pub fn with_parts(
        config: EngineConfig,
        probe: Arc<dyn SystemProbe>,
        key_state: Arc<dyn KeyState>,
        relay: RelayKey,
        runtime: Handle,
    ) -> Self {
        let registry = Arc::new(Registry::new(probe));
        let held = HeldKeys::new(runtime, key_state.clone());
        let (tx, rx) = crossbeam_channel::bounded(HOOK_EVENT_CAPACITY);
        let hook = Arc::new(InputHook::new(
            registry.clone(),
            Dispatcher::new(config.slow_action_warn),
            held.clone(),
            key_state,
            relay,
            config.escape_key,
            tx,
        ));
        Self {
            registry,
            hook,
            held,
            events: rx,
            guard: Mutex::new(None),
            status: Mutex::new(HookStatus::NotStarted),
        }
    }

    /// The claim registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The hook sink, for feeding events directly.
    pub fn sink(&self) -> Arc<dyn KeySink> {
        self.hook.clone()
    }

    /// Register a held-key action for `module`.
    pub fn add_held_key_action(&self, module: &str, key: u8, hold: Duration, action: HeldAction) {
        self.held.add(module, key, hold, action);
    }

    /// Drop every held-key action `module` registered.
    pub fn remove_held_key_actions(&self, module: &str) {
        self.held.remove_module(module);
    }

    /// Receiver for key lifecycle events.
    ///
    /// At most [`HOOK_EVENT_CAPACITY`] events wait unread; the hook drops
    /// newer ones rather than block.
    pub fn hook_events(&self) -> Receiver<HookEvent> {
        self.events.clone()
    }

    /// Install the OS hook once.
    ///
    /// Failure is logged once and leaves the engine running with no hotkeys
    /// firing; later calls return the recorded status without retrying.
    pub fn start_hook(&self) -> HookStatus {
        let mut status = self.status.lock();
        if *status != HookStatus::NotStarted {
            return status.clone();
        }
        *status = match keyhook::install(self.sink()) {
            Ok(guard) => {
                *self.guard.lock() = Some(guard);
                info!("hotkey_hook_started");
                HookStatus::Installed
            }
            Err(e) => {
                warn!(error = %e, "hook_install_failed");
                HookStatus::Disabled {
                    reason: e.to_string(),
                }
            }
        };
        status.clone()
    }

    /// Remove the OS hook if installed.
    pub fn stop_hook(&self) {
        if self.guard.lock().take().is_some() {
            *self.status.lock() = HookStatus::NotStarted;
        }
    }

    /// Current hook status.
    pub fn hook_status(&self) -> HookStatus {
        self.status.lock().clone()
    }
}
