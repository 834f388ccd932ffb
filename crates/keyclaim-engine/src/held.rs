//! Held-key actions: callbacks that fire once a key has stayed down long
//! enough.
//!
//! A press of a key with registrations starts one timer per registration on
//! the host's tokio runtime. Releasing the key, or pressing any other key,
//! cancels the timers that have not fired yet. OS auto-repeat presses of the
//! tracked key are ignored, so each physical hold fires each action at most
//! once.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use keyhook::KeyState;
use parking_lot::Mutex;
use tokio::{runtime::Handle, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::dispatcher::panic_message;

/// Callback run when a hold completes. Runs on a runtime worker thread.
pub type HeldAction = Arc<dyn Fn() + Send + Sync>;

/// One `(module, key, duration, action)` registration.
struct HeldBinding {
    /// Registering module.
    module: String,
    /// Key that must stay down.
    key: u8,
    /// Required hold time.
    hold: Duration,
    /// Callback.
    action: HeldAction,
}

/// A timer that has been started and not yet cancelled.
struct PendingTimer {
    /// Module whose registration started it.
    module: String,
    /// Cancels the timer task.
    token: CancellationToken,
}

/// State behind the `HeldKeys` lock.
#[derive(Default)]
struct HeldState {
    /// All registrations.
    bindings: Vec<HeldBinding>,
    /// Key whose hold is being timed (or already fired) until its release.
    tracked: Option<u8>,
    /// Timers started for `tracked`.
    pending: Vec<PendingTimer>,
}

impl HeldState {
    /// Cancel every pending timer and stop tracking.
    fn cancel_all(&mut self) {
        for t in self.pending.drain(..) {
            t.token.cancel();
        }
        self.tracked = None;
    }
}

/// Registry and timer driver for held-key actions.
#[derive(Clone)]
pub struct HeldKeys {
    /// Registrations and timer bookkeeping.
    state: Arc<Mutex<HeldState>>,
    /// Mirrors `!bindings.is_empty()`, so key events skip the lock when
    /// nothing is registered.
    armed: Arc<AtomicBool>,
    /// Runtime the timers run on.
    runtime: Handle,
    /// Re-checked when a timer elapses.
    key_state: Arc<dyn KeyState>,
}

impl HeldKeys {
    /// Create an empty set of held-key registrations.
    pub fn new(runtime: Handle, key_state: Arc<dyn KeyState>) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeldState::default())),
            armed: Arc::new(AtomicBool::new(false)),
            runtime,
            key_state,
        }
    }

    /// Register `action` to fire once `key` has been held for `hold`.
    pub fn add(&self, module: &str, key: u8, hold: Duration, action: HeldAction) {
        debug!(module, key, hold_ms = hold.as_millis(), "held_key_registered");
        let mut st = self.state.lock();
        st.bindings.push(HeldBinding {
            module: module.to_string(),
            key,
            hold,
            action,
        });
        self.armed.store(true, Ordering::Release);
    }

    /// Drop `module`'s registrations and cancel its pending timers.
    pub fn remove_module(&self, module: &str) {
        let mut st = self.state.lock();
        st.bindings.retain(|b| b.module != module);
        st.pending.retain(|t| {
            let keep = t.module != module;
            if !keep {
                t.token.cancel();
            }
            keep
        });
        if st.pending.is_empty() {
            st.tracked = None;
        }
        self.armed.store(!st.bindings.is_empty(), Ordering::Release);
    }

    /// Feed a physical key press.
    pub fn on_key_down(&self, key: u8) {
        if !self.armed.load(Ordering::Acquire) {
            return;
        }
        let mut st = self.state.lock();
        if st.tracked == Some(key) {
            return;
        }
        if let Some(prev) = st.tracked {
            trace!(prev, key, "held_key_superseded");
            st.cancel_all();
        }
        let starts: Vec<(String, Duration, HeldAction)> = st
            .bindings
            .iter()
            .filter(|b| b.key == key)
            .map(|b| (b.module.clone(), b.hold, b.action.clone()))
            .collect();
        if starts.is_empty() {
            return;
        }
        st.tracked = Some(key);
        for (module, hold, action) in starts {
            let token = CancellationToken::new();
            st.pending.push(PendingTimer {
                module: module.clone(),
                token: token.clone(),
            });
            self.spawn_timer(key, module, hold, action, token);
        }
    }

    /// Feed a physical key release.
    pub fn on_key_up(&self, key: u8) {
        if !self.armed.load(Ordering::Acquire) {
            return;
        }
        let mut st = self.state.lock();
        if st.tracked == Some(key) {
            trace!(key, "held_key_released");
            st.cancel_all();
        }
    }

    /// Start one timer task.
    fn spawn_timer(
        &self,
        key: u8,
        module: String,
        hold: Duration,
        action: HeldAction,
        cancel: CancellationToken,
    ) {
        let key_state = self.key_state.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = time::sleep(hold) => {}
                _ = cancel.cancelled() => {
                    trace!(module, key, "held_key_cancelled");
                    return;
                }
            }
            if !key_state.is_down(key) {
                trace!(module, key, "held_key_up_at_deadline");
                return;
            }
            debug!(module, key, "held_key_fired");
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| action())) {
                error!(
                    module,
                    key,
                    panic = panic_message(payload.as_ref()),
                    "held_key_action_panicked"
                );
            }
        });
    }
}
