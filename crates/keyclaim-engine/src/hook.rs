//! Decision logic behind the OS keyboard hook.
//!
//! [`InputHook`] is the [`KeySink`] handed to `keyhook::install`. For every
//! event it updates held-key timers and lifecycle tracking, then on a key
//! press builds the current hotkey from live modifier state and dispatches it
//! if exactly one claim owns it.

use std::sync::Arc;

use crossbeam_channel::Sender;
use keycode::{Hotkey, Modifiers, encode};
use keyhook::{KeyEvent, KeyKind, KeySink, KeyState, Verdict, policy};
use parking_lot::Mutex;
use relaykey::RelayKey;
use tracing::trace;

use crate::{dispatcher::Dispatcher, held::HeldKeys, registry::Registry};

/// Key lifecycle notifications published by the hook, independent of hotkey
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    /// The configured escape key went down.
    EscapePressed,
    /// A modifier seen going down has been released.
    ModifierReleased(Modifiers),
}

/// Hook-side view of the engine.
pub struct InputHook {
    /// Claim lookup (fast path only).
    registry: Arc<Registry>,
    /// Action runner.
    dispatcher: Dispatcher,
    /// Held-key timers.
    held: HeldKeys,
    /// Live key state for the modifier snapshot.
    key_state: Arc<dyn KeyState>,
    /// Posts the suppression keystroke.
    relay: RelayKey,
    /// Key reported as [`HookEvent::EscapePressed`].
    escape_key: u8,
    /// Modifier key codes seen going down and not yet released. Left and
    /// right keys are tracked separately so a flag is released only when
    /// both sides are up.
    pressed: Mutex<Vec<u8>>,
    /// Lifecycle event outlet.
    events: Sender<HookEvent>,
}

impl InputHook {
    /// Wire up a hook from its collaborators.
    pub fn new(
        registry: Arc<Registry>,
        dispatcher: Dispatcher,
        held: HeldKeys,
        key_state: Arc<dyn KeyState>,
        relay: RelayKey,
        escape_key: u8,
        events: Sender<HookEvent>,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            held,
            key_state,
            relay,
            escape_key,
            pressed: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Held-key and lifecycle bookkeeping for one untagged event.
    fn track(&self, event: &KeyEvent) {
        let modifier = Modifiers::for_key(event.key);
        match event.kind {
            KeyKind::Down => {
                if !event.injected {
                    self.held.on_key_down(event.key);
                }
                if modifier.is_some() {
                    let mut pressed = self.pressed.lock();
                    if !pressed.contains(&event.key) {
                        pressed.push(event.key);
                    }
                }
                if event.key == self.escape_key {
                    self.publish(HookEvent::EscapePressed);
                }
            }
            KeyKind::Up => {
                if !event.injected {
                    self.held.on_key_up(event.key);
                }
                if let Some(m) = modifier
                    && self.release_modifier(event.key, m)
                {
                    self.publish(HookEvent::ModifierReleased(m));
                }
            }
        }
    }

    /// Forget `key`; true when it was down and no other key holding `flag`
    /// remains down.
    fn release_modifier(&self, key: u8, flag: Modifiers) -> bool {
        let mut pressed = self.pressed.lock();
        let Some(pos) = pressed.iter().position(|k| *k == key) else {
            return false;
        };
        pressed.swap_remove(pos);
        !pressed.iter().any(|k| Modifiers::for_key(*k) == Some(flag))
    }

    /// Send a lifecycle event. A full queue drops the event.
    fn publish(&self, event: HookEvent) {
        if self.events.try_send(event).is_err() {
            trace!(?event, "hook_event_dropped");
        }
    }
}

impl KeySink for InputHook {
    fn on_key(&self, event: KeyEvent) -> Verdict {
        if event.tagged {
            trace!(key = event.key, "ignoring_tagged_event");
            return Verdict::PassThrough;
        }
        self.track(&event);

        let hotkey = Hotkey::new(self.key_state.modifiers(), event.key);
        let handle = encode(hotkey);
        let claim = match event.kind {
            KeyKind::Down if !handle.is_none() => self.registry.dispatch_target(handle),
            _ => None,
        };
        let decision = policy::classify(&event, claim.is_some());
        if decision.dispatch
            && let Some(claim) = claim
        {
            trace!(%hotkey, owner = %claim.owner, "hotkey_matched");
            if self.dispatcher.invoke(&claim, handle) {
                self.relay.suppress();
            }
        }
        if decision.swallow {
            Verdict::Swallow
        } else {
            Verdict::PassThrough
        }
    }
}
