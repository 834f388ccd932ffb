//! Fakes for driving the engine without an OS hook.
//!
//! Enabled for this crate's tests and for dependents through the
//! `test-utils` feature.
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use keycode::Hotkey;
use keyhook::KeyState;
use parking_lot::Mutex;
use relaykey::{Poster, RelayKey};
use tokio::runtime::Handle;

use crate::{Action, Engine, EngineConfig, SystemProbe};

/// Probe answering from a fixed set of externally owned hotkeys.
#[derive(Default)]
pub struct FakeProbe {
    /// Combinations "someone else" owns.
    taken: Mutex<HashSet<Hotkey>>,
    /// Number of probe calls so far.
    calls: AtomicUsize,
}

impl FakeProbe {
    /// Probe reporting `taken` as externally claimed.
    pub fn with_taken(taken: impl IntoIterator<Item = Hotkey>) -> Self {
        Self {
            taken: Mutex::new(taken.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Mark `hotkey` as owned by another process.
    pub fn take(&self, hotkey: Hotkey) {
        self.taken.lock().insert(hotkey);
    }

    /// Number of times the probe was consulted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SystemProbe for FakeProbe {
    fn is_claimed_externally(&self, hotkey: Hotkey) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.taken.lock().contains(&hotkey)
    }
}

/// Key state driven by the test.
#[derive(Default)]
pub struct FakeKeyState {
    /// Keys currently held.
    down: Mutex<HashSet<u8>>,
}

impl FakeKeyState {
    /// Mark `key` as held.
    pub fn press(&self, key: u8) {
        self.down.lock().insert(key);
    }

    /// Mark `key` as released.
    pub fn release(&self, key: u8) {
        self.down.lock().remove(&key);
    }
}

impl KeyState for FakeKeyState {
    fn is_down(&self, key: u8) -> bool {
        self.down.lock().contains(&key)
    }
}

/// Poster that records every transition instead of injecting it.
#[derive(Default)]
pub struct RecordingPoster {
    /// `(key, down)` pairs in posting order.
    posted: Mutex<Vec<(u8, bool)>>,
}

impl RecordingPoster {
    /// Everything posted so far.
    pub fn posted(&self) -> Vec<(u8, bool)> {
        self.posted.lock().clone()
    }

    /// Number of suppression key-downs posted.
    pub fn suppressions(&self) -> usize {
        self.posted
            .lock()
            .iter()
            .filter(|(k, down)| *k == eventtag::SUPPRESS_KEY && *down)
            .count()
    }
}

impl Poster for RecordingPoster {
    fn post_key(&self, key: u8, down: bool) -> relaykey::Result<()> {
        self.posted.lock().push((key, down));
        Ok(())
    }
}

/// Action that returns `Ok(false)` and counts its calls.
pub fn counting_action() -> (Action, Arc<AtomicUsize>) {
    counting_action_returning(false)
}

/// Action that returns `Ok(suppress)` and counts its calls.
pub fn counting_action_returning(suppress: bool) -> (Action, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let action: Action = Arc::new(move |_, _| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(suppress)
    });
    (action, count)
}

/// Action that does nothing.
pub fn noop_action() -> Action {
    Arc::new(|_, _| Ok(false))
}

/// An engine wired to fakes, plus handles to the fakes.
pub struct TestEngine {
    /// The engine under test.
    pub engine: Engine,
    /// Its system probe.
    pub probe: Arc<FakeProbe>,
    /// Its key state.
    pub keys: Arc<FakeKeyState>,
    /// Its suppression-key injector.
    pub poster: Arc<RecordingPoster>,
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngine {
    /// Build with default config on the current tokio runtime.
    pub fn new() -> Self {
        Self::with_probe(FakeProbe::default())
    }

    /// Build with a prepared probe on the current tokio runtime.
    pub fn with_probe(probe: FakeProbe) -> Self {
        Self::with_config(EngineConfig::default(), probe, Handle::current())
    }

    /// Build from every part.
    pub fn with_config(config: EngineConfig, probe: FakeProbe, runtime: Handle) -> Self {
        let probe = Arc::new(probe);
        let keys = Arc::new(FakeKeyState::default());
        let poster = Arc::new(RecordingPoster::default());
        let engine = Engine::with_parts(
            config,
            probe.clone(),
            keys.clone(),
            RelayKey::with_poster(poster.clone()),
            runtime,
        );
        Self {
            engine,
            probe,
            keys,
            poster,
        }
    }
}
