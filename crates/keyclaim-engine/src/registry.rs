//! Claim storage and conflict arbitration.
//!
//! Every handle is in exactly one state: absent (unclaimed), `Owned` by one
//! claim, or held in an in-app or system conflict set. The state lives in a
//! single map, so a handle cannot be in two states at once.
//!
//! Two locks are involved:
//! - `tables` serialises all mutation and classification. It may be held
//!   across a [`SystemProbe`] call and is never touched by the hook thread.
//! - `index` mirrors the `Owned` entries for the dispatch fast path. Writers
//!   hold it only to copy the changed entries; the hook takes a read lock for
//!   one lookup.

use std::{collections::HashMap, slice, sync::Arc};

use keycode::{Hotkey, HotkeyHandle, decode, encode};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    claim::{Claim, ClaimOwner},
    probe::SystemProbe,
};

/// Classification of a hotkey against the current claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Conflict {
    /// Dispatchable (or would be).
    NoConflict,
    /// Contested by two or more claims inside this process.
    InAppConflict,
    /// Owned by the OS or another process.
    SystemConflict,
}

/// Per-handle registry state. Absence from the map means unclaimed.
#[derive(Debug)]
enum HandleState {
    /// Exactly one claim, which is dispatched.
    Owned(Claim),
    /// Two or more claims from distinct owners; none dispatched.
    InAppConflict(Vec<Claim>),
    /// Claims for a combination owned outside the process; none dispatched.
    SystemConflict(Vec<Claim>),
}

impl HandleState {
    /// Every claim held in this state.
    fn claims(&self) -> &[Claim] {
        match self {
            Self::Owned(c) => slice::from_ref(c),
            Self::InAppConflict(set) | Self::SystemConflict(set) => set,
        }
    }
}

/// One contested hotkey in a [`ConflictReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictGroup {
    /// The contested combination.
    pub hotkey: Hotkey,
    /// Every owner wanting it, in claim order.
    pub claimants: Vec<ClaimOwner>,
}

/// Every contested handle, split by conflict kind, sorted by handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Handles contested inside the process.
    pub in_app: Vec<ConflictGroup>,
    /// Handles owned outside the process.
    pub system: Vec<ConflictGroup>,
}

impl ConflictReport {
    /// True when nothing is contested.
    pub fn is_empty(&self) -> bool {
        self.in_app.is_empty() && self.system.is_empty()
    }
}

/// Mutable registry tables, guarded by `Registry::tables`.
#[derive(Default)]
struct Tables {
    /// Arbitration state per handle.
    states: HashMap<HotkeyHandle, HandleState>,
    /// Parked claims per module, outside arbitration.
    disabled: HashMap<String, Vec<Claim>>,
}

/// Registry of hotkey claims.
///
/// Construct one per process at the composition root and share it by `Arc`;
/// tests build independent instances with a fake probe.
pub struct Registry {
    /// Authoritative state; see the module docs.
    tables: Mutex<Tables>,
    /// Dispatch fast path: shared copies of every `Owned` claim.
    index: RwLock<HashMap<HotkeyHandle, Arc<Claim>>>,
    /// External-ownership check for unclaimed handles.
    probe: Arc<dyn SystemProbe>,
}

impl Registry {
    /// Create an empty registry using `probe` for external ownership checks.
    pub fn new(probe: Arc<dyn SystemProbe>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            index: RwLock::new(HashMap::new()),
            probe,
        }
    }

    /// Register a claim. Returns true when the claim is (or already was)
    /// the dispatched owner of its hotkey, or was parked as disabled.
    ///
    /// Key-less hotkeys are rejected without touching any state.
    pub fn add_claim(&self, claim: Claim, enabled: bool) -> bool {
        let handle = claim.handle();
        if handle.is_none() {
            debug!(owner = %claim.owner, "claim_rejected_no_key");
            return false;
        }
        let mut tables = self.tables.lock();
        if !enabled {
            debug!(owner = %claim.owner, hotkey = %claim.hotkey, "claim_parked_disabled");
            tables
                .disabled
                .entry(claim.owner.module.clone())
                .or_default()
                .push(claim);
            return true;
        }
        let accepted = self.arbitrate(&mut tables, claim);
        self.sync_index(&tables, &[handle]);
        accepted
    }

    /// Remove every claim `module` holds and return the ones that were in
    /// arbitration (owned or conflicting). Its disabled claims are dropped.
    ///
    /// A conflict set shrinking to one claim promotes that claim to owner.
    /// System conflicts are never promoted: the external owner is still there.
    pub fn remove_claims_for_module(&self, module: &str) -> Vec<Claim> {
        let mut tables = self.tables.lock();
        tables.disabled.remove(module);
        let (removed, touched) = take_module_claims(&mut tables, module);
        self.sync_index(&tables, &touched);
        debug!(module, removed = removed.len(), "module_claims_removed");
        removed
    }

    /// Pull all of `module`'s claims out of arbitration, remembering them so
    /// [`Registry::enable_claims_for_module`] can restore them.
    pub fn disable_claims_for_module(&self, module: &str) {
        let mut tables = self.tables.lock();
        let mut parked = tables.disabled.remove(module).unwrap_or_default();
        let (removed, touched) = take_module_claims(&mut tables, module);
        parked.extend(removed);
        debug!(module, parked = parked.len(), "module_claims_disabled");
        if !parked.is_empty() {
            tables.disabled.insert(module.to_string(), parked);
        }
        self.sync_index(&tables, &touched);
    }

    /// Replay every parked claim of `module` through arbitration.
    pub fn enable_claims_for_module(&self, module: &str) {
        let mut tables = self.tables.lock();
        let parked = tables.disabled.remove(module).unwrap_or_default();
        let mut touched = Vec::with_capacity(parked.len());
        for claim in parked {
            touched.push(claim.handle());
            self.arbitrate(&mut tables, claim);
        }
        debug!(module, replayed = touched.len(), "module_claims_enabled");
        self.sync_index(&tables, &touched);
    }

    /// Status of `hotkey` regardless of who asks.
    ///
    /// An owned hotkey reports `NoConflict`. An unclaimed one is probed.
    pub fn classify(&self, hotkey: Hotkey) -> Conflict {
        let handle = encode(hotkey);
        if handle.is_none() {
            return Conflict::NoConflict;
        }
        let tables = self.tables.lock();
        match tables.states.get(&handle) {
            Some(HandleState::InAppConflict(_)) => Conflict::InAppConflict,
            Some(HandleState::SystemConflict(_)) => Conflict::SystemConflict,
            Some(HandleState::Owned(_)) => Conflict::NoConflict,
            None => self.probe_conflict(hotkey),
        }
    }

    /// Status of `hotkey` from the point of view of `(module, id)`.
    ///
    /// Owning the hotkey yourself is not a conflict; anyone else owning it is
    /// an in-app conflict.
    pub fn classify_for(&self, hotkey: Hotkey, module: &str, id: i32) -> Conflict {
        let handle = encode(hotkey);
        if handle.is_none() {
            return Conflict::NoConflict;
        }
        let tables = self.tables.lock();
        match tables.states.get(&handle) {
            Some(HandleState::InAppConflict(_)) => Conflict::InAppConflict,
            Some(HandleState::SystemConflict(_)) => Conflict::SystemConflict,
            Some(HandleState::Owned(c)) if c.owner.is(module, id) => Conflict::NoConflict,
            Some(HandleState::Owned(_)) => Conflict::InAppConflict,
            None => self.probe_conflict(hotkey),
        }
    }

    /// Every owner contesting `hotkey`.
    ///
    /// Falls back to the owner of an owned hotkey, and finally to the
    /// synthetic [`ClaimOwner::system`] when nothing in-process explains it.
    pub fn all_conflicts_for(&self, hotkey: Hotkey) -> Vec<ClaimOwner> {
        let tables = self.tables.lock();
        match tables.states.get(&encode(hotkey)) {
            Some(state) => state.claims().iter().map(|c| c.owner.clone()).collect(),
            None => vec![ClaimOwner::system()],
        }
    }

    /// Full dump of contested handles for the settings surface.
    pub fn conflict_report(&self) -> ConflictReport {
        let tables = self.tables.lock();
        let mut handles: Vec<&HotkeyHandle> = tables.states.keys().collect();
        handles.sort();
        let mut report = ConflictReport::default();
        for handle in handles {
            let group = |set: &[Claim]| ConflictGroup {
                hotkey: decode(*handle),
                claimants: set.iter().map(|c| c.owner.clone()).collect(),
            };
            match &tables.states[handle] {
                HandleState::InAppConflict(set) => report.in_app.push(group(set)),
                HandleState::SystemConflict(set) => report.system.push(group(set)),
                HandleState::Owned(_) => {}
            }
        }
        report
    }

    /// Every dispatched hotkey and its owner, sorted by handle.
    pub fn owned_snapshot(&self) -> Vec<(Hotkey, ClaimOwner)> {
        let index = self.index.read();
        let mut out: Vec<(HotkeyHandle, Hotkey, ClaimOwner)> = index
            .iter()
            .map(|(h, c)| (*h, c.hotkey, c.owner.clone()))
            .collect();
        out.sort_by_key(|(h, _, _)| *h);
        out.into_iter().map(|(_, hk, o)| (hk, o)).collect()
    }

    /// Claims `module` currently has parked.
    pub fn disabled_claims(&self, module: &str) -> Vec<Claim> {
        self.tables
            .lock()
            .disabled
            .get(module)
            .cloned()
            .unwrap_or_default()
    }

    /// Dispatch fast path: the sole owner of `handle`, if there is one.
    ///
    /// One read-lock acquisition and a reference-count bump; nothing is
    /// allocated.
    pub fn dispatch_target(&self, handle: HotkeyHandle) -> Option<Arc<Claim>> {
        self.index.read().get(&handle).cloned()
    }

    /// Apply the arbitration rule for one enabled claim.
    fn arbitrate(&self, tables: &mut Tables, claim: Claim) -> bool {
        let handle = claim.handle();
        let owner = claim.owner.clone();
        let (next, accepted) = match tables.states.remove(&handle) {
            Some(HandleState::InAppConflict(mut set)) => {
                join_set(&mut set, claim);
                (HandleState::InAppConflict(set), false)
            }
            Some(HandleState::SystemConflict(mut set)) => {
                join_set(&mut set, claim);
                (HandleState::SystemConflict(set), false)
            }
            Some(HandleState::Owned(existing)) if existing.owner == claim.owner => {
                (HandleState::Owned(claim), true)
            }
            Some(HandleState::Owned(existing)) => {
                debug!(%handle, winner = %existing.owner, %owner, "claim_demoted_in_app_conflict");
                (HandleState::InAppConflict(vec![existing, claim]), false)
            }
            None if self.probe.is_claimed_externally(claim.hotkey) => {
                debug!(%handle, %owner, "claim_system_conflict");
                (HandleState::SystemConflict(vec![claim]), false)
            }
            None => (HandleState::Owned(claim), true),
        };
        trace!(%handle, %owner, accepted, "claim_arbitrated");
        tables.states.insert(handle, next);
        accepted
    }

    /// Probe an unclaimed hotkey.
    fn probe_conflict(&self, hotkey: Hotkey) -> Conflict {
        if self.probe.is_claimed_externally(hotkey) {
            Conflict::SystemConflict
        } else {
            Conflict::NoConflict
        }
    }

    /// Copy the current owner (or absence) of each handle into the index.
    fn sync_index(&self, tables: &Tables, handles: &[HotkeyHandle]) {
        if handles.is_empty() {
            return;
        }
        let mut index = self.index.write();
        for handle in handles {
            match tables.states.get(handle) {
                Some(HandleState::Owned(c)) => {
                    index.insert(*handle, Arc::new(c.clone()));
                }
                _ => {
                    index.remove(handle);
                }
            }
        }
    }
}

/// Add `claim` to a conflict set, replacing an earlier claim by the same owner.
fn join_set(set: &mut Vec<Claim>, claim: Claim) {
    match set.iter_mut().find(|c| c.owner == claim.owner) {
        Some(slot) => *slot = claim,
        None => set.push(claim),
    }
}

/// Remove `module`'s claims from every arbitration state.
///
/// Returns the removed claims (sorted by handle, then owner) and every handle
/// whose state changed.
fn take_module_claims(tables: &mut Tables, module: &str) -> (Vec<Claim>, Vec<HotkeyHandle>) {
    let mut removed: Vec<Claim> = Vec::new();
    let mut touched = Vec::new();
    let handles: Vec<HotkeyHandle> = tables
        .states
        .iter()
        .filter(|(_, s)| s.claims().iter().any(|c| c.owner.module == module))
        .map(|(h, _)| *h)
        .collect();

    for handle in handles {
        let Some(state) = tables.states.remove(&handle) else {
            continue;
        };
        touched.push(handle);
        let next = match state {
            HandleState::Owned(c) => {
                removed.push(c);
                None
            }
            HandleState::InAppConflict(set) => {
                let (gone, mut kept): (Vec<Claim>, Vec<Claim>) =
                    set.into_iter().partition(|c| c.owner.module == module);
                removed.extend(gone);
                match kept.len() {
                    0 => None,
                    1 => kept.pop().map(|c| {
                        debug!(%handle, owner = %c.owner, "claim_promoted");
                        HandleState::Owned(c)
                    }),
                    _ => Some(HandleState::InAppConflict(kept)),
                }
            }
            HandleState::SystemConflict(set) => {
                let (gone, kept): (Vec<Claim>, Vec<Claim>) =
                    set.into_iter().partition(|c| c.owner.module == module);
                removed.extend(gone);
                (!kept.is_empty()).then_some(HandleState::SystemConflict(kept))
            }
        };
        if let Some(next) = next {
            tables.states.insert(handle, next);
        }
    }

    removed.sort_by(|a, b| (a.handle(), &a.owner).cmp(&(b.handle(), &b.owner)));
    (removed, touched)
}
