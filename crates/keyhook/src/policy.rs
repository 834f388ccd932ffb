use crate::{KeyEvent, KeyKind};

/// What the hook should do with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Run matching and dispatch for this event.
    pub dispatch: bool,
    /// Stop the event from reaching the rest of the system.
    pub swallow: bool,
}

impl Decision {
    /// Forward untouched, no dispatch.
    pub const PASS: Self = Self {
        dispatch: false,
        swallow: false,
    };
}

/// Classify how the hook should handle a given event.
///
/// - Tagged events (our own injections) always pass with no dispatch.
/// - Only a key-down with an owner dispatches, and it is then swallowed.
/// - Key-ups always pass: the matching key-down was the only one consumed.
pub fn classify(event: &KeyEvent, owned: bool) -> Decision {
    if event.tagged {
        return Decision::PASS;
    }
    match event.kind {
        KeyKind::Down if owned => Decision {
            dispatch: true,
            swallow: true,
        },
        _ => Decision::PASS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: KeyKind, tagged: bool) -> KeyEvent {
        KeyEvent {
            key: 0x41,
            kind,
            injected: tagged,
            tagged,
        }
    }

    #[test]
    fn tagged_events_never_dispatch() {
        assert_eq!(classify(&ev(KeyKind::Down, true), true), Decision::PASS);
        assert_eq!(classify(&ev(KeyKind::Up, true), true), Decision::PASS);
    }

    #[test]
    fn owned_keydown_dispatches_and_swallows() {
        let d = classify(&ev(KeyKind::Down, false), true);
        assert!(d.dispatch);
        assert!(d.swallow);
    }

    #[test]
    fn unowned_or_keyup_passes() {
        assert_eq!(classify(&ev(KeyKind::Down, false), false), Decision::PASS);
        assert_eq!(classify(&ev(KeyKind::Up, false), true), Decision::PASS);
    }
}
