//! RON configuration for the modules keyclaimd hosts.
//!
//! ```ron
//! (
//!     modules: [
//!         (name: "Alarm", enabled: true, claims: [
//!             (id: 1, hotkey: "ctrl+a", suppress_start_menu: false),
//!         ]),
//!     ],
//!     held_keys: [ (module: "Peek", key: "space", hold_ms: 900) ],
//! )
//! ```

use std::{fs, path::Path, time::Duration};

use keycode::{Hotkey, vk};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Modules and their claims, in registration order.
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
    /// Held-key registrations.
    #[serde(default)]
    pub held_keys: Vec<HeldKeyConfig>,
}

/// One module's claims.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleConfig {
    /// Module identifier.
    pub name: String,
    /// Whether claims start out in arbitration.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Claims made by this module.
    #[serde(default)]
    pub claims: Vec<ClaimConfig>,
}

/// One claim inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClaimConfig {
    /// Per-module claim id.
    pub id: i32,
    /// Key spec, e.g. `"win+shift+s"`.
    pub hotkey: String,
    /// Ask for the suppression keystroke after the action runs.
    #[serde(default)]
    pub suppress_start_menu: bool,
}

/// A held-key action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeldKeyConfig {
    /// Registering module.
    pub module: String,
    /// Key name, e.g. `"space"` or `"0x20"`.
    pub key: String,
    /// Required hold time in milliseconds.
    pub hold_ms: u64,
}

/// Serde default for [`ModuleConfig::enabled`].
fn default_enabled() -> bool {
    true
}

impl HostConfig {
    /// Parse config from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }
}

impl ClaimConfig {
    /// Parsed hotkey for this claim.
    pub fn parsed(&self, module: &str) -> Result<Hotkey> {
        Hotkey::parse(&self.hotkey).ok_or_else(|| Error::KeySpec {
            module: module.to_string(),
            spec: self.hotkey.clone(),
        })
    }
}

impl HeldKeyConfig {
    /// Parsed virtual key code.
    pub fn key_code(&self) -> Result<u8> {
        vk::from_spec(&self.key).ok_or_else(|| Error::KeySpec {
            module: self.module.clone(),
            spec: self.key.clone(),
        })
    }

    /// Hold time as a duration.
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

#[cfg(test)]
mod tests {
    use keycode::Modifiers;

    use super::*;

    const SAMPLE: &str = r#"(
        modules: [
            (name: "Alarm", enabled: true, claims: [
                (id: 1, hotkey: "ctrl+a", suppress_start_menu: false),
            ]),
            (name: "Launcher", claims: [
                (id: 7, hotkey: "win+shift+s", suppress_start_menu: true),
            ]),
        ],
        held_keys: [ (module: "Peek", key: "space", hold_ms: 900) ],
    )"#;

    #[test]
    fn parses_sample() {
        let cfg = HostConfig::from_ron(SAMPLE).unwrap();
        assert_eq!(cfg.modules.len(), 2);
        assert!(cfg.modules[1].enabled);
        let launcher = &cfg.modules[1].claims[0];
        assert!(launcher.suppress_start_menu);
        assert_eq!(
            launcher.parsed("Launcher").unwrap(),
            Hotkey::new(Modifiers::WIN | Modifiers::SHIFT, 0x53)
        );
        let held = &cfg.held_keys[0];
        assert_eq!(held.key_code().unwrap(), vk::SPACE);
        assert_eq!(held.hold(), Duration::from_millis(900));
    }

    #[test]
    fn empty_config_is_valid() {
        assert_eq!(HostConfig::from_ron("()").unwrap(), HostConfig::default());
    }

    #[test]
    fn bad_key_names_the_spec() {
        let claim = ClaimConfig {
            id: 1,
            hotkey: "ctrl+nope".into(),
            suppress_start_menu: false,
        };
        let err = claim.parsed("Alarm").unwrap_err();
        assert!(err.to_string().contains("ctrl+nope"));
    }

    #[test]
    fn syntax_errors_surface() {
        assert!(matches!(
            HostConfig::from_ron("(modules: [ (name: )])"),
            Err(Error::Parse(_))
        ));
    }
}
