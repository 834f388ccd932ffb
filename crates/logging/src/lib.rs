#![warn(missing_docs)]

//! Shared logging helpers and CLI argument definitions for the keyclaim
//! workspace.
//!
//! - [`LogArgs`]: `--trace`/`--debug`/`--log-level`/`--log-filter` flags
//! - [`compute_spec`]: resolve those flags (and `RUST_LOG`) to a filter
//! - [`init`]: install a formatted subscriber for a binary

use std::{env, io};

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "keyclaim_engine=trace,keyhook=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter spec selected by these flags.
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        "keyclaimd",
        "keyclaim_engine",
        // OS integration
        "keyhook",
        "relaykey",
        // Utilities
        "keycode",
        "eventtag",
        "logging",
    ]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info"))
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// Install a stderr fmt subscriber filtered by `args`.
///
/// Does nothing if a global subscriber is already set.
pub fn init(args: &LogArgs) {
    let filter = env_filter_from_spec(&args.spec());
    let _ignored = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let spec = compute_spec(false, false, Some("warn"), Some("keyhook=trace"));
        assert_eq!(spec, "keyhook=trace");
    }

    #[test]
    fn level_applies_to_every_crate() {
        let spec = compute_spec(false, true, None, None);
        assert_eq!(spec.split(',').count(), our_crates().len());
        assert!(spec.contains("keyclaim_engine=debug"));
        assert!(spec.split(',').all(|d| d.ends_with("=debug")));
    }

    #[test]
    fn level_is_lowercased() {
        assert!(level_spec_for("WARN").contains("keyhook=warn"));
    }

    #[test]
    fn args_resolve_through_compute_spec() {
        let args = LogArgs {
            log_level: Some("error".into()),
            ..LogArgs::default()
        };
        assert!(args.spec().contains("relaykey=error"));
    }
}
