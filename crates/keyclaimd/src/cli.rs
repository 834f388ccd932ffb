//! Command-line interface definitions for keyclaimd.

use std::path::PathBuf;

use clap::Parser;
use logging::LogArgs;

/// Command-line interface for the `keyclaimd` binary.
#[derive(Parser, Debug)]
#[command(
    name = "keyclaimd",
    about = "Global hotkey host with conflict arbitration",
    version
)]
pub struct Cli {
    /// Logging controls shared across keyclaim binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Path to the RON module configuration.
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Print the conflict report as JSON and exit.
    #[arg(long)]
    pub dump_conflicts: bool,

    /// Load and arbitrate claims without installing the keyboard hook.
    #[arg(long)]
    pub no_hook: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from([
            "keyclaimd",
            "--config",
            "mods.ron",
            "--dump-conflicts",
            "--debug",
        ]);
        assert_eq!(cli.config, PathBuf::from("mods.ron"));
        assert!(cli.dump_conflicts);
        assert!(!cli.no_hook);
        assert!(cli.log.debug);
    }
}
