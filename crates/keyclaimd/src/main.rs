#![warn(missing_docs)]

//! Entry point for the `keyclaimd` binary.

mod cli;
mod config;
mod error;

use std::{
    io::{self, Write},
    process,
    sync::Arc,
    thread,
};

use clap::Parser;
use keyclaim_engine::{Action, Claim, ClaimOwner, Engine, EngineConfig, HookStatus};
use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::{
    cli::Cli,
    config::{ClaimConfig, HostConfig},
    error::Result,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, load modules and serve hotkeys
/// until interrupted.
async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let host = HostConfig::load(&cli.config)?;
    let engine = Engine::new(EngineConfig::default())?;
    register_modules(&engine, &host)?;

    if cli.dump_conflicts {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &engine.registry().conflict_report())?;
        writeln!(out)?;
        return Ok(());
    }
    print_bindings(&engine)?;

    if cli.no_hook {
        info!("hook_skipped");
        return Ok(());
    }
    if let HookStatus::Disabled { reason } = engine.start_hook() {
        warn!(%reason, "hotkeys_inactive");
    }
    let events = engine.hook_events();
    thread::Builder::new()
        .name("keyclaimd-events".into())
        .spawn(move || {
            for event in events.iter() {
                debug!(?event, "hook_event");
            }
        })?;

    signal::ctrl_c().await?;
    engine.stop_hook();
    info!("keyclaimd_shutdown");
    Ok(())
}

/// Register every configured claim and held-key action with `engine`.
fn register_modules(engine: &Engine, host: &HostConfig) -> Result<()> {
    let registry = engine.registry();
    for module in &host.modules {
        for claim in &module.claims {
            let hotkey = claim.parsed(&module.name)?;
            let owner = ClaimOwner::new(module.name.clone(), claim.id);
            let accepted = registry.add_claim(
                Claim::new(hotkey, owner.clone(), logging_action(&owner, claim)),
                module.enabled,
            );
            if !accepted {
                warn!(%owner, %hotkey, conflict = ?registry.classify(hotkey), "claim_not_owned");
            }
        }
    }
    for held in &host.held_keys {
        let key = held.key_code()?;
        let module = held.module.clone();
        engine.add_held_key_action(
            &held.module,
            key,
            held.hold(),
            Arc::new(move || info!(module, key, "held_key_action")),
        );
    }
    Ok(())
}

/// Action that logs the firing claim.
fn logging_action(owner: &ClaimOwner, claim: &ClaimConfig) -> Action {
    let owner = owner.clone();
    let suppress = claim.suppress_start_menu;
    Arc::new(move |modifiers, key| {
        info!(%owner, ?modifiers, key, "hotkey_fired");
        Ok(suppress)
    })
}

/// Print the active bindings and any contested hotkeys.
fn print_bindings(engine: &Engine) -> Result<()> {
    let registry = engine.registry();
    let mut out = io::stdout().lock();
    for (hotkey, owner) in registry.owned_snapshot() {
        writeln!(out, "{hotkey:<24} {owner}")?;
    }
    let report = registry.conflict_report();
    for group in &report.in_app {
        let who: Vec<String> = group.claimants.iter().map(ToString::to_string).collect();
        writeln!(out, "{:<24} in-app conflict: {}", group.hotkey, who.join(", "))?;
    }
    for group in &report.system {
        writeln!(out, "{:<24} taken by another program", group.hotkey)?;
    }
    Ok(())
}
