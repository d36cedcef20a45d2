//! combat_sim - Headless scenario runner for combat_core
//!
//! Usage: `combat_sim [scenario.toml]`
//!
//! Set `RUST_LOG=combat=debug` to see every transition and attack.

mod runner;
mod scenario;

use anyhow::{Context, Result};
use scenario::Scenario;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn default_scenario() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/duel.toml")
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("combat=info".parse()?))
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_scenario);
    let scenario = Scenario::load(&path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let library = scenario
        .library(base_dir)
        .context("failed to load combat library")?;
    info!(
        skills = library.skills.len(),
        effects = library.effects.len(),
        "combat library ready"
    );

    let summary = runner::run(&scenario, library)?;
    summary.print();
    Ok(())
}
