use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use serverinfo_core::{DEFAULT_TARGET, RateUnit, TargetList};

use crate::poller::Poller;
use crate::tui::app::MonitorApp;

/// Refresh interval when none is given.
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

pub fn run(
    config: Option<&Path>,
    interval_secs: f64,
    unit: RateUnit,
    servers: &[String],
) -> anyhow::Result<()> {
    let interval = parse_interval(interval_secs)?;

    let registry = super::open_registry(config)?;
    let Some(targets) = resolve_targets(servers, &registry) else {
        eprintln!("No servers configured. Usage:");
        eprintln!("  serverinfo-client add http://IP:8765");
        eprintln!("  serverinfo-client monitor");
        std::process::exit(1);
    };

    let poller = Poller::new(unit).context("cannot build HTTP client")?;
    let mut app = MonitorApp::new(targets, interval, poller);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    rt.block_on(app.run()).context("dashboard failed")?;

    println!("\nExiting.");
    Ok(())
}

/// Positive, finite, and small enough to fit a `Duration`.
pub fn parse_interval(secs: f64) -> anyhow::Result<Duration> {
    if secs <= 0.0 {
        anyhow::bail!("interval must be a positive number of seconds, got {secs}");
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow::anyhow!("invalid interval {secs}: {e}"))
}

/// Servers given on the command line win for this run only. Otherwise the
/// registry is used; a registry file that was never written falls back to the
/// built-in default, while an existing but empty one yields `None`.
pub fn resolve_targets(servers: &[String], registry: &TargetList) -> Option<Vec<String>> {
    if !servers.is_empty() {
        let mut targets: Vec<String> = Vec::with_capacity(servers.len());
        for url in servers.iter().map(|s| super::server_url(s)) {
            if !targets.contains(&url) {
                targets.push(url);
            }
        }
        return Some(targets);
    }
    if !registry.is_empty() {
        return Some(registry.targets().to_vec());
    }
    if !registry.is_persisted() {
        return Some(vec![DEFAULT_TARGET.to_string()]);
    }
    None
}
