mod config;
mod detector;
mod error;
mod fetcher;
mod monitor;
mod notification;
mod state;
mod types;
mod window;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::detector::RosterSet;
use crate::error::Result;
use crate::fetcher::EspnFetcher;
use crate::monitor::Monitor;
use crate::notification::build_notifier;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!("🏀 Fantasy Basketball Monitor Started");
    info!("League ID: {}", cfg.espn.league_label());
    info!("Check interval: {:.1} minutes", cfg.check_interval.as_secs_f64() / 60.0);
    info!("Game time window: {}", cfg.window);
    if cfg.window.enabled && cfg.window.crosses_midnight() {
        warn!(
            "gameTimeStart {} is after gameTimeEnd {}; the window will never open",
            cfg.window.start, cfg.window.end,
        );
    }
    if let Some(email) = &cfg.email {
        info!("Email alerts: {} → {} via {}", email.from.user, email.to, email.smtp_host());
    }
    if let Some(webhook) = &cfg.webhook {
        info!("Webhook alerts: {}", webhook.url);
    }

    let t = &cfg.thresholds;
    info!(
        "Thresholds: {}+ pts, {}+ reb, {}+ ast, {}+ 3pm, {}+ stl, {}+ blk, ≤{} TO",
        t.points, t.rebounds, t.assists, t.three_pointers, t.steals, t.blocks, t.turnovers,
    );

    let roster = RosterSet::load(cfg.roster_file.as_deref())?;
    if roster.is_empty() {
        warn!("No rostered players loaded; every qualifying player is treated as available");
    }

    let notifier = build_notifier(&cfg)?;
    let source = Arc::new(EspnFetcher::new(&cfg)?);
    let monitor = Monitor::new(&cfg, roster, source, notifier);

    tokio::select! {
        _ = monitor.run() => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!("Failed to listen for shutdown signal: {e}");
            }
            info!("🛑 Stopping monitor... Goodbye!");
        }
    }

    Ok(())
}
