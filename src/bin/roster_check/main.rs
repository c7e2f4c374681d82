//! Fetches fantasy league rosters for a completed and a current season and
//! reports whether roster data is retrievable. A populated season is written
//! to `{season}_season_rosters.json` and `{season}_rostered_player_ids.json`;
//! the latter is the `rosterFile` format the monitor reads.

mod fantasy;

use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fantasy::{analyze, rostered_player_ids, CheckConfig, Diagnosis, FantasyClient, Result, SeasonAnalysis};

#[tokio::main]
async fn main() {
    let cfg = match CheckConfig::from_env() {
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
        error!("❌ Script error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: CheckConfig) -> Result<()> {
    info!("HISTORICAL ROSTER FETCHER - SEASON COMPARISON");
    info!("League ID: {}", cfg.league_id);
    info!("Historical Season: {} (completed)", cfg.historical_season);
    info!("Current Season: {} (upcoming)", cfg.current_season);
    if cfg.has_cookies() {
        info!("Authentication: ✅ Configured");
    } else {
        warn!("Authentication: ESPN_SWID / ESPN_S2 not set; private leagues will return no data");
    }

    let client = FantasyClient::new(&cfg)?;

    let historical = check_season(&client, &cfg, cfg.historical_season).await?;

    // Rate limiting.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let current = check_season(&client, &cfg, cfg.current_season).await?;

    info!("{}", "═".repeat(60));
    info!("COMPARISON RESULTS");
    info!("{}", "═".repeat(60));
    log_results(cfg.historical_season, "Historical", &historical);
    log_results(cfg.current_season, "Current", &current);

    let diagnosis = Diagnosis::from_results(&historical, &current);
    info!("{}", "═".repeat(60));
    info!("{}", diagnosis.headline());
    for line in diagnosis.advice() {
        info!("   - {line}");
    }

    Ok(())
}

async fn check_season(client: &FantasyClient, cfg: &CheckConfig, season: u16) -> Result<SeasonAnalysis> {
    let data = client.fetch_season(season).await;
    let analysis = analyze(data.as_ref(), season);

    if let (true, Some(data)) = (analysis.has_rosters, data.as_ref()) {
        let snapshot = cfg.output_dir.join(format!("{season}_season_rosters.json"));
        write_json(&snapshot, data)?;
        info!("✅ {season} roster data saved to: {}", snapshot.display());

        let ids = rostered_player_ids(data);
        let ids_path = cfg.output_dir.join(format!("{season}_rostered_player_ids.json"));
        write_json(&ids_path, &ids)?;
        info!("✅ Player IDs saved to: {}", ids_path.display());
        info!("   Total unique players: {}", ids.len());
    }

    Ok(analysis)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body)?;
    Ok(())
}

fn log_results(season: u16, label: &str, a: &SeasonAnalysis) {
    info!("{season} Season ({label}):");
    info!("  ✅ Has Rosters: {}", if a.has_rosters { "YES" } else { "NO" });
    info!("  📊 Total Players: {}", a.player_count);
    info!("  👥 Teams with Data: {}", a.teams_with_rosters);
}
