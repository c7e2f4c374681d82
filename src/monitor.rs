use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::{Config, Thresholds};
use crate::detector::{meets_thresholds, RosterSet};
use crate::fetcher::DataSource;
use crate::notification::Notifier;
use crate::state::AlertHistory;
use crate::types::{AlertCandidate, CycleOutcome, CycleReport, PlayerObservation};
use crate::window::GameTimeWindow;

/// Drives poll → evaluate → dedupe → notify cycles.
///
/// The alert history sits behind a mutex that a cycle holds for its whole
/// run; a cycle that cannot take it immediately is skipped, so at most one
/// cycle is ever in flight.
pub struct Monitor {
    source: Arc<dyn DataSource>,
    notifier: Arc<dyn Notifier>,
    thresholds: Thresholds,
    window: GameTimeWindow,
    roster: RosterSet,
    check_interval: Duration,
    history: Mutex<AlertHistory>,
}

impl Monitor {
    pub fn new(
        cfg: &Config,
        roster: RosterSet,
        source: Arc<dyn DataSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            notifier,
            thresholds: cfg.thresholds,
            window: cfg.window,
            roster,
            check_interval: cfg.check_interval,
            history: Mutex::new(AlertHistory::new(cfg.window.zone)),
        }
    }

    /// Runs a cycle immediately, then once per check interval. Never returns.
    pub async fn run(&self) {
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.run_cycle(Utc::now()).await;
        }
    }

    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let Ok(mut history) = self.history.try_lock() else {
            warn!("Previous cycle still running; skipping this tick");
            return CycleReport::empty(CycleOutcome::Skipped);
        };

        info!("{}", "=".repeat(60));
        info!("🔍 Checking games at {}", now.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
        info!("{}", "=".repeat(60));

        if !self.window.allows(now) {
            info!("⏰ Outside game time window ({}) - skipping check", self.window);
            return CycleReport::empty(CycleOutcome::OutsideWindow);
        }

        let pruned = history.prune(now);
        if pruned > 0 {
            debug!(pruned, remaining = history.len(), "Dropped alert keys from previous days");
        }

        let games = match self.source.fetch_schedule().await {
            Ok(games) => games,
            Err(e) => {
                error!("Error fetching games: {e}");
                Vec::new()
            }
        };
        if games.is_empty() {
            info!("📅 No games scheduled for today");
            return CycleReport::empty(CycleOutcome::NoGames);
        }

        info!("🏀 Found {} game(s) today", games.len());
        for game in &games {
            info!("   {} - {}", game.short_name, game.status);
        }

        let mut report = CycleReport { games: games.len(), ..CycleReport::empty(CycleOutcome::Completed) };
        let mut batch: Vec<AlertCandidate> = Vec::new();

        for game in &games {
            info!("   Analyzing {}...", game.short_name);
            let players = match self.source.fetch_box_score(game).await {
                Ok(players) => players,
                Err(e) => {
                    error!("Error processing game {}: {e}", game.id);
                    report.failed_games += 1;
                    continue;
                }
            };
            report.players_evaluated += players.len();

            for player in players {
                if let Some(candidate) = self.evaluate(player, &mut history, now) {
                    batch.push(candidate);
                }
            }
        }

        report.alerts = batch.len();

        if batch.is_empty() {
            info!("✓ No new alerts this check");
        } else {
            info!("🚨 {} NEW ALERT(S)!", batch.len());
            for c in &batch {
                let p = &c.player;
                info!(
                    player_id = %p.id,
                    available = c.is_available,
                    "   {} {}: {}pts, {}reb, {}ast",
                    if c.is_available { "✅" } else { "❌" },
                    p.name,
                    p.points,
                    p.rebounds,
                    p.assists,
                );
            }
            // Keys stay committed even if delivery fails; no same-day retry.
            if let Err(e) = self.notifier.notify(&batch).await {
                error!("Error sending {} alert: {e}", self.notifier.name());
            }
        }

        info!(
            outcome = %report.outcome,
            games = report.games,
            failed_games = report.failed_games,
            players = report.players_evaluated,
            alerts = report.alerts,
            "Cycle complete: {} games ({} failed), {} players checked, {} alerts",
            report.games,
            report.failed_games,
            report.players_evaluated,
            report.alerts,
        );

        report
    }

    /// Threshold → roster → dedupe. Returns the candidate only if every stage
    /// passes; registering the alert key is the last step.
    fn evaluate(
        &self,
        player: PlayerObservation,
        history: &mut AlertHistory,
        now: DateTime<Utc>,
    ) -> Option<AlertCandidate> {
        if !meets_thresholds(&player, &self.thresholds) {
            return None;
        }

        let is_available = self.roster.classify(&player.id).is_available();
        if !(is_available || self.roster.is_empty()) {
            debug!(player_id = %player.id, "{} qualifies but is rostered", player.name);
            return None;
        }

        if !history.should_alert(&player.id, now) {
            return None;
        }

        Some(AlertCandidate { player, is_available })
    }
}
