use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

const FANTASY_API_BASE: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/fba/seasons";
const SAMPLE_PLAYERS: usize = 3;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unexpected response: {0}")]
    Response(String),
}

pub type Result<T> = std::result::Result<T, CheckError>;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CheckConfig {
    pub league_id: String,
    pub swid: String,
    pub espn_s2: String,
    pub historical_season: u16,
    pub current_season: u16,
    pub output_dir: PathBuf,
    pub log_level: String,
}

impl CheckConfig {
    pub fn from_env() -> Result<Self> {
        let league_id = std::env::var("ESPN_LEAGUE_ID")
            .map_err(|_| CheckError::Config("ESPN_LEAGUE_ID must be set".to_string()))?;

        Ok(Self {
            league_id,
            swid: std::env::var("ESPN_SWID").unwrap_or_default(),
            espn_s2: std::env::var("ESPN_S2").unwrap_or_default(),
            historical_season: parse_season("HISTORICAL_SEASON", 2025)?,
            current_season: parse_season("CURRENT_SEASON", 2026)?,
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn has_cookies(&self) -> bool {
        !self.swid.is_empty() && !self.espn_s2.is_empty()
    }
}

fn parse_season(key: &str, default: u16) -> Result<u16> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| CheckError::Config(format!("{key} must be a year, got {v:?}"))),
        Err(_) => Ok(default),
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Teams, rosters and league metadata for one season.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonData {
    pub teams: Vec<Value>,
    pub rosters: Vec<Value>,
    pub settings: Value,
    pub status: Value,
}

pub struct FantasyClient {
    client: reqwest::Client,
    league_id: String,
    cookie: String,
}

impl FantasyClient {
    pub fn new(cfg: &CheckConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            league_id: cfg.league_id.clone(),
            cookie: format!("SWID={}; espn_s2={}", cfg.swid, cfg.espn_s2),
        })
    }

    async fn fetch_view(&self, season: u16, view: &str) -> Result<Value> {
        let url = format!(
            "{FANTASY_API_BASE}/{season}/segments/0/leagues/{}?view={view}",
            self.league_id
        );
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::COOKIE, &self.cookie)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Error fetching {view} for {season}: HTTP {status}");
            if !body.is_empty() {
                error!("Error details: {body}");
            }
            return Err(CheckError::Response(format!("{view} returned HTTP {status}")));
        }
        Ok(resp.json::<Value>().await?)
    }

    /// `None` when either view could not be fetched.
    pub async fn fetch_season(&self, season: u16) -> Option<SeasonData> {
        info!("Fetching season {season} data...");

        let teams_data = match self.fetch_view(season, "mTeam").await {
            Ok(v) if v.get("teams").is_some_and(Value::is_array) => v,
            Ok(_) => {
                warn!("❌ Could not fetch teams data");
                return None;
            }
            Err(e) => {
                warn!("❌ Could not fetch teams data: {e}");
                return None;
            }
        };

        let roster_data = match self.fetch_view(season, "mRoster").await {
            Ok(v) => v,
            Err(e) => {
                warn!("❌ Could not fetch roster data: {e}");
                return None;
            }
        };

        Some(SeasonData {
            teams: array_field(&teams_data, "teams"),
            rosters: array_field(&roster_data, "teams"),
            settings: teams_data.get("settings").cloned().unwrap_or(Value::Null),
            status: teams_data.get("status").cloned().unwrap_or(Value::Null),
        })
    }
}

fn array_field(v: &Value, key: &str) -> Vec<Value> {
    v.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeasonAnalysis {
    pub has_rosters: bool,
    pub player_count: usize,
    pub teams_with_rosters: usize,
}

fn roster_entries<'a>(data: &'a SeasonData, team_id: &Value) -> &'a [Value] {
    data.rosters
        .iter()
        .find(|r| r.get("id") == Some(team_id))
        .and_then(|r| r.pointer("/roster/entries"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn team_name(team: &Value, idx: usize) -> String {
    if let Some(name) = team.get("name").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        return name.to_string();
    }
    let location = team.get("location").and_then(Value::as_str).unwrap_or("");
    let nickname = team.get("nickname").and_then(Value::as_str).unwrap_or("");
    let joined = format!("{location} {nickname}").trim().to_string();
    if joined.is_empty() {
        format!("Team {}", idx + 1)
    } else {
        joined
    }
}

/// "First Last (PRO) - ESPN ID: n" for a roster entry with player details.
fn describe_entry(entry: &Value) -> Option<String> {
    let player = entry.pointer("/playerPoolEntry/player")?;
    let first = player.get("firstName").and_then(Value::as_str).unwrap_or("");
    let last = player.get("lastName").and_then(Value::as_str).unwrap_or("");
    let pro = player.get("proTeamAbbreviation").and_then(Value::as_str).unwrap_or("FA");
    let id = entry.get("playerId").map(ToString::to_string).unwrap_or_default();
    Some(format!("{first} {last} ({pro}) - ESPN ID: {id}"))
}

fn status_field(status: &Value, key: &str) -> String {
    status.get(key).map(ToString::to_string).unwrap_or_else(|| "null".to_string())
}

pub fn analyze(data: Option<&SeasonData>, season: u16) -> SeasonAnalysis {
    info!("{}", "=".repeat(60));
    info!("ANALYZING {season} SEASON DATA");
    info!("{}", "=".repeat(60));

    let Some(data) = data else {
        warn!("❌ No data received");
        return SeasonAnalysis::default();
    };

    let league_name = data.settings.get("name").and_then(Value::as_str).unwrap_or("N/A");
    info!("📋 Basic Info:");
    info!("  League Name: {league_name}");
    info!("  Number of Teams: {}", data.teams.len());
    if !data.status.is_null() {
        let is_active = status_field(&data.status, "isActive");
        let matchup = status_field(&data.status, "currentMatchupPeriod");
        let scoring = status_field(&data.status, "latestScoringPeriod");
        info!("  Is Active: {is_active}");
        info!("  Current Matchup Period: {matchup}");
        info!("  Latest Scoring Period: {scoring}");
    }

    let mut analysis = SeasonAnalysis::default();
    if !data.teams.is_empty() {
        info!("📊 Team Roster Analysis:");
    }

    for (idx, team) in data.teams.iter().enumerate() {
        let name = team_name(team, idx);
        let abbrev = team.get("abbrev").and_then(Value::as_str).unwrap_or("N/A");
        let entries = roster_entries(data, team.get("id").unwrap_or(&Value::Null));

        if entries.is_empty() {
            info!("  {:>2}. {abbrev:<6} {name:<25} ❌ No roster data", idx + 1);
            continue;
        }

        analysis.player_count += entries.len();
        analysis.teams_with_rosters += 1;
        info!("  {:>2}. {abbrev:<6} {name:<25} {} players", idx + 1, entries.len());

        if idx == 0 {
            info!("     Sample Players:");
            for line in entries.iter().take(SAMPLE_PLAYERS).filter_map(describe_entry) {
                info!("     - {line}");
            }
            if entries.len() > SAMPLE_PLAYERS {
                info!("     ... and {} more", entries.len() - SAMPLE_PLAYERS);
            }
        }
    }

    analysis.has_rosters = analysis.teams_with_rosters > 0;

    info!("📈 Summary:");
    info!("  Teams with rosters: {}/{}", analysis.teams_with_rosters, data.teams.len());
    info!("  Total players: {}", analysis.player_count);

    analysis
}

/// Every rostered player id across all teams, first occurrence order.
pub fn rostered_player_ids(data: &SeasonData) -> Vec<Value> {
    let mut seen = HashSet::new();
    data.rosters
        .iter()
        .filter_map(|team| team.pointer("/roster/entries").and_then(Value::as_array))
        .flatten()
        .filter_map(|entry| entry.get("playerId"))
        .filter(|id| !id.is_null() && id.as_u64() != Some(0))
        .filter(|id| seen.insert(id.to_string()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnosis {
    AllWorking,
    CurrentNotReady,
    NoRosters,
    Unexpected,
}

impl Diagnosis {
    pub fn from_results(historical: &SeasonAnalysis, current: &SeasonAnalysis) -> Self {
        match (historical.has_rosters, current.has_rosters) {
            (true, true) => Diagnosis::AllWorking,
            (true, false) => Diagnosis::CurrentNotReady,
            (false, false) => Diagnosis::NoRosters,
            (false, true) => Diagnosis::Unexpected,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Diagnosis::AllWorking => "✅ DIAGNOSIS: Everything Works!",
            Diagnosis::CurrentNotReady => "🎯 DIAGNOSIS: API Works, But Current Season Not Ready",
            Diagnosis::NoRosters => "❌ DIAGNOSIS: Cannot Retrieve Rosters",
            Diagnosis::Unexpected => "🤔 DIAGNOSIS: Unexpected Results",
        }
    }

    pub fn advice(self) -> &'static [&'static str] {
        match self {
            Diagnosis::AllWorking => &[
                "Both seasons have roster data",
                "The roster id file can be used directly as rosterFile",
            ],
            Diagnosis::CurrentNotReady => &[
                "The API and authentication work; historical rosters were retrieved",
                "Current season rosters are not populated yet",
                "Use the historical player id file as a starting point",
                "Check the current season again in a few hours or days",
            ],
            Diagnosis::NoRosters => &[
                "Even the completed season returned no roster data; authentication may be failing",
                "Verify ESPN_SWID and ESPN_S2 are fresh (SWID keeps its curly braces)",
                "Log into ESPN again and copy new cookies",
            ],
            Diagnosis::Unexpected => &[
                "The current season has rosters but the historical season does not",
                "Review the written JSON files to understand the data structure",
            ],
        }
    }
}
