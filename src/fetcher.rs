use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::{Config, ESPN_SCOREBOARD_URL, ESPN_SUMMARY_URL};
use crate::error::{AppError, Result};
use crate::types::{Game, PlayerId, PlayerObservation};

/// Source of today's schedule and per-game box scores.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_schedule(&self) -> Result<Vec<Game>>;
    async fn fetch_box_score(&self, game: &Game) -> Result<Vec<PlayerObservation>>;
}

// ---------------------------------------------------------------------------
// RequestPacer
// ---------------------------------------------------------------------------

/// Enforces a minimum gap between consecutive requests. The first request
/// goes out immediately.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last: Mutex::new(None) }
    }

    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

// ---------------------------------------------------------------------------
// EspnFetcher
// ---------------------------------------------------------------------------

/// Client for ESPN's public NBA site API. No key required.
pub struct EspnFetcher {
    client: reqwest::Client,
    scoreboard_url: String,
    summary_url: String,
    pacer: RequestPacer,
}

impl EspnFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(Self {
            client,
            scoreboard_url: ESPN_SCOREBOARD_URL.to_string(),
            summary_url: ESPN_SUMMARY_URL.to_string(),
            pacer: RequestPacer::new(cfg.request_delay()),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        self.pacer.wait().await;
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl DataSource for EspnFetcher {
    async fn fetch_schedule(&self) -> Result<Vec<Game>> {
        let resp = self.get_json(&self.scoreboard_url).await?;
        let games = parse_schedule(&resp);
        debug!("ESPN: scoreboard returned {} games", games.len());
        Ok(games)
    }

    async fn fetch_box_score(&self, game: &Game) -> Result<Vec<PlayerObservation>> {
        let url = format!("{}?event={}", self.summary_url, game.id);
        let resp = self.get_json(&url).await?;
        if !resp.is_object() {
            return Err(AppError::Response {
                source_name: "ESPN summary",
                detail: format!("game {} response was not an object", game.id),
            });
        }
        Ok(parse_box_score(&resp, &game.id, &game.short_name))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the scoreboard `events[]` into games. A missing `events` key is an
/// empty schedule.
pub fn parse_schedule(v: &Value) -> Vec<Game> {
    let Some(events) = v.get("events").and_then(|e| e.as_array()) else {
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| {
            let id = json_scalar(event.get("id")?)?;
            let str_field = |key: &str| {
                event.get(key).and_then(|s| s.as_str()).unwrap_or("").to_string()
            };

            let competitors = event
                .get("competitions")
                .and_then(|c| c.as_array())
                .and_then(|a| a.first())
                .and_then(|c| c.get("competitors"))
                .and_then(|c| c.as_array());
            let team_abbrev = |side: &str| {
                competitors
                    .and_then(|cs| {
                        cs.iter().find(|c| c.get("homeAway").and_then(|h| h.as_str()) == Some(side))
                    })
                    .and_then(|c| c.get("team"))
                    .and_then(|t| t.get("abbreviation"))
                    .and_then(|a| a.as_str())
                    .unwrap_or("")
                    .to_string()
            };

            let status = event
                .get("status")
                .and_then(|s| s.get("type"))
                .and_then(|t| t.get("description"))
                .and_then(|d| d.as_str())
                .unwrap_or("Scheduled")
                .to_string();

            Some(Game {
                id,
                name: str_field("name"),
                short_name: str_field("shortName"),
                status,
                home_team: team_abbrev("home"),
                away_team: team_abbrev("away"),
            })
        })
        .collect()
}

/// Column positions inside an athlete's `stats[]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StatColumns {
    minutes: usize,
    threes: usize,
    rebounds: usize,
    assists: usize,
    steals: usize,
    blocks: usize,
    turnovers: usize,
    points: usize,
}

impl StatColumns {
    /// ESPN's usual layout:
    /// MIN FG 3PT FT OREB DREB REB AST STL BLK TO PF +/- PTS
    const ESPN_DEFAULT: Self = Self {
        minutes: 0,
        threes: 2,
        rebounds: 6,
        assists: 7,
        steals: 8,
        blocks: 9,
        turnovers: 10,
        points: 13,
    };

    /// Resolve columns by label, falling back to the default position for
    /// any label that is absent.
    fn from_labels(labels: &[&str]) -> Self {
        let find = |label: &str, fallback: usize| {
            labels
                .iter()
                .position(|l| l.eq_ignore_ascii_case(label))
                .unwrap_or(fallback)
        };
        let d = Self::ESPN_DEFAULT;
        Self {
            minutes: find("MIN", d.minutes),
            threes: find("3PT", d.threes),
            rebounds: find("REB", d.rebounds),
            assists: find("AST", d.assists),
            steals: find("STL", d.steals),
            blocks: find("BLK", d.blocks),
            turnovers: find("TO", d.turnovers),
            points: find("PTS", d.points),
        }
    }

    fn for_group(group: &Value) -> Self {
        let labels: Vec<&str> = group
            .get("labels")
            .or_else(|| group.get("names"))
            .and_then(|l| l.as_array())
            .map(|a| a.iter().filter_map(|l| l.as_str()).collect())
            .unwrap_or_default();
        if labels.is_empty() {
            Self::ESPN_DEFAULT
        } else {
            Self::from_labels(&labels)
        }
    }
}

/// Parse `boxscore.players[]` from a game summary into observations.
/// Missing or malformed stat cells become 0; athletes without an id are skipped.
pub fn parse_box_score(v: &Value, game_id: &str, game_label: &str) -> Vec<PlayerObservation> {
    let Some(teams) = v
        .get("boxscore")
        .and_then(|b| b.get("players"))
        .and_then(|p| p.as_array())
    else {
        return Vec::new();
    };

    let mut out = Vec::new();

    for team in teams {
        let team_name = team
            .get("team")
            .and_then(|t| t.get("displayName"))
            .and_then(|n| n.as_str())
            .unwrap_or("")
            .to_string();

        let Some(group) = team
            .get("statistics")
            .and_then(|s| s.as_array())
            .and_then(|a| a.first())
        else {
            continue;
        };
        let Some(athletes) = group.get("athletes").and_then(|a| a.as_array()) else {
            continue;
        };
        let cols = StatColumns::for_group(group);

        for entry in athletes {
            let athlete = entry.get("athlete");
            let Some(id) = athlete.and_then(|a| a.get("id")).and_then(PlayerId::from_value) else {
                debug!("Skipping athlete without id in game {game_id}");
                continue;
            };
            let name = athlete
                .and_then(|a| a.get("displayName"))
                .and_then(|n| n.as_str())
                .unwrap_or("")
                .to_string();

            let stats: &[Value] = entry
                .get("stats")
                .and_then(|s| s.as_array())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let cell = |idx: usize| stats.get(idx).and_then(json_scalar);
            let count = |idx: usize| cell(idx).map(|s| parse_count(&s)).unwrap_or(0);

            let minutes = cell(cols.minutes)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "0".to_string());

            out.push(PlayerObservation {
                id,
                name,
                team: team_name.clone(),
                game_id: game_id.to_string(),
                game: game_label.to_string(),
                minutes,
                points: count(cols.points),
                rebounds: count(cols.rebounds),
                assists: count(cols.assists),
                // "made-attempted"; leading-integer parse takes the made part.
                three_pointers: count(cols.threes),
                steals: count(cols.steals),
                blocks: count(cols.blocks),
                turnovers: count(cols.turnovers),
            });
        }
    }

    out
}

/// Leading-integer parse: `"12"` → 12, `"3-7"` → 3, `"--"` / `""` → 0.
/// A digit run past `u32::MAX` saturates. Never fails.
pub fn parse_count(raw: &str) -> u32 {
    let t = raw.trim();
    let end = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
    let digits = &t[..end];
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

fn json_scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
