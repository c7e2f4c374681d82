use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Normalized player identifier.
///
/// Feeds disagree on whether ids are numbers or strings (`123` vs `"123"`),
/// so every id is stored in its trimmed string form and compared that way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Normalize a JSON id. Numbers and strings are accepted; anything else
    /// (or an empty string) yields `None`.
    pub fn from_value(v: &serde_json::Value) -> Option<Self> {
        let raw = match v {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.trim().to_string(),
            _ => return None,
        };
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<u64> for PlayerId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    /// Short label, e.g. "BOS @ LAL". Used as the game label in alerts.
    pub short_name: String,
    pub status: String,
    pub home_team: String,
    pub away_team: String,
}

// ---------------------------------------------------------------------------
// Box score
// ---------------------------------------------------------------------------

/// One athlete's line in one game, sampled at one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerObservation {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub game_id: String,
    pub game: String,
    /// Raw minutes string as reported by the feed ("34", "--", ...).
    pub minutes: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub three_pointers: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
}

impl PlayerObservation {
    pub fn box_score_url(&self) -> String {
        format!("{}/{}", crate::config::BOX_SCORE_LINK_BASE, self.game_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Rostered,
}

impl Availability {
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Availability::Available => "available",
            Availability::Rostered => "rostered",
        };
        write!(f, "{s}")
    }
}

/// A qualifying observation handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCandidate {
    #[serde(flatten)]
    pub player: PlayerObservation,
    pub is_available: bool,
}

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Gate closed; nothing fetched.
    OutsideWindow,
    /// Schedule empty (or the schedule fetch failed).
    NoGames,
    Completed,
    /// Another cycle was still running.
    Skipped,
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CycleOutcome::OutsideWindow => "outside_window",
            CycleOutcome::NoGames => "no_games",
            CycleOutcome::Completed => "completed",
            CycleOutcome::Skipped => "skipped",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub games: usize,
    pub failed_games: usize,
    pub players_evaluated: usize,
    pub alerts: usize,
}

impl CycleReport {
    pub fn empty(outcome: CycleOutcome) -> Self {
        Self {
            outcome,
            games: 0,
            failed_games: 0,
            players_evaluated: 0,
            alerts: 0,
        }
    }
}
