use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::window::{GameTimeWindow, TimeOfDay, Zone};

pub const ESPN_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/basketball/nba/scoreboard";
pub const ESPN_SUMMARY_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/basketball/nba/summary";

/// Deep link target for the "view full box score" button; game id is appended.
pub const BOX_SCORE_LINK_BASE: &str = "https://www.espn.com/nba/boxscore/_/gameId";

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Minimum gap between consecutive ESPN requests (milliseconds).
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// HTTP timeout for ESPN requests (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// File layout (config.json)
// ---------------------------------------------------------------------------

/// Minimums for the six counting stats, maximum for turnovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub three_pointers: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonitoringSection {
    check_interval_minutes: f64,
    #[serde(default)]
    only_during_game_times: bool,
    #[serde(default = "default_window_start")]
    game_time_start: String,
    #[serde(default = "default_window_end")]
    game_time_end: String,
    #[serde(default)]
    timezone: Option<String>,
}

fn default_window_start() -> String {
    "00:00".to_string()
}

fn default_window_end() -> String {
    "23:59".to_string()
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSender {
    pub user: String,
    pub app_password: String,
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSender")
            .field("user", &self.user)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn addresses(&self) -> Vec<&str> {
        match self {
            Recipients::One(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
            Recipients::Many(v) => v.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect(),
        }
    }
}

impl std::fmt::Display for Recipients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.addresses().join(", "))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    pub from: EmailSender,
    pub to: Recipients,
    #[serde(default)]
    pub smtp_host: Option<String>,
}

impl EmailConfig {
    pub fn smtp_host(&self) -> &str {
        self.smtp_host.as_deref().unwrap_or(DEFAULT_SMTP_HOST)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnConfig {
    /// Fantasy league id; display only. Accepts number or string.
    #[serde(default)]
    pub league_id: Option<serde_json::Value>,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EspnConfig {
    fn default() -> Self {
        Self {
            league_id: None,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl EspnConfig {
    pub fn league_label(&self) -> String {
        match &self.league_id {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => "n/a".to_string(),
        }
    }
}

fn default_request_delay_ms() -> u64 {
    DEFAULT_REQUEST_DELAY_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    thresholds: Thresholds,
    monitoring: MonitoringSection,
    #[serde(default)]
    email: Option<EmailConfig>,
    #[serde(default)]
    webhook: Option<WebhookConfig>,
    #[serde(default)]
    roster_file: Option<PathBuf>,
    #[serde(default)]
    espn: EspnConfig,
}

// ---------------------------------------------------------------------------
// Validated config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub thresholds: Thresholds,
    pub check_interval: Duration,
    /// Game-time gate; its zone is also the zone for alert-day keys.
    pub window: GameTimeWindow,
    pub email: Option<EmailConfig>,
    pub webhook: Option<WebhookConfig>,
    /// Path to a JSON array of rostered player ids; `None` disables roster filtering.
    pub roster_file: Option<PathBuf>,
    pub espn: EspnConfig,
}

impl Config {
    /// Reads the JSON config at `CONFIG_PATH` (default `./config.json`);
    /// `LOG_LEVEL` comes from the environment.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load(Path::new(&path))?;
        cfg.log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("invalid config JSON: {e}")))?;

        let m = &file.monitoring;
        let check_interval = parse_interval(m.check_interval_minutes)?;

        let window = GameTimeWindow {
            enabled: m.only_during_game_times,
            start: TimeOfDay::parse(&m.game_time_start)?,
            end: TimeOfDay::parse(&m.game_time_end)?,
            zone: Zone::parse(m.timezone.as_deref())?,
        };

        if file.email.is_none() && file.webhook.is_none() {
            return Err(AppError::Config(
                "at least one of `email` or `webhook` must be configured".to_string(),
            ));
        }
        if let Some(email) = &file.email {
            if email.to.addresses().is_empty() {
                return Err(AppError::Config("email.to has no recipients".to_string()));
            }
        }

        Ok(Self {
            log_level: "info".to_string(),
            thresholds: file.thresholds,
            check_interval,
            window,
            email: file.email,
            webhook: file.webhook,
            roster_file: file.roster_file,
            espn: file.espn,
        })
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.espn.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.espn.request_timeout_secs)
    }
}

/// Minutes → non-zero `Duration`. Rejects values that are not finite, not
/// positive, too large to represent, or that round down to zero.
fn parse_interval(minutes: f64) -> Result<Duration> {
    let invalid = || {
        AppError::Config(format!(
            "monitoring.checkIntervalMinutes must be a positive number of minutes, got {minutes}"
        ))
    };
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(invalid());
    }
    let interval = Duration::try_from_secs_f64(minutes * 60.0).map_err(|_| invalid())?;
    if interval.is_zero() {
        return Err(invalid());
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "espn": { "leagueId": 1497752245 },
        "thresholds": {
            "points": 30, "rebounds": 0, "assists": 0, "threePointers": 0,
            "steals": 0, "blocks": 0, "turnovers": 5
        },
        "monitoring": {
            "checkIntervalMinutes": 5,
            "onlyDuringGameTimes": true,
            "gameTimeStart": "18:00",
            "gameTimeEnd": "23:59",
            "timezone": "America/New_York"
        },
        "email": {
            "from": { "user": "me@example.com", "appPassword": "secret" },
            "to": "alerts@example.com"
        },
        "rosterFile": "./rostered_player_ids.json"
    }"#;

    #[test]
    fn parses_full_sample() {
        let cfg = Config::from_json_str(SAMPLE).unwrap();
        assert_eq!(cfg.thresholds.points, 30);
        assert_eq!(cfg.thresholds.turnovers, 5);
        assert_eq!(cfg.check_interval, Duration::from_secs(300));
        assert!(cfg.window.enabled);
        assert_eq!(cfg.window.start.to_string(), "18:00");
        assert_eq!(cfg.window.zone.to_string(), "America/New_York");
        assert_eq!(cfg.espn.league_label(), "1497752245");
        assert_eq!(cfg.request_delay(), Duration::from_millis(DEFAULT_REQUEST_DELAY_MS));
        let email = cfg.email.unwrap();
        assert_eq!(email.smtp_host(), DEFAULT_SMTP_HOST);
        assert_eq!(email.to.addresses(), vec!["alerts@example.com"]);
        assert_eq!(cfg.roster_file.unwrap(), PathBuf::from("./rostered_player_ids.json"));
    }

    #[test]
    fn password_is_not_debug_printed() {
        let cfg = Config::from_json_str(SAMPLE).unwrap();
        let dbg = format!("{:?}", cfg.email.unwrap().from);
        assert!(!dbg.contains("secret"));
    }

    #[test]
    fn recipients_accept_list() {
        let raw = SAMPLE.replace(
            r#""to": "alerts@example.com""#,
            r#""to": ["a@example.com", " b@example.com "]"#,
        );
        let cfg = Config::from_json_str(&raw).unwrap();
        assert_eq!(cfg.email.unwrap().to.addresses(), vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn rejects_missing_notifier() {
        let mut v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        v.as_object_mut().unwrap().remove("email");
        let err = Config::from_json_str(&v.to_string()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn webhook_alone_is_enough() {
        let mut v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        let obj = v.as_object_mut().unwrap();
        obj.remove("email");
        obj.insert("webhook".into(), serde_json::json!({ "url": "http://localhost/hook" }));
        let cfg = Config::from_json_str(&v.to_string()).unwrap();
        assert!(cfg.email.is_none());
        assert_eq!(cfg.webhook.unwrap().url, "http://localhost/hook");
    }

    #[test]
    fn rejects_bad_interval_time_and_zone() {
        let zero = SAMPLE.replace(r#""checkIntervalMinutes": 5"#, r#""checkIntervalMinutes": 0"#);
        assert!(Config::from_json_str(&zero).is_err());

        let bad_time = SAMPLE.replace("23:59", "25:00");
        assert!(Config::from_json_str(&bad_time).is_err());

        let bad_zone = SAMPLE.replace("America/New_York", "Nowhere/Special");
        assert!(Config::from_json_str(&bad_zone).is_err());
    }

    #[test]
    fn rejects_intervals_that_do_not_fit_a_duration() {
        for value in ["1e-12", "1e300", "-5"] {
            let raw = SAMPLE.replace(
                r#""checkIntervalMinutes": 5"#,
                &format!(r#""checkIntervalMinutes": {value}"#),
            );
            let err = Config::from_json_str(&raw).unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "{value} should be rejected");
        }
    }

    #[test]
    fn fractional_interval_is_kept() {
        let raw = SAMPLE.replace(r#""checkIntervalMinutes": 5"#, r#""checkIntervalMinutes": 0.5"#);
        let cfg = Config::from_json_str(&raw).unwrap();
        assert_eq!(cfg.check_interval, Duration::from_secs(30));
    }

    #[test]
    fn missing_thresholds_is_error() {
        let mut v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        v.as_object_mut().unwrap().remove("thresholds");
        assert!(Config::from_json_str(&v.to_string()).is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::load(Path::new("/definitely/not/here/config.json")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
