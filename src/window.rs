//! Time-of-day gating and calendar-day resolution in the configured zone.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, Result};

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// Timezone used for the game window and for alert-day keys.
/// Falls back to the host's local zone when none is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    Named(Tz),
}

impl Zone {
    pub fn parse(name: Option<&str>) -> Result<Self> {
        match name.map(str::trim) {
            None | Some("") => Ok(Zone::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(Zone::Named)
                .map_err(|e| AppError::Config(format!("unknown timezone {name:?}: {e}"))),
        }
    }

    pub fn date(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => now.with_timezone(&chrono::Local).date_naive(),
            Zone::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }

    pub fn time(&self, now: DateTime<Utc>) -> NaiveTime {
        match self {
            Zone::Local => now.with_timezone(&chrono::Local).time(),
            Zone::Named(tz) => now.with_timezone(tz).time(),
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Local => write!(f, "local"),
            Zone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeOfDay
// ---------------------------------------------------------------------------

/// Minute-of-day parsed from "HH:MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn parse(s: &str) -> Result<Self> {
        let bad = || AppError::Config(format!("invalid time {s:?}, expected HH:MM"));
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let hours: u16 = h.parse().map_err(|_| bad())?;
        let minutes: u16 = m.parse().map_err(|_| bad())?;
        if hours > 23 || minutes > 59 {
            return Err(bad());
        }
        Ok(Self(hours * 60 + minutes))
    }

    pub fn from_time(t: NaiveTime) -> Self {
        Self((t.hour() * 60 + t.minute()) as u16)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

// ---------------------------------------------------------------------------
// GameTimeWindow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTimeWindow {
    pub enabled: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub zone: Zone,
}

impl GameTimeWindow {
    /// True when a cycle may fetch. Both bounds are inclusive.
    ///
    /// A window with `start > end` never opens: midnight wrap is not supported.
    pub fn allows(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return true;
        }
        let current = TimeOfDay::from_time(self.zone.time(now));
        current >= self.start && current <= self.end
    }

    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }
}

impl std::fmt::Display for GameTimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.enabled {
            write!(f, "{} - {} {}", self.start, self.end, self.zone)
        } else {
            write!(f, "disabled")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, h, m, 0).unwrap()
    }

    fn window(enabled: bool, start: &str, end: &str) -> GameTimeWindow {
        GameTimeWindow {
            enabled,
            start: TimeOfDay::parse(start).unwrap(),
            end: TimeOfDay::parse(end).unwrap(),
            zone: Zone::Named(chrono_tz::UTC),
        }
    }

    #[test]
    fn parses_hh_mm() {
        assert_eq!(TimeOfDay::parse("18:00").unwrap().minutes(), 1080);
        assert_eq!(TimeOfDay::parse("7:05").unwrap().to_string(), "07:05");
        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("12:60").is_err());
        assert!(TimeOfDay::parse("noon").is_err());
    }

    #[test]
    fn disabled_window_always_allows() {
        let w = window(false, "18:00", "23:59");
        assert!(w.allows(utc(12, 0)));
        assert!(w.allows(utc(3, 30)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let w = window(true, "18:00", "23:59");
        assert!(!w.allows(utc(12, 0)));
        assert!(!w.allows(utc(17, 59)));
        assert!(w.allows(utc(18, 0)));
        assert!(w.allows(utc(23, 59)));
    }

    #[test]
    fn window_is_evaluated_in_configured_zone() {
        let mut w = window(true, "18:00", "23:59");
        w.zone = Zone::parse(Some("America/New_York")).unwrap();
        // 23:30 UTC in January is 18:30 in New York.
        assert!(w.allows(utc(23, 30)));
        // 18:30 UTC is 13:30 in New York.
        assert!(!w.allows(utc(18, 30)));
    }

    #[test]
    fn midnight_crossing_window_never_opens() {
        let w = window(true, "22:00", "02:00");
        assert!(w.crosses_midnight());
        assert!(!w.allows(utc(23, 0)));
        assert!(!w.allows(utc(1, 0)));
    }

    #[test]
    fn date_follows_zone() {
        let zone = Zone::parse(Some("America/Los_Angeles")).unwrap();
        // 03:00 UTC on the 15th is still the 14th on the west coast.
        let d = zone.date(utc(3, 0));
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());
    }

    #[test]
    fn unknown_zone_is_config_error() {
        assert!(matches!(Zone::parse(Some("Mars/Olympus")), Err(AppError::Config(_))));
        assert_eq!(Zone::parse(None).unwrap(), Zone::Local);
    }
}
