use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::PlayerId;
use crate::window::Zone;

/// (player, calendar day) pair that suppresses repeat alerts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub player_id: PlayerId,
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// AlertHistory
// ---------------------------------------------------------------------------

/// In-memory record of who has been alerted today.
///
/// Not synchronized itself; the monitor keeps it behind its cycle lock.
/// Nothing is persisted: a restart forgets the day's alerts.
#[derive(Debug)]
pub struct AlertHistory {
    zone: Zone,
    /// key → time of the first alert
    alerted: HashMap<AlertKey, DateTime<Utc>>,
}

impl AlertHistory {
    pub fn new(zone: Zone) -> Self {
        Self { zone, alerted: HashMap::new() }
    }

    /// Returns true and records the key the first time `player_id` is seen on
    /// `now`'s calendar day; false on every later call that day.
    pub fn should_alert(&mut self, player_id: &PlayerId, now: DateTime<Utc>) -> bool {
        let key = AlertKey { player_id: player_id.clone(), date: self.zone.date(now) };
        if self.alerted.contains_key(&key) {
            return false;
        }
        self.alerted.insert(key, now);
        true
    }

    /// Drop keys from previous days. Returns the number removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let today = self.zone.date(now);
        let before = self.alerted.len();
        self.alerted.retain(|key, _| key.date == today);
        before - self.alerted.len()
    }

    pub fn first_alerted_at(&self, player_id: &PlayerId, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let key = AlertKey { player_id: player_id.clone(), date: self.zone.date(now) };
        self.alerted.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.alerted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn history() -> AlertHistory {
        AlertHistory::new(Zone::Named(chrono_tz::UTC))
    }

    #[test]
    fn second_call_same_day_is_suppressed() {
        let mut h = history();
        let id = PlayerId::from("42");
        assert!(h.should_alert(&id, at(10, 1)));
        assert!(!h.should_alert(&id, at(10, 23)));
        assert_eq!(h.first_alerted_at(&id, at(10, 23)), Some(at(10, 1)));
    }

    #[test]
    fn new_day_alerts_again() {
        let mut h = history();
        let id = PlayerId::from("42");
        assert!(h.should_alert(&id, at(10, 12)));
        assert!(h.should_alert(&id, at(11, 12)));
    }

    #[test]
    fn players_are_independent() {
        let mut h = history();
        assert!(h.should_alert(&PlayerId::from("1"), at(10, 12)));
        assert!(h.should_alert(&PlayerId::from("2"), at(10, 12)));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn numeric_and_string_ids_share_a_key() {
        let mut h = history();
        assert!(h.should_alert(&PlayerId::from(7u64), at(10, 12)));
        assert!(!h.should_alert(&PlayerId::from("7"), at(10, 13)));
    }

    #[test]
    fn day_boundary_follows_zone() {
        let mut h = AlertHistory::new(Zone::parse(Some("America/New_York")).unwrap());
        let id = PlayerId::from("42");
        // 23:00 and 03:00 UTC next day are both March 10 in New York (EDT, UTC-4).
        assert!(h.should_alert(&id, Utc.with_ymd_and_hms(2025, 3, 10, 23, 0, 0).unwrap()));
        assert!(!h.should_alert(&id, Utc.with_ymd_and_hms(2025, 3, 11, 3, 0, 0).unwrap()));
    }

    #[test]
    fn prune_drops_only_stale_days() {
        let mut h = history();
        h.should_alert(&PlayerId::from("1"), at(10, 12));
        h.should_alert(&PlayerId::from("2"), at(11, 12));
        assert_eq!(h.prune(at(11, 13)), 1);
        assert_eq!(h.len(), 1);
        assert!(!h.should_alert(&PlayerId::from("2"), at(11, 14)));
        assert!(h.should_alert(&PlayerId::from("1"), at(11, 14)));
    }
}
