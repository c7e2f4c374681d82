use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::types::{Availability, PlayerId};

/// Player ids owned by some team in the league. Loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct RosterSet {
    ids: HashSet<PlayerId>,
}

impl RosterSet {
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PlayerId>,
    {
        Self { ids: ids.into_iter().map(Into::into).collect() }
    }

    /// Load a flat JSON array of ids (numbers or strings).
    ///
    /// A missing path or missing file yields an empty set: roster filtering is
    /// then disabled and every player counts as available. A file that exists
    /// but is not a JSON array is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            warn!("No rosterFile configured; availability filtering disabled");
            return Ok(Self::default());
        };

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Roster file not found: {}; monitoring continues without availability filtering",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::Roster(format!("cannot read {}: {e}", path.display())));
            }
        };

        let roster = Self::from_json_str(&raw)
            .map_err(|e| AppError::Roster(format!("{}: {e}", path.display())))?;
        info!("Loaded {} rostered players from {}", roster.len(), path.display());
        Ok(roster)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let items = value
            .as_array()
            .ok_or_else(|| AppError::Roster("expected a JSON array of player ids".to_string()))?;

        let mut ids = HashSet::with_capacity(items.len());
        for item in items {
            match PlayerId::from_value(item) {
                Some(id) => {
                    ids.insert(id);
                }
                None => warn!("Skipping unusable roster entry: {item}"),
            }
        }
        Ok(Self { ids })
    }

    pub fn classify(&self, id: &PlayerId) -> Availability {
        if self.ids.contains(id) {
            Availability::Rostered
        } else {
            Availability::Available
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("courtwatch-{name}-{nonce}.json"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn numeric_id_matches_string_roster_entry() {
        let roster = RosterSet::from_json_str(r#"["123", "456"]"#).unwrap();
        assert_eq!(roster.classify(&PlayerId::from(123u64)), Availability::Rostered);
    }

    #[test]
    fn string_id_matches_numeric_roster_entry() {
        let roster = RosterSet::from_json_str("[3945274, 4066261]").unwrap();
        assert_eq!(roster.classify(&PlayerId::from("3945274")), Availability::Rostered);
        assert_eq!(roster.classify(&PlayerId::from("1")), Availability::Available);
    }

    #[test]
    fn empty_roster_marks_everyone_available() {
        let roster = RosterSet::default();
        assert!(roster.is_empty());
        assert_eq!(roster.classify(&PlayerId::from("anything")), Availability::Available);
    }

    #[test]
    fn unusable_entries_are_skipped() {
        let roster = RosterSet::from_json_str(r#"[1, null, {"id": 2}, "3"]"#).unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn non_array_is_error() {
        assert!(RosterSet::from_json_str(r#"{"ids": [1]}"#).is_err());
        assert!(RosterSet::from_json_str("not json").is_err());
    }

    #[test]
    fn missing_file_is_empty_not_error() {
        let roster = RosterSet::load(Some(Path::new("/no/such/roster.json"))).unwrap();
        assert!(roster.is_empty());
        assert!(RosterSet::load(None).unwrap().is_empty());
    }

    #[test]
    fn loads_file_from_disk() {
        let path = temp_file("roster", "[10, \"11\"]");
        let roster = RosterSet::load(Some(&path)).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.classify(&PlayerId::from(11u64)), Availability::Rostered);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_file_is_roster_error() {
        let path = temp_file("bad-roster", "{ nope");
        let err = RosterSet::load(Some(&path)).unwrap_err();
        assert!(matches!(err, AppError::Roster(_)));
        let _ = std::fs::remove_file(path);
    }
}
