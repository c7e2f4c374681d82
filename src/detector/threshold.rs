use crate::config::Thresholds;
use crate::types::PlayerObservation;

/// True iff every counting stat clears its minimum and turnovers stay at or
/// under the maximum.
pub fn meets_thresholds(p: &PlayerObservation, t: &Thresholds) -> bool {
    p.points >= t.points
        && p.rebounds >= t.rebounds
        && p.assists >= t.assists
        && p.three_pointers >= t.three_pointers
        && p.steals >= t.steals
        && p.blocks >= t.blocks
        && p.turnovers <= t.turnovers
}
