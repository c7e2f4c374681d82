//! Subject line and HTML body for alert emails.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::json;

use crate::config::Thresholds;
use crate::error::Result;
use crate::types::AlertCandidate;

const TEMPLATE_NAME: &str = "alert.html";

const ALERT_HTML: &str = r##"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #667eea;">🏀 Fantasy Basketball Alert</h2>
  <p>The following {{ "players meet" if players|length > 1 else "player meets" }} your threshold criteria:</p>
{% for p in players %}
  <div style="background: #f0f4ff; padding: 20px; border-radius: 10px; margin: 15px 0; border-left: 5px solid {{ "#48bb78" if p.available else "#f56565" }};">
    <h3 style="margin-top: 0; color: #333;">{{ p.name }} ({{ p.team }}) <span style="color: {{ "#48bb78" if p.available else "#f56565" }};">{{ "✓ AVAILABLE" if p.available else "✗ ROSTERED" }}</span></h3>
    <p style="font-size: 16px; margin: 10px 0;"><strong>Game:</strong> {{ p.game }}<br><strong>Minutes:</strong> {{ p.minutes }}</p>
    <div style="display: grid; grid-template-columns: repeat(4, 1fr); gap: 10px; margin: 15px 0;">
{% for s in p.stats %}
      <div style="text-align: center; padding: 10px; background: white; border-radius: 8px;"><div style="font-size: 24px; font-weight: bold; color: #667eea;">{{ s.value }}</div><div style="font-size: 11px; color: #718096;">{{ s.label }}</div></div>
{% endfor %}
    </div>
    <a href="{{ p.box_score_url }}" style="display: inline-block; background: #667eea; color: white; padding: 10px 20px; text-decoration: none; border-radius: 8px; margin-top: 10px;">📊 View Full Box Score</a>
  </div>
{% endfor %}
  <hr style="border: none; border-top: 1px solid #ddd; margin: 30px 0;">
  <div style="color: #666; font-size: 12px;">
    <p><strong>Your Current Thresholds:</strong></p>
    <p>Points: {{ t.points }}+ | Rebounds: {{ t.rebounds }}+ | Assists: {{ t.assists }}+ | 3PM: {{ t.threePointers }}+</p>
    <p>Steals: {{ t.steals }}+ | Blocks: {{ t.blocks }}+ | Turnovers: {{ t.turnovers }} max</p>
    <p style="margin-top: 15px;"><em>Sent at {{ sent_at }}</em><br>Fantasy Basketball Monitor</p>
  </div>
</div>"##;

pub fn subject(alerts: &[AlertCandidate]) -> String {
    match alerts {
        [one] => format!("🏀 FANTASY ALERT: {} Available!", one.player.name),
        many => format!("🏀 FANTASY ALERT: {} Players Available!", many.len()),
    }
}

/// Renders the alert email body. Registered under an `.html` name, so every
/// interpolated value is HTML-escaped.
pub struct AlertTemplate {
    env: Environment<'static>,
}

impl AlertTemplate {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(TEMPLATE_NAME, ALERT_HTML)?;
        Ok(Self { env })
    }

    pub fn render(&self, alerts: &[AlertCandidate], thresholds: &Thresholds, sent_at: &str) -> Result<String> {
        let players: Vec<_> = alerts
            .iter()
            .map(|alert| {
                let p = &alert.player;
                json!({
                    "name": p.name,
                    "team": p.team,
                    "game": p.game,
                    "minutes": p.minutes,
                    "available": alert.is_available,
                    "box_score_url": p.box_score_url(),
                    "stats": [
                        { "label": "POINTS", "value": p.points },
                        { "label": "REBOUNDS", "value": p.rebounds },
                        { "label": "ASSISTS", "value": p.assists },
                        { "label": "3-POINTERS", "value": p.three_pointers },
                        { "label": "STEALS", "value": p.steals },
                        { "label": "BLOCKS", "value": p.blocks },
                        { "label": "TURNOVERS", "value": p.turnovers },
                    ],
                })
            })
            .collect();

        let context = json!({ "players": players, "t": thresholds, "sent_at": sent_at });
        Ok(self.env.get_template(TEMPLATE_NAME)?.render(context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlayerId, PlayerObservation};

    fn alert(name: &str, available: bool) -> AlertCandidate {
        AlertCandidate {
            player: PlayerObservation {
                id: PlayerId::from("1"),
                name: name.to_string(),
                team: "Golden State Warriors".into(),
                game_id: "401585100".into(),
                game: "GS @ SAC".into(),
                minutes: "38".into(),
                points: 41,
                rebounds: 5,
                assists: 7,
                three_pointers: 9,
                steals: 2,
                blocks: 0,
                turnovers: 3,
            },
            is_available: available,
        }
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            points: 30,
            rebounds: 0,
            assists: 0,
            three_pointers: 5,
            steals: 0,
            blocks: 0,
            turnovers: 6,
        }
    }

    fn render(alerts: &[AlertCandidate]) -> String {
        AlertTemplate::new().unwrap().render(alerts, &thresholds(), "now").unwrap()
    }

    #[test]
    fn subject_names_single_player() {
        assert_eq!(subject(&[alert("Stephen Curry", true)]), "🏀 FANTASY ALERT: Stephen Curry Available!");
    }

    #[test]
    fn subject_counts_multiple_players() {
        let alerts = vec![alert("A", true), alert("B", true), alert("C", false)];
        assert_eq!(subject(&alerts), "🏀 FANTASY ALERT: 3 Players Available!");
    }

    #[test]
    fn body_has_card_stats_and_link() {
        let html = render(&[alert("Stephen Curry", true)]);
        assert!(html.contains("Stephen Curry (Golden State Warriors)"));
        assert!(html.contains("✓ AVAILABLE"));
        assert!(html.contains("401585100"));
        assert!(html.contains(">41<"));
        assert!(html.contains("3-POINTERS"));
        assert!(html.contains("player meets"));
        assert!(html.contains("Points: 30+"));
        assert!(html.contains("3PM: 5+"));
        assert!(html.contains("Turnovers: 6 max"));
    }

    #[test]
    fn rostered_badge_and_plural_copy() {
        let html = render(&[alert("A", false), alert("B", true)]);
        assert!(html.contains("✗ ROSTERED"));
        assert!(html.contains("✓ AVAILABLE"));
        assert!(html.contains("players meet"));
    }

    #[test]
    fn names_are_escaped() {
        let html = render(&[alert("<script>x</script>", true)]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
