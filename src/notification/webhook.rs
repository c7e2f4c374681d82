use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Thresholds, WebhookConfig};
use crate::error::{AppError, Result};
use crate::notification::{template, Notifier};
use crate::types::AlertCandidate;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPlayer<'a> {
    #[serde(flatten)]
    alert: &'a AlertCandidate,
    box_score_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    subject: String,
    players: Vec<WebhookPlayer<'a>>,
    thresholds: &'a Thresholds,
    sent_at: String,
}

fn build_payload<'a>(
    alerts: &'a [AlertCandidate],
    thresholds: &'a Thresholds,
    sent_at: String,
) -> WebhookPayload<'a> {
    WebhookPayload {
        subject: template::subject(alerts),
        players: alerts
            .iter()
            .map(|alert| WebhookPlayer { alert, box_score_url: alert.player.box_score_url() })
            .collect(),
        thresholds,
        sent_at,
    }
}

/// POSTs the alert batch as JSON to a configured URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    thresholds: Thresholds,
}

impl WebhookNotifier {
    pub fn new(cfg: &WebhookConfig, thresholds: Thresholds) -> Result<Self> {
        if !(cfg.url.starts_with("http://") || cfg.url.starts_with("https://")) {
            return Err(AppError::Config(format!("webhook.url must be http(s): {}", cfg.url)));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, url: cfg.url.clone(), thresholds })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, alerts: &[AlertCandidate]) -> Result<()> {
        if alerts.is_empty() {
            return Ok(());
        }
        let payload = build_payload(alerts, &self.thresholds, chrono::Utc::now().to_rfc3339());

        let resp = self.client.post(&self.url).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Notify(format!("webhook returned HTTP {status}: {body}")));
        }

        debug!("Webhook accepted alert batch");
        info!("Alert webhook sent for {} player(s)", alerts.len());
        Ok(())
    }
}
