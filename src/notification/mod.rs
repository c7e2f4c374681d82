//! Alert delivery.
//!
//! The monitor hands each non-empty batch of qualifying players to a single
//! [`Notifier`]. Email and webhook channels implement it; when both are
//! configured they are wrapped in a [`FanoutNotifier`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::AlertCandidate;

pub mod email;
pub mod template;
pub mod webhook;

pub use email::EmailNotifier;
pub use webhook::WebhookNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver one notification covering the whole batch.
    async fn notify(&self, alerts: &[AlertCandidate]) -> Result<()>;
}

/// Delivers to every channel; fails if any channel failed.
pub struct FanoutNotifier {
    channels: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(channels: Vec<Arc<dyn Notifier>>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn notify(&self, alerts: &[AlertCandidate]) -> Result<()> {
        let mut failed = Vec::new();
        for channel in &self.channels {
            if let Err(e) = channel.notify(alerts).await {
                error!("{} notification failed: {e}", channel.name());
                failed.push(channel.name());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(AppError::Notify(format!("failed channels: {}", failed.join(", "))))
        }
    }
}

/// Build the configured notifier(s). Fails on invalid addresses or URLs.
pub fn build_notifier(cfg: &Config) -> Result<Arc<dyn Notifier>> {
    let mut channels: Vec<Arc<dyn Notifier>> = Vec::new();
    if let Some(email) = &cfg.email {
        channels.push(Arc::new(EmailNotifier::new(email, cfg.thresholds)?));
    }
    if let Some(webhook) = &cfg.webhook {
        channels.push(Arc::new(WebhookNotifier::new(webhook, cfg.thresholds)?));
    }

    match channels.len() {
        0 => Err(AppError::Config("no notifier configured".to_string())),
        1 => Ok(channels.remove(0)),
        _ => Ok(Arc::new(FanoutNotifier::new(channels))),
    }
}
