use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::{EmailConfig, Thresholds};
use crate::error::{AppError, Result};
use crate::notification::template::{self, AlertTemplate};
use crate::notification::Notifier;
use crate::types::AlertCandidate;

/// Sends one HTML email per alert batch over authenticated SMTP.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    thresholds: Thresholds,
    template: AlertTemplate,
}

impl EmailNotifier {
    /// Validates addresses and builds the transport. No connection is opened
    /// until the first send.
    pub fn new(cfg: &EmailConfig, thresholds: Thresholds) -> Result<Self> {
        let from: Mailbox = cfg.from.user.parse()?;
        let to = cfg
            .to
            .addresses()
            .into_iter()
            .map(str::parse::<Mailbox>)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if to.is_empty() {
            return Err(AppError::Config("email.to has no recipients".to_string()));
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(cfg.smtp_host())?
            .credentials(Credentials::new(cfg.from.user.clone(), cfg.from.app_password.clone()))
            .build();

        info!("Email transport configured via {}", cfg.smtp_host());
        Ok(Self { transport, from, to, thresholds, template: AlertTemplate::new()? })
    }

    fn build_message(&self, alerts: &[AlertCandidate], sent_at: &str) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(template::subject(alerts));
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        let html = self.template.render(alerts, &self.thresholds, sent_at)?;
        Ok(builder.header(ContentType::TEXT_HTML).body(html)?)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, alerts: &[AlertCandidate]) -> Result<()> {
        if alerts.is_empty() {
            return Ok(());
        }
        let sent_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let message = self.build_message(alerts, &sent_at)?;
        self.transport.send(message).await?;

        info!("Alert email sent for {} player(s)", alerts.len());
        for alert in alerts {
            info!("   📧 {}", alert.player.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmailSender, Recipients};
    use crate::types::{PlayerId, PlayerObservation};

    fn email_config(to: Recipients) -> EmailConfig {
        EmailConfig {
            from: EmailSender { user: "monitor@example.com".into(), app_password: "pw".into() },
            to,
            smtp_host: Some("smtp.example.com".into()),
        }
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            points: 20,
            rebounds: 0,
            assists: 0,
            three_pointers: 0,
            steals: 0,
            blocks: 0,
            turnovers: 99,
        }
    }

    fn alert() -> AlertCandidate {
        AlertCandidate {
            player: PlayerObservation {
                id: PlayerId::from("1"),
                name: "Tyrese Maxey".into(),
                team: "Philadelphia 76ers".into(),
                game_id: "401".into(),
                game: "PHI @ NYK".into(),
                minutes: "40".into(),
                points: 35,
                rebounds: 4,
                assists: 8,
                three_pointers: 5,
                steals: 1,
                blocks: 0,
                turnovers: 2,
            },
            is_available: true,
        }
    }

    #[tokio::test]
    async fn builds_message_for_all_recipients() {
        let cfg = email_config(Recipients::Many(vec!["a@example.com".into(), "b@example.com".into()]));
        let notifier = EmailNotifier::new(&cfg, thresholds()).unwrap();
        assert_eq!(notifier.to.len(), 2);

        let message = notifier.build_message(&[alert()], "now").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: a@example.com, b@example.com"));
        assert!(raw.contains("From: monitor@example.com"));
        assert!(raw.contains("Content-Type: text/html"));
    }

    #[tokio::test]
    async fn invalid_address_fails_setup() {
        let cfg = email_config(Recipients::One("not an address".into()));
        let err = EmailNotifier::new(&cfg, thresholds()).err().unwrap();
        assert!(matches!(err, AppError::EmailAddress(_)));
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let cfg = email_config(Recipients::One("a@example.com".into()));
        let notifier = EmailNotifier::new(&cfg, thresholds()).unwrap();
        // Would fail to connect if it tried to send.
        notifier.notify(&[]).await.unwrap();
    }
}
