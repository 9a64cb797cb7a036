//! Outage alerts.
//!
//! [`Notifier::notify`] never fails outward: a message that cannot be built
//! or delivered is logged and dropped. There are no retries.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info, warn};

use crate::data::TIMESTAMP_FORMAT;
use crate::error::NotifyError;
use crate::settings::SmtpSettings;

/// A stream that just went offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub source: String,
    /// Listener count reported by the failing observation.
    pub listeners: u32,
    pub at: NaiveDateTime,
}

impl Alert {
    pub fn subject(&self) -> String {
        format!("Alert: radio {} is down!", self.source)
    }

    pub fn body(&self) -> String {
        format!(
            "Radio {} went down at {} with {} listeners.",
            self.source,
            self.at.format(TIMESTAMP_FORMAT),
            self.listeners
        )
    }
}

/// Delivers alerts to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert);

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Sends alerts as plain-text email over SMTP with STARTTLS.
pub struct EmailNotifier {
    from: Mailbox,
    to: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    /// Build a notifier that sends from `username` to `recipient` through `relay:port`.
    pub fn new(
        relay: &str,
        port: u16,
        username: &str,
        password: &str,
        recipient: &str,
    ) -> Result<Self, NotifyError> {
        let from: Mailbox = username.parse()?;
        let to: Mailbox = recipient.parse()?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(relay)?
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self { from, to, mailer })
    }

    /// Build from settings; `None` when no credentials are configured.
    pub fn from_settings(smtp: &SmtpSettings) -> Result<Option<Self>, NotifyError> {
        let Some((username, password)) = smtp.credentials() else {
            return Ok(None);
        };
        let recipient = smtp.recipient().unwrap_or(username);
        Self::new(&smtp.relay, smtp.port, username, password, recipient).map(Some)
    }

    /// Compose the alert message.
    pub fn compose(&self, alert: &Alert) -> Result<Message, NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(alert.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body())?;
        Ok(message)
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let message = self.compose(alert)?;
        self.mailer.send(message).await?;
        Ok(())
    }
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("from", &self.from.email.to_string())
            .field("to", &self.to.email.to_string())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, alert: &Alert) {
        match self.send(alert).await {
            Ok(()) => info!(source = %alert.source, "alert email sent"),
            Err(e) => error!(source = %alert.source, "failed to send alert email: {}", e),
        }
    }

    fn name(&self) -> &str {
        "email"
    }
}

/// Logs alerts instead of sending them. Used when SMTP is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) {
        warn!(source = %alert.source, "{} {}", alert.subject(), alert.body());
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn alert() -> Alert {
        Alert {
            source: "tabajara".to_string(),
            listeners: 3,
            at: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(21, 4, 59).unwrap(),
        }
    }

    fn smtp(username: Option<&str>, password: Option<&str>) -> SmtpSettings {
        SmtpSettings {
            relay: "mail.example.com".to_string(),
            port: 587,
            username: username.map(String::from),
            password: password.map(String::from),
            recipient: None,
        }
    }

    #[test]
    fn test_alert_template() {
        let alert = alert();
        assert_eq!(alert.subject(), "Alert: radio tabajara is down!");
        assert_eq!(alert.body(), "Radio tabajara went down at 2024-05-01 21:04:59 with 3 listeners.");
    }

    #[tokio::test]
    async fn test_compose_addresses_and_body() {
        let notifier =
            EmailNotifier::new("mail.example.com", 587, "ops@example.com", "pw", "ops@example.com")
                .unwrap();
        let message = notifier.compose(&alert()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: ops@example.com"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Subject: Alert: radio tabajara is down!"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("with 3 listeners."));
    }

    #[tokio::test]
    async fn test_invalid_address_is_rejected() {
        let result = EmailNotifier::new("mail.example.com", 587, "not an address", "pw", "x@y.z");
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }

    #[tokio::test]
    async fn test_from_settings_requires_credentials() {
        assert!(EmailNotifier::from_settings(&smtp(None, None)).unwrap().is_none());
        assert!(EmailNotifier::from_settings(&smtp(Some("a@b.c"), None)).unwrap().is_none());
        assert!(EmailNotifier::from_settings(&smtp(Some("a@b.c"), Some(""))).unwrap().is_none());

        let notifier = EmailNotifier::from_settings(&smtp(Some("a@b.c"), Some("pw"))).unwrap();
        assert!(notifier.is_some());
        assert_eq!(notifier.unwrap().name(), "email");
    }

    #[tokio::test]
    async fn test_send_failure_does_not_panic() {
        // Port 1 on localhost refuses connections; the failure is logged and swallowed.
        let notifier =
            EmailNotifier::new("127.0.0.1", 1, "ops@example.com", "pw", "ops@example.com").unwrap();
        notifier.notify(&alert()).await;
        LogNotifier.notify(&alert()).await;
    }
}
