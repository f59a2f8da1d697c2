use crate::domain::error::DomainError;
use crate::domain::ports::notifier::AlertNotifier;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

const DEFAULT_SMTP_PORT: u16 = 587;

/// Mail relay settings, read from `WHEELHOUSE_SMTP_*` and
/// `WHEELHOUSE_ALERT_RECIPIENT`.
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub recipient: String,
}

impl SmtpSettings {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DomainError::Notify(format!("{key} is not set")))
        };

        let port = match get("WHEELHOUSE_SMTP_PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| DomainError::Notify(format!("invalid WHEELHOUSE_SMTP_PORT: {p}")))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            server: required("WHEELHOUSE_SMTP_SERVER")?,
            port,
            user: required("WHEELHOUSE_SMTP_USER")?,
            password: required("WHEELHOUSE_SMTP_PASSWORD")?,
            recipient: required("WHEELHOUSE_ALERT_RECIPIENT")?,
        })
    }
}

/// Sends alerts as plain-text mail through a STARTTLS relay.
pub struct SmtpNotifier {
    settings: SmtpSettings,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    pub fn from_env() -> Result<Self, DomainError> {
        SmtpSettings::from_env().map(Self::new)
    }

    fn message(&self, subject: &str, body: &str) -> Result<Message, DomainError> {
        let from = self
            .settings
            .user
            .parse()
            .map_err(|e| DomainError::Notify(format!("invalid sender address: {e}")))?;
        let to = self
            .settings
            .recipient
            .parse()
            .map_err(|e| DomainError::Notify(format!("invalid recipient address: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DomainError::Notify(e.to_string()))
    }
}

#[async_trait]
impl AlertNotifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), DomainError> {
        let message = self.message(subject, body)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.server)
            .map_err(|e| DomainError::Notify(format!("SMTP relay {}: {e}", self.settings.server)))?
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.user.clone(),
                self.settings.password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| DomainError::Notify(format!("send failed: {e}")))?;

        info!(recipient = %self.settings.recipient, "alert e-mail sent");
        Ok(())
    }
}
