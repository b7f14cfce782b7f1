use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Mails the registries send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Carries the confirmation key
    Welcome,
    /// Registration attempt for an already confirmed address
    Deny,
    ConfirmTwice,
    ConfirmationInfo,
}

impl NotificationKind {
    pub fn subject(self) -> &'static str {
        match self {
            NotificationKind::Welcome => "Welcome to Warsjawa!",
            NotificationKind::Deny => "We've got a problem here !",
            NotificationKind::ConfirmTwice => "You can not confirm twice",
            NotificationKind::ConfirmationInfo => "Warsjawa - additional informations",
        }
    }

    /// Plain text body. `context` fields missing from the map render empty.
    pub fn text(self, context: &Value) -> String {
        let field = |name: &str| context.get(name).and_then(Value::as_str).unwrap_or("").to_string();

        match self {
            NotificationKind::Welcome => format!(
                "Hi {},\n\nthanks for registering. Your confirmation key is: {}\n",
                field("name"),
                field("key")
            ),
            NotificationKind::Deny => format!(
                "Hi {},\n\nthe address {} is already registered and confirmed.\n",
                field("name"),
                field("email")
            ),
            NotificationKind::ConfirmTwice => format!(
                "Hi {},\n\nyour registration was already confirmed.\n",
                field("name")
            ),
            NotificationKind::ConfirmationInfo => format!(
                "Hi {},\n\nyour registration is confirmed. See you at the event!\n",
                field("name")
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound notification channel.
///
/// Callers log failures and carry on; a send never decides an outcome.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, kind: NotificationKind, context: &Value) -> Result<(), NotifyError>;
}

/// Sends and logs a failure instead of returning it.
///
/// Runs after the state change is committed, inside the operation.
pub async fn dispatch(notifier: &dyn Notifier, to: &str, kind: NotificationKind, context: Value) {
    if let Err(e) = notifier.send(to, kind, &context).await {
        log::warn!("⚠️  Failed to send {:?} mail to {}: {}", kind, to, e);
    }
}

/// Sends through the Mailgun messages API
pub struct MailgunNotifier {
    client: reqwest::Client,
    base_url: String,
    domain: String,
    api_key: String,
    from: String,
}

impl MailgunNotifier {
    pub fn new(
        base_url: impl Into<String>,
        domain: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            domain: domain.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v3/{}/messages", self.base_url, self.domain)
    }
}

#[async_trait]
impl Notifier for MailgunNotifier {
    async fn send(&self, to: &str, kind: NotificationKind, context: &Value) -> Result<(), NotifyError> {
        let text = kind.text(context);
        let form = [
            ("from", self.from.as_str()),
            ("to", to),
            ("subject", kind.subject()),
            ("text", text.as_str()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("📧 Sent {:?} mail to {}", kind, to);
        Ok(())
    }
}

/// Used when no mail provider is configured; writes the mail to the log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, kind: NotificationKind, context: &Value) -> Result<(), NotifyError> {
        log::info!(
            "📧 [mail disabled] to={} subject={:?}\n{}",
            to,
            kind.subject(),
            kind.text(context)
        );
        Ok(())
    }
}

#[cfg(test)]
pub use recording::*;
