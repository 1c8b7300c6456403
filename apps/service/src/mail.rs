use async_trait::async_trait;
use downtrack::{Notifier, NotifyError};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use crate::config::SmtpConfig;

/// Port on which the relay expects TLS from the first byte
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends alert mail through an authenticated SMTP relay
pub struct SmtpNotifier {
    mailer: Result<AsyncSmtpTransport<Tokio1Executor>, String>,
    from: Option<Mailbox>,
    subject: String,
}

impl SmtpNotifier {
    /// Build the transport from config.
    ///
    /// Incomplete settings do not fail here: every later send reports
    /// `NotifyError::Config` so checking keeps running without mail.
    pub fn new(config: &SmtpConfig) -> Self {
        let mailer = build_transport(config);
        if let Err(reason) = &mailer {
            warn!(reason = %reason, "SMTP notifier disabled");
        }

        let from = config.from.trim().parse::<Mailbox>().ok();

        Self { mailer, from, subject: config.subject.clone() }
    }

    fn compose(&self, recipient: &str, html_body: &str) -> Result<Message, NotifyError> {
        let from = self
            .from
            .clone()
            .ok_or_else(|| NotifyError::Config("invalid sender address".to_string()))?;
        let to = recipient.trim().parse::<Mailbox>().map_err(|e| NotifyError::Recipient {
            recipient: recipient.to_string(),
            reason: e.to_string(),
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

fn build_transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let missing = config.missing_fields();
    if !missing.is_empty() {
        return Err(format!("missing SMTP settings: {}", missing.join(", ")));
    }

    let host = config.host.trim();
    let builder = if config.port == IMPLICIT_TLS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
    }
    .map_err(|e| e.to_string())?;

    Ok(builder
        .port(config.port)
        .credentials(Credentials::new(config.username.clone(), config.password.clone()))
        .build())
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, recipient: &str, html_body: &str) -> Result<(), NotifyError> {
        let mailer = self.mailer.as_ref().map_err(|reason| NotifyError::Config(reason.clone()))?;
        let message = self.compose(recipient, html_body)?;

        mailer.send(message).await.map_err(|e| NotifyError::Delivery(e.to_string()))?;
        debug!(recipient, "alert mail sent");
        Ok(())
    }
}
