//! SMTP email notifier implementing NotifyPort.
//!
//! Port 465 uses implicit TLS, any other port STARTTLS. Credentials and
//! recipients come from the environment; the relay from `[email]`.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

use crate::domain::error::DigestError;
use crate::domain::settings::EmailSettings;
use crate::ports::notify_port::{Digest, NotifyPort};

pub const USER_ENV: &str = "SMTP_USER";
pub const PASSWORD_ENV: &str = "SMTP_PASSWORD";
pub const RECIPIENTS_ENV: &str = "MAIL_TO";

const IMPLICIT_TLS_PORT: u16 = 465;

pub struct SmtpAdapter {
    transport: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpAdapter {
    pub fn new(
        settings: &EmailSettings,
        user: String,
        password: String,
        recipients: &str,
        timeout: Duration,
    ) -> Result<Self, DigestError> {
        let from: Mailbox = user
            .parse()
            .map_err(|e| DigestError::invalid("email", USER_ENV, format!("{e}")))?;
        let to = parse_recipients(recipients)?;

        let builder = if settings.smtp_port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&settings.smtp_host)
        } else {
            SmtpTransport::starttls_relay(&settings.smtp_host)
        }
        .map_err(|e| DigestError::invalid("email", "smtp_host", e.to_string()))?;

        let transport = builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(user, password))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// Builds the sink when user and password are both present in the
    /// environment lookup. Recipients default to the sending account.
    pub fn from_lookup(
        settings: &EmailSettings,
        timeout: Duration,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Result<Self, DigestError>> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let user = non_empty(USER_ENV)?;
        let password = non_empty(PASSWORD_ENV)?;
        let recipients = non_empty(RECIPIENTS_ENV).unwrap_or_else(|| user.clone());
        Some(Self::new(settings, user, password, &recipients, timeout))
    }

    pub fn build_message(&self, digest: &Digest) -> Result<Message, DigestError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(digest.title.clone())
            .header(ContentType::TEXT_HTML);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        builder
            .body(digest.html.clone())
            .map_err(|e| self.failed(format!("failed to build message: {e}")))
    }

    fn failed(&self, reason: impl Into<String>) -> DigestError {
        DigestError::NotificationFailed {
            sink: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

impl NotifyPort for SmtpAdapter {
    fn name(&self) -> &str {
        "email"
    }

    fn send(&self, digest: &Digest) -> Result<(), DigestError> {
        let message = self.build_message(digest)?;
        self.transport
            .send(&message)
            .map_err(|e| self.failed(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

pub fn parse_recipients(input: &str) -> Result<Vec<Mailbox>, DigestError> {
    let recipients = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Mailbox>()
                .map_err(|e| DigestError::invalid("email", RECIPIENTS_ENV, format!("{s}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if recipients.is_empty() {
        return Err(DigestError::invalid("email", RECIPIENTS_ENV, "no recipients"));
    }
    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings() -> EmailSettings {
        EmailSettings {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 465,
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_recipients_splits_commas() {
        let to = parse_recipients("a@example.com, b@example.com").unwrap();
        assert_eq!(to.len(), 2);
        assert_eq!(to[1].email.to_string(), "b@example.com");
    }

    #[test]
    fn parse_recipients_rejects_garbage_and_empty() {
        assert!(parse_recipients("not an address").is_err());
        assert!(parse_recipients(" , ").is_err());
    }

    #[test]
    fn missing_credentials_disable_sink() {
        let vars = env(&[(USER_ENV, "me@example.com")]);
        let sink = SmtpAdapter::from_lookup(&settings(), Duration::from_secs(5), |k| {
            vars.get(k).cloned()
        });
        assert!(sink.is_none());
    }

    #[test]
    fn recipients_default_to_sender() {
        let vars = env(&[(USER_ENV, "me@example.com"), (PASSWORD_ENV, "secret")]);
        let sink = SmtpAdapter::from_lookup(&settings(), Duration::from_secs(5), |k| {
            vars.get(k).cloned()
        })
        .unwrap()
        .unwrap();
        assert_eq!(sink.to.len(), 1);
        assert_eq!(sink.to[0].email.to_string(), "me@example.com");
    }

    #[test]
    fn message_is_html_with_subject() {
        let vars = env(&[
            (USER_ENV, "me@example.com"),
            (PASSWORD_ENV, "secret"),
            (RECIPIENTS_ENV, "you@example.com"),
        ]);
        let sink = SmtpAdapter::from_lookup(&settings(), Duration::from_secs(5), |k| {
            vars.get(k).cloned()
        })
        .unwrap()
        .unwrap();
        let digest = Digest {
            title: "Daily PnL".into(),
            markdown: "ignored".into(),
            html: "<p>hello</p>".into(),
        };

        let message = sink.build_message(&digest).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Daily PnL"));
        assert!(raw.contains("To: you@example.com"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("<p>hello</p>"));
    }
}
