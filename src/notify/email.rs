//! Email notifications over SMTP with STARTTLS

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Notifier, NotifierError, NotifyOutcome};
use crate::config::SmtpConfig;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends plain-text incident emails
pub struct EmailNotifier {
    smtp: Option<SmtpConfig>,
}

impl EmailNotifier {
    pub fn new(smtp: Option<SmtpConfig>) -> Self {
        Self { smtp }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        match &self.smtp {
            Some(smtp) => smtp.missing_fields(),
            None => SmtpConfig::default().missing_fields(),
        }
    }

    async fn send(&self, smtp: &SmtpConfig, subject: &str, body: &str) -> Result<(), NotifierError> {
        let message = build_message(smtp, subject, body)?;

        let host = field(&smtp.host);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(|e| NotifierError::Email(format!("Failed to configure transport: {}", e)))?
            .port(smtp.port.unwrap_or_default())
            .credentials(Credentials::new(field(&smtp.username), field(&smtp.password)))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| NotifierError::Email(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

fn field(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Build a multipart message with a single plain-text part
fn build_message(
    smtp: &SmtpConfig,
    subject: &str,
    body: &str,
) -> Result<Message, NotifierError> {
    let from: Mailbox = field(&smtp.sender_email)
        .parse()
        .map_err(|e| NotifierError::Email(format!("Invalid sender address: {}", e)))?;
    let to: Mailbox = field(&smtp.receiver_email)
        .parse()
        .map_err(|e| NotifierError::Email(format!("Invalid receiver address: {}", e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(MultiPart::mixed().singlepart(SinglePart::plain(body.to_string())))
        .map_err(|e| NotifierError::Email(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, subject: &str, body: &str) -> NotifyOutcome {
        let missing = self.missing_fields();
        let smtp = match &self.smtp {
            Some(smtp) if missing.is_empty() => smtp,
            _ => {
                tracing::info!(
                    missing = %missing.join(", "),
                    "Email notification skipped: incomplete SMTP configuration"
                );
                return NotifyOutcome::Skipped { missing };
            }
        };

        match self.send(smtp, subject, body).await {
            Ok(()) => {
                tracing::info!(receiver = ?smtp.receiver_email, "Email sent");
                NotifyOutcome::Sent
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send email notification");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_on_port(port: u16) -> SmtpConfig {
        SmtpConfig {
            host: Some("127.0.0.1".to_string()),
            port: Some(port),
            username: Some("monitor".to_string()),
            password: Some("secret".to_string()),
            sender_email: Some("monitor@example.com".to_string()),
            receiver_email: Some("ops@example.com".to_string()),
        }
    }

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_skipped_without_config() {
        let notifier = EmailNotifier::new(None);
        let outcome = notifier.notify("Incident Detected", "body").await;

        assert!(outcome.is_skipped());
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_skipped_reports_missing_fields() {
        let smtp = SmtpConfig {
            username: None,
            password: Some(String::new()),
            ..smtp_on_port(587)
        };
        let outcome = EmailNotifier::new(Some(smtp)).notify("s", "b").await;

        assert_eq!(
            outcome,
            NotifyOutcome::Skipped {
                missing: vec!["username", "password"]
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_without_panicking() {
        let notifier = EmailNotifier::new(Some(smtp_on_port(closed_port())));
        let outcome = notifier.notify("Incident Detected", "body").await;

        assert!(matches!(outcome, NotifyOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_bad_sender_address_fails() {
        let smtp = SmtpConfig {
            sender_email: Some("not an address".to_string()),
            ..smtp_on_port(closed_port())
        };
        let outcome = EmailNotifier::new(Some(smtp)).notify("s", "b").await;

        match outcome {
            NotifyOutcome::Failed(reason) => assert!(reason.contains("sender")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_message_has_one_plain_part() {
        let body = "An incident occurred for URL: http://down.test";
        let message = build_message(&smtp_on_port(587), "Incident Detected", body).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("Subject: Incident Detected"));
        assert!(formatted.contains("From: monitor@example.com"));
        assert!(formatted.contains("To: ops@example.com"));
        assert!(formatted.contains("multipart/mixed"));
        assert_eq!(formatted.matches("text/plain").count(), 1);
        assert!(formatted.contains(body));
    }

    #[test]
    fn test_bad_receiver_address_rejected() {
        let smtp = SmtpConfig {
            receiver_email: Some("ops at example".to_string()),
            ..smtp_on_port(587)
        };
        match build_message(&smtp, "s", "b") {
            Err(NotifierError::Email(reason)) => assert!(reason.contains("receiver")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
