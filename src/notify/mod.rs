//! Incident notifications
//!
//! Two independent channels, email and push, behind one [`Notifier`] trait.
//! A channel without complete credentials reports [`NotifyOutcome::Skipped`]
//! and never touches the network. Delivery failures are logged and reported
//! as [`NotifyOutcome::Failed`]; they are never retried or propagated.

pub mod email;
pub mod push;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MonitorConfig;

pub use email::EmailNotifier;
pub use push::PushNotifier;

/// Subject line of incident emails
pub const INCIDENT_SUBJECT: &str = "Incident Detected";

/// Title of incident push notifications
pub const PUSH_TITLE: &str = "Website Monitoring";

/// Result of one notification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Delivered to the channel
    Sent,
    /// Not attempted because credentials are incomplete
    Skipped { missing: Vec<&'static str> },
    /// Attempted and failed
    Failed(String),
}

impl NotifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, NotifyOutcome::Sent)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, NotifyOutcome::Skipped { .. })
    }
}

/// A channel that delivers human-readable alerts
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs
    fn channel(&self) -> &'static str;

    /// Deliver one alert. Never fails; problems are reported in the outcome.
    async fn notify(&self, subject: &str, body: &str) -> NotifyOutcome;
}

/// Outcomes of dispatching one incident to every channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub email: NotifyOutcome,
    pub push: NotifyOutcome,
}

/// The email and push channels used for incidents
#[derive(Clone)]
pub struct IncidentNotifiers {
    email: Arc<dyn Notifier>,
    push: Arc<dyn Notifier>,
}

impl IncidentNotifiers {
    pub fn new(email: Arc<dyn Notifier>, push: Arc<dyn Notifier>) -> Self {
        Self { email, push }
    }

    /// Build both channels from a config snapshot
    pub fn from_config(config: &MonitorConfig, client: reqwest::Client) -> Self {
        Self {
            email: Arc::new(EmailNotifier::new(config.smtp.clone())),
            push: Arc::new(PushNotifier::new(config.fcm.clone(), client)),
        }
    }

    /// Notify about an incident: email first, then push
    pub async fn dispatch(&self, url: &str, response: &str) -> DispatchReport {
        let body = format!("An incident occurred for URL: {}\nResponse: {}", url, response);
        let email = self.email.notify(INCIDENT_SUBJECT, &body).await;

        let message = format!("Incident detected for URL: {}", url);
        let push = self.push.notify(PUSH_TITLE, &message).await;

        for (channel, outcome) in [(self.email.channel(), &email), (self.push.channel(), &push)] {
            tracing::debug!(url = %url, channel, outcome = ?outcome, "Incident notification dispatched");
        }

        DispatchReport { email, push }
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Email error: {0}")]
    Email(String),

    #[error("Push error: {0}")]
    Push(String),
}
