//! Push notifications through the FCM HTTP gateway

use async_trait::async_trait;
use reqwest::header;

use super::{Notifier, NotifierError, NotifyOutcome};
use crate::config::FcmConfig;

/// Sends incident push notifications to one device
pub struct PushNotifier {
    fcm: Option<FcmConfig>,
    client: reqwest::Client,
}

impl PushNotifier {
    pub fn new(fcm: Option<FcmConfig>, client: reqwest::Client) -> Self {
        Self { fcm, client }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        match &self.fcm {
            Some(fcm) => fcm.missing_fields(),
            None => FcmConfig::default().missing_fields(),
        }
    }

    async fn send(&self, fcm: &FcmConfig, title: &str, body: &str) -> Result<(), NotifierError> {
        let server_key = fcm.server_key.as_deref().unwrap_or_default();
        let payload = serde_json::json!({
            "notification": {
                "title": title,
                "body": body,
            },
            "to": fcm.device_token,
        });

        let response = self
            .client
            .post(fcm.endpoint())
            .header(header::AUTHORIZATION, format!("key={}", server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifierError::Push(format!("Failed to send push notification: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(NotifierError::Push(format!(
                "Push gateway returned status {}",
                response.status().as_u16()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for PushNotifier {
    fn channel(&self) -> &'static str {
        "push"
    }

    async fn notify(&self, subject: &str, body: &str) -> NotifyOutcome {
        let missing = self.missing_fields();
        let fcm = match &self.fcm {
            Some(fcm) if missing.is_empty() => fcm,
            _ => {
                tracing::info!(
                    missing = %missing.join(", "),
                    "Push notification skipped: incomplete FCM configuration"
                );
                return NotifyOutcome::Skipped { missing };
            }
        };

        match self.send(fcm, subject, body).await {
            Ok(()) => {
                tracing::info!(endpoint = %fcm.endpoint(), "Push notification sent");
                NotifyOutcome::Sent
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send push notification");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}
