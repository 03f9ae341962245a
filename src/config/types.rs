//! Monitor configuration types

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Default per-request timeout for URL checks
pub const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 30;

/// Default push gateway endpoint
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Snapshot of the monitor configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// URLs to check, in order
    pub urls: Vec<String>,
    /// Seconds between cycles
    pub refresh_interval: u64,
    /// Path of the SQLite database file
    pub database_location: String,
    /// SMTP settings for email alerts
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    /// FCM settings for push alerts
    #[serde(default)]
    pub fcm: Option<FcmConfig>,
    /// Per-request timeout in seconds
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,
    /// Upper bound on checks in flight within one cycle
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
}

fn default_check_timeout_secs() -> u64 {
    DEFAULT_CHECK_TIMEOUT_SECS
}

fn default_max_concurrent_checks() -> usize {
    1
}

impl MonitorConfig {
    /// Create a config with the given URLs and defaults everywhere else
    pub fn new(urls: Vec<String>, refresh_interval: u64, database_location: impl Into<String>) -> Self {
        Self {
            urls,
            refresh_interval,
            database_location: database_location.into(),
            smtp: None,
            fcm: None,
            check_timeout_secs: DEFAULT_CHECK_TIMEOUT_SECS,
            max_concurrent_checks: 1,
        }
    }

    /// Set SMTP settings
    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = Some(smtp);
        self
    }

    /// Set FCM settings
    pub fn with_fcm(mut self, fcm: FcmConfig) -> Self {
        self.fcm = Some(fcm);
        self
    }

    /// Set the concurrency bound for checks
    pub fn with_max_concurrent_checks(mut self, limit: usize) -> Self {
        self.max_concurrent_checks = limit;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs.max(1))
    }
}

/// SMTP settings. Every field is optional in the file; the email notifier
/// skips sending unless all of them are present and non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "port_from_number_or_string")]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub receiver_email: Option<String>,
}

impl SmtpConfig {
    /// Names of required fields that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("host", is_blank(&self.host)),
            ("port", matches!(self.port, None | Some(0))),
            ("username", is_blank(&self.username)),
            ("password", is_blank(&self.password)),
            ("sender_email", is_blank(&self.sender_email)),
            ("receiver_email", is_blank(&self.receiver_email)),
        ];
        checks
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| name)
            .collect()
    }
}

/// FCM settings for push notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FcmConfig {
    #[serde(default)]
    pub server_key: Option<String>,
    #[serde(default)]
    pub device_token: Option<String>,
    /// Push gateway override
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl FcmConfig {
    /// Names of required fields that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.server_key) {
            missing.push("server_key");
        }
        if is_blank(&self.device_token) {
            missing.push("device_token");
        }
        missing
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_FCM_ENDPOINT)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PortValue::Text(text)) => text
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid SMTP port: {}", text))),
    }
}
