//! HTTP probe for a single URL

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};

/// Status code treated as healthy. Anything else is an incident.
pub const HEALTHY_STATUS: u16 = 200;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Outcome of checking one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The request completed with this status
    Status(u16),
    /// The request could not complete
    TransportError(String),
}

impl CheckOutcome {
    /// Only an exact 200 counts as healthy
    pub fn is_incident(&self) -> bool {
        !matches!(self, CheckOutcome::Status(HEALTHY_STATUS))
    }

    /// Text stored in the `response` column
    pub fn response_text(&self) -> String {
        match self {
            CheckOutcome::Status(code) => code.to_string(),
            CheckOutcome::TransportError(message) => message.clone(),
        }
    }
}

/// Probes one URL
#[async_trait]
pub trait UrlChecker: Send + Sync {
    async fn check(&self, url: &str) -> CheckOutcome;
}

/// Checker issuing a GET with browser-like headers
#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(browser_headers())
            .build()?;
        Ok(Self { client })
    }
}

/// Headers that make the probe look like a desktop browser, so bot
/// filters do not turn healthy sites into incidents
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

#[async_trait]
impl UrlChecker for HttpChecker {
    async fn check(&self, url: &str) -> CheckOutcome {
        match self.client.get(url).send().await {
            Ok(response) => CheckOutcome::Status(response.status().as_u16()),
            Err(e) => CheckOutcome::TransportError(describe_error(&e)),
        }
    }
}

/// Error text including its source chain
fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
