//! One monitoring pass over the configured URLs

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;

use super::checker::{CheckOutcome, UrlChecker};
use crate::config::{ConfigProvider, MonitorConfig};
use crate::notify::IncidentNotifiers;
use crate::storage::{timestamp_now, CheckRecord, ResultRecorder, ResultStore};

/// Counts from one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// URLs checked (one `logs` row each)
    pub checked: usize,
    /// Checks that were incidents
    pub incidents: usize,
}

enum NotifierSource {
    /// Rebuilt from every config snapshot
    FromConfig(reqwest::Client),
    Fixed(IncidentNotifiers),
}

/// Checks every configured URL once per call to [`MonitorCycle::run_cycle`]
pub struct MonitorCycle {
    provider: Arc<dyn ConfigProvider>,
    checker: Arc<dyn UrlChecker>,
    recorder: ResultRecorder,
    notifiers: NotifierSource,
    /// Last config that loaded and validated
    snapshot: Mutex<MonitorConfig>,
}

impl MonitorCycle {
    pub fn new(
        provider: Arc<dyn ConfigProvider>,
        checker: Arc<dyn UrlChecker>,
        store: Arc<dyn ResultStore>,
        initial: MonitorConfig,
    ) -> Self {
        Self {
            provider,
            checker,
            recorder: ResultRecorder::new(store),
            notifiers: NotifierSource::FromConfig(reqwest::Client::new()),
            snapshot: Mutex::new(initial),
        }
    }

    /// Use a fixed set of notifiers instead of building them from config
    pub fn with_notifiers(mut self, notifiers: IncidentNotifiers) -> Self {
        self.notifiers = NotifierSource::Fixed(notifiers);
        self
    }

    /// Latest good config snapshot
    pub fn snapshot(&self) -> MonitorConfig {
        self.snapshot.lock().clone()
    }

    /// Re-read the config, keeping the last good snapshot if that fails
    fn reload(&self) -> MonitorConfig {
        match self.provider.load_validated() {
            Ok(config) => {
                *self.snapshot.lock() = config.clone();
                config
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to reload configuration, using last good snapshot"
                );
                self.snapshot()
            }
        }
    }

    /// Check every configured URL once, recording each result and
    /// raising incidents for failures
    pub async fn run_cycle(&self) -> CycleReport {
        let config = self.reload();
        let notifiers = match &self.notifiers {
            NotifierSource::FromConfig(client) => {
                IncidentNotifiers::from_config(&config, client.clone())
            }
            NotifierSource::Fixed(notifiers) => notifiers.clone(),
        };

        let limit = config.max_concurrent_checks.max(1);
        let urls = if limit > 1 {
            unique_in_order(config.urls)
        } else {
            config.urls
        };

        tracing::debug!(urls = urls.len(), concurrency = limit, "Starting monitor cycle");

        let checker = Arc::clone(&self.checker);
        let mut results = stream::iter(urls)
            .map(move |url| {
                let checker = Arc::clone(&checker);
                let task_url = url.clone();
                // Each check runs on its own task so its timestamp is taken
                // when it finishes, not when the writer gets to it.
                let handle = tokio::spawn(async move {
                    let outcome = checker.check(&task_url).await;
                    (timestamp_now(), outcome)
                });
                async move {
                    match handle.await {
                        Ok((timestamp, outcome)) => (timestamp, url, outcome),
                        Err(e) => {
                            tracing::error!(url = %url, error = %e, "URL check task failed");
                            let outcome =
                                CheckOutcome::TransportError(format!("Check failed: {}", e));
                            (timestamp_now(), url, outcome)
                        }
                    }
                }
            })
            .buffered(limit);

        let mut report = CycleReport::default();
        while let Some((timestamp, url, outcome)) = results.next().await {
            let record = CheckRecord::new(timestamp, url, outcome.response_text());
            report.checked += 1;
            self.recorder.record_check(&record).await;

            if outcome.is_incident() {
                report.incidents += 1;
                tracing::warn!(
                    url = %record.url,
                    response = %record.response,
                    "An incident occurred"
                );
                self.recorder.record_incident(&record, &notifiers).await;
            } else {
                tracing::debug!(url = %record.url, "URL is up");
            }
        }

        tracing::info!(
            checked = report.checked,
            incidents = report.incidents,
            "Monitor cycle complete"
        );
        report
    }
}

fn unique_in_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| {
            let fresh = seen.insert(url.clone());
            if !fresh {
                tracing::warn!(url = %url, "Skipping duplicate URL in concurrent cycle");
            }
            fresh
        })
        .collect()
}

impl std::fmt::Debug for MonitorCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorCycle")
            .field("snapshot", &*self.snapshot.lock())
            .finish_non_exhaustive()
    }
}
