//! Writes check results and turns incidents into notifications

use std::sync::Arc;

use super::store::{CheckRecord, ResultStore, Table};
use crate::notify::{DispatchReport, IncidentNotifiers};

/// Front end of the result store used by the monitor loop.
///
/// Write failures are logged here and never reach the caller.
#[derive(Clone)]
pub struct ResultRecorder {
    store: Arc<dyn ResultStore>,
}

impl ResultRecorder {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }

    /// Append a row to `logs`. Returns whether the write succeeded.
    pub async fn record_check(&self, record: &CheckRecord) -> bool {
        self.write(Table::Logs, record).await
    }

    /// Append a row to `incidents`, then notify email and push.
    ///
    /// Notifications go out even when the write fails.
    pub async fn record_incident(
        &self,
        record: &CheckRecord,
        notifiers: &IncidentNotifiers,
    ) -> DispatchReport {
        self.write(Table::Incidents, record).await;
        notifiers.dispatch(&record.url, &record.response).await
    }

    async fn write(&self, table: Table, record: &CheckRecord) -> bool {
        match self.store.append(table, record).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    table = %table,
                    url = %record.url,
                    error = %e,
                    "Failed to record check result"
                );
                false
            }
        }
    }
}
