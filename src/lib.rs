//! Sitewatch: scheduled HTTP uptime monitor
//!
//! Periodically requests every configured URL, records each outcome in an
//! append-only SQLite store, and raises an incident, with email and push
//! alerts, for anything that does not answer HTTP 200.
//!
//! # Components
//!
//! - **config**: JSON config file, re-read at the start of every cycle
//! - **storage**: `logs` and `incidents` tables, plus the recorder that
//!   dispatches notifications for incidents
//! - **notify**: email (SMTP with STARTTLS) and push (FCM) channels
//! - **monitor**: the URL checker and the monitor cycle
//! - **scheduler**: runs the cycle immediately and then at a fixed interval
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use sitewatch::config::{ConfigProvider, FileConfigProvider};
//! use sitewatch::monitor::{HttpChecker, MonitorCycle};
//! use sitewatch::storage::{ResultStore, SqliteStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(FileConfigProvider::new("config.json"));
//! let config = provider.load_validated()?;
//!
//! let store = Arc::new(SqliteStore::connect(&config.database_location).await?);
//! store.initialize().await?;
//!
//! let checker = Arc::new(HttpChecker::new(Duration::from_secs(30))?);
//! let cycle = MonitorCycle::new(provider, checker, store, config);
//! let report = cycle.run_cycle().await;
//! println!("{} checked, {} incidents", report.checked, report.incidents);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod monitor;
pub mod notify;
pub mod scheduler;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigError, ConfigProvider, FileConfigProvider, MonitorConfig};
pub use monitor::{CheckOutcome, CycleReport, HttpChecker, MonitorCycle, UrlChecker};
pub use notify::{IncidentNotifiers, Notifier, NotifyOutcome};
pub use scheduler::Scheduler;
pub use storage::{CheckRecord, ResultStore, SqliteStore, StorageError};
