//! Sitewatch
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - SITEWATCH_CONFIG: Path of the JSON config file (default: config.json)
//! - RUST_LOG: Log level (default: sitewatch=info)
//!
//! Config file keys: `urls`, `refresh_interval`, `database_location`, `smtp`,
//! `fcm`. Optional: `check_timeout_secs`, `max_concurrent_checks`.

use std::sync::Arc;
use std::time::Duration;

use sitewatch::config::{ConfigProvider, FileConfigProvider};
use sitewatch::monitor::{HttpChecker, MonitorCycle};
use sitewatch::scheduler::Scheduler;
use sitewatch::storage::{ResultStore, SqliteStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitewatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let provider = Arc::new(FileConfigProvider::from_env());

    // An invalid config stops here, before any table is created
    let config = match provider.load_validated() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %provider.path().display(), error = %e, "Configuration validation failed");
            tracing::error!("Please check your config file");
            return Ok(());
        }
    };

    tracing::info!("Sitewatch configuration:");
    tracing::info!("  Config file: {}", provider.path().display());
    tracing::info!("  URLs: {}", config.urls.len());
    for url in &config.urls {
        tracing::info!("    - {}", url);
    }
    tracing::info!("  Refresh interval: {} seconds", config.refresh_interval);
    tracing::info!("  Database: {}", config.database_location);
    tracing::info!("  Check timeout: {} seconds", config.check_timeout().as_secs());
    tracing::info!("  Max concurrent checks: {}", config.max_concurrent_checks.max(1));

    let store = Arc::new(SqliteStore::connect(&config.database_location).await?);
    store.initialize().await?;

    let checker = Arc::new(HttpChecker::new(config.check_timeout())?);

    // The interval is taken from a fresh read just before scheduling
    let refresh_interval = provider
        .load()
        .map(|c| c.refresh_interval)
        .unwrap_or(config.refresh_interval);

    let cycle = Arc::new(MonitorCycle::new(provider, checker, store, config));

    let mut scheduler = Scheduler::new(Duration::from_secs(refresh_interval));
    tracing::info!("  Scheduling every {} seconds", scheduler.period().as_secs());
    let handle = scheduler.start(move || {
        let cycle = Arc::clone(&cycle);
        async move {
            cycle.run_cycle().await;
        }
    });

    scheduler.run_until(handle, tokio::signal::ctrl_c()).await?;

    Ok(())
}
