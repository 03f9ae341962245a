//! URL checking and the monitor cycle
//!
//! A cycle reloads the config, probes every URL in order, writes one `logs`
//! row per URL and, for anything other than HTTP 200, an `incidents` row
//! followed by email and push notifications.

pub mod checker;
pub mod cycle;

pub use checker::{browser_headers, CheckOutcome, HttpChecker, UrlChecker, HEALTHY_STATUS};
pub use cycle::{CycleReport, MonitorCycle};
