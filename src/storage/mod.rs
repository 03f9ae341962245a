//! Append-only persistence of check results
//!
//! Two tables, `logs` (every check) and `incidents` (failed checks), both
//! with columns `(timestamp, url, response)`.

pub mod memory;
pub mod recorder;
pub mod sqlite;
pub mod store;

pub use memory::MemoryStore;
pub use recorder::ResultRecorder;
pub use sqlite::SqliteStore;
pub use store::{timestamp_now, CheckRecord, ResultStore, StorageError, Table, TIMESTAMP_FORMAT};
