use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Format of recorded timestamps (local wall-clock time)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded check: a row of `logs` or `incidents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub timestamp: String,
    pub url: String,
    /// Status code as text, or an error description
    pub response: String,
}

impl CheckRecord {
    pub fn new(
        timestamp: impl Into<String>,
        url: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            url: url.into(),
            response: response.into(),
        }
    }
}

/// Current local time in the recorded format
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// The two append-only tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Every check
    Logs,
    /// Checks whose outcome was a failure
    Incidents,
}

impl Table {
    pub const ALL: [Table; 2] = [Table::Logs, Table::Incidents];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Logs => "logs",
            Table::Incidents => "incidents",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Append-only persistence for check results
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Ensure both tables exist. Safe to call more than once.
    async fn initialize(&self) -> Result<(), StorageError>;

    /// Append one row
    async fn append(&self, table: Table, record: &CheckRecord) -> Result<(), StorageError>;

    /// All rows of a table in insertion order
    async fn records(&self, table: Table) -> Result<Vec<CheckRecord>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Table not initialized: {0}")]
    TableNotInitialized(Table),
}
