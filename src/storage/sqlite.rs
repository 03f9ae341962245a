//! SQLite-backed result store

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::store::{CheckRecord, ResultStore, StorageError, Table};

/// Result store in a SQLite database file.
///
/// The pool holds a single connection, so concurrent writers queue behind
/// each other instead of contending for the database lock.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path`
    pub async fn connect<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(Duration::from_secs(60))
            .connect_with(options)
            .await?;

        tracing::debug!(path = %path.as_ref().display(), "Opened result database");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn initialize(&self) -> Result<(), StorageError> {
        for table in Table::ALL {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (timestamp TEXT, url TEXT, response TEXT)",
                table.name()
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn append(&self, table: Table, record: &CheckRecord) -> Result<(), StorageError> {
        let sql = format!(
            "INSERT INTO {} (timestamp, url, response) VALUES (?, ?, ?)",
            table.name()
        );
        sqlx::query(&sql)
            .bind(record.timestamp.as_str())
            .bind(record.url.as_str())
            .bind(record.response.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn records(&self, table: Table) -> Result<Vec<CheckRecord>, StorageError> {
        let sql = format!(
            "SELECT timestamp, url, response FROM {} ORDER BY rowid",
            table.name()
        );
        let rows: Vec<(String, String, String)> =
            sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(timestamp, url, response)| CheckRecord {
                timestamp,
                url,
                response,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::connect(dir.path().join("monitor.db")).await.unwrap();

        store.initialize().await.unwrap();
        store
            .append(Table::Logs, &CheckRecord::new("2024-01-01 00:00:00", "http://ok.test", "200"))
            .await
            .unwrap();
        store.initialize().await.unwrap();

        assert_eq!(store.records(Table::Logs).await.unwrap().len(), 1);
        assert!(store.records(Table::Incidents).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_preserves_order_per_table() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::connect(dir.path().join("monitor.db")).await.unwrap();
        store.initialize().await.unwrap();

        let first = CheckRecord::new("2024-01-01 00:00:00", "http://b.test", "200");
        let second = CheckRecord::new("2024-01-01 00:00:01", "http://a.test", "503");
        store.append(Table::Logs, &first).await.unwrap();
        store.append(Table::Logs, &second).await.unwrap();
        store.append(Table::Incidents, &second).await.unwrap();

        assert_eq!(store.records(Table::Logs).await.unwrap(), vec![first, second.clone()]);
        assert_eq!(store.records(Table::Incidents).await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monitor.db");
        let record = CheckRecord::new("2024-01-01 00:00:00", "http://down.test", "connection refused");

        {
            let store = SqliteStore::connect(&path).await.unwrap();
            store.initialize().await.unwrap();
            store.append(Table::Incidents, &record).await.unwrap();
            store.pool().close().await;
        }

        let store = SqliteStore::connect(&path).await.unwrap();
        store.initialize().await.unwrap();
        assert_eq!(store.records(Table::Incidents).await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_append_before_initialize_fails() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::connect(dir.path().join("monitor.db")).await.unwrap();

        let result = store
            .append(Table::Logs, &CheckRecord::new("t", "http://ok.test", "200"))
            .await;
        assert!(matches!(result, Err(StorageError::Database(_))));
    }
}
