use redb::{Database as RedbDatabase, ReadTransaction, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::tables::*;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("Decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Redb(#[from] redb::Error),
    #[error("Database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
}

impl DatabaseError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, DatabaseError::Timeout(_))
    }
}

#[derive(Clone)]
pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("sweet-shop.redb");
        let db = RedbDatabase::create(db_path)?;

        // Create tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(ACCOUNTS)?;
            write_txn.open_table(ACCOUNT_EMAILS)?;
            write_txn.open_table(SWEETS)?;
            write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    /// Run a store call on the blocking pool, bounded by `timeout`.
    ///
    /// On timeout the call is not cancelled: it may still commit after
    /// `DatabaseError::Timeout` has been returned to the caller.
    pub async fn run<T, F>(&self, timeout: Duration, f: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
    {
        let db = self.clone();
        let task = tokio::task::spawn_blocking(move || f(&db));

        match tokio::time::timeout(timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Store call timed out");
                Err(DatabaseError::Timeout(timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::setup_db;

    #[test]
    fn test_reopen_keeps_tables() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        {
            Database::open(temp_dir.path()).unwrap();
        }
        let db = Database::open(temp_dir.path()).unwrap();
        assert!(db.list_sweets().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_returns_result() {
        let (db, _temp) = setup_db();
        let sweets = db
            .run(Duration::from_secs(1), |db| db.list_sweets())
            .await
            .unwrap();
        assert!(sweets.is_empty());
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let (db, _temp) = setup_db();
        let result = db
            .run(Duration::from_millis(10), |_| {
                std::thread::sleep(Duration::from_millis(200));
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, DatabaseError::Timeout(_)));
        assert!(err.is_retryable());
    }
}
