use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::FluentDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::schema::TableSchema;
use super::worker::SqliteWorker;

/// Outcome of a successfully executed write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DmlOutcome {
    pub rows_affected: usize,
    /// `sqlite3_last_insert_rowid` observed right after the statement.
    pub last_insert_id: i64,
}

/// Owned `SQLite` connection backed by a dedicated worker thread.
///
/// Every clone submits to the same worker, so statements from all clones run
/// one at a time in submission order.
#[derive(Clone)]
pub struct SqliteConnection {
    worker: Arc<SqliteWorker>,
}

impl SqliteConnection {
    /// Open the database at `path` on a fresh worker thread.
    ///
    /// # Errors
    /// Returns [`FluentDbError`] if the worker cannot be spawned or the database cannot be opened.
    pub async fn open(path: PathBuf, wal: bool) -> Result<Self, FluentDbError> {
        let worker = SqliteWorker::spawn(path, wal).await?;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    /// Execute a SQL query and return the rows produced by the worker thread.
    ///
    /// # Errors
    /// Returns any [`FluentDbError`] encountered while the worker prepares or evaluates the
    /// statement, or if channel communication with the worker fails.
    pub async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, FluentDbError> {
        self.worker
            .execute_select(query.to_owned(), Params::convert(params).into_values())
            .await
    }

    /// Execute a single write statement (DDL, INSERT, UPDATE, DELETE).
    ///
    /// # Errors
    /// Returns any [`FluentDbError`] reported by the worker while executing the statement or
    /// relaying the result back to the caller.
    pub async fn execute_dml(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<DmlOutcome, FluentDbError> {
        self.worker
            .execute_dml(query.to_owned(), Params::convert(params).into_values())
            .await
    }

    /// Read the declared columns of `table`.
    ///
    /// # Errors
    /// Returns [`FluentDbError::TableNotFound`] if the table does not exist.
    pub async fn table_info(&self, table: &str) -> Result<TableSchema, FluentDbError> {
        self.worker.table_info(table.to_owned()).await
    }

    /// Close the underlying connection. Later submissions from any clone fail.
    ///
    /// # Errors
    /// Returns [`FluentDbError`] if `SQLite` refuses to close or the worker is already gone.
    pub async fn close(&self) -> Result<(), FluentDbError> {
        self.worker.close().await
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("worker_id", &self.worker.worker_id())
            .finish()
    }
}
