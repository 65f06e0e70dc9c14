//! The long-lived handle application code chains builder calls on.
//!
//! A [`Session`] owns one execution channel (a worker thread holding the
//! `SQLite` connection), the current [`ConditionState`], an optional
//! [`Snapshot`] of it, and the per-table schema cache.
//!
//! ```no_run
//! use fluent_sqlite::prelude::*;
//!
//! # async fn demo() -> Result<(), FluentDbError> {
//! let mut db = Session::open("app.db").await?;
//! db.create_table([("name", RowValues::from("")), ("age", RowValues::from(0))], "users")
//!     .await;
//!
//! db.table("users").data_with_map([("name", "Alice")]).add().await;
//! let alice = db.where_with_string("name = 'Alice'").find().await;
//! assert!(alice.is_some());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::FluentDbError;
use crate::query_builder::{Statement, validate_identifier};
use crate::results::ResultSet;
use crate::sqlite::{DmlOutcome, SessionOptions, SqliteConnection, TableSchema};

mod conditions;
mod terminal;

pub use conditions::{ConditionState, Filter, Payload, Snapshot};

pub struct Session {
    conn: SqliteConnection,
    options: SessionOptions,
    state: ConditionState,
    snapshot: Option<Snapshot>,
    schema_cache: HashMap<String, TableSchema>,
    last_sql: String,
    last_error: Option<FluentDbError>,
    last_insert_id: Option<i64>,
}

impl Session {
    /// Open (creating if needed) `db_name` in the current directory with default options.
    ///
    /// # Errors
    /// Returns `FluentDbError` if the database cannot be opened.
    pub async fn open(db_name: &str) -> Result<Self, FluentDbError> {
        Self::open_with(SessionOptions::new(db_name)).await
    }

    /// Open a session with explicit options.
    ///
    /// # Errors
    /// Returns `FluentDbError::ConfigError` for invalid options, or the error
    /// raised while spawning the worker or opening the database.
    pub async fn open_with(options: SessionOptions) -> Result<Self, FluentDbError> {
        options.validate()?;
        let path = options.db_path();
        let wal = options.wal && !options.is_memory();
        let conn = SqliteConnection::open(path.clone(), wal).await?;
        info!(path = %path.display(), prefix = %options.prefix, "opened database");
        Ok(Self::with_connection(conn, options))
    }

    fn with_connection(conn: SqliteConnection, options: SessionOptions) -> Self {
        Self {
            conn,
            options,
            state: ConditionState::default(),
            snapshot: None,
            schema_cache: HashMap::new(),
            last_sql: String::new(),
            last_error: None,
            last_insert_id: None,
        }
    }

    /// A new session on the same execution channel with its own, empty condition state.
    ///
    /// Statements from all forks are still applied one at a time.
    #[must_use]
    pub fn fork(&self) -> Self {
        let mut forked = Self::with_connection(self.conn.clone(), self.options.clone());
        forked.schema_cache = self.schema_cache.clone();
        forked
    }

    /// Close the underlying connection. Forks sharing it fail afterwards.
    ///
    /// # Errors
    /// Returns `FluentDbError` if `SQLite` refuses to close the connection.
    pub async fn close(self) -> Result<(), FluentDbError> {
        self.conn.close().await?;
        info!(path = %self.options.db_path().display(), "closed database");
        Ok(())
    }

    #[must_use]
    pub fn db_name(&self) -> &str {
        &self.options.db_name
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.options.db_path()
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.options.prefix
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Text of the most recently executed statement, successful or not.
    #[must_use]
    pub fn last_sql(&self) -> &str {
        &self.last_sql
    }

    /// Why the last collapsed terminal operation failed; cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&FluentDbError> {
        self.last_error.as_ref()
    }

    /// Rowid of the row inserted by the last successful `add`.
    #[must_use]
    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    #[must_use]
    pub fn current_table(&self) -> Option<&str> {
        self.state.table.as_deref()
    }

    /// Declared columns of the current table, once a terminal operation has looked them up.
    #[must_use]
    pub fn table_fields(&self) -> Option<&TableSchema> {
        self.state.table_fields.as_ref()
    }

    /// Declared columns of `table` (already prefix-qualified), cached after the
    /// first successful lookup.
    ///
    /// # Errors
    /// Returns `FluentDbError::TableNotFound` if the table does not exist.
    pub async fn columns_of(&mut self, table: &str) -> Result<TableSchema, FluentDbError> {
        if let Some(schema) = self.schema_cache.get(table) {
            debug!(table, "schema cache hit");
            return Ok(schema.clone());
        }
        // missing tables are not cached, so a later CREATE TABLE is observed
        let schema = self.conn.table_info(table).await?;
        self.schema_cache.insert(table.to_owned(), schema.clone());
        Ok(schema)
    }

    /// The validated current table name.
    fn target_table(&self) -> Result<String, FluentDbError> {
        let table = self
            .state
            .table
            .clone()
            .ok_or_else(|| FluentDbError::ConfigError("no table selected".into()))?;
        validate_identifier(&table, "table name")?;
        Ok(table)
    }

    /// Current table plus its columns, loading them into the condition state on first use.
    async fn target_schema(&mut self) -> Result<(String, TableSchema), FluentDbError> {
        let table = self.target_table()?;
        if let Some(schema) = self.state.table_fields.as_ref().filter(|s| s.table == table) {
            return Ok((table, schema.clone()));
        }
        let schema = self.columns_of(&table).await?;
        self.state.table_fields = Some(schema.clone());
        Ok((table, schema))
    }

    fn ensure_bounded(&self, operation: &str) -> Result<(), FluentDbError> {
        if self.state.where_clause.is_none() && !self.options.allow_unbounded_write {
            return Err(FluentDbError::ConfigError(format!(
                "{operation} without a where condition is disabled for this session"
            )));
        }
        Ok(())
    }

    async fn submit_query(&mut self, stmt: Statement) -> Result<ResultSet, FluentDbError> {
        self.last_sql.clone_from(&stmt.sql);
        self.conn.execute_select(&stmt.sql, &stmt.params).await
    }

    async fn submit_update(&mut self, stmt: Statement) -> Result<DmlOutcome, FluentDbError> {
        self.last_sql.clone_from(&stmt.sql);
        self.conn.execute_dml(&stmt.sql, &stmt.params).await
    }

    /// Collapse a terminal outcome to its plain value, remembering the failure.
    fn settle<T>(&mut self, outcome: Result<T, FluentDbError>, fallback: T) -> T {
        match outcome {
            Ok(value) => {
                self.last_error = None;
                value
            }
            Err(err) => {
                if raised_by_statement(&err) {
                    warn!(sql = %self.last_sql, error = %err, "statement failed");
                } else {
                    // nothing was executed, so last_sql belongs to an earlier call
                    warn!(error = %err, "operation rejected");
                }
                self.last_error = Some(err);
                fallback
            }
        }
    }
}

/// Whether `err` was reported while executing the statement in `last_sql`.
fn raised_by_statement(err: &FluentDbError) -> bool {
    matches!(
        err,
        FluentDbError::SqliteError(_) | FluentDbError::ExecutionError(_)
    )
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("conn", &self.conn)
            .field("db_name", &self.options.db_name)
            .field("state", &self.state)
            .field("last_sql", &self.last_sql)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_execution_failures_carry_the_statement() {
        assert!(raised_by_statement(&FluentDbError::ExecutionError("x".into())));
        assert!(raised_by_statement(&FluentDbError::SqliteError(
            rusqlite::Error::InvalidQuery
        )));
        assert!(!raised_by_statement(&FluentDbError::ConfigError("x".into())));
        assert!(!raised_by_statement(&FluentDbError::TableNotFound("t".into())));
        assert!(!raised_by_statement(&FluentDbError::ConnectionError("x".into())));
    }
}
