use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Deserialize;

use crate::error::FluentDbError;
use crate::query_builder::validate_identifier;
use crate::session::Session;

/// Database name that opens a private in-memory database instead of a file.
pub const MEMORY_DB: &str = ":memory:";

/// Options for opening a [`Session`].
///
/// Deserializable so a session can be configured from a JSON document:
/// ```rust
/// use fluent_sqlite::prelude::*;
///
/// let opts: SessionOptions =
///     serde_json::from_str(r#"{ "db_name": "app.db", "prefix": "app_" }"#).unwrap();
/// assert_eq!(opts.prefix, "app_");
/// assert!(opts.allow_unbounded_write);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SessionOptions {
    pub db_name: String,
    #[serde(default = "default_dir")]
    pub db_dir: PathBuf,
    #[serde(default)]
    pub prefix: String,
    /// Allow `save`/`set_value`/`delete` without a where condition to touch every row.
    #[serde(default = "default_true")]
    pub allow_unbounded_write: bool,
    /// Switch file-backed databases to WAL journaling on open.
    #[serde(default = "default_true")]
    pub wal: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

impl SessionOptions {
    #[must_use]
    pub fn new(db_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            db_dir: default_dir(),
            prefix: String::new(),
            allow_unbounded_write: true,
            wal: true,
        }
    }

    #[must_use]
    pub fn builder(db_name: impl Into<String>) -> SessionOptionsBuilder {
        SessionOptionsBuilder::new(db_name)
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.db_name == MEMORY_DB
    }

    /// Filesystem location of the database (`:memory:` for in-memory sessions).
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        if self.is_memory() {
            PathBuf::from(MEMORY_DB)
        } else {
            self.db_dir.join(&self.db_name)
        }
    }

    /// Check the options before anything is opened.
    ///
    /// # Errors
    /// Returns `FluentDbError::ConfigError` for an empty database name or a prefix
    /// containing anything but ASCII alphanumerics and underscores.
    pub fn validate(&self) -> Result<(), FluentDbError> {
        if self.db_name.trim().is_empty() {
            return Err(FluentDbError::ConfigError("database name is empty".into()));
        }
        if !self.prefix.is_empty() {
            validate_identifier(&self.prefix, "table prefix")?;
        }
        Ok(())
    }
}

/// Fluent builder for session options.
#[derive(Debug, Clone)]
pub struct SessionOptionsBuilder {
    opts: SessionOptions,
}

impl SessionOptionsBuilder {
    #[must_use]
    pub fn new(db_name: impl Into<String>) -> Self {
        Self {
            opts: SessionOptions::new(db_name),
        }
    }

    #[must_use]
    pub fn dir(mut self, db_dir: impl Into<PathBuf>) -> Self {
        self.opts.db_dir = db_dir.into();
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.opts.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn allow_unbounded_write(mut self, allow: bool) -> Self {
        self.opts.allow_unbounded_write = allow;
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> SessionOptions {
        self.opts
    }

    /// Open a [`Session`] with these options.
    ///
    /// # Errors
    ///
    /// Returns `FluentDbError` if the options are invalid or the database cannot be opened.
    pub async fn build(self) -> Result<Session, FluentDbError> {
        Session::open_with(self.finish()).await
    }
}

/// Open the underlying connection, creating the file if it does not exist yet.
///
/// Runs on the worker thread that will own the connection.
pub(crate) fn open_connection(path: &Path, wal: bool) -> Result<Connection, FluentDbError> {
    if path == Path::new(MEMORY_DB) {
        return Ok(Connection::open_in_memory()?);
    }
    let conn = Connection::open(path)?;
    if wal {
        // journal_mode reports the resulting mode as a row
        conn.query_row("PRAGMA journal_mode = WAL;", [], |_| Ok(()))?;
    }
    Ok(conn)
}
