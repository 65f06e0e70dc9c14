#![allow(dead_code)]

use fluent_sqlite::prelude::*;
use tempfile::TempDir;

/// Route library logs to the test harness; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// File-backed session in a fresh temporary directory; keep the dir alive for the test.
pub async fn file_session(prefix: &str) -> Result<(TempDir, Session), FluentDbError> {
    init_tracing();
    let dir = tempfile::tempdir().map_err(|e| FluentDbError::ConfigError(e.to_string()))?;
    let session = SessionOptions::builder("test.db")
        .dir(dir.path())
        .prefix(prefix)
        .build()
        .await?;
    Ok((dir, session))
}

pub async fn memory_session() -> Result<Session, FluentDbError> {
    init_tracing();
    Session::open(":memory:").await
}

/// `users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)`, selected as the current table.
pub async fn with_users_table(session: &mut Session) {
    assert!(
        session
            .create_table(
                [("name", RowValues::from("")), ("age", RowValues::from(0))],
                "users",
            )
            .await,
        "create users failed: {:?}",
        session.last_error()
    );
    session.table("users");
}
