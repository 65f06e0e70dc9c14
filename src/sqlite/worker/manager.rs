use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use rusqlite::types::Value;
use tokio::sync::oneshot;

use crate::error::FluentDbError;
use crate::results::ResultSet;
use crate::sqlite::config::open_connection;
use crate::sqlite::connection::DmlOutcome;
use crate::sqlite::schema::TableSchema;

use super::channel::{Command, Reply};
use super::dispatcher::run_sqlite_worker;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

pub(in crate::sqlite) struct SqliteWorker {
    sender: Sender<Command>,
    worker_id: u64,
}

impl SqliteWorker {
    /// Spawn the worker thread, open the database on it, and wait until it is ready.
    pub(in crate::sqlite) async fn spawn(path: PathBuf, wal: bool) -> Result<Self, FluentDbError> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), FluentDbError>>();
        let worker_id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);

        thread::Builder::new()
            .name(format!("sqlite-worker-{worker_id}"))
            .spawn(move || match open_connection(&path, wal) {
                Ok(conn) => {
                    let _ = ready_tx.send(Ok(()));
                    run_sqlite_worker(conn, &receiver);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .map_err(|err| {
                FluentDbError::ConnectionError(format!(
                    "failed to spawn SQLite worker thread: {err}"
                ))
            })?;

        ready_rx
            .await
            .map_err(|_| connection_error("SQLite worker exited before opening the database"))??;

        Ok(Self { sender, worker_id })
    }

    pub(in crate::sqlite) fn worker_id(&self) -> u64 {
        self.worker_id
    }

    fn send_command(&self, command: Command) -> Result<(), FluentDbError> {
        self.sender
            .send(command)
            .map_err(|_| connection_error("SQLite worker closed"))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
        drop_message: &'static str,
    ) -> Result<T, FluentDbError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        rx.await.map_err(|_| connection_error(drop_message))?
    }

    pub(in crate::sqlite) async fn execute_select(
        &self,
        query: String,
        params: Vec<Value>,
    ) -> Result<ResultSet, FluentDbError> {
        self.request(
            |respond_to| Command::ExecuteSelect {
                query,
                params,
                respond_to,
            },
            "SQLite worker dropped while executing select",
        )
        .await
    }

    pub(in crate::sqlite) async fn execute_dml(
        &self,
        query: String,
        params: Vec<Value>,
    ) -> Result<DmlOutcome, FluentDbError> {
        self.request(
            |respond_to| Command::ExecuteDml {
                query,
                params,
                respond_to,
            },
            "SQLite worker dropped while executing update",
        )
        .await
    }

    pub(in crate::sqlite) async fn table_info(
        &self,
        table: String,
    ) -> Result<TableSchema, FluentDbError> {
        self.request(
            |respond_to| Command::TableInfo { table, respond_to },
            "SQLite worker dropped while reading table info",
        )
        .await
    }

    pub(in crate::sqlite) async fn close(&self) -> Result<(), FluentDbError> {
        self.request(
            |respond_to| Command::Close { respond_to },
            "SQLite worker dropped while closing",
        )
        .await
    }
}

impl Drop for SqliteWorker {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}

fn connection_error(message: &str) -> FluentDbError {
    FluentDbError::ConnectionError(message.into())
}
