use std::sync::mpsc::Receiver;

use rusqlite::types::Value;
use rusqlite::{Connection, ToSql};
use tracing::debug;

use crate::error::FluentDbError;
use crate::results::ResultSet;
use crate::sqlite::connection::DmlOutcome;
use crate::sqlite::query::build_result_set;
use crate::sqlite::schema::read_table_info;

use super::channel::Command;

/// Worker loop: one command at a time, in the order they were sent.
pub(super) fn run_sqlite_worker(conn: Connection, receiver: &Receiver<Command>) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::ExecuteSelect {
                query,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(execute_select(&conn, &query, &params));
            }
            Command::ExecuteDml {
                query,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(execute_dml(&conn, &query, &params));
            }
            Command::TableInfo { table, respond_to } => {
                debug!(table = %table, "reading table info");
                let _ = respond_to.send(read_table_info(&conn, &table));
            }
            Command::Close { respond_to } => {
                let outcome = conn.close().map_err(|(_, err)| FluentDbError::SqliteError(err));
                let _ = respond_to.send(outcome);
                return;
            }
            Command::Shutdown => break,
        }
    }
}

fn execute_select(
    conn: &Connection,
    query: &str,
    params: &[Value],
) -> Result<ResultSet, FluentDbError> {
    debug!(sql = %query, params = params.len(), "executing select");
    let mut stmt = conn.prepare(query)?;
    build_result_set(&mut stmt, params)
}

fn execute_dml(
    conn: &Connection,
    query: &str,
    params: &[Value],
) -> Result<DmlOutcome, FluentDbError> {
    debug!(sql = %query, params = params.len(), "executing update");
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|value| value as &dyn ToSql).collect();
    let rows_affected = {
        let mut stmt = conn.prepare(query)?;
        stmt.execute(&param_refs[..])?
    };
    Ok(DmlOutcome {
        rows_affected,
        last_insert_id: conn.last_insert_rowid(),
    })
}
