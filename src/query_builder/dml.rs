use indexmap::IndexMap;

use crate::error::FluentDbError;
use crate::types::RowValues;

use super::{Statement, placeholders};

fn empty_payload(table: &str) -> FluentDbError {
    FluentDbError::ConfigError(format!("no writable fields for table '{table}'"))
}

/// `INSERT INTO <table> (cols) VALUES (?1, ...)` from an already filtered payload.
///
/// # Errors
/// Returns `FluentDbError::ConfigError` if `data` is empty.
pub fn insert(table: &str, data: &IndexMap<String, RowValues>) -> Result<Statement, FluentDbError> {
    if data.is_empty() {
        return Err(empty_payload(table));
    }
    let columns: Vec<&str> = data.keys().map(String::as_str).collect();
    let values: Vec<String> = placeholders(1, data.len()).collect();
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        values.join(", ")
    );
    Ok(Statement::with_params(sql, data.values().cloned().collect()))
}

/// `UPDATE <table> SET col = ?1, ... [WHERE ...]` from an already filtered payload.
///
/// Without a where condition the update applies to every row.
///
/// # Errors
/// Returns `FluentDbError::ConfigError` if `data` is empty.
pub fn update(
    table: &str,
    data: &IndexMap<String, RowValues>,
    where_clause: Option<&str>,
) -> Result<Statement, FluentDbError> {
    if data.is_empty() {
        return Err(empty_payload(table));
    }
    let assignments: Vec<String> = data
        .keys()
        .zip(placeholders(1, data.len()))
        .map(|(column, placeholder)| format!("{column} = {placeholder}"))
        .collect();
    let mut sql = format!("UPDATE {table} SET {}", assignments.join(", "));
    if let Some(where_clause) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(where_clause);
    }
    Ok(Statement::with_params(sql, data.values().cloned().collect()))
}

/// `DELETE FROM <table> [WHERE ...]`; without a where condition every row goes.
#[must_use]
pub fn delete(table: &str, where_clause: Option<&str>) -> Statement {
    match where_clause {
        Some(where_clause) => Statement::new(format!("DELETE FROM {table} WHERE {where_clause}")),
        None => Statement::new(format!("DELETE FROM {table}")),
    }
}
