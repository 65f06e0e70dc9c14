//! Table column discovery.

use indexmap::IndexMap;
use rusqlite::{Connection, params};

use crate::error::FluentDbError;

/// Declared columns of one table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    /// column name -> declared type (as written in the DDL, possibly empty)
    pub columns: IndexMap<String, String>,
    /// The single `INTEGER PRIMARY KEY` column aliasing the rowid, if any.
    pub rowid_alias: Option<String>,
}

impl TableSchema {
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Columns a positional payload is assigned to: every column except the rowid alias.
    pub fn writable_columns(&self) -> impl Iterator<Item = &str> {
        self.column_names()
            .filter(move |name| self.rowid_alias.as_deref() != Some(*name))
    }
}

/// Read the declared columns of `table`.
///
/// # Errors
/// Returns `FluentDbError::TableNotFound` when the table has no columns (it does
/// not exist), or `FluentDbError::SqliteError` if the metadata query fails.
pub(crate) fn read_table_info(conn: &Connection, table: &str) -> Result<TableSchema, FluentDbError> {
    let mut stmt = conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
    let rows = stmt
        .query_map(params![table], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Err(FluentDbError::TableNotFound(table.to_owned()));
    }

    let pk_columns: Vec<&(String, String, i64)> = rows.iter().filter(|(_, _, pk)| *pk > 0).collect();
    let rowid_alias = match pk_columns.as_slice() {
        [(name, decl, _)] if decl.eq_ignore_ascii_case("INTEGER") => Some(name.clone()),
        _ => None,
    };

    let columns = rows
        .into_iter()
        .map(|(name, decl, _)| (name, decl))
        .collect();

    Ok(TableSchema {
        table: table.to_owned(),
        columns,
        rowid_alias,
    })
}
