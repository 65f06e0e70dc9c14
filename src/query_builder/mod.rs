//! SQL text assembly.
//!
//! Everything here is pure: condition state and table schema in, statement
//! text (plus bound parameters where the statement carries values) out.
//! Nothing in this module touches a connection.

use indexmap::IndexMap;

use crate::error::FluentDbError;
use crate::session::Payload;
use crate::sqlite::TableSchema;
use crate::types::RowValues;

pub mod ddl;
pub mod dml;
pub mod literal;
pub mod select;

/// A statement ready for the worker: SQL text with `?N` placeholders and the
/// values bound to them, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<RowValues>,
}

impl Statement {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_params(sql: impl Into<String>, params: Vec<RowValues>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Accept only non-empty ASCII alphanumeric/underscore names.
///
/// # Errors
/// Returns `FluentDbError::ConfigError` naming `what` when `name` is rejected.
pub fn validate_identifier(name: &str, what: &str) -> Result<(), FluentDbError> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(FluentDbError::ConfigError(format!(
            "invalid {what} '{name}': must contain only alphanumeric characters and underscores"
        )))
    }
}

/// Keep only the entries whose key is a declared column, in their original order.
#[must_use]
pub fn filter_payload(
    data: &IndexMap<String, RowValues>,
    schema: &TableSchema,
) -> IndexMap<String, RowValues> {
    data.iter()
        .filter(|(key, _)| schema.contains(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Turn a pending payload into the column -> value map a write statement uses.
///
/// Field payloads are filtered against the schema; positional payloads are
/// zipped onto the writable columns and any surplus values are dropped.
#[must_use]
pub fn resolve_payload(pending: &Payload, schema: &TableSchema) -> IndexMap<String, RowValues> {
    match pending {
        Payload::Fields(data) => filter_payload(data, schema),
        Payload::Positional(values) => schema
            .writable_columns()
            .zip(values.iter())
            .map(|(column, value)| (column.to_owned(), value.clone()))
            .collect(),
    }
}

/// `?1, ?2, ... ?n`
pub(crate) fn placeholders(start: usize, count: usize) -> impl Iterator<Item = String> {
    (start..start + count).map(|i| format!("?{i}"))
}
