//! Rendering values as SQL literals, for where conditions built from maps.

use std::fmt::Write;

use indexmap::IndexMap;

use crate::types::RowValues;

use super::validate_identifier;

/// Render a value as a SQL literal.
#[must_use]
pub fn render(value: &RowValues) -> String {
    match value {
        RowValues::Int(i) => i.to_string(),
        RowValues::Float(f) if f.is_finite() => format!("{f:?}"),
        // SQLite has no literal for NaN or infinities
        RowValues::Float(_) | RowValues::Null => "NULL".to_owned(),
        RowValues::Text(s) => format!("'{}'", s.replace('\'', "''")),
        RowValues::Blob(bytes) => {
            let mut out = String::with_capacity(bytes.len() * 2 + 3);
            out.push_str("X'");
            for byte in bytes {
                let _ = write!(out, "{byte:02X}");
            }
            out.push('\'');
            out
        }
    }
}

/// Plain identifiers are emitted as is; anything else is double-quoted so it
/// can only ever name a column.
fn column_name(column: &str) -> String {
    if validate_identifier(column, "column name").is_ok() {
        column.to_owned()
    } else {
        format!("\"{}\"", column.replace('"', "\"\""))
    }
}

/// Equality conjunction for a key -> value map: `a = 1 AND b = 'x'`.
///
/// `NULL` values compare with `IS NULL`. Returns `None` for an empty map.
#[must_use]
pub fn where_from_map(conditions: &IndexMap<String, RowValues>) -> Option<String> {
    if conditions.is_empty() {
        return None;
    }
    let parts: Vec<String> = conditions
        .iter()
        .map(|(column, value)| {
            let column = column_name(column);
            match value {
                RowValues::Null => format!("{column} IS NULL"),
                other => format!("{column} = {}", render(other)),
            }
        })
        .collect();
    Some(parts.join(" AND "))
}
