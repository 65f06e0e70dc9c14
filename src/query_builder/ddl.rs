use indexmap::IndexMap;

use crate::error::FluentDbError;
use crate::types::RowValues;

use super::{Statement, validate_identifier};

/// Name of the auto-incrementing key every created table gets.
pub const PRIMARY_KEY: &str = "id";

/// `CREATE TABLE IF NOT EXISTS` with one column per sample entry.
///
/// Column types are inferred from each sample value; an `id` key in the
/// sample is skipped because the primary key is always added.
///
/// # Errors
/// Returns `FluentDbError::ConfigError` for an invalid column name.
pub fn create_table(
    table: &str,
    sample: &IndexMap<String, RowValues>,
) -> Result<Statement, FluentDbError> {
    let mut columns = vec![format!("{PRIMARY_KEY} INTEGER PRIMARY KEY AUTOINCREMENT")];
    for (name, value) in sample {
        if name == PRIMARY_KEY {
            continue;
        }
        validate_identifier(name, "column name")?;
        columns.push(format!("{name} {}", value.column_type()));
    }
    Ok(Statement::new(format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        columns.join(", ")
    )))
}

/// `CREATE INDEX IF NOT EXISTS idx_<table>_<field> ON <table> (<field>)`.
///
/// # Errors
/// Returns `FluentDbError::ConfigError` for an invalid field name.
pub fn create_index(table: &str, field: &str) -> Result<Statement, FluentDbError> {
    validate_identifier(field, "column name")?;
    Ok(Statement::new(format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_{field} ON {table} ({field})"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_infers_types_in_input_order() {
        let mut sample = IndexMap::new();
        sample.insert("name".to_owned(), RowValues::Text(String::new()));
        sample.insert("id".to_owned(), RowValues::Int(0));
        sample.insert("age".to_owned(), RowValues::Int(0));
        sample.insert("score".to_owned(), RowValues::Float(0.0));
        let stmt = create_table("users", &sample).unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, age INTEGER, score REAL)"
        );
    }

    #[test]
    fn create_table_rejects_bad_column() {
        let mut sample = IndexMap::new();
        sample.insert("bad name".to_owned(), RowValues::Int(0));
        assert!(create_table("users", &sample).is_err());
    }

    #[test]
    fn create_index_names_the_index_after_table_and_field() {
        assert_eq!(
            create_index("users", "name").unwrap().sql,
            "CREATE INDEX IF NOT EXISTS idx_users_name ON users (name)"
        );
    }
}
