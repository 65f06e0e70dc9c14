use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::types::RowValues;

/// A single row returned by a query.
///
/// Columns keep the order the statement projected them in, and the column
/// names are shared with every other row of the same result set.
#[derive(Debug, Clone)]
pub struct Record {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, positionally matching `column_names`
    pub values: Vec<RowValues>,
    // Column name -> index, shared like the names themselves
    pub(crate) column_index: Arc<HashMap<String, usize>>,
}

impl Record {
    /// Create a new record, building its column lookup table.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let column_index = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            values,
            column_index,
        }
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        column_index: Arc<HashMap<String, usize>>,
        values: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name, or `None` if the column is absent.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(column, value)` pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Ordered column-name -> value mapping.
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, RowValues> {
        self.iter()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect()
    }

    /// JSON object form of this record.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let object: JsonMap<String, JsonValue> = self
            .iter()
            .map(|(name, value)| (name.to_owned(), value.to_json()))
            .collect();
        JsonValue::Object(object)
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        // first occurrence wins for duplicated projections like `SELECT a, a`
        .rev()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_values_by_name_and_position() {
        let record = Record::new(
            Arc::new(vec!["id".into(), "name".into()]),
            vec![RowValues::Int(1), RowValues::Text("Alice".into())],
        );
        assert_eq!(record.get("name"), Some(&RowValues::Text("Alice".into())));
        assert_eq!(record.get_by_index(0), Some(&RowValues::Int(1)));
        assert!(record.get("missing").is_none());
        let keys: Vec<_> = record.to_map().into_keys().collect();
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn duplicated_columns_resolve_to_first() {
        let record = Record::new(
            Arc::new(vec!["a".into(), "a".into()]),
            vec![RowValues::Int(1), RowValues::Int(2)],
        );
        assert_eq!(record.get("a"), Some(&RowValues::Int(1)));
    }
}
