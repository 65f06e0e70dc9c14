use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::FluentDbError;
use crate::query_builder::literal::where_from_map;
use crate::sqlite::TableSchema;
use crate::types::RowValues;

use super::Session;

/// Data waiting to be written by the next `add`/`save`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Field name -> value; keys that are not declared columns are dropped.
    Fields(IndexMap<String, RowValues>),
    /// Values assigned in order to the table's writable columns.
    Positional(Vec<RowValues>),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Fields(IndexMap::new())
    }
}

impl Payload {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Fields(data) => data.is_empty(),
            Payload::Positional(values) => values.is_empty(),
        }
    }
}

/// A where condition in either of its accepted forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A literal SQL boolean expression.
    Raw(String),
    /// Column equalities joined with `AND`.
    Equals(IndexMap<String, RowValues>),
}

impl Filter {
    /// Build an equality filter from `(column, value)` pairs.
    pub fn equals<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        Filter::Equals(collect_pairs(pairs))
    }

    /// The where fragment this filter stands for; `None` when it is empty.
    #[must_use]
    pub fn to_sql(&self) -> Option<String> {
        match self {
            Filter::Raw(sql) => non_empty(sql),
            Filter::Equals(conditions) => where_from_map(conditions),
        }
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Filter::Raw(value.to_owned())
    }
}

impl From<String> for Filter {
    fn from(value: String) -> Self {
        Filter::Raw(value)
    }
}

impl From<IndexMap<String, RowValues>> for Filter {
    fn from(value: IndexMap<String, RowValues>) -> Self {
        Filter::Equals(value)
    }
}

/// The mutable per-session query configuration.
///
/// Every fluent setter writes here; terminal operations read it and leave it
/// in place, so the same conditions can drive several queries in a row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionState {
    /// Prefix-qualified table targeted by the next terminal operation.
    pub table: Option<String>,
    /// Declared columns of `table`, filled lazily on the first terminal operation.
    pub table_fields: Option<TableSchema>,
    pub select_fields: Vec<String>,
    pub where_clause: Option<String>,
    pub order: Option<String>,
    pub group: Option<String>,
    pub limit: Option<String>,
    pub pending: Payload,
}

impl ConditionState {
    /// Drop projection, clauses and pending data; the table binding survives.
    pub fn clear_conditions(&mut self) {
        *self = ConditionState {
            table: self.table.take(),
            table_fields: self.table_fields.take(),
            ..ConditionState::default()
        };
    }
}

/// A saved copy of a [`ConditionState`], produced by `lock` and restored by `reset`.
///
/// Holds owned copies only: later changes to the live state never reach it.
/// Diagnostics (`last_sql`, `last_error`, `last_insert_id`) are not part of the
/// condition state and are never captured or restored; after `reset` they still
/// describe the most recent statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    state: ConditionState,
}

impl Snapshot {
    fn capture(state: &ConditionState) -> Self {
        Self {
            state: state.clone(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ConditionState {
        &self.state
    }
}

fn non_empty(fragment: &str) -> Option<String> {
    let trimmed = fragment.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn collect_pairs<I, K, V>(pairs: I) -> IndexMap<String, RowValues>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RowValues>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

impl Session {
    /// Target `table` (the session prefix is prepended) for the next terminal operations.
    ///
    /// Other conditions are kept; call [`Session::clean`] when switching to an
    /// unrelated table.
    pub fn table(&mut self, table: &str) -> &mut Self {
        let qualified = format!("{}{table}", self.options.prefix);
        if self.state.table.as_deref() != Some(qualified.as_str()) {
            self.state.table_fields = None;
        }
        self.state.table = Some(qualified);
        self
    }

    pub fn fields_with_array<S: AsRef<str>>(&mut self, fields: &[S]) -> &mut Self {
        self.state.select_fields = fields
            .iter()
            .filter_map(|field| non_empty(field.as_ref()))
            .collect();
        self
    }

    /// Comma separated projection, e.g. `"id, name"`.
    pub fn fields_with_string(&mut self, fields: &str) -> &mut Self {
        self.state.select_fields = fields.split(',').filter_map(non_empty).collect();
        self
    }

    /// Literal where expression; an empty string clears the condition.
    pub fn where_with_string(&mut self, condition: &str) -> &mut Self {
        self.state.where_clause = non_empty(condition);
        self
    }

    /// Equality conditions joined with `AND`; an empty map clears the condition.
    pub fn where_with_map<I, K, V>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        self.state.where_clause = where_from_map(&collect_pairs(conditions));
        self
    }

    /// Install a where condition given in either form.
    pub fn filter(&mut self, filter: impl Into<Filter>) -> &mut Self {
        self.state.where_clause = filter.into().to_sql();
        self
    }

    pub fn order_with_string(&mut self, order: &str) -> &mut Self {
        self.state.order = non_empty(order);
        self
    }

    pub fn order_with_array<S: AsRef<str>>(&mut self, terms: &[S]) -> &mut Self {
        let terms: Vec<String> = terms.iter().filter_map(|t| non_empty(t.as_ref())).collect();
        self.state.order = (!terms.is_empty()).then(|| terms.join(", "));
        self
    }

    pub fn group_with_string(&mut self, group: &str) -> &mut Self {
        self.state.group = non_empty(group);
        self
    }

    /// Literal limit fragment such as `"10"` or `"5,10"`.
    pub fn limit_with_string(&mut self, limit: &str) -> &mut Self {
        self.state.limit = non_empty(limit);
        self
    }

    /// `[count]` or `[offset, count]`; an empty slice clears the limit.
    pub fn limit_with_array(&mut self, bounds: &[u64]) -> &mut Self {
        let parts: Vec<String> = bounds.iter().take(2).map(u64::to_string).collect();
        self.state.limit = (!parts.is_empty()).then(|| parts.join(","));
        self
    }

    /// Rows in the half-open range `[start, end)`.
    pub fn limit_with_start_end(&mut self, start: u64, end: u64) -> &mut Self {
        self.state.limit = Some(format!("{start},{}", end.saturating_sub(start)));
        self
    }

    /// Field -> value payload for the next `add`/`save`.
    pub fn data_with_map<I, K, V>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        self.state.pending = Payload::Fields(collect_pairs(data));
        self
    }

    /// Positional payload, assigned to the table's columns in declaration
    /// order (an integer primary key is skipped).
    pub fn data_with_array<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<RowValues>,
    {
        self.state.pending = Payload::Positional(values.into_iter().map(Into::into).collect());
        self
    }

    /// Decode a JSON document into the pending payload.
    ///
    /// An object becomes a field payload and an array a positional one.
    ///
    /// # Errors
    /// Returns `FluentDbError::JsonError` for malformed JSON and
    /// `FluentDbError::ParameterError` for a top-level scalar. The pending
    /// payload is left untouched on error.
    pub fn data_with_json(&mut self, json: &[u8]) -> Result<&mut Self, FluentDbError> {
        let decoded: JsonValue = serde_json::from_slice(json)?;
        let payload = match decoded {
            JsonValue::Object(object) => Payload::Fields(
                object
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), RowValues::from_json(value)?)))
                    .collect::<Result<_, FluentDbError>>()?,
            ),
            JsonValue::Array(items) => Payload::Positional(
                items
                    .iter()
                    .map(RowValues::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            other => {
                return Err(FluentDbError::ParameterError(format!(
                    "JSON payload must be an object or an array, got {other}"
                )));
            }
        };
        self.state.pending = payload;
        Ok(self)
    }

    /// Reset projection, clauses and pending data. The table binding and any
    /// snapshot are kept.
    pub fn clean(&mut self) -> &mut Self {
        self.state.clear_conditions();
        self
    }

    /// Save a copy of the whole condition state.
    pub fn lock(&mut self) -> &mut Self {
        self.snapshot = Some(Snapshot::capture(&self.state));
        self
    }

    /// Restore the state saved by the last `lock`, or the empty state if
    /// nothing was ever locked.
    pub fn reset(&mut self) -> &mut Self {
        self.state = self
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.state.clone())
            .unwrap_or_default();
        self
    }

    #[must_use]
    pub fn conditions(&self) -> &ConditionState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Projection the next select would use.
    #[must_use]
    pub fn fields_string(&self) -> String {
        crate::query_builder::select::projection(&self.state)
    }
}
