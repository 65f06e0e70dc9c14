use indexmap::IndexMap;

use crate::error::FluentDbError;
use crate::query_builder::{
    Statement, ddl, dml, filter_payload, resolve_payload, select, validate_identifier,
};
use crate::results::Record;
use crate::sqlite::TableSchema;
use crate::types::RowValues;

use super::{Filter, Session};

// Terminal operations come in pairs: `try_*` reports the failure, the plain
// form collapses it (empty / false / None / 0) and records it in `last_error`.
impl Session {
    /// # Errors
    /// Fails when no table is selected, the table does not exist, or the query errors.
    pub async fn try_select(&mut self) -> Result<Vec<Record>, FluentDbError> {
        let (table, _) = self.target_schema().await?;
        let sql = select::select(&table, &self.state, None);
        Ok(self.submit_query(Statement::new(sql)).await?.into_records())
    }

    /// Every row matching the current conditions.
    pub async fn select(&mut self) -> Vec<Record> {
        let outcome = self.try_select().await;
        self.settle(outcome, Vec::new())
    }

    /// # Errors
    /// Fails when no table is selected, the table does not exist, or the query errors.
    pub async fn try_find(&mut self) -> Result<Option<Record>, FluentDbError> {
        let (table, _) = self.target_schema().await?;
        let limit = select::single_row_limit(self.state.limit.as_deref());
        let sql = select::select(&table, &self.state, Some(&limit));
        Ok(self
            .submit_query(Statement::new(sql))
            .await?
            .into_records()
            .into_iter()
            .next())
    }

    /// First row matching the current conditions.
    pub async fn find(&mut self) -> Option<Record> {
        let outcome = self.try_find().await;
        self.settle(outcome, None)
    }

    /// Insert the pending payload; returns the number of rows inserted.
    ///
    /// # Errors
    /// Fails with `ConfigError` when no payload key matches a column, or when the insert errors.
    pub async fn try_add(&mut self) -> Result<usize, FluentDbError> {
        let (table, schema) = self.target_schema().await?;
        let data = resolve_payload(&self.state.pending, &schema);
        let outcome = self.submit_update(dml::insert(&table, &data)?).await?;
        self.last_insert_id = Some(outcome.last_insert_id);
        Ok(outcome.rows_affected)
    }

    pub async fn add(&mut self) -> bool {
        let outcome = self.try_add().await.map(|_| true);
        self.settle(outcome, false)
    }

    /// Replace the pending payload with `data`, then insert it.
    pub async fn add_with<I, K, V>(&mut self, data: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        self.data_with_map(data);
        self.add().await
    }

    /// Update the rows matching the current where condition with the pending
    /// payload; returns the number of rows changed.
    ///
    /// # Errors
    /// Fails with `ConfigError` for an empty filtered payload or a disallowed
    /// unbounded update, or when the update errors.
    pub async fn try_save(&mut self) -> Result<usize, FluentDbError> {
        let (table, schema) = self.target_schema().await?;
        self.ensure_bounded("update")?;
        let data = resolve_payload(&self.state.pending, &schema);
        let stmt = dml::update(&table, &data, self.state.where_clause.as_deref())?;
        Ok(self.submit_update(stmt).await?.rows_affected)
    }

    pub async fn save(&mut self) -> bool {
        let outcome = self.try_save().await.map(|_| true);
        self.settle(outcome, false)
    }

    /// Replace the pending payload with `data`, then update.
    pub async fn save_with<I, K, V>(&mut self, data: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        self.data_with_map(data);
        self.save().await
    }

    /// Delete the rows matching the current where condition (every row when
    /// none is set); returns the number of rows removed.
    ///
    /// # Errors
    /// Fails with `ConfigError` for a disallowed unbounded delete, or when the delete errors.
    pub async fn try_delete(&mut self) -> Result<usize, FluentDbError> {
        let table = self.target_table()?;
        self.ensure_bounded("delete")?;
        let stmt = dml::delete(&table, self.state.where_clause.as_deref());
        Ok(self.submit_update(stmt).await?.rows_affected)
    }

    pub async fn delete(&mut self) -> bool {
        let outcome = self.try_delete().await.map(|_| true);
        self.settle(outcome, false)
    }

    /// Install `filter` as the where condition, then delete.
    pub async fn delete_where(&mut self, filter: impl Into<Filter>) -> bool {
        self.filter(filter);
        self.delete().await
    }

    /// # Errors
    /// Fails when no table is selected or the count query errors.
    pub async fn try_query_count(&mut self) -> Result<i64, FluentDbError> {
        let table = self.target_table()?;
        let sql = select::count(&table, &self.state);
        let result = self.submit_query(Statement::new(sql)).await?;
        result
            .results
            .first()
            .and_then(|row| row.get_by_index(0))
            .and_then(RowValues::as_int)
            .copied()
            .ok_or_else(|| FluentDbError::ExecutionError("count returned no value".into()))
    }

    pub async fn query_count(&mut self) -> i64 {
        let outcome = self.try_query_count().await;
        self.settle(outcome, 0)
    }

    /// # Errors
    /// Fails with `ConfigError` when `field` is not a declared column, or when no
    /// table is selected, the table does not exist, or the query errors.
    pub async fn try_get_field(&mut self, field: &str) -> Result<Option<RowValues>, FluentDbError> {
        let (table, schema) = self.target_schema().await?;
        ensure_column(&schema, field)?;
        let sql = select::get_field(&table, field, &self.state);
        let result = self.submit_query(Statement::new(sql)).await?;
        Ok(result
            .results
            .first()
            .and_then(|row| row.get_by_index(0))
            .cloned())
    }

    /// Value of `field` in the first matching row, or `None` when nothing matches.
    pub async fn get_field(&mut self, field: &str) -> Option<RowValues> {
        let outcome = self.try_get_field(field).await;
        self.settle(outcome, None)
    }

    /// # Errors
    /// Fails with `ConfigError` when `field` is not a declared column or the
    /// update would be unbounded and that is disallowed, or when the update errors.
    pub async fn try_set_value(
        &mut self,
        value: impl Into<RowValues>,
        field: &str,
    ) -> Result<usize, FluentDbError> {
        let (table, schema) = self.target_schema().await?;
        ensure_column(&schema, field)?;
        self.ensure_bounded("update")?;
        let data = IndexMap::from([(field.to_owned(), value.into())]);
        let stmt = dml::update(&table, &data, self.state.where_clause.as_deref())?;
        Ok(self.submit_update(stmt).await?.rows_affected)
    }

    /// Set one column on the rows matching the current where condition.
    pub async fn set_value(&mut self, value: impl Into<RowValues>, field: &str) -> bool {
        let outcome = self.try_set_value(value, field).await.map(|_| true);
        self.settle(outcome, false)
    }

    /// The subset of `data` whose keys are columns of the current table.
    ///
    /// # Errors
    /// Fails when no table is selected or the table does not exist.
    pub async fn try_filter_with_map(
        &mut self,
        data: &IndexMap<String, RowValues>,
    ) -> Result<IndexMap<String, RowValues>, FluentDbError> {
        let (_, schema) = self.target_schema().await?;
        Ok(filter_payload(data, &schema))
    }

    pub async fn filter_with_map(
        &mut self,
        data: &IndexMap<String, RowValues>,
    ) -> IndexMap<String, RowValues> {
        let outcome = self.try_filter_with_map(data).await;
        self.settle(outcome, IndexMap::new())
    }

    /// Create `table` (prefix applied) with columns typed after the sample values.
    ///
    /// # Errors
    /// Fails with `ConfigError` for invalid names, or when the statement errors.
    pub async fn try_create_table<I, K, V>(
        &mut self,
        sample: I,
        table: &str,
    ) -> Result<(), FluentDbError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        let table = self.qualified_table(table)?;
        let sample: IndexMap<String, RowValues> = sample
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.submit_update(ddl::create_table(&table, &sample)?).await?;
        Ok(())
    }

    pub async fn create_table<I, K, V>(&mut self, sample: I, table: &str) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        let outcome = self.try_create_table(sample, table).await.map(|()| true);
        self.settle(outcome, false)
    }

    /// # Errors
    /// Fails with `ConfigError` for invalid names, or when the statement errors.
    pub async fn try_create_index(&mut self, field: &str, table: &str) -> Result<(), FluentDbError> {
        let table = self.qualified_table(table)?;
        self.submit_update(ddl::create_index(&table, field)?).await?;
        Ok(())
    }

    /// Plain index on `field` of `table` (prefix applied); repeating it is harmless.
    pub async fn create_index(&mut self, field: &str, table: &str) -> bool {
        let outcome = self.try_create_index(field, table).await.map(|()| true);
        self.settle(outcome, false)
    }

    /// # Errors
    /// Returns the error raised while preparing or running `sql`.
    pub async fn try_run_query(&mut self, sql: &str) -> Result<Vec<Record>, FluentDbError> {
        Ok(self.submit_query(Statement::new(sql)).await?.into_records())
    }

    /// Run arbitrary SQL and return its rows; failures yield an empty vector.
    pub async fn run_query(&mut self, sql: &str) -> Vec<Record> {
        let outcome = self.try_run_query(sql).await;
        self.settle(outcome, Vec::new())
    }

    /// # Errors
    /// Returns the error raised while preparing or running `sql`.
    pub async fn try_run_update(&mut self, sql: &str) -> Result<usize, FluentDbError> {
        Ok(self.submit_update(Statement::new(sql)).await?.rows_affected)
    }

    /// Run one arbitrary write statement; `false` on any failure.
    pub async fn run_update(&mut self, sql: &str) -> bool {
        let outcome = self.try_run_update(sql).await.map(|_| true);
        self.settle(outcome, false)
    }

    fn qualified_table(&self, table: &str) -> Result<String, FluentDbError> {
        validate_identifier(table, "table name")?;
        let qualified = format!("{}{table}", self.options.prefix);
        validate_identifier(&qualified, "table name")?;
        Ok(qualified)
    }
}

fn ensure_column(schema: &TableSchema, field: &str) -> Result<(), FluentDbError> {
    if schema.contains(field) {
        Ok(())
    } else {
        Err(FluentDbError::ConfigError(format!(
            "column '{field}' does not exist in table '{}'",
            schema.table
        )))
    }
}
