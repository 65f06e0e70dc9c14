use crate::session::ConditionState;

/// Append the optional clauses in their fixed order; absent fragments are elided.
fn push_clauses(sql: &mut String, state: &ConditionState, with_order: bool) {
    if let Some(where_clause) = &state.where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(where_clause);
    }
    if let Some(group) = &state.group {
        sql.push_str(" GROUP BY ");
        sql.push_str(group);
    }
    if with_order {
        if let Some(order) = &state.order {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
    }
}

/// Projection list: explicit fields, else the table's declared columns, else `*`.
#[must_use]
pub fn projection(state: &ConditionState) -> String {
    if !state.select_fields.is_empty() {
        state.select_fields.join(", ")
    } else if let Some(schema) = state.table_fields.as_ref().filter(|s| !s.is_empty()) {
        schema.column_names().collect::<Vec<_>>().join(", ")
    } else {
        "*".to_owned()
    }
}

/// `SELECT <fields> FROM <table> [WHERE] [GROUP BY] [ORDER BY] [LIMIT]`.
///
/// `limit` overrides the state's limit fragment for this statement only.
#[must_use]
pub fn select(table: &str, state: &ConditionState, limit: Option<&str>) -> String {
    let mut sql = format!("SELECT {} FROM {table}", projection(state));
    push_clauses(&mut sql, state, true);
    if let Some(limit) = limit.or(state.limit.as_deref()) {
        sql.push_str(" LIMIT ");
        sql.push_str(limit);
    }
    sql
}

/// Limit fragment that keeps the state's offset but fetches a single row.
#[must_use]
pub fn single_row_limit(limit: Option<&str>) -> String {
    let Some(limit) = limit else {
        return "1".to_owned();
    };
    if let Some((offset, _)) = limit.split_once(',') {
        return format!("{},1", offset.trim());
    }
    let upper = limit.to_ascii_uppercase();
    if let Some(pos) = upper.find("OFFSET") {
        return format!("1 {}", limit[pos..].trim());
    }
    "1".to_owned()
}

/// `SELECT COUNT(*) ...` over the current conditions.
///
/// With a group condition the groups themselves are counted. The order
/// fragment is never emitted: it may name projection aliases.
#[must_use]
pub fn count(table: &str, state: &ConditionState) -> String {
    if state.group.is_some() {
        let mut inner = format!("SELECT 1 FROM {table}");
        push_clauses(&mut inner, state, false);
        format!("SELECT COUNT(*) AS count FROM ({inner})")
    } else {
        let mut sql = format!("SELECT COUNT(*) AS count FROM {table}");
        push_clauses(&mut sql, state, false);
        sql
    }
}

/// Single-column select of the first matching row.
#[must_use]
pub fn get_field(table: &str, field: &str, state: &ConditionState) -> String {
    let mut sql = format!("SELECT {field} FROM {table}");
    push_clauses(&mut sql, state, true);
    sql.push_str(" LIMIT ");
    sql.push_str(&single_row_limit(state.limit.as_deref()));
    sql
}
