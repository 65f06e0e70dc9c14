mod common;

use fluent_sqlite::prelude::*;

use common::{memory_session, with_users_table};

async fn seeded(rows: i64) -> Result<Session, FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;
    for i in 0..rows {
        db.data_with_map([
            ("name", RowValues::from(format!("user{i}"))),
            ("age", RowValues::from(i % 3)),
        ]);
        assert_eq!(db.try_add().await?, 1);
    }
    Ok(db)
}

#[tokio::test]
async fn count_tracks_deletes() -> Result<(), FluentDbError> {
    let mut db = seeded(9).await?;
    assert_eq!(db.query_count().await, 9);

    // ages cycle 0,1,2 so three rows have age 0
    assert!(db.delete_where(Filter::equals([("age", 0)])).await);
    assert_eq!(db.last_sql(), "DELETE FROM users WHERE age = 0");
    assert_eq!(db.query_count().await, 0);

    db.clean();
    assert_eq!(db.query_count().await, 6);
    db.where_with_string("age = 1");
    assert_eq!(db.try_delete().await?, 3);
    db.clean();
    assert_eq!(db.query_count().await, 3);
    Ok(())
}

#[tokio::test]
async fn delete_without_where_removes_everything() -> Result<(), FluentDbError> {
    let mut db = seeded(4).await?;
    assert_eq!(db.try_delete().await?, 4);
    assert_eq!(db.last_sql(), "DELETE FROM users");
    assert_eq!(db.query_count().await, 0);
    assert!(db.select().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_matching_nothing_still_succeeds() -> Result<(), FluentDbError> {
    let mut db = seeded(3).await?;
    assert!(db.delete_where("name = 'nobody'").await);
    assert!(db.last_error().is_none());
    db.clean();
    assert_eq!(db.query_count().await, 3);
    Ok(())
}

#[tokio::test]
async fn grouped_count_counts_groups() -> Result<(), FluentDbError> {
    let mut db = seeded(7).await?;
    db.group_with_string("age");
    assert_eq!(db.query_count().await, 3);
    assert!(db.last_sql().starts_with("SELECT COUNT(*) AS count FROM (SELECT 1 FROM users"));

    db.where_with_string("age > 0");
    assert_eq!(db.query_count().await, 2);
    Ok(())
}

#[tokio::test]
async fn get_field_and_set_value() -> Result<(), FluentDbError> {
    let mut db = seeded(3).await?;
    db.where_with_map([("name", "user1")]);
    assert_eq!(db.get_field("age").await, Some(RowValues::Int(1)));

    assert!(db.set_value(42, "age").await);
    assert_eq!(db.get_field("age").await, Some(RowValues::Int(42)));

    // unknown columns are refused before any statement runs
    assert!(!db.set_value(1, "shoe_size").await);
    assert!(matches!(db.last_error(), Some(FluentDbError::ConfigError(_))));

    db.where_with_string("name = 'nobody'");
    assert_eq!(db.get_field("age").await, None);
    assert!(db.last_error().is_none());
    Ok(())
}

#[tokio::test]
async fn count_on_missing_table_collapses_to_zero() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    db.table("ghosts");
    assert_eq!(db.query_count().await, 0);
    assert!(db.last_error().is_some());
    assert!(db.try_query_count().await.is_err());
    Ok(())
}

#[tokio::test]
async fn count_ignores_order_on_projection_aliases() -> Result<(), FluentDbError> {
    let mut db = seeded(3).await?;
    db.fields_with_string("name, age * 2 AS twice")
        .order_with_string("twice DESC");

    let rows = db.select().await;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("twice"), Some(&RowValues::Int(4)));

    assert_eq!(db.try_query_count().await?, 3);
    assert_eq!(db.last_sql(), "SELECT COUNT(*) AS count FROM users");
    Ok(())
}
