mod common;

use fluent_sqlite::prelude::*;
use serde_json::json;

use common::{file_session, memory_session, with_users_table};

#[tokio::test]
async fn json_object_payload_is_filtered_and_inserted() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;

    let added = db
        .data_with_json(br#"{"name": "Jo", "age": 7, "extra": true}"#)?
        .add()
        .await;
    assert!(added);
    assert_eq!(db.last_sql(), "INSERT INTO users (name, age) VALUES (?1, ?2)");

    let row = db.find().await.expect("inserted row");
    assert_eq!(row.to_json(), json!({"id": 1, "name": "Jo", "age": 7}));
    Ok(())
}

#[tokio::test]
async fn array_payloads_fill_columns_in_declaration_order() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;

    assert!(db.data_with_json(br#"["Kim", 12]"#)?.add().await);
    // surplus values are dropped
    db.data_with_array([RowValues::from("Lee"), RowValues::from(13), RowValues::from(99)]);
    assert!(db.add().await);

    db.order_with_string("id");
    let rows = db.select().await;
    let pairs: Vec<(Option<&str>, Option<&RowValues>)> = rows
        .iter()
        .map(|row| (row.get("name").and_then(RowValues::as_text), row.get("age")))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Some("Kim"), Some(&RowValues::Int(12))),
            (Some("Lee"), Some(&RowValues::Int(13))),
        ]
    );

    db.data_with_array(Vec::<RowValues>::new());
    assert!(matches!(db.try_add().await, Err(FluentDbError::ConfigError(_))));
    Ok(())
}

#[tokio::test]
async fn rejected_json_leaves_pending_data_alone() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;
    db.data_with_map([("name", "kept")]);

    assert!(matches!(db.data_with_json(b"5"), Err(FluentDbError::ParameterError(_))));
    assert!(matches!(db.data_with_json(b"{oops"), Err(FluentDbError::JsonError(_))));

    assert!(db.add().await);
    assert_eq!(
        db.get_field("name").await,
        Some(RowValues::Text("kept".into()))
    );
    Ok(())
}

#[tokio::test]
async fn unbounded_writes_can_be_disabled() -> Result<(), FluentDbError> {
    let mut db = SessionOptions::builder(":memory:")
        .allow_unbounded_write(false)
        .build()
        .await?;
    with_users_table(&mut db).await;
    assert!(db.add_with([("name", "a")]).await);
    assert!(db.add_with([("name", "b")]).await);

    assert!(matches!(db.try_delete().await, Err(FluentDbError::ConfigError(_))));
    assert!(!db.save_with([("age", 0)]).await);
    assert!(!db.set_value(0, "age").await);
    assert_eq!(db.query_count().await, 2);

    assert!(db.delete_where(Filter::equals([("name", "a")])).await);
    db.clean();
    assert_eq!(db.query_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn prefix_applies_to_created_and_targeted_tables() -> Result<(), FluentDbError> {
    let (_dir, mut db) = file_session("app_").await?;
    assert_eq!(db.prefix(), "app_");
    with_users_table(&mut db).await;
    assert_eq!(db.current_table(), Some("app_users"));

    assert!(db.add_with([("name", "p")]).await);
    assert_eq!(db.last_sql(), "INSERT INTO app_users (name) VALUES (?1)");

    let tables = db
        .run_query("SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'app_%'")
        .await;
    assert_eq!(tables.len(), 1);

    assert!(!db.create_table([("x", 1)], "bad-name").await);
    assert!(matches!(db.last_error(), Some(FluentDbError::ConfigError(_))));
    Ok(())
}

#[tokio::test]
async fn create_index_is_idempotent() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;

    assert!(db.create_index("name", "users").await);
    assert!(db.create_index("name", "users").await);
    assert_eq!(
        db.last_sql(),
        "CREATE INDEX IF NOT EXISTS idx_users_name ON users (name)"
    );
    let indexes = db
        .run_query("SELECT name FROM sqlite_master WHERE type = 'index' AND name = 'idx_users_name'")
        .await;
    assert_eq!(indexes.len(), 1);

    assert!(!db.create_index("no such", "users").await);
    Ok(())
}

#[tokio::test]
async fn table_created_after_failed_lookup_is_found() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    db.table("posts");
    assert!(db.select().await.is_empty());
    assert!(matches!(db.last_error(), Some(FluentDbError::TableNotFound(_))));
    assert!(db.table_fields().is_none());

    assert!(db.create_table([("title", "")], "posts").await);
    assert!(db.add_with([("title", "hello")]).await);
    assert_eq!(db.select().await.len(), 1);
    let schema = db.table_fields().expect("schema loaded");
    assert_eq!(schema.column_names().collect::<Vec<_>>(), vec!["id", "title"]);
    Ok(())
}

#[tokio::test]
async fn columns_of_reports_declared_columns() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;
    let schema = db.columns_of("users").await?;
    assert_eq!(schema.column_names().collect::<Vec<_>>(), vec!["id", "name", "age"]);
    assert!(schema.contains("age"));
    assert!(matches!(
        db.columns_of("nope").await,
        Err(FluentDbError::TableNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn schema_is_read_once_per_session() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;
    assert!(db.add_with([("name", "a")]).await);

    assert!(db.run_update("ALTER TABLE users ADD COLUMN email TEXT").await);
    assert!(db.add_with([("name", "b"), ("email", "b@example.com")]).await);
    assert_eq!(db.last_sql(), "INSERT INTO users (name) VALUES (?1)");

    let stored = db
        .run_query("SELECT email FROM users WHERE name = 'b'")
        .await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get("email"), Some(&RowValues::Null));

    let schema = db.columns_of("users").await?;
    assert!(!schema.contains("email"));
    db.clean();
    let row = db.find().await.expect("row");
    assert!(row.get("email").is_none());
    Ok(())
}

#[tokio::test]
async fn get_field_refuses_undeclared_columns() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;
    assert!(db.add_with([("name", "a")]).await);
    let before = db.last_sql().to_owned();

    assert_eq!(db.get_field("1; DROP TABLE users").await, None);
    assert!(matches!(db.last_error(), Some(FluentDbError::ConfigError(_))));
    assert_eq!(db.last_sql(), before);
    assert_eq!(db.get_field("name").await, Some(RowValues::Text("a".into())));
    Ok(())
}

#[tokio::test]
async fn odd_where_map_keys_only_name_columns() -> Result<(), FluentDbError> {
    let mut db = memory_session().await?;
    with_users_table(&mut db).await;
    assert!(db.add_with([("name", "a")]).await);
    assert!(db.add_with([("name", "b")]).await);

    // quoted as an identifier, the key cannot widen the condition
    db.where_with_map([("name' OR 1=1 --", "x")]);
    assert!(db.last_sql().starts_with("INSERT"));
    let _ = db.delete().await;
    assert_eq!(db.last_sql(), "DELETE FROM users WHERE \"name' OR 1=1 --\" = 'x'");
    db.clean();
    assert_eq!(db.query_count().await, 2);
    Ok(())
}
