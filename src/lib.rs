//! Fluent, stateful query building over a single `SQLite` connection.
//!
//! Chain configuration calls on a [`Session`] (table, fields, where, order,
//! group, limit, payload data), then run a terminal operation (`find`,
//! `select`, `add`, `save`, `delete`, `query_count`, `get_field`,
//! `set_value`). The session assembles the SQL, submits it to the dedicated
//! worker thread that owns the connection, and hands back plain [`Record`]s.
//!
//! Conditions persist across terminal operations until [`Session::clean`] is
//! called; [`Session::lock`] and [`Session::reset`] save and restore them.
//!
//! ```no_run
//! use fluent_sqlite::prelude::*;
//!
//! # async fn demo() -> Result<(), FluentDbError> {
//! let mut db = SessionOptions::builder("app.db").prefix("app_").build().await?;
//! db.table("users")
//!     .where_with_map([("name", "Alice")])
//!     .order_with_string("id DESC")
//!     .limit_with_array(&[10]);
//! for row in db.select().await {
//!     println!("{}", row.to_json());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod session;
pub mod sqlite;
pub mod types;

pub use error::FluentDbError;
pub use results::{Record, ResultSet};
pub use session::Session;
pub use types::RowValues;
