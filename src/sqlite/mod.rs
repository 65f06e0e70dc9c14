// SQLite module - the storage boundary behind a session
//
// - config: session options and opening the underlying connection
// - params: conversion of row values into SQLite parameter values
// - query: result extraction and building
// - schema: table column discovery (`PRAGMA table_info`)
// - worker: the dedicated thread every statement is funneled through
// - connection: the cloneable handle callers submit statements to

pub mod config;
pub mod connection;
pub mod params;
pub mod query;
pub mod schema;
mod worker;

pub use config::{SessionOptions, SessionOptionsBuilder};
pub use connection::{DmlOutcome, SqliteConnection};
pub use params::Params;
pub use query::build_result_set;
pub use schema::TableSchema;
