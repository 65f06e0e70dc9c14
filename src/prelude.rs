//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types to make it easier to
//! get started with the library.

pub use crate::error::FluentDbError;
pub use crate::results::{Record, ResultSet};
pub use crate::session::{ConditionState, Filter, Payload, Session, Snapshot};
pub use crate::sqlite::{SessionOptions, SessionOptionsBuilder, TableSchema};
pub use crate::types::RowValues;
