//! Query results: ordered records and the result sets that carry them.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::Record;
