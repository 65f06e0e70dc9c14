use rusqlite::types::Value;
use tokio::sync::oneshot;

use crate::error::FluentDbError;
use crate::results::ResultSet;
use crate::sqlite::connection::DmlOutcome;
use crate::sqlite::schema::TableSchema;

pub(super) type Reply<T> = oneshot::Sender<Result<T, FluentDbError>>;

pub(super) enum Command {
    ExecuteSelect {
        query: String,
        params: Vec<Value>,
        respond_to: Reply<ResultSet>,
    },
    ExecuteDml {
        query: String,
        params: Vec<Value>,
        respond_to: Reply<DmlOutcome>,
    },
    TableInfo {
        table: String,
        respond_to: Reply<TableSchema>,
    },
    Close {
        respond_to: Reply<()>,
    },
    Shutdown,
}
