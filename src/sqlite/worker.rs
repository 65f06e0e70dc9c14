mod channel;
mod dispatcher;
mod manager;

pub(super) use manager::SqliteWorker;
