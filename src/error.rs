use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluentDbError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),
}

/// Convenience alias for results with [`FluentDbError`].
pub type Result<T> = std::result::Result<T, FluentDbError>;
