//! Error types for query compilation and execution.

use std::time::Duration;

use thiserror::Error;

use crate::catalog::ColumnType;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type for execution client operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Errors that abort a query.
///
/// Every variant except [`QueryError::QueryExecutionFailed`] is raised while
/// compiling, before the execution client is contacted.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The `from` table is not in the catalog.
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// A referenced column is not defined for the table.
    #[error("invalid column '{column}' for table '{table}'")]
    InvalidColumn { table: String, column: String },

    /// A filter or group key disagrees with the column's declared type.
    #[error("column '{column}' is declared as {declared} but was used as {used_as}")]
    ColumnTypeMismatch {
        column: String,
        declared: ColumnType,
        used_as: &'static str,
    },

    /// A plain column in an aggregated query that is not a group key.
    #[error("column '{0}' must appear in groupBy or be used in an aggregate")]
    UngroupedColumn(String),

    /// The query selects nothing.
    #[error("select must name at least one column")]
    EmptySelect,

    /// The same column appears twice in `groupBy`.
    #[error("column '{0}' is grouped more than once")]
    DuplicateGroupKey(String),

    /// Two columns with the same name in one table definition.
    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// The store rejected the statement or timed out.
    ///
    /// The display text is generic. The store's message is only
    /// reachable through [`std::error::Error::source`].
    #[error("query execution failed")]
    QueryExecutionFailed {
        #[source]
        source: ExecutorError,
    },
}

impl QueryError {
    pub fn invalid_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::InvalidColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// True when the error was raised before anything reached the store.
    pub fn is_compile_error(&self) -> bool {
        !matches!(self, Self::QueryExecutionFailed { .. })
    }
}

impl From<ExecutorError> for QueryError {
    fn from(source: ExecutorError) -> Self {
        Self::QueryExecutionFailed { source }
    }
}

/// Errors reported by an execution client.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The store refused the statement (syntax error, missing table, ...).
    #[error("statement rejected: {0}")]
    Rejected(String),

    /// The statement ran past the configured timeout and was interrupted.
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),

    /// The store could not be opened or reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The caller timed out or went away. The statement was interrupted, or
    /// never started if it was still waiting for the connection.
    #[error("statement cancelled")]
    Cancelled,

    /// The blocking task running the statement panicked or was cancelled.
    #[error("execution task failed: {0}")]
    TaskFailed(String),
}

impl ExecutorError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<tokio::task::JoinError> for ExecutorError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}
