//! Statement execution.
//!
//! The [`QueryExecutor`] trait abstracts over the store a compiled statement
//! runs against. [`execute_query`] is the library entry point: it compiles a
//! [`QuerySpec`] and hands the statement to an executor, so callers never
//! deal with SQL text directly.
//!
//! # Example
//!
//! ```ignore
//! use tracelens::catalog::Catalog;
//! use tracelens::execute::{execute_query, SqliteExecutor};
//! use tracelens::spec::{QuerySpec, SelectItem};
//!
//! let executor = SqliteExecutor::open("traces.db")?;
//! let spec = QuerySpec::new("traces").select(SelectItem::column("id"));
//! let rows = execute_query(&Catalog::builtin(), &executor, &spec).await?;
//! ```

mod sqlite;
mod value;

pub use sqlite::SqliteExecutor;
pub use value::{Row, Value};

use async_trait::async_trait;
use tracing::{debug, error};

use crate::catalog::Catalog;
use crate::compile::{compile, CompiledStatement};
use crate::error::{ExecutorResult, QueryResult};
use crate::spec::QuerySpec;
use crate::sql::Dialect;

/// Runs compiled statements against a store.
///
/// Implementations own connection management, pooling and statement
/// timeouts. A caller dropping the returned future should cancel the
/// in-flight statement where the store supports it.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Dialect statements must be compiled for.
    fn dialect(&self) -> Dialect;

    /// Execute one read-only statement.
    ///
    /// Rows carry the statement's output aliases as keys.
    async fn execute(&self, statement: &CompiledStatement) -> ExecutorResult<Vec<Row>>;
}

/// Compile `spec` for the executor's dialect and run it.
///
/// Compilation errors are returned before the executor is contacted. Store
/// failures are logged here with the full query context and surface as
/// [`QueryError::QueryExecutionFailed`](crate::error::QueryError::QueryExecutionFailed).
pub async fn execute_query(
    catalog: &Catalog,
    executor: &dyn QueryExecutor,
    spec: &QuerySpec,
) -> QueryResult<Vec<Row>> {
    let statement = compile(catalog, spec, executor.dialect())?;

    match executor.execute(&statement).await {
        Ok(rows) => {
            debug!(table = %spec.from, rows = rows.len(), "query executed");
            Ok(rows)
        }
        Err(err) => {
            error!(
                table = %spec.from,
                spec = ?spec,
                sql = %statement.sql,
                error = %err,
                "query execution failed"
            );
            Err(err.into())
        }
    }
}
