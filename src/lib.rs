//! # tracelens
//!
//! Compiles declarative analytics queries over LLM traces into
//! parameterized, multi-dialect SQL, and runs them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          QuerySpec (from, filter, groupBy, select,       │
//! │                     orderBy, limit)                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog lookup]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Column catalog (logical name → physical expr)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │   CompiledStatement (SQL text + bound parameters)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [execute]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Rows (alias → typed value)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod compile;
pub mod config;
pub mod error;
pub mod execute;
pub mod spec;
pub mod sql;

// Re-export SQL submodules at crate level for convenience
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{Catalog, ColumnDefinition, ColumnType, TableDefinition};
    pub use crate::compile::{compile, CompiledStatement, OutputColumn};
    pub use crate::error::{ExecutorError, QueryError, QueryResult};
    pub use crate::execute::{execute_query, QueryExecutor, Row, SqliteExecutor, Value};
    pub use crate::spec::{
        Aggregation, DatetimeOperator, Direction, FilterCondition, GroupBy, NumberOperator,
        OptionsOperator, OrderBy, QuerySpec, SelectItem, StringOperator,
    };
    pub use crate::sql::{BoundValue, Dialect, TimeUnit};
}

// Also export at crate root for convenience
pub use catalog::Catalog;
pub use compile::{compile, CompiledStatement};
pub use error::{QueryError, QueryResult};
pub use execute::{execute_query, QueryExecutor, Row, Value};
pub use spec::QuerySpec;
pub use sql::Dialect;
