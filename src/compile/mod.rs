//! Compilation from a [`QuerySpec`] to a parameterized SQL statement.
//!
//! ```text
//! QuerySpec ─┬─ filter   → WHERE c1 AND c2 ...        (bound values → params)
//!            ├─ groupBy  → GROUP BY k1, k2 ...
//!            ├─ select   → SELECT expr AS "alias", ...
//!            └─ orderBy  → ORDER BY expr DIR, ...     (or the table default)
//! ```
//!
//! Every column reference is resolved through the [`Catalog`] before any
//! SQL is produced; a single unresolved reference aborts the whole query.
//!
//! # Example
//!
//! ```ignore
//! use tracelens::catalog::Catalog;
//! use tracelens::compile::compile;
//! use tracelens::spec::{QuerySpec, SelectItem};
//! use tracelens::sql::Dialect;
//!
//! let spec = QuerySpec::new("traces").select(SelectItem::column("id"));
//! let statement = compile(&Catalog::builtin(), &spec, Dialect::Postgres)?;
//! println!("{}", statement.sql);
//! ```

mod filter;
mod select;

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{QueryError, QueryResult};
use crate::spec::{Aggregation, QuerySpec};
use crate::sql::params::{BoundValue, ParamList};
use crate::sql::query::{Query, TableRef};
use crate::sql::Dialect;

pub use filter::compile_filters;

// ============================================================================
// Result Types
// ============================================================================

/// One column of the statement's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputColumn {
    /// Alias the value is returned under.
    pub alias: String,
    /// Logical column it was computed from.
    pub column: String,
    pub agg: Option<Aggregation>,
}

/// An executable statement: SQL text plus the values for its placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub sql: String,
    /// Bound values, in placeholder order.
    pub params: Vec<BoundValue>,
    pub dialect: Dialect,
    /// Output columns, in select order.
    pub columns: Vec<OutputColumn>,
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile `spec` against `catalog` for `dialect`.
///
/// Pure and deterministic: the same inputs always produce byte-identical
/// SQL and parameters.
pub fn compile(
    catalog: &Catalog,
    spec: &QuerySpec,
    dialect: Dialect,
) -> QueryResult<CompiledStatement> {
    let table = catalog.table(&spec.from)?;
    if spec.select.is_empty() {
        return Err(QueryError::EmptySelect);
    }

    let mut params = ParamList::new();
    let condition = compile_filters(table, &spec.filter, &mut params)?;
    let projection = select::compile_projection(table, spec)?;

    let mut query = Query::new()
        .select(projection.select)
        .from(TableRef::raw(&table.source))
        .group_by(projection.group_by)
        .order_by(projection.order_by);

    if let Some(condition) = condition {
        query = query.filter(condition);
    }
    if let Some(limit) = spec.limit {
        query = query.limit(limit);
    }

    let sql = query.to_sql(dialect);

    // Parameter values stay out of logs.
    debug!(
        table = %spec.from,
        %dialect,
        params = params.len(),
        sql = %sql,
        "compiled query specification"
    );

    Ok(CompiledStatement {
        sql,
        params: params.into_values(),
        dialect,
        columns: projection.columns,
    })
}
