//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect SQL.
//! It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`params`] - Bound parameter collection
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod params;
pub mod query;
pub mod token;
pub mod types;


// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, cast, count, count_star, date_trunc, func, json_get_text, max, min, raw_sql, star, sum,
    BinaryOperator, Expr, ExprExt,
};
pub use params::{BoundValue, ParamList};
pub use query::{OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{Token, TokenStream};
pub use types::{CastType, TimeUnit};
