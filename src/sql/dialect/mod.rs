//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting
//! - Parameter placeholders: `$1` (PostgreSQL/DuckDB) vs `?1` (SQLite)
//! - Explicit casts for bound timestamps and numbers
//! - Temporal truncation: `date_trunc(...)` vs `strftime(...)`
//!
//! # Usage
//!
//! ```ignore
//! use tracelens::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let placeholder = dialect.placeholder(1);  // $1
//! ```
//!
//! # Feature Matrix
//!
//! | Feature | PostgreSQL | DuckDB | SQLite |
//! |---------|-----------|--------|--------|
//! | Placeholder | `$n` | `$n` | `?n` |
//! | JSON `->>` | 9.3+ | ✓ | 3.38+ |
//! | `date_trunc` | ✓ | ✓ | ❌ (`strftime`) |
//! | TIMESTAMP cast | ✓ | ✓ | ❌ (`datetime()`) |

mod duckdb;
pub mod helpers;
mod postgres;
mod sqlite;

pub use duckdb::DuckDb;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use serde::{Deserialize, Serialize};

use super::token::TokenStream;
use super::types::{CastType, TimeUnit};

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All supported dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Placeholder for the bound parameter at 1-based `index`.
    fn placeholder(&self, index: usize) -> String;

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit a LIMIT clause.
    fn emit_limit(&self, limit: u64) -> TokenStream {
        helpers::emit_limit_standard(limit)
    }

    // =========================================================================
    // Casts
    // =========================================================================

    /// Wrap `inner` in an explicit cast to `target`.
    ///
    /// Default is ANSI `CAST(inner AS <type>)` with `TIMESTAMP` and
    /// `DOUBLE PRECISION`.
    fn emit_cast(&self, inner: TokenStream, target: CastType) -> TokenStream {
        let type_name = match target {
            CastType::Timestamp => "TIMESTAMP",
            CastType::Double => "DOUBLE PRECISION",
        };
        helpers::emit_ansi_cast(inner, type_name)
    }

    // =========================================================================
    // Date/Time
    // =========================================================================

    /// Truncate a timestamp expression to the start of its `unit` bucket.
    ///
    /// Default is `date_trunc('<unit>', inner)` (PostgreSQL/DuckDB).
    fn emit_date_trunc(&self, unit: TimeUnit, inner: TokenStream) -> TokenStream {
        helpers::emit_date_trunc_function(unit, inner)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
    Sqlite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
            Dialect::Sqlite => &Sqlite,
        }
    }

    /// Parse a dialect name (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            "duckdb" | "duck" => Some(Dialect::DuckDb),
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn emit_limit(&self, limit: u64) -> TokenStream {
        self.dialect().emit_limit(limit)
    }

    fn emit_cast(&self, inner: TokenStream, target: CastType) -> TokenStream {
        self.dialect().emit_cast(inner, target)
    }

    fn emit_date_trunc(&self, unit: TimeUnit, inner: TokenStream) -> TokenStream {
        self.dialect().emit_date_trunc(unit, inner)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
