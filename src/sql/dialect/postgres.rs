//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - `$n` positional parameters
//! - `->>` JSON text extraction on `json`/`jsonb`
//! - `date_trunc` for temporal bucketing

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    // Uses default emit_cast (CAST(... AS TIMESTAMP / DOUBLE PRECISION))
    // Uses default emit_date_trunc (date_trunc('unit', ...))
}
