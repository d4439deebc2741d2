//! SQLite SQL dialect.
//!
//! SQLite has no TIMESTAMP type and no `date_trunc`:
//! - timestamps are stored as `YYYY-MM-DD HH:MM:SS` text and normalized with `datetime()`
//! - temporal buckets are built with `strftime`
//! - `?n` numbered parameters
//! - `->>` JSON extraction (3.38+, always available in the bundled build)

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;
use crate::sql::types::{CastType, TimeUnit};

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_question(index)
    }

    fn emit_cast(&self, inner: TokenStream, target: CastType) -> TokenStream {
        match target {
            CastType::Timestamp => helpers::emit_function("datetime", vec![inner]),
            CastType::Double => helpers::emit_ansi_cast(inner, "REAL"),
        }
    }

    fn emit_date_trunc(&self, unit: TimeUnit, inner: TokenStream) -> TokenStream {
        helpers::emit_date_trunc_strftime(unit, inner)
    }
}
