//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible for everything emitted here except:
//! - `DOUBLE` rather than `DOUBLE PRECISION` in casts

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;
use crate::sql::types::CastType;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    fn emit_cast(&self, inner: TokenStream, target: CastType) -> TokenStream {
        let type_name = match target {
            CastType::Timestamp => "TIMESTAMP",
            CastType::Double => "DOUBLE",
        };
        helpers::emit_ansi_cast(inner, type_name)
    }
}
