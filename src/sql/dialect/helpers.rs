//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::token::{Token, TokenStream};
use super::super::types::TimeUnit;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Placeholders
// =============================================================================

/// `$n` placeholders.
/// Used by: Postgres, DuckDB
pub fn placeholder_dollar(index: usize) -> String {
    format!("${}", index)
}

/// `?n` placeholders.
/// Used by: SQLite
pub fn placeholder_question(index: usize) -> String {
    format!("?{}", index)
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit LIMIT n (standard SQL).
/// Used by: Postgres, DuckDB, SQLite
pub fn emit_limit_standard(limit: u64) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Limit)
        .space()
        .push(Token::LitInt(limit.min(i64::MAX as u64) as i64));
    ts
}

// =============================================================================
// Casts and Functions
// =============================================================================

/// Emit `CAST(inner AS type_name)`.
pub fn emit_ansi_cast(inner: TokenStream, type_name: &'static str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("CAST".into()))
        .lparen()
        .append(&inner)
        .space()
        .push(Token::As)
        .space()
        .push(Token::Raw(type_name.into()))
        .rparen();
    ts
}

/// Emit a function call whose arguments are pre-rendered token streams.
pub fn emit_function(name: &str, args: Vec<TokenStream>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(name.into())).lparen();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(arg);
    }
    ts.rparen();
    ts
}

fn string_arg(s: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::LitString(s.into()));
    ts
}

/// Emit `date_trunc('<unit>', inner)`.
/// Used by: Postgres, DuckDB
pub fn emit_date_trunc_function(unit: TimeUnit, inner: TokenStream) -> TokenStream {
    emit_function("date_trunc", vec![string_arg(unit.as_str()), inner])
}

/// Emit a `strftime` bucket for SQLite, which has no `date_trunc`.
///
/// Buckets render as `YYYY-MM-DD HH:MM:SS` text so they sort and compare
/// like the stored timestamps. Weeks start on Monday, as in `date_trunc`.
pub fn emit_date_trunc_strftime(unit: TimeUnit, inner: TokenStream) -> TokenStream {
    let format = match unit {
        TimeUnit::Year => "%Y-01-01 00:00:00",
        TimeUnit::Month => "%Y-%m-01 00:00:00",
        TimeUnit::Week | TimeUnit::Day => "%Y-%m-%d 00:00:00",
        TimeUnit::Hour => "%Y-%m-%d %H:00:00",
        TimeUnit::Minute => "%Y-%m-%d %H:%M:00",
    };

    let mut args = vec![string_arg(format), inner];
    if unit == TimeUnit::Week {
        args.push(string_arg("weekday 0"));
        args.push(string_arg("-6 days"));
    }
    emit_function("strftime", args)
}
