//! SQL-level types used while emitting expressions.
//!
//! Small closed vocabularies: every value renders to a fixed keyword or
//! format string, so none of them can carry caller text into the statement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target type of an explicit cast.
///
/// Each dialect decides how a cast is spelled (see `SqlDialect::emit_cast`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    /// Timestamp without timezone.
    Timestamp,
    /// Double-precision floating point.
    Double,
}

/// Temporal truncation unit used to bucket datetime values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

impl TimeUnit {
    /// Unit name as understood by `date_trunc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Year => "year",
            TimeUnit::Month => "month",
            TimeUnit::Week => "week",
            TimeUnit::Day => "day",
            TimeUnit::Hour => "hour",
            TimeUnit::Minute => "minute",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
