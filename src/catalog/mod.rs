//! Column catalog.
//!
//! A catalog maps logical table names to [`TableDefinition`]s, and each table
//! maps public column names to the physical SQL expression they compile to.
//! The catalog is the allow-list for everything that is interpolated into a
//! statement: a reference that does not resolve here never reaches SQL.
//!
//! # Example
//!
//! ```ignore
//! use tracelens::catalog::Catalog;
//!
//! let catalog = Catalog::builtin();
//! let traces = catalog.table("traces")?;
//! let name = traces.column("name")?;
//! assert_eq!(name.internal, "t.\"name\"");
//! ```

mod builtin;
mod options;

pub use options::{load_options, options_query};

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

// ============================================================================
// Column types
// ============================================================================

/// Declared semantic type of a logical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    String,
    Number,
    Datetime,
    /// String drawn from a runtime-discovered set of values.
    StringOptions,
    /// String-valued property of a JSON column.
    StringObject,
    /// Number-valued property of a JSON column.
    NumberObject,
}

impl ColumnType {
    /// Wire name, as used in filter conditions.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Datetime => "datetime",
            ColumnType::StringOptions => "stringOptions",
            ColumnType::StringObject => "stringObject",
            ColumnType::NumberObject => "numberObject",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One discovered value of an option-typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub value: String,
    pub count: i64,
}

// ============================================================================
// Column definitions
// ============================================================================

/// A logical, user-facing column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Public identifier used in query specifications.
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Physical SQL expression, e.g. `t."name"`.
    ///
    /// Emitted verbatim. Must come from code or operator configuration,
    /// never from a request.
    pub internal: String,

    /// Known values, for `stringOptions` columns only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionValue>,
}

impl ColumnDefinition {
    pub fn new(name: &str, column_type: ColumnType, internal: &str) -> Self {
        Self {
            name: name.into(),
            column_type,
            internal: internal.into(),
            options: Vec::new(),
        }
    }
}

// ============================================================================
// Table definitions
// ============================================================================

/// A logical table: a physical FROM source plus its column catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDefinition {
    pub name: String,

    /// Physical FROM fragment, e.g. `traces t` or a fixed join.
    pub source: String,

    /// Logical name of the column used for "most recent first" ordering.
    pub timestamp_column: Option<String>,

    columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// Build a table definition, rejecting duplicate column names and a
    /// timestamp column that is not a declared datetime column.
    pub fn new(
        name: &str,
        source: &str,
        timestamp_column: Option<&str>,
        columns: Vec<ColumnDefinition>,
    ) -> QueryResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(QueryError::DuplicateColumn {
                    table: name.into(),
                    column: column.name.clone(),
                });
            }
        }

        let table = Self {
            name: name.into(),
            source: source.into(),
            timestamp_column: timestamp_column.map(String::from),
            columns,
        };

        if let Some(ts) = &table.timestamp_column {
            let column = table.column(ts)?;
            if column.column_type != ColumnType::Datetime {
                return Err(QueryError::ColumnTypeMismatch {
                    column: ts.clone(),
                    declared: column.column_type,
                    used_as: "datetime",
                });
            }
        }

        Ok(table)
    }

    /// Resolve a logical column name.
    pub fn column(&self, name: &str) -> QueryResult<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| QueryError::invalid_column(&self.name, name))
    }

    pub fn column_mut(&mut self, name: &str) -> QueryResult<&mut ColumnDefinition> {
        let table = &self.name;
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| QueryError::invalid_column(table, name))
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// The canonical timestamp column, if the table has one.
    pub fn timestamp(&self) -> Option<&ColumnDefinition> {
        self.timestamp_column
            .as_deref()
            .and_then(|name| self.column(name).ok())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Logical tables available to query specifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tables: BTreeMap<String, TableDefinition>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The trace-analytics tables: `traces`, `observations`,
    /// `traces_observations` and `scores`.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for table in builtin::tables() {
            catalog.insert(table);
        }
        catalog
    }

    /// Add a table, replacing any existing table with the same name.
    pub fn insert(&mut self, table: TableDefinition) -> Option<TableDefinition> {
        self.tables.insert(table.name.clone(), table)
    }

    /// Resolve a logical table name.
    pub fn table(&self, name: &str) -> QueryResult<&TableDefinition> {
        self.tables
            .get(name)
            .ok_or_else(|| QueryError::UnknownTable(name.into()))
    }

    pub fn table_mut(&mut self, name: &str) -> QueryResult<&mut TableDefinition> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| QueryError::UnknownTable(name.into()))
    }

    /// Tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDefinition> {
        self.tables.values()
    }
}
