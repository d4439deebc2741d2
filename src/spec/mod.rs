//! Query specifications.
//!
//! A [`QuerySpec`] is the declarative, serializable description of one
//! analytics query. It is built per request (usually deserialized from JSON),
//! compiled, executed and dropped.
//!
//! ```json
//! {
//!   "from": "traces",
//!   "filter": [{ "type": "string", "column": "release", "operator": "=", "value": "v2" }],
//!   "groupBy": [{ "type": "datetime", "column": "timestamp", "temporalUnit": "day" }],
//!   "select": [{ "column": "timestamp", "agg": null }, { "column": "id", "agg": "COUNT" }],
//!   "orderBy": [{ "column": "timestamp", "direction": "ASC" }],
//!   "limit": 100
//! }
//! ```
//!
//! Each filter type carries its own operator vocabulary, so an operator that
//! does not apply to a type is rejected while deserializing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ColumnType;
use crate::sql::TimeUnit;

// ============================================================================
// Query specification
// ============================================================================

/// A complete query description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Logical table name.
    pub from: String,
    /// Conditions, ANDed in order.
    #[serde(default)]
    pub filter: Vec<FilterCondition>,
    #[serde(default)]
    pub group_by: Vec<GroupBy>,
    pub select: Vec<SelectItem>,
    /// Explicit ordering. Empty means the table's default ordering.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl QuerySpec {
    pub fn new(from: &str) -> Self {
        Self {
            from: from.into(),
            filter: Vec::new(),
            group_by: Vec::new(),
            select: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn group_by(mut self, key: GroupBy) -> Self {
        self.group_by.push(key);
        self
    }

    pub fn select(mut self, item: SelectItem) -> Self {
        self.select.push(item);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when the query groups rows or aggregates any select item.
    pub fn is_aggregated(&self) -> bool {
        !self.group_by.is_empty() || self.select.iter().any(|s| s.agg.is_some())
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Operators for `string` and `stringObject` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "like")]
    Like,
}

/// Operators for `number` and `numberObject` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

/// Operators for `datetime` conditions. Equality is not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatetimeOperator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

/// Membership operators for `stringOptions` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionsOperator {
    #[serde(rename = "any of")]
    AnyOf,
    #[serde(rename = "none of")]
    NoneOf,
}

/// A single predicate. The `type` tag must match the column's declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterCondition {
    String {
        column: String,
        operator: StringOperator,
        value: String,
    },
    Number {
        column: String,
        operator: NumberOperator,
        value: f64,
    },
    Datetime {
        column: String,
        operator: DatetimeOperator,
        value: DateTime<Utc>,
    },
    StringOptions {
        column: String,
        operator: OptionsOperator,
        value: Vec<String>,
    },
    StringObject {
        column: String,
        key: String,
        operator: StringOperator,
        value: String,
    },
    NumberObject {
        column: String,
        key: String,
        operator: NumberOperator,
        value: f64,
    },
}

impl FilterCondition {
    /// Logical column the condition applies to.
    pub fn column(&self) -> &str {
        match self {
            FilterCondition::String { column, .. }
            | FilterCondition::Number { column, .. }
            | FilterCondition::Datetime { column, .. }
            | FilterCondition::StringOptions { column, .. }
            | FilterCondition::StringObject { column, .. }
            | FilterCondition::NumberObject { column, .. } => column,
        }
    }

    /// Column type the condition is written for.
    pub fn column_type(&self) -> ColumnType {
        match self {
            FilterCondition::String { .. } => ColumnType::String,
            FilterCondition::Number { .. } => ColumnType::Number,
            FilterCondition::Datetime { .. } => ColumnType::Datetime,
            FilterCondition::StringOptions { .. } => ColumnType::StringOptions,
            FilterCondition::StringObject { .. } => ColumnType::StringObject,
            FilterCondition::NumberObject { .. } => ColumnType::NumberObject,
        }
    }
}

// ============================================================================
// Grouping, selection, ordering
// ============================================================================

/// A group-by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GroupBy {
    String {
        column: String,
    },
    Number {
        column: String,
    },
    Datetime {
        column: String,
        #[serde(rename = "temporalUnit")]
        temporal_unit: TimeUnit,
    },
}

impl GroupBy {
    pub fn column(&self) -> &str {
        match self {
            GroupBy::String { column }
            | GroupBy::Number { column }
            | GroupBy::Datetime { column, .. } => column,
        }
    }

    /// Short name of the key kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            GroupBy::String { .. } => "string",
            GroupBy::Number { .. } => "number",
            GroupBy::Datetime { .. } => "datetime",
        }
    }

    /// Whether a column of `column_type` can be grouped by this kind of key.
    pub fn accepts(&self, column_type: ColumnType) -> bool {
        match self {
            GroupBy::String { .. } => {
                matches!(column_type, ColumnType::String | ColumnType::StringOptions)
            }
            GroupBy::Number { .. } => column_type == ColumnType::Number,
            GroupBy::Datetime { .. } => column_type == ColumnType::Datetime,
        }
    }
}

/// Aggregation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Avg => "AVG",
            Aggregation::Count => "COUNT",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
        }
    }

    /// Output alias for this aggregation over `column`, e.g. `sum_total_tokens`.
    ///
    /// Rows key an aggregate by this alias, never by the bare column name:
    /// `SUM(completion_tokens)` comes back under `sum_completion_tokens`. Two
    /// aggregates over one column, or an aggregate next to a grouped plain
    /// column of the same name, therefore never collide.
    pub fn alias(&self, column: &str) -> String {
        format!("{}_{}", self.as_str().to_lowercase(), column)
    }
}

/// One output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectItem {
    pub column: String,
    #[serde(default)]
    pub agg: Option<Aggregation>,
}

impl SelectItem {
    /// A plain column.
    pub fn column(column: &str) -> Self {
        Self {
            column: column.into(),
            agg: None,
        }
    }

    /// An aggregated column.
    pub fn agg(column: &str, agg: Aggregation) -> Self {
        Self {
            column: column.into(),
            agg: Some(agg),
        }
    }

    /// Deterministic output alias: the column name for a plain item,
    /// [`Aggregation::alias`] for an aggregated one.
    pub fn alias(&self) -> String {
        match self.agg {
            Some(agg) => agg.alias(&self.column),
            None => self.column.clone(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

/// One ordering entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
    /// Order by the aggregated value rather than the raw column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg: Option<Aggregation>,
}

impl OrderBy {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
            agg: None,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
            agg: None,
        }
    }

    pub fn with_agg(mut self, agg: Aggregation) -> Self {
        self.agg = Some(agg);
        self
    }
}
