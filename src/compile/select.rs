//! SELECT, GROUP BY and ORDER BY compilation.

use crate::catalog::{ColumnDefinition, ColumnType, TableDefinition};
use crate::error::{QueryError, QueryResult};
use crate::spec::{Aggregation, Direction, GroupBy, QuerySpec};
use crate::sql::expr::{self, date_trunc, raw_sql, Expr};
use crate::sql::query::{OrderByExpr, SelectExpr, SortDir};

use super::OutputColumn;

/// The compiled non-filter clauses of a statement.
#[derive(Debug)]
pub(super) struct Projection {
    pub select: Vec<SelectExpr>,
    pub columns: Vec<OutputColumn>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
}

/// A compiled group key: the logical column and the expression grouped on.
struct GroupKey<'a> {
    column: &'a ColumnDefinition,
    expr: Expr,
    temporal: bool,
}

pub(super) fn compile_projection(
    table: &TableDefinition,
    spec: &QuerySpec,
) -> QueryResult<Projection> {
    let keys = spec
        .group_by
        .iter()
        .map(|key| compile_group_key(table, key))
        .collect::<QueryResult<Vec<_>>>()?;
    // Select and orderBy find a key by column name, so each column is
    // grouped at most once.
    for (i, key) in keys.iter().enumerate() {
        if keys[..i].iter().any(|k| k.column.name == key.column.name) {
            return Err(QueryError::DuplicateGroupKey(key.column.name.clone()));
        }
    }
    let aggregated = spec.is_aggregated();

    let mut select = Vec::with_capacity(spec.select.len());
    let mut columns = Vec::with_capacity(spec.select.len());
    for item in &spec.select {
        let column = table.column(&item.column)?;
        let expr = match item.agg {
            Some(agg) => aggregate(agg, column)?,
            None => plain(column, &keys, aggregated)?,
        };
        let alias = item.alias();
        select.push(SelectExpr::new(expr).with_alias(&alias));
        columns.push(OutputColumn {
            alias,
            column: column.name.clone(),
            agg: item.agg,
        });
    }

    let order_by = if spec.order_by.is_empty() {
        default_order(table, &keys, aggregated)
    } else {
        spec.order_by
            .iter()
            .map(|entry| {
                let column = table.column(&entry.column)?;
                let expr = match entry.agg {
                    Some(agg) => aggregate(agg, column)?,
                    None => plain(column, &keys, aggregated)?,
                };
                Ok(OrderByExpr::new(expr, sort_dir(entry.direction)))
            })
            .collect::<QueryResult<Vec<_>>>()?
    };

    Ok(Projection {
        select,
        columns,
        group_by: keys.into_iter().map(|k| k.expr).collect(),
        order_by,
    })
}

fn compile_group_key<'a>(table: &'a TableDefinition, key: &GroupBy) -> QueryResult<GroupKey<'a>> {
    let column = table.column(key.column())?;
    if !key.accepts(column.column_type) {
        return Err(QueryError::ColumnTypeMismatch {
            column: column.name.clone(),
            declared: column.column_type,
            used_as: key.kind(),
        });
    }

    let physical = raw_sql(&column.internal);
    let (expr, temporal) = match key {
        GroupBy::Datetime { temporal_unit, .. } => (date_trunc(*temporal_unit, physical), true),
        GroupBy::String { .. } | GroupBy::Number { .. } => (physical, false),
    };

    Ok(GroupKey {
        column,
        expr,
        temporal,
    })
}

/// Expression for an unaggregated reference to `column`.
///
/// In an aggregated query the column must be a group key, and the key's
/// expression is reused so a datetime column selects its truncated bucket.
fn plain(column: &ColumnDefinition, keys: &[GroupKey<'_>], aggregated: bool) -> QueryResult<Expr> {
    if let Some(key) = keys.iter().find(|k| k.column.name == column.name) {
        return Ok(key.expr.clone());
    }
    if aggregated {
        return Err(QueryError::UngroupedColumn(column.name.clone()));
    }
    Ok(raw_sql(&column.internal))
}

/// `AGG(<physical>)`. SUM and AVG need a number column.
fn aggregate(agg: Aggregation, column: &ColumnDefinition) -> QueryResult<Expr> {
    let physical = raw_sql(&column.internal);
    Ok(match agg {
        Aggregation::Sum | Aggregation::Avg if column.column_type != ColumnType::Number => {
            return Err(QueryError::ColumnTypeMismatch {
                column: column.name.clone(),
                declared: column.column_type,
                used_as: "number",
            });
        }
        Aggregation::Sum => expr::sum(physical),
        Aggregation::Avg => expr::avg(physical),
        Aggregation::Count => expr::count(physical),
        Aggregation::Min => expr::min(physical),
        Aggregation::Max => expr::max(physical),
    })
}

/// Most recent first. Aggregated queries can only order by the timestamp
/// when it is bucketed by a group key.
fn default_order(
    table: &TableDefinition,
    keys: &[GroupKey<'_>],
    aggregated: bool,
) -> Vec<OrderByExpr> {
    let Some(timestamp) = table.timestamp() else {
        return Vec::new();
    };

    if !aggregated {
        return vec![OrderByExpr::desc(raw_sql(&timestamp.internal))];
    }

    keys.iter()
        .find(|k| k.temporal && k.column.name == timestamp.name)
        .map(|k| vec![OrderByExpr::desc(k.expr.clone())])
        .unwrap_or_default()
}

fn sort_dir(direction: Direction) -> SortDir {
    match direction {
        Direction::Asc => SortDir::Asc,
        Direction::Desc => SortDir::Desc,
    }
}
