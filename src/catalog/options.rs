//! Option discovery for `stringOptions` columns.

use tracing::{debug, warn};

use super::{Catalog, ColumnDefinition, ColumnType, OptionValue, TableDefinition};
use crate::compile::{CompiledStatement, OutputColumn};
use crate::error::{QueryError, QueryResult};
use crate::execute::{QueryExecutor, Row};
use crate::spec::Aggregation;
use crate::sql::expr::{count_star, raw_sql, ExprExt};
use crate::sql::query::{OrderByExpr, Query, SelectExpr, TableRef};
use crate::sql::Dialect;

/// Statement listing the distinct non-null values of `column` with their
/// occurrence counts, most frequent first and ties by value.
pub fn options_query(
    table: &TableDefinition,
    column: &ColumnDefinition,
    dialect: Dialect,
) -> CompiledStatement {
    let physical = raw_sql(&column.internal);
    let query = Query::new()
        .select(vec![
            SelectExpr::new(physical.clone()).with_alias("value"),
            SelectExpr::new(count_star()).with_alias("count"),
        ])
        .from(TableRef::raw(&table.source))
        .filter(physical.clone().is_not_null())
        .group_by(vec![physical.clone()])
        .order_by(vec![
            OrderByExpr::desc(count_star()),
            OrderByExpr::asc(physical),
        ]);

    CompiledStatement {
        sql: query.to_sql(dialect),
        params: Vec::new(),
        dialect,
        columns: vec![
            OutputColumn {
                alias: "value".into(),
                column: column.name.clone(),
                agg: None,
            },
            OutputColumn {
                alias: "count".into(),
                column: column.name.clone(),
                agg: Some(Aggregation::Count),
            },
        ],
    }
}

/// Populate the `options` of every `stringOptions` column of `table` from
/// the values currently in the store.
pub async fn load_options(
    executor: &dyn QueryExecutor,
    catalog: &mut Catalog,
    table: &str,
) -> QueryResult<()> {
    let definition = catalog.table(table)?;
    let statements: Vec<(String, CompiledStatement)> = definition
        .columns()
        .iter()
        .filter(|c| c.column_type == ColumnType::StringOptions)
        .map(|c| (c.name.clone(), options_query(definition, c, executor.dialect())))
        .collect();

    for (column, statement) in statements {
        let rows = executor.execute(&statement).await.map_err(|err| {
            warn!(table, column = %column, error = %err, "option discovery failed");
            QueryError::from(err)
        })?;

        let mut options = Vec::with_capacity(rows.len());
        for row in &rows {
            match option_value(row) {
                Some(option) => options.push(option),
                None => warn!(
                    table,
                    column = %column,
                    row = ?row,
                    "skipping unreadable option row"
                ),
            }
        }

        debug!(table, column = %column, options = options.len(), "loaded column options");
        catalog.table_mut(table)?.column_mut(&column)?.options = options;
    }

    Ok(())
}

fn option_value(row: &Row) -> Option<OptionValue> {
    Some(OptionValue {
        value: row.get("value")?.normalized()?,
        count: row.get("count")?.as_i64()?,
    })
}
