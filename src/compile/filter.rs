//! Filter clause compilation.
//!
//! Each [`FilterCondition`] becomes one boolean expression; the expressions
//! are ANDed in input order. Values always travel as bound parameters. The
//! only text interpolated into the statement is the column's physical
//! expression from the catalog and the operator keyword from the closed
//! operator enums.

use chrono::{DateTime, Utc};

use crate::catalog::{ColumnDefinition, TableDefinition};
use crate::error::{QueryError, QueryResult};
use crate::spec::{DatetimeOperator, FilterCondition, NumberOperator, OptionsOperator, StringOperator};
use crate::sql::expr::{cast, json_get_text, raw_sql, Expr, ExprExt};
use crate::sql::params::{BoundValue, ParamList};
use crate::sql::CastType;

/// Timestamp format bound for datetime filters. Sub-second precision is
/// dropped by the format itself.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compile all conditions into a single expression.
///
/// Returns `None` for an empty filter list so that no WHERE clause is emitted.
pub fn compile_filters(
    table: &TableDefinition,
    filters: &[FilterCondition],
    params: &mut ParamList,
) -> QueryResult<Option<Expr>> {
    let mut combined: Option<Expr> = None;
    for condition in filters {
        let expr = compile_condition(table, condition, params)?;
        combined = Some(match combined {
            Some(existing) => existing.and(expr),
            None => expr,
        });
    }
    Ok(combined)
}

fn compile_condition(
    table: &TableDefinition,
    condition: &FilterCondition,
    params: &mut ParamList,
) -> QueryResult<Expr> {
    let column = resolve(table, condition)?;
    let target = raw_sql(&column.internal);

    let expr = match condition {
        FilterCondition::String {
            operator, value, ..
        } => {
            let bound = params.bind(BoundValue::Text(value.clone()));
            string_predicate(target, *operator, bound)
        }

        FilterCondition::Number {
            operator, value, ..
        } => {
            let bound = params.bind(BoundValue::Double(*value));
            number_predicate(target, *operator, bound)
        }

        FilterCondition::Datetime {
            operator, value, ..
        } => {
            let bound = cast(
                params.bind(BoundValue::Timestamp(format_timestamp(value))),
                CastType::Timestamp,
            );
            datetime_predicate(target, *operator, bound)
        }

        FilterCondition::StringOptions {
            operator, value, ..
        } => {
            let values = value
                .iter()
                .map(|v| params.bind(BoundValue::Text(v.clone())))
                .collect();
            match operator {
                OptionsOperator::AnyOf => target.in_list(values),
                OptionsOperator::NoneOf => target.not_in_list(values),
            }
        }

        FilterCondition::StringObject {
            key,
            operator,
            value,
            ..
        } => {
            let property = json_get_text(target, params.bind(BoundValue::Text(key.clone())));
            let bound = params.bind(BoundValue::Text(value.clone()));
            string_predicate(property.paren(), *operator, bound)
        }

        FilterCondition::NumberObject {
            key,
            operator,
            value,
            ..
        } => {
            let property = json_get_text(target, params.bind(BoundValue::Text(key.clone())));
            let bound = params.bind(BoundValue::Double(*value));
            number_predicate(cast(property.paren(), CastType::Double), *operator, bound)
        }
    };

    Ok(expr)
}

/// Resolve the condition's column and check it is declared with the
/// condition's type.
fn resolve<'a>(
    table: &'a TableDefinition,
    condition: &FilterCondition,
) -> QueryResult<&'a ColumnDefinition> {
    let column = table.column(condition.column())?;
    let expected = condition.column_type();
    if column.column_type != expected {
        return Err(QueryError::ColumnTypeMismatch {
            column: column.name.clone(),
            declared: column.column_type,
            used_as: expected.as_str(),
        });
    }
    Ok(column)
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn string_predicate(target: Expr, operator: StringOperator, bound: Expr) -> Expr {
    match operator {
        StringOperator::Eq => target.eq(bound),
        StringOperator::Like => target.like(bound),
    }
}

fn number_predicate(target: Expr, operator: NumberOperator, bound: Expr) -> Expr {
    match operator {
        NumberOperator::Eq => target.eq(bound),
        NumberOperator::Gt => target.gt(bound),
        NumberOperator::Lt => target.lt(bound),
        NumberOperator::Gte => target.gte(bound),
        NumberOperator::Lte => target.lte(bound),
    }
}

fn datetime_predicate(target: Expr, operator: DatetimeOperator, bound: Expr) -> Expr {
    match operator {
        DatetimeOperator::Gt => target.gt(bound),
        DatetimeOperator::Lt => target.lt(bound),
        DatetimeOperator::Gte => target.gte(bound),
        DatetimeOperator::Lte => target.lte(bound),
    }
}
