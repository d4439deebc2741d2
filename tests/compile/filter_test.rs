//! Filter compilation through the public API: operators, value binding and
//! type checking per filter type.

use chrono::{TimeZone, Utc};
use tracelens::catalog::{Catalog, ColumnType};
use tracelens::compile::compile;
use tracelens::error::QueryError;
use tracelens::spec::{
    DatetimeOperator, FilterCondition, NumberOperator, OptionsOperator, QuerySpec, SelectItem,
    StringOperator,
};
use tracelens::sql::{BoundValue, Dialect};

fn where_clause(table: &str, condition: FilterCondition, dialect: Dialect) -> (String, Vec<BoundValue>) {
    let spec = QuerySpec::new(table)
        .filter(condition)
        .select(SelectItem::column("id"));
    let stmt = compile(&Catalog::builtin(), &spec, dialect).unwrap();
    let line = stmt
        .sql
        .lines()
        .find(|l| l.starts_with("WHERE "))
        .expect("statement has a WHERE clause")
        .trim_start_matches("WHERE ")
        .to_string();
    (line, stmt.params)
}

// ============================================================================
// stringOptions
// ============================================================================

#[test]
fn test_any_of_is_order_preserving_in_list() {
    let values = vec!["zeta".to_string(), "alpha".to_string(), "mid".to_string()];
    let (clause, params) = where_clause(
        "observations",
        FilterCondition::StringOptions {
            column: "model".into(),
            operator: OptionsOperator::AnyOf,
            value: values.clone(),
        },
        Dialect::Postgres,
    );

    assert_eq!(clause, "o.\"model\" IN ($1, $2, $3)");
    let bound: Vec<BoundValue> = values.into_iter().map(BoundValue::Text).collect();
    assert_eq!(params, bound);
}

#[test]
fn test_none_of_is_not_in() {
    let (clause, _) = where_clause(
        "traces",
        FilterCondition::StringOptions {
            column: "name".into(),
            operator: OptionsOperator::NoneOf,
            value: vec!["health-check".into()],
        },
        Dialect::Sqlite,
    );
    assert_eq!(clause, "t.\"name\" NOT IN (?1)");
}

#[test]
fn test_empty_option_lists() {
    let (clause, params) = where_clause(
        "traces",
        FilterCondition::StringOptions {
            column: "name".into(),
            operator: OptionsOperator::AnyOf,
            value: vec![],
        },
        Dialect::Postgres,
    );
    assert_eq!(clause, "FALSE");
    assert!(params.is_empty());

    let (clause, _) = where_clause(
        "traces",
        FilterCondition::StringOptions {
            column: "name".into(),
            operator: OptionsOperator::NoneOf,
            value: vec![],
        },
        Dialect::Postgres,
    );
    assert_eq!(clause, "TRUE");
}

// ============================================================================
// datetime
// ============================================================================

#[test]
fn test_datetime_drops_fractional_seconds() {
    let instants = [
        Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap() + chrono::Duration::nanoseconds(999_999_999),
        Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap() + chrono::Duration::microseconds(1),
        Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap(),
    ];

    for value in instants {
        let (clause, params) = where_clause(
            "traces",
            FilterCondition::Datetime {
                column: "timestamp".into(),
                operator: DatetimeOperator::Lt,
                value,
            },
            Dialect::Postgres,
        );
        assert_eq!(clause, "t.\"timestamp\" < CAST($1 AS TIMESTAMP)");
        assert_eq!(
            params,
            vec![BoundValue::Timestamp("2024-06-30 23:59:59".into())]
        );
    }
}

#[test]
fn test_datetime_cast_per_dialect() {
    let condition = FilterCondition::Datetime {
        column: "start_time".into(),
        operator: DatetimeOperator::Gt,
        value: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    };

    let (duck, _) = where_clause("observations", condition.clone(), Dialect::DuckDb);
    assert_eq!(duck, "o.\"start_time\" > CAST($1 AS TIMESTAMP)");

    let (lite, _) = where_clause("observations", condition, Dialect::Sqlite);
    assert_eq!(lite, "o.\"start_time\" > DATETIME(?1)");
}

// ============================================================================
// numbers and JSON properties
// ============================================================================

#[test]
fn test_number_operators() {
    let cases = [
        (NumberOperator::Eq, "="),
        (NumberOperator::Gt, ">"),
        (NumberOperator::Lt, "<"),
        (NumberOperator::Gte, ">="),
        (NumberOperator::Lte, "<="),
    ];
    for (operator, symbol) in cases {
        let (clause, params) = where_clause(
            "scores",
            FilterCondition::Number {
                column: "value".into(),
                operator,
                value: 0.75,
            },
            Dialect::Postgres,
        );
        assert_eq!(clause, format!("s.\"value\" {} $1", symbol));
        assert_eq!(params, vec![BoundValue::Double(0.75)]);
    }
}

#[test]
fn test_number_object_cast_per_dialect() {
    let condition = FilterCondition::NumberObject {
        column: "usage".into(),
        key: "output".into(),
        operator: NumberOperator::Gte,
        value: 5.0,
    };

    let (pg, params) = where_clause("observations", condition.clone(), Dialect::Postgres);
    assert_eq!(pg, "CAST((o.\"usage\" ->> $1) AS DOUBLE PRECISION) >= $2");
    assert_eq!(
        params,
        vec![BoundValue::Text("output".into()), BoundValue::Double(5.0)]
    );

    let (lite, _) = where_clause("observations", condition, Dialect::Sqlite);
    assert_eq!(lite, "CAST((o.\"usage\" ->> ?1) AS REAL) >= ?2");
}

#[test]
fn test_string_like() {
    let (clause, params) = where_clause(
        "traces",
        FilterCondition::String {
            column: "release".into(),
            operator: StringOperator::Like,
            value: "2024.%".into(),
        },
        Dialect::DuckDb,
    );
    assert_eq!(clause, "t.\"release\" LIKE $1");
    assert_eq!(params, vec![BoundValue::Text("2024.%".into())]);
}

// ============================================================================
// type checking
// ============================================================================

#[test]
fn test_condition_type_must_match_column() {
    let spec = QuerySpec::new("traces")
        .filter(FilterCondition::String {
            column: "timestamp".into(),
            operator: StringOperator::Eq,
            value: "yesterday".into(),
        })
        .select(SelectItem::column("id"));

    let err = compile(&Catalog::builtin(), &spec, Dialect::Postgres).unwrap_err();
    assert!(matches!(
        err,
        QueryError::ColumnTypeMismatch {
            declared: ColumnType::Datetime,
            used_as: "string",
            ..
        }
    ));
}
