//! End-to-end execution: compile, run against a store, read typed rows.

mod fixtures;

use std::error::Error as _;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{TimeZone, Utc};
use serde_json::json;
use tracelens::catalog::Catalog;
use tracelens::compile::CompiledStatement;
use tracelens::error::{ExecutorError, ExecutorResult, QueryError};
use tracelens::execute::{execute_query, QueryExecutor, Row, SqliteExecutor, Value};
use tracelens::spec::{
    Aggregation, DatetimeOperator, FilterCondition, GroupBy, NumberOperator, OptionsOperator,
    OrderBy, QuerySpec, SelectItem, StringOperator,
};
use tracelens::sql::{Dialect, TimeUnit};

// ============================================================================
// Recording executor
// ============================================================================

/// Records every statement it receives and answers with a canned result.
struct RecordingExecutor {
    statements: Mutex<Vec<String>>,
    respond: fn() -> ExecutorResult<Vec<Row>>,
}

impl RecordingExecutor {
    fn new(respond: fn() -> ExecutorResult<Vec<Row>>) -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            respond,
        }
    }

    fn calls(&self) -> usize {
        self.statements.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, statement: &CompiledStatement) -> ExecutorResult<Vec<Row>> {
        self.statements.lock().unwrap().push(statement.sql.clone());
        (self.respond)()
    }
}

fn no_rows() -> ExecutorResult<Vec<Row>> {
    Ok(Vec::new())
}

// ============================================================================
// Compile errors never reach the store
// ============================================================================

#[tokio::test]
async fn test_invalid_column_makes_no_store_call() {
    let executor = RecordingExecutor::new(no_rows);
    let spec = QuerySpec::new("traces")
        .filter(FilterCondition::String {
            column: "no_such_column".into(),
            operator: StringOperator::Eq,
            value: "x".into(),
        })
        .select(SelectItem::column("id"));

    let err = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::InvalidColumn { ref column, .. } if column == "no_such_column"));
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_unknown_table_makes_no_store_call() {
    let executor = RecordingExecutor::new(no_rows);
    let spec = QuerySpec::new("sessions").select(SelectItem::column("id"));

    let err = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::UnknownTable(ref t) if t == "sessions"));
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_empty_select_makes_no_store_call() {
    let executor = RecordingExecutor::new(no_rows);
    let spec: QuerySpec = serde_json::from_value(json!({ "from": "traces", "select": [] })).unwrap();

    let err = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::EmptySelect));
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_statement_compiled_for_executor_dialect() {
    let executor = RecordingExecutor::new(no_rows);
    let spec = QuerySpec::new("traces")
        .filter(FilterCondition::String {
            column: "user_id".into(),
            operator: StringOperator::Eq,
            value: "alice".into(),
        })
        .select(SelectItem::column("id"));

    execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();

    let statements = executor.statements.lock().unwrap();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].contains("t.\"user_id\" = $1"));
}

// ============================================================================
// Store failures
// ============================================================================

#[tokio::test]
async fn test_store_failure_is_generic_with_source() {
    // No schema: every statement is rejected.
    let executor = SqliteExecutor::open_in_memory().unwrap();
    let spec = QuerySpec::new("traces").select(SelectItem::column("id"));

    let err = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap_err();

    assert!(!err.is_compile_error());
    assert_eq!(err.to_string(), "query execution failed");
    let source = err.source().expect("store error is chained").to_string();
    assert!(source.contains("no such table"), "unexpected source: {source}");
}

#[tokio::test]
async fn test_timeout_surfaces_as_execution_failure() {
    fn timed_out() -> ExecutorResult<Vec<Row>> {
        Err(ExecutorError::Timeout(Duration::from_secs(30)))
    }
    let executor = RecordingExecutor::new(timed_out);
    let spec = QuerySpec::new("traces").select(SelectItem::column("id"));

    let err = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap_err();

    match err {
        QueryError::QueryExecutionFailed { source } => assert!(source.is_timeout()),
        other => panic!("expected QueryExecutionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_decimal_results_normalize() {
    fn decimal_sum() -> ExecutorResult<Vec<Row>> {
        let mut row = Row::new();
        row.push("name", "chat")
            .push("sum_completion_tokens", "8.000".parse::<BigDecimal>().unwrap());
        Ok(vec![row])
    }
    let executor = RecordingExecutor::new(decimal_sum);
    let spec = QuerySpec::new("traces_observations")
        .group_by(GroupBy::String {
            column: "name".into(),
        })
        .select(SelectItem::column("name"))
        .select(SelectItem::agg("completion_tokens", Aggregation::Sum));

    let rows = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();
    assert_eq!(
        rows[0].get("sum_completion_tokens").unwrap().normalized().as_deref(),
        Some("8")
    );
}

// ============================================================================
// SQLite round trips
// ============================================================================

async fn completion_tokens_by_name(agg: Aggregation) -> Vec<(String, String)> {
    let executor = fixtures::seeded();
    let spec = QuerySpec::new("traces_observations")
        .group_by(GroupBy::String {
            column: "name".into(),
        })
        .select(SelectItem::column("name"))
        .select(SelectItem::agg("completion_tokens", agg))
        .order_by(OrderBy::asc("name"));

    let alias = agg.alias("completion_tokens");
    execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap()
        .iter()
        .map(|row| {
            (
                row.get("name").unwrap().normalized().unwrap(),
                row.get(&alias).unwrap().normalized().unwrap(),
            )
        })
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[tokio::test]
async fn test_sum_per_group() {
    assert_eq!(
        completion_tokens_by_name(Aggregation::Sum).await,
        pairs(&[("chat", "8"), ("search", "4")])
    );
}

#[tokio::test]
async fn test_avg_per_group() {
    assert_eq!(
        completion_tokens_by_name(Aggregation::Avg).await,
        pairs(&[("chat", "4"), ("search", "4")])
    );
}

#[tokio::test]
async fn test_min_max_per_group() {
    assert_eq!(
        completion_tokens_by_name(Aggregation::Min).await,
        pairs(&[("chat", "3"), ("search", "4")])
    );
    assert_eq!(
        completion_tokens_by_name(Aggregation::Max).await,
        pairs(&[("chat", "5"), ("search", "4")])
    );
}

#[tokio::test]
async fn test_count_ignores_nulls() {
    assert_eq!(
        completion_tokens_by_name(Aggregation::Count).await,
        pairs(&[("chat", "2"), ("search", "1")])
    );
}

#[tokio::test]
async fn test_single_trace_end_to_end() {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor.execute_batch(fixtures::SCHEMA).unwrap();
    executor
        .execute_batch(
            "INSERT INTO traces (\"id\", \"name\", \"timestamp\") \
             VALUES ('trace-1', 'chat', '2024-01-01 10:00:00');",
        )
        .unwrap();

    let spec: QuerySpec = serde_json::from_value(json!({
        "from": "traces",
        "filter": [],
        "groupBy": [],
        "select": [{ "column": "id", "agg": null }]
    }))
    .unwrap();

    let rows = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        json!([{ "id": "trace-1" }])
    );
}

#[tokio::test]
async fn test_rows_keyed_by_alias() {
    let executor = fixtures::seeded();
    let spec = QuerySpec::new("traces")
        .filter(FilterCondition::StringOptions {
            column: "name".into(),
            operator: OptionsOperator::AnyOf,
            value: vec!["chat".into()],
        })
        .select(SelectItem::column("id"));

    let rows = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        json!([{ "id": "trace-1" }])
    );
}

#[tokio::test]
async fn test_default_order_is_most_recent_first() {
    let executor = fixtures::seeded();
    let spec = QuerySpec::new("traces").select(SelectItem::column("id"));

    let rows = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();
    let ids: Vec<&str> = rows
        .iter()
        .map(|r| r.get("id").and_then(Value::as_str).unwrap())
        .collect();
    assert_eq!(ids, vec!["trace-2", "trace-1"]);
}

#[tokio::test]
async fn test_datetime_filter_against_text_timestamps() {
    let executor = fixtures::seeded();
    let spec = QuerySpec::new("traces")
        .filter(FilterCondition::Datetime {
            column: "timestamp".into(),
            operator: DatetimeOperator::Gte,
            value: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        })
        .select(SelectItem::column("id"));

    let rows = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id"), Some(&Value::String("trace-2".into())));
}

#[tokio::test]
async fn test_daily_buckets() {
    let executor = fixtures::seeded();
    let spec = QuerySpec::new("observations")
        .group_by(GroupBy::Datetime {
            column: "start_time".into(),
            temporal_unit: TimeUnit::Day,
        })
        .select(SelectItem::column("start_time"))
        .select(SelectItem::agg("id", Aggregation::Count));

    let rows = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();

    // Default order: newest bucket first.
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        json!([
            { "start_time": "2024-01-02 00:00:00", "count_id": 2 },
            { "start_time": "2024-01-01 00:00:00", "count_id": 2 },
        ])
    );
}

#[tokio::test]
async fn test_json_property_filter() {
    let executor = fixtures::seeded();
    let spec = QuerySpec::new("observations")
        .filter(FilterCondition::NumberObject {
            column: "usage".into(),
            key: "output".into(),
            operator: NumberOperator::Gt,
            value: 3.0,
        })
        .select(SelectItem::column("id"))
        .order_by(OrderBy::asc("id"));

    let rows = execute_query(&Catalog::builtin(), &executor, &spec)
        .await
        .unwrap();
    let ids: Vec<_> = rows
        .iter()
        .map(|r| r.get("id").unwrap().normalized().unwrap())
        .collect();
    assert_eq!(ids, vec!["obs-1", "obs-3"]);
}
