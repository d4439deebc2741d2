//! Built-in trace-analytics tables.

use super::{ColumnDefinition, ColumnType, TableDefinition};

use ColumnType as T;

fn table(
    name: &str,
    source: &str,
    timestamp_column: &str,
    columns: &[(&str, ColumnType, &str)],
) -> TableDefinition {
    TableDefinition {
        name: name.into(),
        source: source.into(),
        timestamp_column: Some(timestamp_column.into()),
        columns: columns
            .iter()
            .map(|(name, column_type, internal)| {
                ColumnDefinition::new(name, *column_type, internal)
            })
            .collect(),
    }
}

pub(super) fn tables() -> Vec<TableDefinition> {
    vec![traces(), observations(), traces_observations(), scores()]
}

fn traces() -> TableDefinition {
    table(
        "traces",
        "traces t",
        "timestamp",
        &[
            ("id", T::String, r#"t."id""#),
            ("name", T::StringOptions, r#"t."name""#),
            ("timestamp", T::Datetime, r#"t."timestamp""#),
            ("user_id", T::String, r#"t."user_id""#),
            ("session_id", T::String, r#"t."session_id""#),
            ("release", T::String, r#"t."release""#),
            ("version", T::String, r#"t."version""#),
            ("metadata", T::StringObject, r#"t."metadata""#),
        ],
    )
}

fn observations() -> TableDefinition {
    table(
        "observations",
        "observations o",
        "start_time",
        &[
            ("id", T::String, r#"o."id""#),
            ("trace_id", T::String, r#"o."trace_id""#),
            ("name", T::StringOptions, r#"o."name""#),
            ("type", T::StringOptions, r#"o."type""#),
            ("model", T::StringOptions, r#"o."model""#),
            ("level", T::StringOptions, r#"o."level""#),
            ("start_time", T::Datetime, r#"o."start_time""#),
            ("end_time", T::Datetime, r#"o."end_time""#),
            ("prompt_tokens", T::Number, r#"o."prompt_tokens""#),
            ("completion_tokens", T::Number, r#"o."completion_tokens""#),
            ("total_tokens", T::Number, r#"o."total_tokens""#),
            ("metadata", T::StringObject, r#"o."metadata""#),
            ("usage", T::NumberObject, r#"o."usage""#),
        ],
    )
}

fn traces_observations() -> TableDefinition {
    table(
        "traces_observations",
        r#"traces t LEFT JOIN observations o ON o."trace_id" = t."id""#,
        "timestamp",
        &[
            ("trace_id", T::String, r#"t."id""#),
            ("name", T::StringOptions, r#"t."name""#),
            ("timestamp", T::Datetime, r#"t."timestamp""#),
            ("user_id", T::String, r#"t."user_id""#),
            ("release", T::String, r#"t."release""#),
            ("metadata", T::StringObject, r#"t."metadata""#),
            ("observation_id", T::String, r#"o."id""#),
            ("observation_name", T::StringOptions, r#"o."name""#),
            ("model", T::StringOptions, r#"o."model""#),
            ("start_time", T::Datetime, r#"o."start_time""#),
            ("prompt_tokens", T::Number, r#"o."prompt_tokens""#),
            ("completion_tokens", T::Number, r#"o."completion_tokens""#),
            ("total_tokens", T::Number, r#"o."total_tokens""#),
            ("usage", T::NumberObject, r#"o."usage""#),
        ],
    )
}

fn scores() -> TableDefinition {
    table(
        "scores",
        "scores s",
        "timestamp",
        &[
            ("id", T::String, r#"s."id""#),
            ("trace_id", T::String, r#"s."trace_id""#),
            ("name", T::StringOptions, r#"s."name""#),
            ("value", T::Number, r#"s."value""#),
            ("source", T::StringOptions, r#"s."source""#),
            ("comment", T::String, r#"s."comment""#),
            ("timestamp", T::Datetime, r#"s."timestamp""#),
        ],
    )
}
