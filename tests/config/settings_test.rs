//! Configuration files and the catalogs they produce.

use std::io::Write;
use std::time::Duration;

use tracelens::catalog::ColumnType;
use tracelens::config::{Settings, SettingsError};
use tracelens::error::QueryError;
use tracelens::spec::{QuerySpec, SelectItem};
use tracelens::sql::Dialect;

const CONFIG: &str = r#"
[store]
dialect = "sqlite"
path = "/var/lib/tracelens/traces.db"
statement_timeout = "5s"

[tables.requests]
source = "requests r"
timestamp_column = "timestamp"
columns = [
  { name = "id", type = "string", internal = 'r."id"' },
  { name = "route", type = "stringOptions", internal = 'r."route"' },
  { name = "latency_ms", type = "number", internal = 'r."latency_ms"' },
  { name = "timestamp", type = "datetime", internal = 'r."timestamp"' },
]

[tables.scores]
source = "scores s"
columns = [
  { name = "id", type = "string", internal = 's."id"' },
  { name = "value", type = "number", internal = 's."value"' },
]
"#;

#[test]
fn test_store_settings() {
    let settings = Settings::from_toml(CONFIG).unwrap();
    assert_eq!(settings.store.dialect, Dialect::Sqlite);
    assert_eq!(settings.store.timeout().unwrap(), Duration::from_secs(5));
    assert_eq!(
        settings.store.resolved_path().unwrap().to_str(),
        Some("/var/lib/tracelens/traces.db")
    );
}

#[test]
fn test_configured_table_is_queryable() {
    let catalog = Settings::from_toml(CONFIG).unwrap().catalog().unwrap();

    let requests = catalog.table("requests").unwrap();
    assert_eq!(requests.source, "requests r");
    assert_eq!(
        requests.column("route").unwrap().column_type,
        ColumnType::StringOptions
    );

    let spec = QuerySpec::new("requests").select(SelectItem::column("route"));
    let stmt = tracelens::compile(&catalog, &spec, Dialect::Sqlite).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT\n  r.\"route\" AS \"route\"\nFROM requests r\nORDER BY r.\"timestamp\" DESC"
    );
}

#[test]
fn test_configured_table_replaces_builtin() {
    let catalog = Settings::from_toml(CONFIG).unwrap().catalog().unwrap();

    let scores = catalog.table("scores").unwrap();
    assert_eq!(scores.columns().len(), 2);
    assert!(scores.timestamp().is_none());
    assert!(matches!(
        scores.column("comment"),
        Err(QueryError::InvalidColumn { .. })
    ));

    // Untouched built-ins survive.
    assert!(catalog.table("traces_observations").is_ok());
}

#[test]
fn test_duplicate_column_rejected() {
    let config = r#"
[tables.broken]
source = "broken b"
columns = [
  { name = "id", type = "string", internal = 'b."id"' },
  { name = "id", type = "number", internal = 'b."other_id"' },
]
"#;
    let err = Settings::from_toml(config).unwrap().catalog().unwrap_err();
    match err {
        SettingsError::InvalidTable { table, source } => {
            assert_eq!(table, "broken");
            assert!(matches!(source, QueryError::DuplicateColumn { .. }));
        }
        other => panic!("expected InvalidTable, got {other:?}"),
    }
}

#[test]
fn test_timestamp_column_must_be_datetime() {
    let config = r#"
[tables.events]
source = "events e"
timestamp_column = "id"
columns = [{ name = "id", type = "string", internal = 'e."id"' }]
"#;
    let err = Settings::from_toml(config).unwrap().catalog().unwrap_err();
    assert!(matches!(
        err,
        SettingsError::InvalidTable {
            source: QueryError::ColumnTypeMismatch { .. },
            ..
        }
    ));
}

#[test]
fn test_unknown_column_type_is_parse_error() {
    let config = r#"
[tables.events]
source = "events e"
columns = [{ name = "id", type = "uuid", internal = 'e."id"' }]
"#;
    assert!(matches!(
        Settings::from_toml(config),
        Err(SettingsError::ParseError(_))
    ));
}

#[test]
fn test_path_expands_env_vars() {
    std::env::set_var("TRACELENS_SETTINGS_TEST_DIR", "/tmp/tracelens-data");
    let settings = Settings::from_toml(
        r#"
[store]
path = "${TRACELENS_SETTINGS_TEST_DIR}/traces.db"
"#,
    )
    .unwrap();
    assert_eq!(
        settings.store.resolved_path().unwrap().to_str(),
        Some("/tmp/tracelens-data/traces.db")
    );
    std::env::remove_var("TRACELENS_SETTINGS_TEST_DIR");
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join(format!("tracelens-settings-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    drop(file);

    let settings = Settings::from_file(&path).unwrap();
    assert!(settings.tables.contains_key("requests"));
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        Settings::from_file(&path),
        Err(SettingsError::FileNotFound(_))
    ));
}

#[test]
fn test_invalid_timeout() {
    let settings = Settings::from_toml("[store]\nstatement_timeout = \"soon\"").unwrap();
    assert!(matches!(
        settings.store.timeout(),
        Err(SettingsError::InvalidDuration(_))
    ));
}
