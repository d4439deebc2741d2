//! TOML-based configuration for tracelens.
//!
//! Supports a config file (tracelens.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [store]
//! dialect = "sqlite"
//! path = "${TRACELENS_DB}"
//! statement_timeout = "30s"
//!
//! [tables.requests]
//! source = "requests r"
//! timestamp_column = "timestamp"
//! columns = [
//!   { name = "id", type = "string", internal = 'r."id"' },
//!   { name = "route", type = "stringOptions", internal = 'r."route"' },
//!   { name = "timestamp", type = "datetime", internal = 'r."timestamp"' },
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::{Catalog, ColumnDefinition, TableDefinition};
use crate::error::QueryError;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid duration format: {0}")]
    InvalidDuration(String),

    #[error("Invalid table '{table}': {source}")]
    InvalidTable {
        table: String,
        #[source]
        source: QueryError,
    },

    #[error("No database path configured")]
    MissingPath,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Store connection.
    pub store: StoreSettings,

    /// Additional or overriding logical tables.
    pub tables: BTreeMap<String, TableSettings>,
}

/// Store connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Dialect to compile for when none is given explicitly.
    pub dialect: Dialect,

    /// Database path (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Statement timeout (e.g., "30s", "500ms", "2m").
    pub statement_timeout: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            path: None,
            statement_timeout: "30s".to_string(),
        }
    }
}

impl StoreSettings {
    /// Get the database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        let path = self.path.as_deref().ok_or(SettingsError::MissingPath)?;
        Ok(PathBuf::from(expand_env_vars(path)?))
    }

    /// Parsed statement timeout.
    pub fn timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration(&self.statement_timeout)
    }
}

/// A logical table defined in configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableSettings {
    /// Physical FROM fragment.
    pub source: String,

    /// Logical name of the canonical timestamp column.
    #[serde(default)]
    pub timestamp_column: Option<String>,

    pub columns: Vec<ColumnDefinition>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TRACELENS_CONFIG`
    /// 2. `./tracelens.toml`
    /// 3. `~/.config/tracelens/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("TRACELENS_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("tracelens.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tracelens").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// The built-in catalog with configured tables added over it.
    ///
    /// A configured table replaces a built-in table of the same name.
    pub fn catalog(&self) -> Result<Catalog, SettingsError> {
        let mut catalog = Catalog::builtin();
        for (name, table) in &self.tables {
            let definition = TableDefinition::new(
                name,
                &table.source,
                table.timestamp_column.as_deref(),
                table.columns.clone(),
            )
            .map_err(|source| SettingsError::InvalidTable {
                table: name.clone(),
                source,
            })?;
            catalog.insert(definition);
        }
        Ok(catalog)
    }
}

/// Parse a duration such as `500ms`, `30s`, `5m` or `1h`.
pub fn parse_duration(s: &str) -> Result<Duration, SettingsError> {
    let s = s.trim();
    let invalid = || SettingsError::InvalidDuration(s.to_string());

    let split = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
    let (amount, unit) = s.split_at(split);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;

    let seconds = |per_unit: u64| {
        amount
            .checked_mul(per_unit)
            .map(Duration::from_secs)
            .ok_or_else(invalid)
    };

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => seconds(60),
        "h" => seconds(3600),
        _ => Err(invalid()),
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                name.push(ch);
                chars.next();
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
