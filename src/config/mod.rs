//! Configuration module for tracelens.
//!
//! Handles the store connection, statement timeouts and custom table catalogs.

mod settings;

pub use settings::{
    expand_env_vars, parse_duration, Settings, SettingsError, StoreSettings, TableSettings,
};
