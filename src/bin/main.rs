//! tracelens CLI - compile and run query specifications
//!
//! Usage:
//!   tracelens compile <spec.json> [--dialect <dialect>]
//!   tracelens run <spec.json> --db <path>
//!   tracelens tables
//!
//! Examples:
//!   tracelens compile daily_tokens.json --dialect duckdb
//!   tracelens run daily_tokens.json --db ./traces.db
//!   RUST_LOG=tracelens=debug tracelens compile daily_tokens.json

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracelens::catalog::load_options;
use tracelens::config::Settings;
use tracelens::execute::SqliteExecutor;
use tracelens::{compile, execute_query, Catalog, Dialect, QuerySpec};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tracelens")]
#[command(about = "tracelens - compile trace analytics queries to parameterized SQL")]
#[command(version)]
struct Cli {
    /// Path to a tracelens.toml (overrides the default search)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query specification to SQL
    Compile {
        /// Path to the query specification (JSON)
        file: PathBuf,

        /// SQL dialect to generate (defaults to the configured store dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Compile and run a query specification against a SQLite database
    Run {
        /// Path to the query specification (JSON)
        file: PathBuf,

        /// SQLite database (defaults to the configured store path)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// List catalog tables and their columns
    Tables {
        /// Discover option values from this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let catalog = match settings.catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compile { file, dialect } => {
            let dialect = dialect.map(Dialect::from).unwrap_or(settings.store.dialect);
            cmd_compile(&catalog, &file, dialect)
        }
        Commands::Run { file, db } => match open_store(&settings, db) {
            Ok(executor) => cmd_run(&catalog, &file, executor),
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Tables { db } => {
            let executor = match db {
                Some(path) => match open_store(&settings, Some(path)) {
                    Ok(executor) => Some(executor),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::FAILURE;
                    }
                },
                None => None,
            };
            cmd_tables(catalog, executor)
        }
    }
}

fn open_store(settings: &Settings, db: Option<PathBuf>) -> Result<SqliteExecutor, String> {
    let path = match db {
        Some(path) => path,
        None => settings.store.resolved_path().map_err(|e| e.to_string())?,
    };
    let timeout = settings.store.timeout().map_err(|e| e.to_string())?;
    SqliteExecutor::open(&path)
        .map(|executor| executor.with_timeout(timeout))
        .map_err(|e| format!("cannot open '{}': {}", path.display(), e))
}

fn read_spec(file: &Path) -> Result<QuerySpec, String> {
    let source = fs::read_to_string(file)
        .map_err(|e| format!("Error reading file '{}': {}", file.display(), e))?;
    serde_json::from_str(&source)
        .map_err(|e| format!("Invalid query specification '{}': {}", file.display(), e))
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Error starting runtime: {}", e))
}

fn cmd_compile(catalog: &Catalog, file: &Path, dialect: Dialect) -> ExitCode {
    let spec = match read_spec(file) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match compile(catalog, &spec, dialect) {
        Ok(compiled) => {
            println!("-- Dialect: {}", compiled.dialect);
            for (i, param) in compiled.params.iter().enumerate() {
                let value = serde_json::to_string(param).unwrap_or_default();
                println!("-- Param {}: {}", i + 1, value);
            }
            println!("{}", compiled.sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(catalog: &Catalog, file: &Path, executor: SqliteExecutor) -> ExitCode {
    let spec = match read_spec(file) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(execute_query(catalog, &executor, &spec)) {
        Ok(rows) => match serde_json::to_string_pretty(&rows) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing rows: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_tables(mut catalog: Catalog, executor: Option<SqliteExecutor>) -> ExitCode {
    if let Some(executor) = executor {
        let rt = match runtime() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        let names: Vec<String> = catalog.tables().map(|t| t.name.clone()).collect();
        for name in names {
            if let Err(e) = rt.block_on(load_options(&executor, &mut catalog, &name)) {
                eprintln!("Warning: could not load options for '{}': {}", name, e);
            }
        }
    }

    for table in catalog.tables() {
        println!("{} ({})", table.name, table.source);
        for column in table.columns() {
            let marker = if table.timestamp_column.as_deref() == Some(column.name.as_str()) {
                " [timestamp]"
            } else {
                ""
            };
            println!(
                "  {:<20} {:<14} {}{}",
                column.name, column.column_type, column.internal, marker
            );
            for option in &column.options {
                println!("      {} ({})", option.value, option.count);
            }
        }
        println!();
    }

    ExitCode::SUCCESS
}
