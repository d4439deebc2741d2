//! SQLite execution client.
//!
//! Runs statements on a single rusqlite connection. Each statement executes
//! on a blocking thread; the async side enforces the statement timeout and
//! cancels the statement when the timeout expires or the caller goes away.
//!
//! Calls queue on the connection. Cancelling a call only ever interrupts that
//! call's own statement: a call cancelled while still queued is skipped when
//! it reaches the connection, and never interrupts the statement ahead of it.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode, InterruptHandle};
use tracing::{debug, warn};

use super::{QueryExecutor, Row, Value};
use crate::compile::CompiledStatement;
use crate::error::{ExecutorError, ExecutorResult};
use crate::sql::params::BoundValue;
use crate::sql::Dialect;

/// Default statement timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Execution client backed by a SQLite database.
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
    active: Arc<ActiveStatement>,
    timeout: Duration,
}

impl SqliteExecutor {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> ExecutorResult<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| ExecutorError::Connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database (for testing).
    pub fn open_in_memory() -> ExecutorResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| ExecutorError::Connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let interrupt = Arc::new(conn.get_interrupt_handle());
        Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
            active: Arc::new(ActiveStatement::default()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the statement timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a batch of semicolon-separated statements, e.g. to create and seed
    /// a schema. Not subject to the statement timeout.
    pub fn execute_batch(&self, sql: &str) -> ExecutorResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(sql).map_err(store_error)
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, statement: &CompiledStatement) -> ExecutorResult<Vec<Row>> {
        let conn = Arc::clone(&self.conn);
        let active = Arc::clone(&self.active);
        let ticket = Arc::new(Ticket::new(self.active.next_id()));
        let sql = statement.sql.clone();
        let params = statement.params.clone();

        let mut guard = CancelOnDrop::new(&self.interrupt, &self.active, Arc::clone(&ticket));
        let task = tokio::task::spawn_blocking(move || {
            run_statement(&conn, &active, &ticket, &sql, &params)
        });

        let rows = match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined??,
            Err(_) => {
                warn!(timeout = ?self.timeout, "statement timed out, cancelling");
                return Err(ExecutorError::Timeout(self.timeout));
            }
        };

        guard.disarm();
        debug!(rows = rows.len(), "sqlite statement finished");
        Ok(rows)
    }
}

/// One `execute` call's claim on the connection.
struct Ticket {
    id: u64,
    cancelled: AtomicBool,
}

impl Ticket {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: AtomicBool::new(false),
        }
    }
}

/// Which ticket's statement is running on the connection, if any.
///
/// `current` is only set while the connection lock is held, and the cancel
/// flag is checked under the same mutex, so a cancelling guard either sees
/// its own statement running or the statement sees the flag and never starts.
#[derive(Default)]
struct ActiveStatement {
    current: Mutex<Option<u64>>,
    next_id: AtomicU64,
}

impl ActiveStatement {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn slot(&self) -> MutexGuard<'_, Option<u64>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `ticket` as running. Fails if it was cancelled while queued.
    fn begin(&self, ticket: &Ticket) -> ExecutorResult<()> {
        let mut current = self.slot();
        if ticket.cancelled.load(Ordering::SeqCst) {
            return Err(ExecutorError::Cancelled);
        }
        *current = Some(ticket.id);
        Ok(())
    }

    fn finish(&self) {
        *self.slot() = None;
    }
}

/// Cancels its ticket when dropped while armed: on the timeout path and when
/// the caller abandons the future. The connection is interrupted only if the
/// ticket's own statement is the one running.
struct CancelOnDrop<'a> {
    interrupt: &'a InterruptHandle,
    active: &'a ActiveStatement,
    ticket: Arc<Ticket>,
    armed: bool,
}

impl<'a> CancelOnDrop<'a> {
    fn new(
        interrupt: &'a InterruptHandle,
        active: &'a ActiveStatement,
        ticket: Arc<Ticket>,
    ) -> Self {
        Self {
            interrupt,
            active,
            ticket,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.ticket.cancelled.store(true, Ordering::SeqCst);
        let current = self.active.slot();
        if *current == Some(self.ticket.id) {
            self.interrupt.interrupt();
        }
    }
}

fn lock(conn: &Mutex<Connection>) -> ExecutorResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| ExecutorError::TaskFailed("sqlite connection lock poisoned".to_string()))
}

fn run_statement(
    conn: &Mutex<Connection>,
    active: &ActiveStatement,
    ticket: &Ticket,
    sql: &str,
    params: &[BoundValue],
) -> ExecutorResult<Vec<Row>> {
    let conn = lock(conn)?;
    if let Err(err) = active.begin(ticket) {
        debug!(statement = ticket.id, "skipping statement cancelled while queued");
        return Err(err);
    }
    let result = query_rows(&conn, sql, params);
    active.finish();
    result
}

fn query_rows(conn: &Connection, sql: &str, params: &[BoundValue]) -> ExecutorResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql).map_err(store_error)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params_from_iter(params)).map_err(store_error)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(store_error)? {
        let mut values = Row::new();
        for (i, name) in names.iter().enumerate() {
            let value = row.get_ref(i).map_err(store_error)?;
            values.push(name.as_str(), Value::from(value));
        }
        out.push(values);
    }
    Ok(out)
}

fn store_error(err: rusqlite::Error) -> ExecutorError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::OperationInterrupted => {
            ExecutorError::Cancelled
        }
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::CannotOpen => {
            ExecutorError::Connection(err.to_string())
        }
        _ => ExecutorError::Rejected(err.to_string()),
    }
}

impl ToSql for BoundValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            BoundValue::Text(s) | BoundValue::Timestamp(s) => ToSqlOutput::from(s.as_str()),
            BoundValue::Double(f) => ToSqlOutput::from(*f),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::BigInt(n),
            ValueRef::Real(f) => Value::Double(f),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Value::String(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}
