//! DuckDB binding of the transactional embedded store

use crate::error::{StoreError, StoreResult};
use crate::traits::{AsyncTransactionalStore, ExecStats, SqlStorage, TransactionalStore};
use async_trait::async_trait;
use duckdb::Connection;
use sm_sql::{leading_keyword, quote_ident, split_statements, StatementKind};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Table backing the key-value slot unless overridden
pub const DEFAULT_KV_TABLE: &str = "__shardmig_kv";

/// Options for [`DuckDbStore`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Table that backs the key-value slot
    pub kv_table: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            kv_table: DEFAULT_KV_TABLE.to_string(),
        }
    }
}

/// One DuckDB database acting as a tenant's embedded store.
///
/// The key-value slot lives in a small table inside the same database, so
/// a marker written in a transaction commits or rolls back together with
/// the schema changes it tracks.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    kv_table: String,
}

impl DuckDbStore {
    /// Create a new in-memory DuckDB store
    pub fn in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open (or create) a DuckDB store at a file path
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> StoreResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            kv_table: DEFAULT_KV_TABLE.to_string(),
        }
    }

    /// Apply store options
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.kv_table = options.kv_table;
        self
    }

    /// Name of the table backing the key-value slot
    pub fn kv_table(&self) -> &str {
        &self.kv_table
    }

    /// Run `f` against the underlying connection.
    pub fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Check if a table or view exists in the current schema
    pub fn relation_exists(&self, name: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        relation_exists(&conn, name)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::MutexPoisoned(e.to_string()))
    }
}

/// Connection borrowed for the duration of one transaction
struct TxnScope<'a> {
    conn: &'a Connection,
    kv_table: &'a str,
}

impl SqlStorage for TxnScope<'_> {
    /// Nothing runs if any statement would begin, end, or checkpoint the
    /// enclosing transaction.
    fn exec(&self, sql: &str) -> StoreResult<ExecStats> {
        let statements = split_statements(sql)?;
        let control = statements
            .iter()
            .position(|stmt| StatementKind::of(stmt) == StatementKind::Transaction);
        if let Some(index) = control {
            return Err(StoreError::TransactionControl {
                index,
                keyword: leading_keyword(statements[index]).unwrap_or_default(),
            });
        }
        run_statements(self.conn, &statements)
    }

    fn kv_get(&self, key: &str) -> StoreResult<Option<i64>> {
        kv_get(self.conn, self.kv_table, key)
    }

    fn kv_put(&self, key: &str, value: i64) -> StoreResult<()> {
        kv_put(self.conn, self.kv_table, key, value)
    }
}

/// Auto-commit access outside of a transaction
impl SqlStorage for DuckDbStore {
    fn exec(&self, sql: &str) -> StoreResult<ExecStats> {
        let statements = split_statements(sql)?;
        let conn = self.lock()?;
        run_statements(&conn, &statements)
    }

    fn kv_get(&self, key: &str) -> StoreResult<Option<i64>> {
        let conn = self.lock()?;
        kv_get(&conn, &self.kv_table, key)
    }

    fn kv_put(&self, key: &str, value: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        kv_put(&conn, &self.kv_table, key, value)
    }
}

impl TransactionalStore for DuckDbStore {
    fn get_marker(&self, key: &str) -> StoreResult<Option<i64>> {
        SqlStorage::kv_get(self, key)
    }

    fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SqlStorage) -> Result<T, E>,
        E: From<StoreError>,
    {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| StoreError::TransactionError(format!("BEGIN failed: {e}")))?;

        let scope = TxnScope {
            conn: &conn,
            kv_table: &self.kv_table,
        };
        let result = body(&scope);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = conn.execute_batch("COMMIT") {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(StoreError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    ))
                    .into());
                }
            }
            Err(_) => {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    log::warn!("ROLLBACK failed: {rollback_err}");
                }
            }
        }
        result
    }
}

#[async_trait]
impl AsyncTransactionalStore for DuckDbStore {
    async fn get_marker(&self, key: &str) -> StoreResult<Option<i64>> {
        TransactionalStore::get_marker(self, key)
    }

    async fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SqlStorage) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send,
    {
        TransactionalStore::transaction(self, body)
    }
}

/// Execute each statement in order, summing per-statement counters.
///
/// Query rows are drained and count towards `rows_read`. Rows returned by
/// `RETURNING` are the changed rows and count towards `rows_written`, as
/// does the changed-row count of every other statement.
fn run_statements(conn: &Connection, statements: &[&str]) -> StoreResult<ExecStats> {
    let mut stats = ExecStats::default();
    for (index, &stmt) in statements.iter().enumerate() {
        let result = match StatementKind::of(stmt) {
            StatementKind::Query => drain_rows(conn, stmt).map(|n| ExecStats::new(n, 0)),
            StatementKind::Returning => drain_rows(conn, stmt).map(|n| ExecStats::new(0, n)),
            StatementKind::Command | StatementKind::Transaction => conn
                .execute(stmt, [])
                .map(|n| ExecStats::new(0, n as u64)),
        };
        stats += result.map_err(|e| StoreError::ExecutionError {
            index,
            message: e.to_string(),
        })?;
    }
    Ok(stats)
}

fn drain_rows(conn: &Connection, stmt: &str) -> duckdb::Result<u64> {
    let mut prepared = conn.prepare(stmt)?;
    let mut rows = prepared.query([])?;
    let mut count = 0;
    while rows.next()?.is_some() {
        count += 1;
    }
    Ok(count)
}

fn relation_exists(conn: &Connection, name: &str) -> StoreResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = ?",
        duckdb::params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn kv_get(conn: &Connection, table: &str, key: &str) -> StoreResult<Option<i64>> {
    let kv_err = |e: duckdb::Error| StoreError::KvError {
        key: key.to_string(),
        message: e.to_string(),
    };

    if !relation_exists(conn, table)? {
        return Ok(None);
    }

    let sql = format!("SELECT value FROM {} WHERE key = ?", quote_ident(table));
    let mut stmt = conn.prepare(&sql).map_err(kv_err)?;
    let mut rows = stmt.query(duckdb::params![key]).map_err(kv_err)?;
    let value = match rows.next().map_err(kv_err)? {
        Some(row) => Some(row.get(0).map_err(kv_err)?),
        None => None,
    };
    Ok(value)
}

fn kv_put(conn: &Connection, table: &str, key: &str, value: i64) -> StoreResult<()> {
    let kv_err = |e: duckdb::Error| StoreError::KvError {
        key: key.to_string(),
        message: e.to_string(),
    };
    let table = quote_ident(table);

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (key VARCHAR PRIMARY KEY, value BIGINT NOT NULL)"
    ))
    .map_err(kv_err)?;
    conn.execute(
        &format!("INSERT OR REPLACE INTO {table} (key, value) VALUES (?, ?)"),
        duckdb::params![key, value],
    )
    .map_err(kv_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
