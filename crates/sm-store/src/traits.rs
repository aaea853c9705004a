//! Transactional embedded store traits
//!
//! The store comes in two flavours that share one contract: a synchronous
//! transaction scope ([`TransactionalStore`]) and an awaitable one
//! ([`AsyncTransactionalStore`]). In both, the unit of work itself is a
//! synchronous closure over [`SqlStorage`] that runs to completion without
//! interleaving other operations on the same store.

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::ops::AddAssign;

/// Row counters reported by the engine for executed statements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecStats {
    pub rows_read: u64,
    pub rows_written: u64,
}

impl ExecStats {
    pub fn new(rows_read: u64, rows_written: u64) -> Self {
        Self {
            rows_read,
            rows_written,
        }
    }
}

impl AddAssign for ExecStats {
    fn add_assign(&mut self, rhs: Self) {
        self.rows_read += rhs.rows_read;
        self.rows_written += rhs.rows_written;
    }
}

/// Operations available inside a transaction scope
pub trait SqlStorage {
    /// Execute one or more `;`-separated statements.
    ///
    /// Result rows are fully drained so the counters are complete.
    fn exec(&self, sql: &str) -> StoreResult<ExecStats>;

    /// Read an integer from the durable key-value slot
    fn kv_get(&self, key: &str) -> StoreResult<Option<i64>>;

    /// Write an integer to the durable key-value slot
    fn kv_put(&self, key: &str, value: i64) -> StoreResult<()>;
}

/// Store with a synchronous all-or-nothing transaction scope
pub trait TransactionalStore {
    /// Read a marker outside of any transaction
    fn get_marker(&self, key: &str) -> StoreResult<Option<i64>>;

    /// Run `body` in a transaction: commit when it returns `Ok`, roll back
    /// when it returns `Err`.
    fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SqlStorage) -> Result<T, E>,
        E: From<StoreError>;
}

/// Store with an awaitable transaction scope
#[async_trait]
pub trait AsyncTransactionalStore: Send + Sync {
    /// Read a marker outside of any transaction
    async fn get_marker(&self, key: &str) -> StoreResult<Option<i64>>;

    /// Run `body` in a transaction: commit when it returns `Ok`, roll back
    /// when it returns `Err`.
    async fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SqlStorage) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send;
}
