//! In-memory store used by the runner unit tests.
//!
//! Every statement reports one row read and three rows written, so the
//! counters a batch produces are predictable. A statement containing the
//! configured failure text fails, and the whole transaction is discarded.

use async_trait::async_trait;
use sm_store::{
    AsyncTransactionalStore, ExecStats, SqlStorage, StoreError, StoreResult, TransactionalStore,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) const READ_PER_STATEMENT: u64 = 1;
pub(crate) const WRITTEN_PER_STATEMENT: u64 = 3;

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeState {
    pub kv: HashMap<String, i64>,
    pub executed: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<FakeState>,
    fail_on: Option<String>,
    marker_reads: AtomicUsize,
    transactions: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_marker(self, key: &str, value: i64) -> Self {
        self.state.lock().unwrap().kv.insert(key.to_string(), value);
        self
    }

    pub fn snapshot(&self) -> FakeState {
        self.state.lock().unwrap().clone()
    }

    pub fn marker(&self, key: &str) -> Option<i64> {
        self.state.lock().unwrap().kv.get(key).copied()
    }

    pub fn marker_reads(&self) -> usize {
        self.marker_reads.load(Ordering::SeqCst)
    }

    pub fn transactions(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    fn read_marker(&self, key: &str) -> StoreResult<Option<i64>> {
        self.marker_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.marker(key))
    }

    fn run<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SqlStorage) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        let working = self.snapshot();
        let scope = FakeScope {
            state: RefCell::new(working),
            fail_on: self.fail_on.as_deref(),
        };
        let result = body(&scope)?;
        *self.state.lock().unwrap() = scope.state.into_inner();
        Ok(result)
    }
}

struct FakeScope<'a> {
    state: RefCell<FakeState>,
    fail_on: Option<&'a str>,
}

impl SqlStorage for FakeScope<'_> {
    fn exec(&self, sql: &str) -> StoreResult<ExecStats> {
        let mut stats = ExecStats::default();
        for (index, stmt) in sm_sql::split_statements(sql)?.into_iter().enumerate() {
            if self.fail_on.is_some_and(|text| stmt.contains(text)) {
                return Err(StoreError::ExecutionError {
                    index,
                    message: format!("forced failure: {stmt}"),
                });
            }
            self.state.borrow_mut().executed.push(stmt.to_string());
            stats += ExecStats::new(READ_PER_STATEMENT, WRITTEN_PER_STATEMENT);
        }
        Ok(stats)
    }

    fn kv_get(&self, key: &str) -> StoreResult<Option<i64>> {
        Ok(self.state.borrow().kv.get(key).copied())
    }

    fn kv_put(&self, key: &str, value: i64) -> StoreResult<()> {
        self.state.borrow_mut().kv.insert(key.to_string(), value);
        Ok(())
    }
}

impl TransactionalStore for FakeStore {
    fn get_marker(&self, key: &str) -> StoreResult<Option<i64>> {
        self.read_marker(key)
    }

    fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SqlStorage) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.run(body)
    }
}

#[async_trait]
impl AsyncTransactionalStore for FakeStore {
    async fn get_marker(&self, key: &str) -> StoreResult<Option<i64>> {
        self.read_marker(key)
    }

    async fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SqlStorage) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send,
    {
        self.run(body)
    }
}
