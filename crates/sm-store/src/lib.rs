//! sm-store - Transactional embedded store for shardmig
//!
//! This crate defines the storage capability the migration runner consumes
//! (statement execution with row counters, an all-or-nothing transaction
//! scope, and a small durable key-value slot) and binds it to DuckDB.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::{DuckDbStore, StoreOptions, DEFAULT_KV_TABLE};
pub use error::{StoreError, StoreResult};
pub use traits::{AsyncTransactionalStore, ExecStats, SqlStorage, TransactionalStore};
