//! Error types for sm-store

use thiserror::Error;

/// Embedded store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed at statement {index}: {message}")]
    ExecutionError { index: usize, message: String },

    /// Transaction management error (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// Key-value slot error (D004)
    #[error("[D004] Key-value access failed for '{key}': {message}")]
    KvError { key: String, message: String },

    /// Statement text could not be split (D005)
    #[error("[D005] Could not split SQL into statements: {0}")]
    Split(#[from] sm_sql::SqlError),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// DuckDB driver error with preserved source chain (D007)
    #[error("[D007] DuckDB error: {0}")]
    DuckDb(#[source] duckdb::Error),

    /// Transaction control inside a managed transaction (D008)
    #[error("[D008] Statement {index} ({keyword}) would end the enclosing transaction; migration SQL may not control transactions")]
    TransactionControl { index: usize, keyword: String },
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl From<duckdb::Error> for StoreError {
    fn from(err: duckdb::Error) -> Self {
        StoreError::DuckDb(err)
    }
}
