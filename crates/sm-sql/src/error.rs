//! Error types for sm-sql

use thiserror::Error;

/// SQL splitting and parsing errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,

    /// Quote or comment never closed (S003)
    #[error("[S003] Unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
