//! Error types for sm-core

use thiserror::Error;

/// Core error type for shardmig
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Migration id below zero
    #[error("[C001] migration id cannot be negative: {id}")]
    NegativeMigrationId { id: i64 },

    /// C002: Two migrations share an id
    #[error("[C002] duplicate migration id detected: {id}")]
    DuplicateMigrationId { id: i64 },

    /// C003: Manifest file not found
    #[error("[C003] Manifest not found: {path}")]
    ManifestNotFound { path: String },

    /// C004: Failed to parse manifest file
    #[error("[C004] Failed to parse manifest: {message}")]
    ManifestParseError { message: String },

    /// C005: Invalid manifest value
    #[error("[C005] Invalid manifest: {message}")]
    ManifestInvalid { message: String },

    /// C006: Migration SQL file could not be read
    #[error("[C006] Failed to read SQL for migration {id} from {path}: {source}")]
    MigrationFileError {
        id: i64,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// C007: IO error with path context
    #[error("[C007] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ManifestParseError {
            message: err.to_string(),
        }
    }
}
