//! Error types for the migration runner.

use sm_core::CoreError;
use sm_store::StoreError;
use thiserror::Error;

/// Migration runner errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The migration list failed validation at construction (M001).
    #[error("[M001] Invalid migration list: {0}")]
    Invalid(#[from] CoreError),

    /// A pending migration has no SQL and the generator produced none (M002).
    #[error("[M002] migration with neither 'sql' nor generated SQL provided: {id}")]
    MissingSql { id: i64 },

    /// The stored marker matches no migration and rerunning would re-apply
    /// older migrations (M003).
    #[error("[M003] Stored marker {marker} matches no migration id; refusing to re-apply {below} older migration(s)")]
    UnrecognizedMarker { marker: i64, below: usize },

    /// A migration's SQL failed; the whole batch was rolled back (M004).
    #[error("[M004] Migration {id} failed: {source}")]
    MigrationFailed {
        id: i64,
        #[source]
        source: StoreError,
    },

    /// Store error outside of migration SQL, e.g. reading or writing the
    /// marker (M005).
    #[error("[M005] Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
