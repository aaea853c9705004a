//! sm-migrate - Schema migration runner for shardmig
//!
//! Given an ordered list of migrations and a transactional embedded store,
//! the runner applies exactly the migrations after the stored marker, in
//! ascending id order, inside one transaction that also advances the
//! marker. Running the same list again is a no-op.
//!
//! [`SchemaMigrations`] binds to a store with a synchronous transaction
//! scope and [`AsyncSchemaMigrations`] to one whose scope is awaited.

pub mod async_runner;
pub mod error;
mod plan;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_support;

pub use async_runner::AsyncSchemaMigrations;
pub use error::{MigrateError, MigrateResult};
pub use plan::{MigrationStats, RunnerOptions, SqlGenerator};
pub use runner::SchemaMigrations;
pub use sm_core::{Migration, UnknownMarkerPolicy, DEFAULT_MARKER_KEY};
