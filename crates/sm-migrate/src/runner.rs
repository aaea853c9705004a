//! Synchronous migration runner

use crate::error::MigrateResult;
use crate::plan::{apply_batch, resolve, MigrationStats, Plan, RunnerOptions, SqlGenerator};
use sm_core::{Migration, MigrationSet};
use sm_store::TransactionalStore;

/// Applies an ordered migration list to one store.
///
/// The stored marker is read on first use and cached for the lifetime of
/// the runner. Every `run_all` applies the pending suffix in a single
/// transaction, so either all of it lands together with the new marker or
/// none of it does.
pub struct SchemaMigrations<'s, S: TransactionalStore> {
    store: &'s S,
    plan: Plan,
}

impl<'s, S: TransactionalStore> SchemaMigrations<'s, S> {
    /// Bind `migrations` to `store` using the default marker key.
    ///
    /// Fails on negative or duplicate ids. No store I/O happens here.
    pub fn new(store: &'s S, migrations: Vec<Migration>) -> MigrateResult<Self> {
        Self::with_options(store, migrations, RunnerOptions::default())
    }

    /// Bind `migrations` to `store` with explicit options.
    pub fn with_options(
        store: &'s S,
        migrations: Vec<Migration>,
        options: RunnerOptions,
    ) -> MigrateResult<Self> {
        Ok(Self {
            store,
            plan: Plan::new(migrations, options)?,
        })
    }

    /// The validated migrations in ascending id order
    pub fn migrations(&self) -> &MigrationSet {
        self.plan.migrations()
    }

    /// Id of the last applied migration, reading the marker if needed
    pub fn current_marker(&mut self) -> MigrateResult<Option<i64>> {
        if let Some(marker) = self.plan.cached_marker() {
            return Ok(marker);
        }
        let marker = self.store.get_marker(self.plan.marker_key())?;
        self.plan.cache_marker(marker);
        Ok(marker)
    }

    /// True when the list is non-empty and the marker is absent or below
    /// the highest id.
    pub fn has_migrations_to_run(&mut self) -> MigrateResult<bool> {
        if self.plan.migrations().is_empty() {
            return Ok(false);
        }
        let marker = self.current_marker()?;
        Ok(self.plan.has_pending(marker))
    }

    /// Ids `run_all` would apply right now
    pub fn pending_ids(&mut self) -> MigrateResult<Vec<i64>> {
        let marker = self.current_marker()?;
        Ok(self.plan.pending(marker)?.iter().map(|m| m.id).collect())
    }

    /// Apply every pending migration in one transaction.
    ///
    /// Migrations without static SQL take their text from `generator`.
    /// Returns zeroed stats when nothing is pending. On failure nothing is
    /// applied and the marker is left unchanged.
    pub fn run_all(
        &mut self,
        generator: Option<SqlGenerator<'_>>,
    ) -> MigrateResult<MigrationStats> {
        if !self.has_migrations_to_run()? {
            log::debug!("No pending migrations");
            return Ok(MigrationStats::default());
        }
        let marker = self.current_marker()?;
        let pending = self.plan.pending(marker)?;

        let batch = resolve(pending, generator)?;
        let marker_key = self.plan.marker_key();
        let stats = self
            .store
            .transaction(|tx| apply_batch(tx, &batch, marker_key))?;

        log::info!(
            "Applied {} migration(s), marker now {:?} ({} rows read, {} rows written)",
            stats.applied.len(),
            stats.last_applied(),
            stats.rows_read,
            stats.rows_written
        );
        self.plan.record(&stats);
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
