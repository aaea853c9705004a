//! Awaitable migration runner
//!
//! Same semantics as [`crate::SchemaMigrations`], bound to a store whose
//! marker read and transaction scope are awaited. SQL for the whole batch
//! is resolved before the transaction opens, so the unit of work itself
//! never awaits.

use crate::error::MigrateResult;
use crate::plan::{apply_batch, resolve, MigrationStats, Plan, RunnerOptions, SqlGenerator};
use sm_core::{Migration, MigrationSet};
use sm_store::AsyncTransactionalStore;

/// Applies an ordered migration list to one awaitable store.
pub struct AsyncSchemaMigrations<'s, S: AsyncTransactionalStore> {
    store: &'s S,
    plan: Plan,
}

impl<'s, S: AsyncTransactionalStore> AsyncSchemaMigrations<'s, S> {
    /// Bind `migrations` to `store` using the default marker key
    pub fn new(store: &'s S, migrations: Vec<Migration>) -> MigrateResult<Self> {
        Self::with_options(store, migrations, RunnerOptions::default())
    }

    /// Bind `migrations` to `store` with explicit options
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

    pub fn migrations(&self) -> &MigrationSet {
        self.plan.migrations()
    }

    pub async fn current_marker(&mut self) -> MigrateResult<Option<i64>> {
        if let Some(marker) = self.plan.cached_marker() {
            return Ok(marker);
        }
        let marker = self.store.get_marker(self.plan.marker_key()).await?;
        self.plan.cache_marker(marker);
        Ok(marker)
    }

    pub async fn has_migrations_to_run(&mut self) -> MigrateResult<bool> {
        if self.plan.migrations().is_empty() {
            return Ok(false);
        }
        let marker = self.current_marker().await?;
        Ok(self.plan.has_pending(marker))
    }

    pub async fn pending_ids(&mut self) -> MigrateResult<Vec<i64>> {
        let marker = self.current_marker().await?;
        Ok(self.plan.pending(marker)?.iter().map(|m| m.id).collect())
    }

    /// Apply every pending migration in one transaction
    pub async fn run_all(
        &mut self,
        generator: Option<SqlGenerator<'_>>,
    ) -> MigrateResult<MigrationStats> {
        if !self.has_migrations_to_run().await? {
            log::debug!("No pending migrations");
            return Ok(MigrationStats::default());
        }
        let marker = self.current_marker().await?;
        let pending = self.plan.pending(marker)?;

        let batch = resolve(pending, generator)?;
        let marker_key = self.plan.marker_key();
        let stats = self
            .store
            .transaction(|tx| apply_batch(tx, &batch, marker_key))
            .await?;

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
#[path = "async_runner_test.rs"]
mod tests;
