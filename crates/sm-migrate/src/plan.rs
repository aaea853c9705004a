//! Planning and batch application shared by both runner flavours.
//!
//! Everything here is independent of how the transaction scope is bound:
//! the synchronous and awaitable runners only differ in how they read the
//! marker and open the transaction.

use crate::error::{MigrateError, MigrateResult};
use sm_core::{Migration, MigrationSet, UnknownMarkerPolicy, DEFAULT_MARKER_KEY};
use sm_store::{ExecStats, SqlStorage};
use std::borrow::Cow;

/// Produces SQL at run time for migrations authored without static SQL.
///
/// Returning `None` (or blank text) for a pending migration fails the run.
pub type SqlGenerator<'g> = &'g (dyn Fn(i64) -> Option<String> + Sync);

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Key of the marker in the store's key-value slot
    pub marker_key: String,
    /// Handling of a stored marker that matches no migration id
    pub unknown_marker: UnknownMarkerPolicy,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            marker_key: DEFAULT_MARKER_KEY.to_string(),
            unknown_marker: UnknownMarkerPolicy::default(),
        }
    }
}

/// Outcome of one `run_all` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStats {
    /// Sum of rows read across every executed statement
    pub rows_read: u64,
    /// Sum of rows written across every executed statement
    pub rows_written: u64,
    /// Ids applied by this call, ascending
    pub applied: Vec<i64>,
}

impl MigrationStats {
    /// True when nothing was applied
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.rows_read == 0 && self.rows_written == 0
    }

    /// Id of the last migration applied by this call
    pub fn last_applied(&self) -> Option<i64> {
        self.applied.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerState {
    Unloaded,
    Loaded(Option<i64>),
}

/// A pending migration with its SQL text resolved
pub(crate) struct ResolvedMigration<'m> {
    id: i64,
    sql: Cow<'m, str>,
}

/// Sorted migrations plus the cached marker for one store.
pub(crate) struct Plan {
    migrations: MigrationSet,
    options: RunnerOptions,
    marker: MarkerState,
}

impl Plan {
    pub(crate) fn new(migrations: Vec<Migration>, options: RunnerOptions) -> MigrateResult<Self> {
        Ok(Self {
            migrations: MigrationSet::new(migrations)?,
            options,
            marker: MarkerState::Unloaded,
        })
    }

    pub(crate) fn migrations(&self) -> &MigrationSet {
        &self.migrations
    }

    pub(crate) fn marker_key(&self) -> &str {
        &self.options.marker_key
    }

    /// Marker value if it has been read already
    pub(crate) fn cached_marker(&self) -> Option<Option<i64>> {
        match self.marker {
            MarkerState::Unloaded => None,
            MarkerState::Loaded(marker) => Some(marker),
        }
    }

    pub(crate) fn cache_marker(&mut self, marker: Option<i64>) {
        self.marker = MarkerState::Loaded(marker);
    }

    /// Whether anything is left to apply given the stored marker
    pub(crate) fn has_pending(&self, marker: Option<i64>) -> bool {
        match (marker, self.migrations.last_id()) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(applied), Some(last)) => applied < last,
        }
    }

    /// Migrations after the stored marker.
    ///
    /// The suffix starts right after the migration whose id equals the
    /// marker. A marker that matches no id falls back to the full set under
    /// [`UnknownMarkerPolicy::RerunAll`]; under [`UnknownMarkerPolicy::Fail`]
    /// that fallback is refused when it would re-apply ids below the marker.
    pub(crate) fn pending(&self, marker: Option<i64>) -> MigrateResult<&[Migration]> {
        if !self.has_pending(marker) {
            return Ok(&[]);
        }
        let Some(marker) = marker else {
            return Ok(self.migrations.as_slice());
        };
        if let Some(rest) = self.migrations.after(marker) {
            return Ok(rest);
        }

        let below = self.migrations.iter().filter(|m| m.id < marker).count();
        if below > 0 {
            match self.options.unknown_marker {
                UnknownMarkerPolicy::RerunAll => log::warn!(
                    "Stored marker {marker} matches no migration id; re-applying all {} migrations, {below} of them below the marker",
                    self.migrations.len()
                ),
                UnknownMarkerPolicy::Fail => {
                    return Err(MigrateError::UnrecognizedMarker { marker, below })
                }
            }
        }
        Ok(self.migrations.as_slice())
    }

    /// Record a committed batch
    pub(crate) fn record(&mut self, stats: &MigrationStats) {
        if let Some(last) = stats.last_applied() {
            self.cache_marker(Some(last));
        }
    }
}

/// Resolve SQL for every pending migration before any of it runs.
///
/// Static SQL wins; the generator is only consulted for migrations
/// without it.
pub(crate) fn resolve<'m>(
    pending: &'m [Migration],
    generator: Option<SqlGenerator<'_>>,
) -> MigrateResult<Vec<ResolvedMigration<'m>>> {
    pending
        .iter()
        .map(|migration| {
            let sql = match &migration.sql {
                Some(sql) => Cow::Borrowed(sql.as_str()),
                None => generator
                    .and_then(|generate| generate(migration.id))
                    .map(Cow::Owned)
                    .ok_or(MigrateError::MissingSql { id: migration.id })?,
            };
            if sql.trim().is_empty() {
                return Err(MigrateError::MissingSql { id: migration.id });
            }
            Ok(ResolvedMigration {
                id: migration.id,
                sql,
            })
        })
        .collect()
}

/// Execute a resolved batch inside an open transaction scope and write the
/// marker last.
pub(crate) fn apply_batch(
    storage: &dyn SqlStorage,
    batch: &[ResolvedMigration<'_>],
    marker_key: &str,
) -> MigrateResult<MigrationStats> {
    let mut totals = ExecStats::default();
    let mut applied = Vec::with_capacity(batch.len());

    for migration in batch {
        log::debug!("Applying migration {}", migration.id);
        totals += storage
            .exec(&migration.sql)
            .map_err(|source| MigrateError::MigrationFailed {
                id: migration.id,
                source,
            })?;
        applied.push(migration.id);
    }

    if let Some(&last) = applied.last() {
        storage.kv_put(marker_key, last)?;
    }

    Ok(MigrationStats {
        rows_read: totals.rows_read,
        rows_written: totals.rows_written,
        applied,
    })
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
