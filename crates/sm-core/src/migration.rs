//! Migration values and the validated, ordered migration set.

use crate::error::{CoreError, CoreResult};
use std::collections::HashSet;

/// A single schema migration.
///
/// Once a migration has been applied to any live database its `id` and
/// `sql` must never change. Corrective changes go into a new migration
/// with a higher id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Position in the monotonic sequence. Must be non-negative.
    pub id: i64,
    /// Free text for the author; ignored by the runner.
    pub description: String,
    /// Statements to execute, possibly several separated by `;`.
    ///
    /// `None` means the text is produced at run time by a generator keyed
    /// by `id`.
    pub sql: Option<String>,
}

impl Migration {
    /// Create a migration with static SQL.
    pub fn new(id: i64, description: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            sql: Some(sql.into()),
        }
    }

    /// Create a migration whose SQL is supplied by a generator at run time.
    pub fn generated(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            sql: None,
        }
    }
}

/// Migrations sorted ascending by id, with unique non-negative ids.
///
/// Validation happens once, in [`MigrationSet::new`]; a set that exists is
/// always valid.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Sort and validate `migrations`.
    ///
    /// Fails on the first negative or repeated id in ascending order.
    pub fn new(mut migrations: Vec<Migration>) -> CoreResult<Self> {
        migrations.sort_by_key(|m| m.id);

        let mut seen = HashSet::with_capacity(migrations.len());
        for m in &migrations {
            if m.id < 0 {
                return Err(CoreError::NegativeMigrationId { id: m.id });
            }
            if !seen.insert(m.id) {
                return Err(CoreError::DuplicateMigrationId { id: m.id });
            }
        }

        Ok(Self { migrations })
    }

    /// Number of migrations in the set
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// True when the set holds no migrations
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Highest id in the set, if any
    pub fn last_id(&self) -> Option<i64> {
        self.migrations.last().map(|m| m.id)
    }

    /// Index of the migration with exactly this id
    pub fn position(&self, id: i64) -> Option<usize> {
        self.migrations.binary_search_by_key(&id, |m| m.id).ok()
    }

    /// Migrations strictly after the one with exactly `id`.
    ///
    /// Returns `None` when no migration has that id.
    pub fn after(&self, id: i64) -> Option<&[Migration]> {
        self.position(id).map(|idx| &self.migrations[idx + 1..])
    }

    /// All migrations in ascending id order
    pub fn as_slice(&self) -> &[Migration] {
        &self.migrations
    }

    /// Iterate migrations in ascending id order
    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
