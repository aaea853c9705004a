//! Manifest types and parsing for shardmig.yml

use crate::error::{CoreError, CoreResult};
use crate::migration::Migration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Key under which the last applied migration id is stored by default
pub const DEFAULT_MARKER_KEY: &str = "__sql_migrations_lastID";

/// Default directory holding one database file per tenant
pub const DEFAULT_DATA_DIR: &str = "tenants";

/// Manifest file names searched by [`Manifest::load_from_dir`], in order
pub const MANIFEST_FILE_NAMES: &[&str] = &["shardmig.yml", "shardmig.yaml"];

/// Project manifest from shardmig.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Project name
    pub name: String,

    /// Directory containing one `<tenant>.duckdb` file per tenant
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Override for the marker key
    #[serde(default)]
    pub marker_key: Option<String>,

    /// Override for the key-value table the marker is stored in
    #[serde(default)]
    pub kv_table: Option<String>,

    /// What to do when the stored marker matches no known migration
    #[serde(default)]
    pub unknown_marker: UnknownMarkerPolicy,

    /// Every migration ever authored for this schema, in any order
    #[serde(default)]
    pub migrations: Vec<MigrationEntry>,
}

/// One migration as written in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationEntry {
    /// Monotonic migration id
    pub id: i64,

    /// Free text description
    #[serde(default)]
    pub description: String,

    /// Inline SQL
    #[serde(default)]
    pub sql: Option<String>,

    /// SQL file, relative to the manifest directory
    #[serde(default)]
    pub file: Option<String>,
}

/// Handling of a stored marker that matches no migration id.
///
/// This happens when the marker is stale or corrupted, or when the list
/// was edited to drop an applied id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMarkerPolicy {
    /// Run the full migration set again (compatible default)
    #[default]
    RerunAll,
    /// Refuse to run anything
    Fail,
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

impl Manifest {
    /// Load a manifest from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let manifest: Manifest = serde_yaml::from_str(&content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load the manifest from a project directory
    /// Looks for shardmig.yml or shardmig.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        MANIFEST_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
            .map_or_else(
                || {
                    Err(CoreError::ManifestNotFound {
                        path: dir.join(MANIFEST_FILE_NAMES[0]).display().to_string(),
                    })
                },
                |p| Self::load(&p),
            )
    }

    /// Validate the manifest.
    ///
    /// Migration ids are not checked here; [`crate::MigrationSet::new`]
    /// owns that.
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ManifestInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.data_dir.trim().is_empty() {
            return Err(CoreError::ManifestInvalid {
                message: "data_dir cannot be empty".to_string(),
            });
        }

        if matches!(self.marker_key.as_deref(), Some(k) if k.trim().is_empty()) {
            return Err(CoreError::ManifestInvalid {
                message: "marker_key cannot be empty".to_string(),
            });
        }

        if matches!(self.kv_table.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(CoreError::ManifestInvalid {
                message: "kv_table cannot be empty".to_string(),
            });
        }

        for entry in &self.migrations {
            if entry.sql.is_some() && entry.file.is_some() {
                return Err(CoreError::ManifestInvalid {
                    message: format!(
                        "Migration {} sets both 'sql' and 'file'; pick one",
                        entry.id
                    ),
                });
            }
        }

        Ok(())
    }

    /// Marker key to use, falling back to [`DEFAULT_MARKER_KEY`]
    pub fn marker_key(&self) -> &str {
        self.marker_key.as_deref().unwrap_or(DEFAULT_MARKER_KEY)
    }

    /// Absolute data directory relative to a project root
    pub fn data_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }

    /// Turn manifest entries into migrations, reading `file` entries
    /// relative to `root`.
    ///
    /// Entries with neither `sql` nor `file` become generated migrations.
    pub fn resolve_migrations(&self, root: &Path) -> CoreResult<Vec<Migration>> {
        self.migrations
            .iter()
            .map(|entry| {
                let sql = match (&entry.sql, &entry.file) {
                    (Some(sql), _) => Some(sql.clone()),
                    (None, Some(file)) => {
                        let path = root.join(file);
                        let text = std::fs::read_to_string(&path).map_err(|e| {
                            CoreError::MigrationFileError {
                                id: entry.id,
                                path: path.display().to_string(),
                                source: e,
                            }
                        })?;
                        log::debug!("Loaded migration {} from {}", entry.id, path.display());
                        Some(text)
                    }
                    (None, None) => None,
                };
                Ok(Migration {
                    id: entry.id,
                    description: entry.description.clone(),
                    sql,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
