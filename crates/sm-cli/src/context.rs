//! Runtime context for CLI commands

use anyhow::{bail, Context, Result};
use sm_core::{Manifest, Migration};
use sm_migrate::RunnerOptions;
use sm_store::{DuckDbStore, StoreOptions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// File extension of tenant databases in the data dir
pub(crate) const TENANT_DB_EXTENSION: &str = "duckdb";

/// Loaded manifest plus the paths derived from it
pub(crate) struct ProjectContext {
    /// Directory that `file` entries and the data dir are relative to
    pub root: PathBuf,

    pub manifest: Manifest,

    /// Directory holding `<tenant>.duckdb` files
    pub data_dir: PathBuf,
}

impl ProjectContext {
    /// Load the manifest named by the global arguments
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let (manifest, root) = match &args.config {
            Some(path) => {
                let path = Path::new(path);
                let manifest = Manifest::load(path).context("Failed to load manifest file")?;
                let root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (manifest, root)
            }
            None => {
                let root = PathBuf::from(&args.project_dir);
                let manifest =
                    Manifest::load_from_dir(&root).context("Failed to load project manifest")?;
                (manifest, root)
            }
        };

        let data_dir = match &args.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => manifest.data_dir_absolute(&root),
        };
        log::debug!(
            "Loaded manifest '{}' with {} migration(s), data dir {}",
            manifest.name,
            manifest.migrations.len(),
            data_dir.display()
        );

        Ok(Self {
            root,
            manifest,
            data_dir,
        })
    }

    /// Migrations from the manifest, with `file` entries read
    pub fn migrations(&self) -> Result<Vec<Migration>> {
        self.manifest
            .resolve_migrations(&self.root)
            .context("Failed to read migration files")
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            marker_key: self.manifest.marker_key().to_string(),
            unknown_marker: self.manifest.unknown_marker,
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        match &self.manifest.kv_table {
            Some(kv_table) => StoreOptions {
                kv_table: kv_table.clone(),
            },
            None => StoreOptions::default(),
        }
    }

    /// Path of a tenant's database file
    pub fn tenant_db_path(&self, tenant: &str) -> PathBuf {
        self.data_dir.join(format!("{tenant}.{TENANT_DB_EXTENSION}"))
    }

    /// Every tenant with a database in the data dir, sorted by name
    pub fn discover_tenants(&self) -> Result<Vec<String>> {
        if !self.data_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.data_dir)
            .with_context(|| format!("Failed to read data dir {}", self.data_dir.display()))?;
        let mut tenants = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TENANT_DB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tenants.push(stem.to_string());
            }
        }
        tenants.sort();
        Ok(tenants)
    }

    /// Tenants named on the command line, or every discovered tenant
    pub fn select_tenants(&self, tenants_arg: &Option<String>) -> Result<Vec<String>> {
        let Some(list) = tenants_arg else {
            return self.discover_tenants();
        };

        let mut tenants = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            validate_tenant_name(name)?;
            if !tenants.iter().any(|t| t == name) {
                tenants.push(name.to_string());
            }
        }
        Ok(tenants)
    }

    /// Open a tenant's database, creating the file and data dir if needed
    pub fn open_tenant(&self, tenant: &str) -> Result<DuckDbStore> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create data dir {}", self.data_dir.display()))?;
        let path = self.tenant_db_path(tenant);
        let store = DuckDbStore::from_path(&path)
            .with_context(|| format!("Failed to open tenant database {}", path.display()))?;
        Ok(store.with_options(self.store_options()))
    }

    /// Open a tenant's database only if it already exists
    pub fn open_existing_tenant(&self, tenant: &str) -> Result<Option<DuckDbStore>> {
        if !self.tenant_db_path(tenant).is_file() {
            return Ok(None);
        }
        self.open_tenant(tenant).map(Some)
    }
}

fn validate_tenant_name(name: &str) -> Result<()> {
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !name.starts_with('.');
    if !valid {
        bail!("Invalid tenant name '{name}': use letters, digits, '_', '-' or '.'");
    }
    Ok(())
}

/// SQL for generated migrations, keyed by id
#[derive(Debug, Default)]
pub(crate) struct GeneratedSql {
    by_id: BTreeMap<i64, String>,
}

impl GeneratedSql {
    /// Read `<id>.sql` and `<id>_<name>.sql` files from `dir`.
    ///
    /// Other files are ignored; two files for the same id are an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read SQL generator dir {}", dir.display()))?;

        let mut by_id = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            let Some(id) = generated_file_id(&path) else {
                continue;
            };
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if by_id.insert(id, sql).is_some() {
                bail!(
                    "More than one SQL file for migration {id} in {}",
                    dir.display()
                );
            }
            log::debug!("Generator SQL for migration {id} from {}", path.display());
        }
        Ok(Self { by_id })
    }

    pub fn get(&self, id: i64) -> Option<String> {
        self.by_id.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

fn generated_file_id(path: &Path) -> Option<i64> {
    if path.extension().and_then(|e| e.to_str()) != Some("sql") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.split_once('_').map_or(stem, |(id, _)| id);
    digits.parse().ok()
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
