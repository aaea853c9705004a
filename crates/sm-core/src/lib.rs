//! sm-core - Core library for shardmig
//!
//! This crate provides the migration value types, the validated migration
//! set, and parsing of the `shardmig.yml` project manifest.

pub mod config;
pub mod error;
pub mod migration;

pub use config::{Manifest, MigrationEntry, UnknownMarkerPolicy, DEFAULT_MARKER_KEY};
pub use error::{CoreError, CoreResult};
pub use migration::{Migration, MigrationSet};
