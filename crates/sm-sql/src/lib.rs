//! sm-sql - SQL utilities for shardmig
//!
//! Migration text may hold several statements separated by `;`. This crate
//! splits such text into individual statements without re-serializing them,
//! classifies each statement by its leading keyword, and offers a
//! sqlparser-based syntax check for authoring-time validation.

pub mod error;
pub mod parser;
pub mod split;

pub use error::{SqlError, SqlResult};
pub use parser::{quote_ident, SqlParser};
pub use split::{leading_keyword, split_statements, StatementKind};
