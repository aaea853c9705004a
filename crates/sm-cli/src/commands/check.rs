//! Check command implementation

use anyhow::{Context, Result};
use sm_core::{Migration, MigrationSet};
use sm_sql::SqlParser;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::ExitCode;
use crate::context::ProjectContext;

/// Result of checking one migration
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CheckOutcome {
    /// Static SQL parsed into this many statements
    Parsed(usize),
    /// SQL is supplied at run time
    Generated,
    Failed(String),
}

/// Execute the check command
pub(crate) async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    println!("Checking migrations for: {}\n", ctx.manifest.name);

    let set = MigrationSet::new(ctx.migrations()?).context("Invalid migration list")?;
    let parser = SqlParser::duckdb();

    let mut errors = 0;
    let mut generated = 0;
    for migration in &set {
        let outcome = check_migration(&parser, migration, args.strict);
        match &outcome {
            CheckOutcome::Parsed(count) => println!(
                "  ✓ {} {} ({} statement{})",
                migration.id,
                migration.description,
                count,
                if *count == 1 { "" } else { "s" }
            ),
            CheckOutcome::Generated => {
                generated += 1;
                println!(
                    "  - {} {} (SQL supplied at run time)",
                    migration.id, migration.description
                );
            }
            CheckOutcome::Failed(message) => {
                errors += 1;
                println!("  ✗ {} {}: {}", migration.id, migration.description, message);
            }
        }
    }

    println!(
        "\n{} migration(s), {} generated, {} error(s)",
        set.len(),
        generated,
        errors
    );

    if errors > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Syntax-check one migration's static SQL
pub(crate) fn check_migration(
    parser: &SqlParser,
    migration: &Migration,
    strict: bool,
) -> CheckOutcome {
    match &migration.sql {
        Some(sql) => match parser.check(sql) {
            Ok(count) => CheckOutcome::Parsed(count),
            Err(e) => CheckOutcome::Failed(e.to_string()),
        },
        None if strict => CheckOutcome::Failed("no static SQL (--strict)".to_string()),
        None => CheckOutcome::Generated,
    }
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
