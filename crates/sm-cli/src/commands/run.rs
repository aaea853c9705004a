//! Run command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sm_core::{Migration, MigrationSet};
use sm_migrate::{AsyncSchemaMigrations, MigrationStats, RunnerOptions, SqlGenerator};
use sm_store::DuckDbStore;
use std::path::Path;
use std::time::Instant;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{format_ids, format_marker, ExitCode, TenantStatus};
use crate::context::{GeneratedSql, ProjectContext};

/// Result of migrating one tenant
#[derive(Debug, Serialize)]
pub(crate) struct TenantRunResult {
    pub tenant: String,
    pub status: TenantStatus,
    pub applied: Vec<i64>,
    pub rows_read: u64,
    pub rows_written: u64,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TenantRunResult {
    fn skipped(tenant: String) -> Self {
        Self {
            tenant,
            status: TenantStatus::Skipped,
            applied: Vec::new(),
            rows_read: 0,
            rows_written: 0,
            duration_secs: 0.0,
            error: None,
        }
    }
}

/// JSON envelope for `run --json`
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    elapsed_secs: f64,
    success_count: usize,
    failure_count: usize,
    results: &'a [TenantRunResult],
}

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let start = Instant::now();
    let ctx = ProjectContext::load(global)?;
    let migrations = ctx.migrations()?;
    let set = MigrationSet::new(migrations.clone()).context("Invalid migration list")?;

    let generated = args
        .sql_gen_dir
        .as_deref()
        .map(|dir| GeneratedSql::load(Path::new(dir)))
        .transpose()?;
    if let Some(generated) = &generated {
        log::debug!("Loaded generator SQL for {} migration(s)", generated.len());
    }
    let lookup = |id: i64| generated.as_ref().and_then(|g| g.get(id));

    let tenants = ctx.select_tenants(&args.tenants)?;
    if tenants.is_empty() {
        println!(
            "No tenants to migrate in {} (name them with --tenants)",
            ctx.data_dir.display()
        );
        return Ok(());
    }

    if !args.json {
        println!(
            "Migrating {} tenant(s) to migration {}\n",
            tenants.len(),
            format_marker(set.last_id())
        );
    }

    let mut results = Vec::with_capacity(tenants.len());
    let mut stopped = false;
    for tenant in tenants {
        if stopped {
            results.push(TenantRunResult::skipped(tenant));
            continue;
        }

        let tenant_start = Instant::now();
        let outcome = match ctx.open_tenant(&tenant) {
            Ok(store) => {
                migrate_tenant(&store, &migrations, ctx.runner_options(), Some(&lookup)).await
            }
            Err(e) => Err(e),
        };
        let result = tenant_result(tenant, outcome, tenant_start.elapsed().as_secs_f64());

        if !args.json {
            print_result(&result);
        }
        if result.status == TenantStatus::Error && args.fail_fast {
            stopped = true;
            if !args.json {
                println!("\n  Stopping due to --fail-fast");
            }
        }
        results.push(result);
    }

    let failure_count = results
        .iter()
        .filter(|r| r.status == TenantStatus::Error)
        .count();
    let success_count = results
        .iter()
        .filter(|r| matches!(r.status, TenantStatus::Migrated | TenantStatus::UpToDate))
        .count();

    if args.json {
        let summary = RunSummary {
            elapsed_secs: start.elapsed().as_secs_f64(),
            success_count,
            failure_count,
            results: &results,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "\nCompleted: {} succeeded, {} failed ({:.2}s)",
            success_count,
            failure_count,
            start.elapsed().as_secs_f64()
        );
    }

    if failure_count > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Apply pending migrations to one tenant's store
pub(crate) async fn migrate_tenant(
    store: &DuckDbStore,
    migrations: &[Migration],
    options: RunnerOptions,
    generator: Option<SqlGenerator<'_>>,
) -> Result<MigrationStats> {
    let mut runner = AsyncSchemaMigrations::with_options(store, migrations.to_vec(), options)?;
    let stats = runner.run_all(generator).await?;
    Ok(stats)
}

fn tenant_result(
    tenant: String,
    outcome: Result<MigrationStats>,
    duration_secs: f64,
) -> TenantRunResult {
    match outcome {
        Ok(stats) => TenantRunResult {
            tenant,
            status: if stats.applied.is_empty() {
                TenantStatus::UpToDate
            } else {
                TenantStatus::Migrated
            },
            applied: stats.applied,
            rows_read: stats.rows_read,
            rows_written: stats.rows_written,
            duration_secs,
            error: None,
        },
        Err(e) => {
            log::warn!("Tenant '{tenant}' failed: {e:#}");
            TenantRunResult {
                tenant,
                status: TenantStatus::Error,
                applied: Vec::new(),
                rows_read: 0,
                rows_written: 0,
                duration_secs,
                error: Some(format!("{e:#}")),
            }
        }
    }
}

fn print_result(result: &TenantRunResult) {
    match result.status {
        TenantStatus::Migrated => println!(
            "  ✓ {} applied [{}] ({} rows read, {} rows written) [{}ms]",
            result.tenant,
            format_ids(&result.applied),
            result.rows_read,
            result.rows_written,
            (result.duration_secs * 1000.0) as u64
        ),
        TenantStatus::Error => println!(
            "  ✗ {} - {}",
            result.tenant,
            result.error.as_deref().unwrap_or("unknown error")
        ),
        _ => println!("  - {} {}", result.tenant, result.status),
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
