//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sm_core::{Migration, MigrationSet};
use sm_migrate::{RunnerOptions, SchemaMigrations};
use sm_store::DuckDbStore;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{format_ids, format_marker, print_table, TenantStatus};
use crate::context::ProjectContext;

/// Migration state of one tenant
#[derive(Debug, Serialize)]
pub(crate) struct TenantReport {
    pub tenant: String,
    pub status: TenantStatus,
    pub marker: Option<i64>,
    pub pending: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let migrations = ctx.migrations()?;
    let set = MigrationSet::new(migrations.clone()).context("Invalid migration list")?;
    let tenants = ctx.select_tenants(&args.tenants)?;

    let mut reports = Vec::with_capacity(tenants.len());
    for tenant in tenants {
        let report = match ctx.open_existing_tenant(&tenant)? {
            None => TenantReport {
                tenant,
                status: TenantStatus::NotCreated,
                marker: None,
                pending: set.iter().map(|m| m.id).collect(),
                error: None,
            },
            Some(store) => inspect_tenant(tenant, &store, &migrations, ctx.runner_options()),
        };
        reports.push(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "{}: {} migration(s), latest id {}\n",
        ctx.manifest.name,
        set.len(),
        format_marker(set.last_id())
    );
    if reports.is_empty() {
        println!("No tenant databases in {}", ctx.data_dir.display());
        return Ok(());
    }

    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.tenant.clone(),
                r.status.to_string(),
                format_marker(r.marker),
                r.error.clone().unwrap_or_else(|| format_ids(&r.pending)),
            ]
        })
        .collect();
    print_table(&["TENANT", "STATUS", "MARKER", "PENDING"], &rows);
    Ok(())
}

/// Read the marker of an existing tenant database and compute what is
/// pending. Nothing is written.
pub(crate) fn inspect_tenant(
    tenant: String,
    store: &DuckDbStore,
    migrations: &[Migration],
    options: RunnerOptions,
) -> TenantReport {
    let inspected = SchemaMigrations::with_options(store, migrations.to_vec(), options)
        .and_then(|mut runner| Ok((runner.current_marker()?, runner.pending_ids()?)));

    match inspected {
        Ok((marker, pending)) => TenantReport {
            tenant,
            status: if pending.is_empty() {
                TenantStatus::UpToDate
            } else {
                TenantStatus::Pending
            },
            marker,
            pending,
            error: None,
        },
        Err(e) => {
            log::warn!("Could not inspect tenant '{tenant}': {e}");
            TenantReport {
                tenant,
                status: TenantStatus::Error,
                marker: None,
                pending: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
