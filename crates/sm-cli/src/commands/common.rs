//! Shared helpers for CLI commands

use serde::Serialize;
use std::fmt;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and open databases are closed.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs reports nothing for it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Outcome of one tenant in a multi-tenant command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TenantStatus {
    /// Database exists and nothing is pending
    UpToDate,
    /// Database exists and migrations are pending
    Pending,
    /// No database file yet
    NotCreated,
    /// Migrations applied by this command
    Migrated,
    Error,
    /// Not attempted because of --fail-fast
    Skipped,
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantStatus::UpToDate => write!(f, "up to date"),
            TenantStatus::Pending => write!(f, "pending"),
            TenantStatus::NotCreated => write!(f, "not created"),
            TenantStatus::Migrated => write!(f, "migrated"),
            TenantStatus::Error => write!(f, "error"),
            TenantStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Render an optional marker for table output
pub(crate) fn format_marker(marker: Option<i64>) -> String {
    marker.map_or_else(|| "-".to_string(), |id| id.to_string())
}

/// Render a list of ids compactly, e.g. `3, 4, 7`
pub(crate) fn format_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
///
/// For each column, returns the maximum width across the header and all
/// row values so that data aligns when printed with left-padding.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
/// Columns are separated by two spaces.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);
    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", render(headers.iter().map(|h| h.to_string()).collect()));
    println!("{}", render(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        println!("{}", render(row.clone()));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
