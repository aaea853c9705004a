//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// shardmig - apply ordered schema migrations to per-tenant DuckDB databases
#[derive(Parser, Debug)]
#[command(name = "shardmig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override manifest file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the directory holding tenant databases
    #[arg(long, global = true, env = "SHARDMIG_DATA_DIR")]
    pub data_dir: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate migration ids and check static SQL syntax
    Check(CheckArgs),

    /// Show the applied marker and pending migrations per tenant
    Status(StatusArgs),

    /// Apply pending migrations to each tenant database
    Run(RunArgs),
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Treat migrations without static SQL as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Tenant names (comma-separated, default: every database in the data dir)
    #[arg(short, long)]
    pub tenants: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Tenant names (comma-separated, default: every database in the data dir)
    #[arg(short, long)]
    pub tenants: Option<String>,

    /// Directory of `<id>.sql` / `<id>_<name>.sql` files for migrations
    /// declared without SQL
    #[arg(long)]
    pub sql_gen_dir: Option<String>,

    /// Stop on the first failing tenant
    #[arg(long)]
    pub fail_fast: bool,

    /// Print JSON results instead of progress lines
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
