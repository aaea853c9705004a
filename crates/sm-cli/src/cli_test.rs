use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_run_args_parse() {
    let cli = Cli::try_parse_from([
        "shardmig",
        "-p",
        "proj",
        "run",
        "--tenants",
        "acme,globex",
        "--sql-gen-dir",
        "gen",
        "--fail-fast",
    ])
    .unwrap();

    assert_eq!(cli.global.project_dir, "proj");
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.tenants.as_deref(), Some("acme,globex"));
            assert_eq!(args.sql_gen_dir.as_deref(), Some("gen"));
            assert!(args.fail_fast);
            assert!(!args.json);
        }
        other => panic!("expected run, got {other:?}"),
    }
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["shardmig", "status", "--json", "-v", "--data-dir", "dbs"]).unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.data_dir.as_deref(), Some("dbs"));
    assert!(matches!(cli.command, Commands::Status(StatusArgs { json: true, .. })));
}
