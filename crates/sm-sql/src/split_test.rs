use super::*;

#[test]
fn test_split_single_statement() {
    let stmts =
        split_statements("CREATE TABLE users(name TEXT PRIMARY KEY, age INTEGER);").unwrap();
    assert_eq!(
        stmts,
        vec!["CREATE TABLE users(name TEXT PRIMARY KEY, age INTEGER)"]
    );
}

#[test]
fn test_split_multiple_statements() {
    let sql = "INSERT INTO users VALUES ('ironman', 100); INSERT INTO users VALUES ('thor', 9000);";
    let stmts = split_statements(sql).unwrap();
    assert_eq!(
        stmts,
        vec![
            "INSERT INTO users VALUES ('ironman', 100)",
            "INSERT INTO users VALUES ('thor', 9000)",
        ]
    );
}

#[test]
fn test_split_without_trailing_semicolon() {
    let stmts = split_statements("SELECT 1; SELECT 2").unwrap();
    assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
}

#[test]
fn test_split_multiline_whitespace() {
    let sql = "
        CREATE TABLE IF NOT EXISTS marvel (heroName TEXT);
        CREATE TABLE IF NOT EXISTS marvelMovies (name TEXT PRIMARY KEY, releaseDateMs INTEGER);
        ";
    let stmts = split_statements(sql).unwrap();
    assert_eq!(stmts.len(), 2);
    assert!(stmts[1].starts_with("CREATE TABLE IF NOT EXISTS marvelMovies"));
}

#[test]
fn test_semicolon_in_string_literal() {
    let stmts = split_statements("INSERT INTO t VALUES ('a;b', 'it''s; fine'); SELECT 1").unwrap();
    assert_eq!(
        stmts,
        vec!["INSERT INTO t VALUES ('a;b', 'it''s; fine')", "SELECT 1"]
    );
}

#[test]
fn test_semicolon_in_quoted_identifier() {
    let stmts = split_statements(r#"CREATE TABLE "odd;name" (id INTEGER); SELECT 1"#).unwrap();
    assert_eq!(stmts.len(), 2);
    assert_eq!(stmts[0], r#"CREATE TABLE "odd;name" (id INTEGER)"#);
}

#[test]
fn test_semicolon_in_comments() {
    let sql = "-- setup; not a split\nCREATE TABLE a (id INTEGER); /* x; y */ CREATE TABLE b (id INTEGER);";
    let stmts = split_statements(sql).unwrap();
    assert_eq!(stmts.len(), 2);
    assert!(stmts[0].ends_with("CREATE TABLE a (id INTEGER)"));
    assert_eq!(stmts[1], "/* x; y */ CREATE TABLE b (id INTEGER)");
}

#[test]
fn test_dollar_quoted_body() {
    let sql = "CREATE MACRO m() AS $body$ SELECT 1; $body$; SELECT $$a;b$$;";
    let stmts = split_statements(sql).unwrap();
    assert_eq!(stmts.len(), 2);
    assert_eq!(stmts[1], "SELECT $$a;b$$");
}

#[test]
fn test_positional_parameter_not_a_tag() {
    let stmts = split_statements("SELECT $1; SELECT 2").unwrap();
    assert_eq!(stmts, vec!["SELECT $1", "SELECT 2"]);
}

#[test]
fn test_comment_only_fragments_dropped() {
    let stmts = split_statements("SELECT 1; -- trailing note\n; ;  /* nothing */").unwrap();
    assert_eq!(stmts, vec!["SELECT 1"]);
}

#[test]
fn test_empty_input() {
    assert!(split_statements("").unwrap().is_empty());
    assert!(split_statements("  ;\n ; ").unwrap().is_empty());
}

#[test]
fn test_unterminated_string() {
    let err = split_statements("SELECT 'oops; SELECT 2").unwrap_err();
    assert!(matches!(
        err,
        SqlError::Unterminated {
            what: "string literal",
            offset: 7
        }
    ));
}

#[test]
fn test_unterminated_block_comment() {
    let err = split_statements("SELECT 1; /* never closed").unwrap_err();
    assert!(matches!(
        err,
        SqlError::Unterminated {
            what: "block comment",
            ..
        }
    ));
}

#[test]
fn test_leading_keyword() {
    assert_eq!(leading_keyword("  select 1"), Some("SELECT".to_string()));
    assert_eq!(
        leading_keyword("-- note\n/* x */ Create table t(a int)"),
        Some("CREATE".to_string())
    );
    assert_eq!(leading_keyword("(SELECT 1)"), Some("SELECT".to_string()));
    assert_eq!(leading_keyword("-- only a comment"), None);
}

#[test]
fn test_statement_kind() {
    assert_eq!(StatementKind::of("SELECT * FROM t"), StatementKind::Query);
    assert_eq!(
        StatementKind::of("WITH x AS (SELECT 1) SELECT * FROM x"),
        StatementKind::Query
    );
    assert_eq!(StatementKind::of("pragma version"), StatementKind::Query);
    assert_eq!(
        StatementKind::of("INSERT INTO t VALUES (1)"),
        StatementKind::Command
    );
    assert_eq!(
        StatementKind::of("CREATE TABLE t (id INTEGER)"),
        StatementKind::Command
    );
}

#[test]
fn test_statement_kind_returning() {
    assert_eq!(
        StatementKind::of("INSERT INTO t VALUES (1), (2) RETURNING id"),
        StatementKind::Returning
    );
    assert_eq!(
        StatementKind::of("delete from t where id > 1 returning *"),
        StatementKind::Returning
    );
    // Quoted, commented, or nested occurrences do not count.
    assert_eq!(
        StatementKind::of("INSERT INTO t VALUES ('returning') -- returning"),
        StatementKind::Command
    );
    assert_eq!(
        StatementKind::of("INSERT INTO \"returning\" VALUES (1)"),
        StatementKind::Command
    );
    assert_eq!(
        StatementKind::of("UPDATE t SET n = (SELECT returning FROM x)"),
        StatementKind::Command
    );
    assert_eq!(
        StatementKind::of("INSERT INTO returning_log VALUES (1)"),
        StatementKind::Command
    );
}

#[test]
fn test_statement_kind_transaction() {
    for stmt in [
        "BEGIN",
        "begin transaction",
        "START TRANSACTION",
        "COMMIT",
        "END",
        "ROLLBACK",
        "ABORT",
        "SAVEPOINT s1",
        "RELEASE SAVEPOINT s1",
        "/* done */ commit",
    ] {
        assert_eq!(StatementKind::of(stmt), StatementKind::Transaction, "{stmt}");
    }
    assert_eq!(
        StatementKind::of("CREATE TABLE commits (id INTEGER)"),
        StatementKind::Command
    );
}
