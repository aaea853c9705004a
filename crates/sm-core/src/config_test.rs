use super::*;

#[test]
fn test_parse_minimal_manifest() {
    let manifest: Manifest = serde_yaml::from_str("name: tenants").unwrap();
    assert_eq!(manifest.name, "tenants");
    assert_eq!(manifest.data_dir, DEFAULT_DATA_DIR);
    assert_eq!(manifest.marker_key(), DEFAULT_MARKER_KEY);
    assert_eq!(manifest.unknown_marker, UnknownMarkerPolicy::RerunAll);
    assert!(manifest.migrations.is_empty());
}

#[test]
fn test_parse_full_manifest() {
    let yaml = r#"
name: tenant_schema
data_dir: ./data
marker_key: schema_cursor
kv_table: my_kv
unknown_marker: fail
migrations:
  - id: 2
    description: activities
    file: sql/002.sql
  - id: 1
    description: users
    sql: CREATE TABLE users(name TEXT PRIMARY KEY, age INTEGER);
  - id: 3
"#;
    let manifest: Manifest = serde_yaml::from_str(yaml).unwrap();
    manifest.validate().unwrap();
    assert_eq!(manifest.marker_key(), "schema_cursor");
    assert_eq!(manifest.kv_table.as_deref(), Some("my_kv"));
    assert_eq!(manifest.unknown_marker, UnknownMarkerPolicy::Fail);
    assert_eq!(manifest.migrations.len(), 3);
    assert_eq!(manifest.migrations[2].description, "");
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Manifest, _> = serde_yaml::from_str("name: x\nmigratons: []");
    assert!(result.is_err());
}

#[test]
fn test_empty_name_invalid() {
    let manifest: Manifest = serde_yaml::from_str("name: ''").unwrap();
    assert!(matches!(
        manifest.validate(),
        Err(CoreError::ManifestInvalid { .. })
    ));
}

#[test]
fn test_sql_and_file_exclusive() {
    let yaml = r#"
name: x
migrations:
  - id: 1
    sql: SELECT 1;
    file: one.sql
"#;
    let manifest: Manifest = serde_yaml::from_str(yaml).unwrap();
    let err = manifest.validate().unwrap_err();
    assert!(err.to_string().contains("both 'sql' and 'file'"));
}

#[test]
fn test_empty_marker_key_invalid() {
    let manifest: Manifest = serde_yaml::from_str("name: x\nmarker_key: ' '").unwrap();
    assert!(manifest.validate().is_err());
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("shardmig.yaml"), "name: from_yaml").unwrap();
    let manifest = Manifest::load_from_dir(dir.path()).unwrap();
    assert_eq!(manifest.name, "from_yaml");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Manifest::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ManifestNotFound { .. }));
}

#[test]
fn test_load_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shardmig.yml");
    std::fs::write(&path, "name: [unclosed").unwrap();
    let err = Manifest::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ManifestParseError { .. }));
}

#[test]
fn test_resolve_migrations_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sql")).unwrap();
    std::fs::write(
        dir.path().join("sql/002.sql"),
        "CREATE TABLE t2 (id INTEGER);",
    )
    .unwrap();

    let yaml = r#"
name: x
migrations:
  - id: 1
    sql: CREATE TABLE t1 (id INTEGER);
  - id: 2
    file: sql/002.sql
  - id: 3
    description: generated
"#;
    let manifest: Manifest = serde_yaml::from_str(yaml).unwrap();
    let migrations = manifest.resolve_migrations(dir.path()).unwrap();

    assert_eq!(
        migrations[0].sql.as_deref(),
        Some("CREATE TABLE t1 (id INTEGER);")
    );
    assert_eq!(
        migrations[1].sql.as_deref(),
        Some("CREATE TABLE t2 (id INTEGER);")
    );
    assert_eq!(migrations[2].sql, None);
}

#[test]
fn test_resolve_migrations_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let manifest: Manifest =
        serde_yaml::from_str("name: x\nmigrations:\n  - id: 4\n    file: nope.sql").unwrap();
    let err = manifest.resolve_migrations(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::MigrationFileError { id: 4, .. }));
}

#[test]
fn test_data_dir_absolute() {
    let manifest: Manifest = serde_yaml::from_str("name: x").unwrap();
    let root = PathBuf::from("/srv/app");
    assert_eq!(manifest.data_dir_absolute(&root), root.join("tenants"));
}
