use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Runs the binary with `args` and returns its output.
fn sqlite_admin(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sqlite-admin"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sqlite-admin")
}

/// Runs the binary and asserts success, returning stdout.
fn run_ok(args: &[&str]) -> String {
    let output = sqlite_admin(args);
    assert!(
        output.status.success(),
        "sqlite-admin {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is not UTF-8")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is not UTF-8")
}

/// Creates `app.db` with a `people` table holding one row.
fn seeded_database(dir: &TempDir) -> PathBuf {
    let db = dir.path().join("app.db");
    let db_arg = path_str(&db);
    run_ok(&["--db", db_arg, "create-table", "app", "people"]);
    run_ok(&["--db", db_arg, "add-column", "app", "people", "name", "text"]);
    run_ok(&["--db", db_arg, "add-column", "app", "people", "age", "INTEGER"]);
    run_ok(&["--db", db_arg, "insert", "app", "people", "name=Ann", "age=30"]);
    db
}

// ---------------------------------------------------------------------------
// Write then read
// ---------------------------------------------------------------------------

#[test]
fn create_add_insert_then_list_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let stdout = run_ok(&["--db", path_str(&db), "--format", "json", "rows", "app", "people"]);
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["identity"], "1");
    assert_eq!(rows[0]["row"]["columns"], serde_json::json!(["id", "name", "age"]));
    assert_eq!(rows[0]["row"]["values"], serde_json::json!([1, "Ann", 30]));
}

#[test]
fn insert_with_json_values_keeps_types() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);
    let db_arg = path_str(&db);

    run_ok(&["--db", db_arg, "insert", "app", "people", "--json", "name=\"Bob\"", "age=null"]);

    let stdout = run_ok(&["--db", db_arg, "--format", "json", "row", "app", "people", "2"]);
    let row: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(row["identity"], "2");
    assert_eq!(row["row"]["values"], serde_json::json!([2, "Bob", null]));
}

#[test]
fn table_output_lists_identity_first() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let stdout = run_ok(&["--db", path_str(&db), "rows", "app", "people"]);
    let mut lines = stdout.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("identity"));
    assert!(header.contains("name"));
    let first = lines.next().unwrap();
    assert!(first.starts_with('1'));
    assert!(first.contains("Ann"));
}

#[test]
fn schema_prints_create_statement() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let stdout = run_ok(&["--db", path_str(&db), "schema", "app", "people"]);
    assert!(stdout.starts_with("CREATE TABLE"));
    assert!(stdout.contains("people"));
    assert!(stdout.contains("age"));
}

#[test]
fn columns_report_primary_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let stdout = run_ok(&["--db", path_str(&db), "--format", "json", "columns", "app", "people"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["primary_key"], serde_json::json!(["id"]));
    assert_eq!(json["columns"].as_array().unwrap().len(), 3);
    assert_eq!(json["columns"][1]["name"], "name");
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn databases_lists_every_registered_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);
    let other = dir.path().join("other.db");

    let stdout = run_ok(&[
        "--db",
        path_str(&db),
        "--db",
        path_str(&other),
        "--format",
        "json",
        "databases",
    ]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json[0]["name"], "app");
    assert_eq!(json[0]["tables"][0]["name"], "people");
    assert_eq!(json[0]["tables"][0]["row_count"], 1);
    assert_eq!(json[1]["name"], "other");
    assert_eq!(json[1]["tables"], serde_json::json!([]));
}

#[test]
fn config_file_supplies_databases() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);
    let config = dir.path().join("sqlite-admin.yml");
    std::fs::write(
        &config,
        format!("databases:\n  - {}\nrow_limit: 1\n", path_str(&db)),
    )
    .unwrap();

    let stdout = run_ok(&["--config", path_str(&config), "tables", "app"]);
    assert!(stdout.contains("people"));
}

#[test]
fn info_reports_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let stdout = run_ok(&["--db", path_str(&db), "--format", "json", "info", "app"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["filename"], "app.db");
    assert!(json["size_bytes"].as_u64().unwrap() > 0);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_table_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let output = sqlite_admin(&["--db", path_str(&db), "schema", "app", "ghost"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ghost"), "stderr: {stderr}");
}

#[test]
fn unknown_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let output = sqlite_admin(&["--db", path_str(&db), "tables", "nope"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown database 'nope'"));
}

#[test]
fn duplicate_database_names_fail_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    let first = dir.path().join("app.db");
    let second = dir.path().join("nested/app.sqlite");

    let output = sqlite_admin(&[
        "--db",
        path_str(&first),
        "--db",
        path_str(&second),
        "databases",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("duplicate database name"));
}

#[test]
fn no_databases_is_an_error() {
    let output = sqlite_admin(&["databases"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no databases given"));
}

#[test]
fn missing_row_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let output = sqlite_admin(&["--db", path_str(&db), "row", "app", "people", "99"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no row with identity '99'"));
}

#[test]
fn insert_into_unknown_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let output = sqlite_admin(&["--db", path_str(&db), "insert", "app", "people", "email=x"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to insert into 'people'"));
}
