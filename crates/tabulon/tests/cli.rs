//! End-to-end tests for the tabulon command line.
//!
//! Commands run in-process against mock environment variables and stdin,
//! with record and settings files in temporary directories.

use std::path::Path;

use clap::Parser;
use serde_json::Value as Json;
use tabulon::{Cli, Environment, MockEnv, MockStdin};

const PEOPLE: &str = r#"[
    {"id": 1, "name": "Bob", "status": "a", "age": 30},
    {"id": 2, "name": "Al", "status": "l", "age": "25"}
]"#;

const COLUMNS: &str = "\
- id: name
  label: Name
- id: status
  label: Status
  kind: select
  options:
    - { value: a, label: Active }
    - { value: l, label: On leave }
- id: age
  label: Age
  kind: number
  align: right
";

fn run_cli(argv: &[&str], env: &MockEnv, stdin: &MockStdin, terminal: bool) -> anyhow::Result<String> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut full = vec!["tabulon"];
    full.extend_from_slice(argv);
    let cli = Cli::try_parse_from(full)?;
    let environment = Environment::new(env, stdin).stdout_is_terminal(terminal);
    tabulon::run(&cli, &environment)
}

fn piped(argv: &[&str]) -> anyhow::Result<String> {
    run_cli(argv, &MockEnv::new(), &MockStdin::piped(PEOPLE), false)
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

// ============================================================================
// view
// ============================================================================

#[test]
fn piped_output_defaults_to_json() {
    let out = piped(&["view", "--sort", "name", "--select", "2"]).unwrap();
    let json: Json = serde_json::from_str(&out).unwrap();

    assert_eq!(json["total_count"], 2);
    assert_eq!(json["page"], 0);
    assert_eq!(json["rows"][0]["name"], "Al");
    assert_eq!(json["selected"], serde_json::json!(["2"]));
    assert_eq!(json["select_all"], "indeterminate");
    assert_eq!(json["selection"][0]["name"], "Al");
}

#[test]
fn terminal_output_defaults_to_text() {
    let out = run_cli(&["view"], &MockEnv::new(), &MockStdin::piped(PEOPLE), true).unwrap();
    assert!(out.contains("Bob"));
    assert!(out.ends_with("Showing 1–2 of 2 · page 1 of 1"));
}

#[test]
fn csv_uses_column_display() {
    let dir = tempfile::tempdir().unwrap();
    let columns = write(dir.path(), "columns.yaml", COLUMNS);

    let out = piped(&["view", "-c", &columns, "--sort", "age", "-o", "csv"]).unwrap();
    assert_eq!(out, "Name,Status,Age\nAl,On leave,25\nBob,Active,30\n");

    let out = piped(&["view", "-c", &columns, "-f", "status:equals:l", "-o", "csv"]).unwrap();
    assert_eq!(out, "Name,Status,Age\nAl,On leave,25\n");
}

#[test]
fn search_and_numeric_filter_combine() {
    let out = piped(&["view", "-s", "O", "-f", "age:lt:28", "-o", "json"]).unwrap();
    let json: Json = serde_json::from_str(&out).unwrap();
    assert_eq!(json["total_count"], 0);
    assert_eq!(json["rows"], serde_json::json!([]));
}

#[test]
fn settings_file_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "columns.yaml", COLUMNS);
    let records = write(dir.path(), "people.json", PEOPLE);
    let config = write(
        dir.path(),
        "tabulon.yaml",
        "output: csv\ncolumns: columns.yaml\ntable:\n  page_size: 1\n",
    );
    let stdin = MockStdin::terminal();

    let out = run_cli(&["--config", &config, "view", "-r", &records], &MockEnv::new(), &stdin, true)
        .unwrap();
    assert_eq!(out, "Name,Status,Age\nBob,Active,30\n");

    let out = run_cli(
        &["--config", &config, "view", "-r", &records, "--page", "2", "-o", "json"],
        &MockEnv::new(),
        &stdin,
        true,
    )
    .unwrap();
    let json: Json = serde_json::from_str(&out).unwrap();
    assert_eq!(json["page"], 1);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["rows"][0]["name"], "Al");
}

#[test]
fn environment_overrides() {
    let env = MockEnv::new()
        .with_var("TABULON_OUTPUT", "yaml")
        .with_var("TABULON_KEY", "name");
    let out = run_cli(&["view", "--select-page"], &env, &MockStdin::piped(PEOPLE), true).unwrap();
    assert!(out.contains("total_count: 2"));
    assert!(out.contains("select_all: checked"));
    assert!(out.contains("- Bob"));
}

#[test]
fn records_must_be_piped_or_named() {
    let err = run_cli(&["view"], &MockEnv::new(), &MockStdin::terminal(), true).unwrap_err();
    assert!(err.to_string().contains("no records piped"));
}

#[test]
fn malformed_records_are_reported() {
    let err = run_cli(
        &["view"],
        &MockEnv::new(),
        &MockStdin::piped(r#"{"id": 1}"#),
        false,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("invalid records"));
}

// ============================================================================
// fields
// ============================================================================

#[test]
fn fields_lists_operator_menus() {
    let dir = tempfile::tempdir().unwrap();
    let columns = write(dir.path(), "columns.yaml", COLUMNS);

    let out = piped(&["fields", "-c", &columns, "-o", "json"]).unwrap();
    let json: Json = serde_json::from_str(&out).unwrap();
    assert_eq!(json[1]["id"], "status");
    assert_eq!(json[1]["operators"][0]["operator"], "equals");
    assert_eq!(json[1]["operators"][0]["label"], "Is");
    assert_eq!(json[2]["operators"][1]["label"], "Greater than");
}

// ============================================================================
// access
// ============================================================================

const USERS: &str = r#"
- password: hunter2
  user:
    id: "2"
    email: bob@example.com
    role: { name: Clerk }
    permissions:
      - { name: invoice_read }
"#;

#[test]
fn access_reports_modules_and_nav() {
    let dir = tempfile::tempdir().unwrap();
    let users = write(dir.path(), "users.yaml", USERS);
    let env = MockEnv::new().with_var("TABULON_PASSWORD", "hunter2");

    let out = run_cli(
        &["access", "-u", &users, "-e", "bob@example.com", "--nav", "--path", "/invoice/create", "-o", "json"],
        &env,
        &MockStdin::terminal(),
        true,
    )
    .unwrap();
    let json: Json = serde_json::from_str(&out).unwrap();
    assert_eq!(json["session"]["state"], "authenticated");
    assert_eq!(json["modules"], serde_json::json!(["INVOICE"]));
    assert_eq!(json["nav"][0]["id"], "invoice");
    assert_eq!(json["check"]["active"], "create-invoice");
    assert_eq!(json["check"]["decision"], "granted");
}

#[test]
fn access_policy_file_replaces_the_default() {
    let dir = tempfile::tempdir().unwrap();
    let users = write(dir.path(), "users.yaml", USERS);
    let policy = write(
        dir.path(),
        "policy.yaml",
        "modules:\n  INVOICE: [invoice_admin]\n  DASHBOARD: [invoice_read]\n",
    );

    let out = run_cli(
        &["access", "-u", &users, "--policy", &policy, "-e", "bob@example.com", "--password", "hunter2", "-m", "invoice"],
        &MockEnv::new(),
        &MockStdin::terminal(),
        true,
    )
    .unwrap();
    assert!(out.contains("Modules: DASHBOARD"));
    assert!(out.ends_with("Check page: no access to INVOICE -> /dashboard"));
}

#[test]
fn unknown_module_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let users = write(dir.path(), "users.yaml", USERS);
    let result = run_cli(
        &["access", "-u", &users, "-m", "payroll"],
        &MockEnv::new(),
        &MockStdin::terminal(),
        true,
    );
    assert!(result.is_err());
}
