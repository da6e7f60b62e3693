use std::path::Path;
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

const SCHEMA: &str = "CREATE TABLE Orders (OrderId INT, CustomerId INT)
GO
CREATE TABLE Customers (CustomerId INT, RegionId INT)
GO
CREATE TABLE Regions (RegionId INT, RegionName VARCHAR(50))
GO
";

const PROCEDURES: &str = "CREATE PROCEDURE P1 AS
BEGIN
    SELECT o.OrderId FROM Orders o JOIN Customers c ON o.CustomerId = c.CustomerId;
END
GO
CREATE PROCEDURE P2 AS
BEGIN
    SELECT r.RegionName FROM Customers c JOIN Regions r ON c.RegionId = r.RegionId;
END
GO
";

fn sqlroute(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sqlroute"))
        .arg("--state")
        .arg(state)
        .args(args)
        .output()
        .expect("run CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Scans a small corpus and returns the temp dir holding the state file.
fn scanned_corpus() -> TempDir {
    let dir = tempdir().expect("temp dir");
    let corpus = dir.path().join("sql");
    std::fs::create_dir(&corpus).expect("create corpus dir");
    std::fs::write(corpus.join("01_schema.sql"), SCHEMA).expect("write schema");
    std::fs::write(corpus.join("02_procs.sql"), PROCEDURES).expect("write procedures");

    let output = sqlroute(
        &dir.path().join("state.json"),
        &["scan", corpus.to_str().expect("corpus path"), "--quiet"],
    );
    assert!(output.status.success(), "scan failed: {output:?}");
    dir
}

#[test]
fn scan_writes_state_and_summary() {
    let dir = scanned_corpus();
    let state = dir.path().join("state.json");
    assert!(state.exists());

    let json = std::fs::read_to_string(&state).expect("read state");
    let records: Vec<serde_json::Value> = serde_json::from_str(&json).expect("state is JSON");
    assert_eq!(records.len(), 5);
    assert_eq!(records[0]["kind"], "table");
    assert_eq!(records[3]["kind"], "procedure");
}

#[test]
fn listings_read_saved_state() {
    let dir = scanned_corpus();
    let state = dir.path().join("state.json");

    assert_eq!(
        stdout(&sqlroute(&state, &["tables"])),
        "Customers\nOrders\nRegions\n"
    );
    assert_eq!(stdout(&sqlroute(&state, &["procedures"])), "P1\nP2\n");
    assert_eq!(
        stdout(&sqlroute(&state, &["fields", "--table", "regions"])),
        "RegionId\nRegionName\n"
    );
}

#[test]
fn route_prints_both_sections() {
    let dir = scanned_corpus();
    let state = dir.path().join("state.json");

    let output = sqlroute(
        &state,
        &["route", "--from-table", "Orders", "--to-field", "RegionName"],
    );
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "StoredProcs:
No route found between source and destination.
Tables:
-- joins from P1,P2
select a.*, c.RegionName
from Orders a
join Customers b on a.CustomerId=b.CustomerId
join Regions c on b.RegionId=c.RegionId
"
    );
}

#[test]
fn route_json_reports_requested_mode_only() {
    let dir = scanned_corpus();
    let state = dir.path().join("state.json");

    let output = sqlroute(
        &state,
        &[
            "route",
            "--from-table",
            "Orders",
            "--to-table",
            "Customers",
            "--direct",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON output");
    assert_eq!(report["direct"][0]["procedures"][0], "P1");
    assert!(report.get("paths").is_none());
}

#[test]
fn locate_prints_file_and_line() {
    let dir = scanned_corpus();
    let state = dir.path().join("state.json");

    let output = sqlroute(&state, &["locate", "P2"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("procedure P2: "), "got {text}");
    assert!(text.trim_end().ends_with("02_procs.sql:6"), "got {text}");

    let missing = sqlroute(&state, &["locate", "Nope", "--quiet"]);
    assert_eq!(missing.status.code(), Some(1));
}

#[test]
fn missing_state_is_a_configuration_error() {
    let dir = tempdir().expect("temp dir");
    let output = sqlroute(&dir.path().join("absent.json"), &["tables"]);
    assert_eq!(output.status.code(), Some(66));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load analysis state"));
}

#[test]
fn route_without_endpoints_is_rejected() {
    let dir = scanned_corpus();
    let output = sqlroute(
        &dir.path().join("state.json"),
        &["route", "--to-table", "Orders"],
    );
    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn parse_errors_are_reported_and_exit_with_failure() {
    let dir = tempdir().expect("temp dir");
    let corpus = dir.path().join("sql");
    std::fs::create_dir(&corpus).expect("create corpus dir");
    std::fs::write(corpus.join("bad.sql"), "CREATE TABLE (").expect("write sql");
    std::fs::write(corpus.join("good.sql"), SCHEMA).expect("write sql");

    let output = sqlroute(
        &dir.path().join("state.json"),
        &["scan", corpus.to_str().expect("corpus path")],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parse errors in"));
    assert!(dir.path().join("state.json").exists());
}
