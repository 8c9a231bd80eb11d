use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

const TABLE: &str = r#"<table>
  <tr><th>Task</th><th>Start</th><th>End</th><th>Time</th></tr>
  <tr><td><span style="margin-left: 0em">Design</span></td><td>15-06-23 09:00:00</td><td>15-06-23 11:30:00</td><td>2:30</td></tr>
  <tr><td><span style="margin-left: 2em">Review</span></td><td>15-06-23 13:00:00</td><td>15-06-23 14:00:00</td><td>1:00</td></tr>
</table>"#;

const CONFIG: &str = r#"{
  "company": {"name": "Acme Studio", "address": "1 Main St\nSpringfield"},
  "billing": {"hourly_rate": 100, "terms": "Net 15"},
  "output": {"directory": "Invoices/YYYY/MM"}
}"#;

fn timebill() -> Command {
    Command::cargo_bin("timebill").unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn pdfs_in(dir: &Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "pdf"))
        .collect()
}

#[test]
fn test_extract_prints_envelope() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "table.html", TABLE);

    let output = timebill().args(["extract", &input]).output().unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "Design");
    assert_eq!(entries[0]["startTime"], "2023-06-15T09:00:00");
    assert_eq!(entries[1]["level"], 2);
}

#[test]
fn test_extract_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "table.html", TABLE);

    timebill()
        .args(["extract", &input, "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name,level,start,end,hours"))
        .stdout(predicate::str::contains("Design,0,2023-06-15T09:00:00,2023-06-15T11:30:00,2.50"))
        .stdout(predicate::str::contains("Review,2,2023-06-15T13:00:00,2023-06-15T14:00:00,1.00"));
}

#[test]
fn test_extract_without_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "empty.html", "<p>nothing tracked</p>");

    timebill()
        .args(["extract", &input])
        .assert()
        .success()
        .stderr(predicate::str::contains("No time entries found"));
}

#[test]
fn test_extract_missing_input() {
    timebill()
        .args(["extract", "does-not-exist.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_entries_lists_flattened_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(
        tmp.path(),
        "envelope.json",
        r#"{"entries":[{"name":"Build","startTime":"2023-06-15T09:00:00","endTime":"2023-06-15T10:00:00",
            "subEntries":[{"name":"Test","startTime":null,"endTime":null}]}]}"#,
    );

    timebill()
        .args(["entries", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build"))
        .stdout(predicate::str::contains("  Test"))
        .stdout(predicate::str::contains("2 entries, 1.00 hours"));
}

#[test]
fn test_entries_rejects_malformed_envelope() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "envelope.json", "not json");

    timebill()
        .args(["entries", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time entry data"));
}

#[test]
fn test_generate_writes_pdf() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "table.html", TABLE);
    let config = write(tmp.path(), "config.json", CONFIG);
    let out = tmp.path().join("out");

    timebill()
        .args(["-c", &config, "generate", &input, "--date", "2024-03-05"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("saved to"));

    let pdfs = pdfs_in(&out.join("Invoices").join("2024").join("03"));
    assert_eq!(pdfs.len(), 1);

    let name = pdfs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Acme-Studio-invoice-2024-03-05-"), "{}", name);
    assert!(fs::read(&pdfs[0]).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn test_generate_flat_rate() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "table.html", TABLE);
    let config = write(tmp.path(), "config.json", CONFIG);

    timebill()
        .args(["-c", &config, "generate", &input, "--flat-rate", "500"])
        .arg("--output-dir")
        .arg(tmp.path())
        .assert()
        .success();
}

#[test]
fn test_generate_rate_too_large_fails_cleanly() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "table.html", TABLE);
    let config = write(
        tmp.path(),
        "config.json",
        r#"{"billing": {"hourly_rate": "70000000000000000000000000000"}}"#,
    );

    timebill()
        .args(["-c", &config, "generate", &input])
        .arg("--output-dir")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invoice amount is too large"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_generate_without_rows_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write(tmp.path(), "empty.html", "<table><tr><th>Task</th></tr></table>");
    let config = write(tmp.path(), "config.json", CONFIG);

    timebill()
        .args(["-c", &config, "generate", &input])
        .arg("--output-dir")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No time entries found"));

    assert!(!tmp.path().join("Invoices").exists());
}

#[test]
fn test_config_init_set_get() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("nested").join("config.json");
    let config = config.to_string_lossy().into_owned();

    timebill()
        .args(["-c", &config, "config", "init"])
        .assert()
        .success();

    timebill()
        .args(["-c", &config, "config", "set", "company.name", "Acme"])
        .assert()
        .success();

    timebill()
        .args(["-c", &config, "config", "get", "company.name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Acme\""));

    timebill()
        .args(["-c", &config, "config", "set", "company.nope", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    timebill()
        .args(["-c", &config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_path() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config.json");

    timebill()
        .args(["config", "path", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"))
        .stdout(predicate::str::contains("not created"));
}
