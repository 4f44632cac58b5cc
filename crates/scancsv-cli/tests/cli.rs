use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn scancsv(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scancsv").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .current_dir(home);
    cmd
}

#[test]
fn parse_writes_csv_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(
        raw.join("inv1.json"),
        r#"{"blocks": [{"text": "Vendor: Acme Corp\nInvoice #: INV-77\nDate: 01/02/2024\nTotal: INR 500.00\n", "bbox": [0, 0, 10, 10]}], "_processing_time": 1.25}"#,
    )
    .unwrap();
    fs::write(raw.join("inv2.json"), r#"{"page_info": {"width": 1, "height": 1}}"#).unwrap();
    fs::write(
        raw.join("inv3.json"),
        r#"{"blocks": [{"text": "S/N\tItem\tQty\tRate\tAmount\nWidget\t2\t50.00\t100.00", "bbox": [0, 0, 1, 1]}]}"#,
    )
    .unwrap();

    let out_csv = dir.path().join("out/invoices_header.csv");
    scancsv(dir.path())
        .args(["parse", "--raw-dir"])
        .arg(&raw)
        .arg("--out-csv")
        .arg(&out_csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 3 invoices (2 successful)"));

    let headers = fs::read_to_string(&out_csv).unwrap();
    let rows: Vec<&str> = headers.lines().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows[1],
        "inv1,Acme Corp,INV-77,01/02/2024,INR,500.00,1.25,success"
    );
    assert!(rows[2].starts_with("inv2,Error,Error,"));
    assert!(rows[3].starts_with("inv3,Unknown Vendor,INV-inv3,"));

    let lines = fs::read_to_string(dir.path().join("out/invoices_lines.csv")).unwrap();
    assert!(lines.contains("inv1,Sample Item,1,100.00,100.00"));
    assert!(lines.contains("inv3,Widget,2,50.00,100.00"));
    assert!(!lines.contains("inv2,"));

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("out/processing_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["total_invoices"], 3);
    assert_eq!(summary["successful_invoices"], 2);
    assert_eq!(summary["total_line_items"], 2);
}

#[test]
fn run_with_mock_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let in_dir = dir.path().join("invoices");
    fs::create_dir_all(&in_dir).unwrap();
    for name in ["invoice_001.pdf", "invoice_002.png", "notes.txt"] {
        fs::write(in_dir.join(name), "dummy content").unwrap();
    }

    scancsv(dir.path())
        .args(["run", "--mock", "--in-dir", "invoices"])
        .args(["--out-csv", "out/invoices_header.csv", "--out-json", "out/raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 invoices"));

    assert!(dir.path().join("out/raw/invoice_001.json").exists());
    let headers = fs::read_to_string(dir.path().join("out/invoices_header.csv")).unwrap();
    assert!(headers.contains("invoice_002,ABC Corporation Ltd,INV-2024-002,15/01/2024"));

    let lines = fs::read_to_string(dir.path().join("out/invoices_lines.csv")).unwrap();
    assert_eq!(lines.lines().count(), 5);
}

#[test]
fn run_without_model_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("invoices")).unwrap();
    fs::write(dir.path().join("invoices/a.pdf"), "dummy content").unwrap();

    scancsv(dir.path())
        .args(["run", "--in-dir", "invoices", "--out-csv", "out/invoices_header.csv"])
        .assert()
        .success();

    assert!(!dir.path().join("out/invoices_header.csv").exists());
}

#[test]
fn run_rejects_missing_input_dir() {
    let dir = tempfile::tempdir().unwrap();

    scancsv(dir.path())
        .args(["run", "--in-dir", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input directory not found"));
}

#[test]
fn command_errors_reach_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("scancsv.log");

    scancsv(dir.path())
        .arg("--log-file")
        .arg(&log)
        .args(["parse", "--raw-dir", "missing-raw"])
        .assert()
        .failure()
        .code(1);

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("ERROR"));
    assert!(contents.contains("missing-raw"));
}

#[test]
fn check_reports_supported_files() {
    let dir = tempfile::tempdir().unwrap();
    let in_dir = dir.path().join("invoices");
    fs::create_dir_all(&in_dir).unwrap();
    for name in ["a.pdf", "b.JPG", "c.docx"] {
        fs::write(in_dir.join(name), "dummy content").unwrap();
    }

    scancsv(dir.path())
        .args(["check", "invoices"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supported files: 2"))
        .stdout(predicate::str::contains("c.docx - Unsupported format"))
        .stdout(predicate::str::contains("is writable"));
}

#[test]
fn config_init_then_get() {
    let dir = tempfile::tempdir().unwrap();

    scancsv(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scancsv"))
        .stdout(predicate::str::contains("not created"));

    scancsv(dir.path()).args(["config", "init"]).assert().success();
    scancsv(dir.path())
        .args(["config", "set", "extraction.defaults.currency", "USD"])
        .assert()
        .success();

    scancsv(dir.path())
        .args(["config", "get", "extraction.defaults.currency"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"USD\""));
}
