//! End-to-end tests for the calnote CLI.
//!
//! Tests invoke the `calnote` binary as a subprocess inside a temporary
//! vault and verify files on disk and JSON output.

use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn calnote() -> Command {
    Command::new(env!("CARGO_BIN_EXE_calnote"))
}

fn calnote_in(dir: &Path) -> Command {
    let mut cmd = calnote();
    cmd.current_dir(dir).stdin(Stdio::null());
    cmd
}

fn run_ok(dir: &Path, args: &[&str]) -> Output {
    let output = calnote_in(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    serde_json::from_slice(&run_ok(dir, args).stdout).unwrap()
}

fn vault_with_config(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".calnote")).unwrap();
    fs::write(dir.path().join(".calnote").join("config.yaml"), config).unwrap();
    dir
}

// === Init ===

#[test]
fn e2e_init_writes_default_config() {
    let dir = TempDir::new().unwrap();
    let output = run_ok(dir.path(), &["init"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Initialized calnote vault"));

    let config = fs::read_to_string(dir.path().join(".calnote").join("config.yaml")).unwrap();
    assert!(config.contains("confirm_before_create: true"));
    assert!(config.contains("gggg-[W]ww"));
}

#[test]
fn e2e_init_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    run_ok(dir.path(), &["init"]);

    let output = calnote_in(dir.path()).arg("init").output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));

    run_ok(dir.path(), &["init", "--force"]);
}

// === Path ===

#[test]
fn e2e_path_uses_default_formats() {
    let dir = TempDir::new().unwrap();
    for (granularity, expected) in [
        ("day", "2026-01-31.md"),
        ("week", "2026-W05.md"),
        ("month", "2026-01.md"),
        ("quarter", "2026-Q1.md"),
        ("year", "2026.md"),
    ] {
        let output = run_ok(dir.path(), &["path", granularity, "--date", "2026-01-31"]);
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected);
    }
}

#[test]
fn e2e_path_honors_configured_folder_and_format() {
    let dir = vault_with_config(
        "week:\n  format: \"GGGG-[W]WW\"\n  folder: journal/weekly\nlocale:\n  preset: iso\n",
    );
    let output = run_ok(dir.path(), &["path", "weekly", "--date", "2026-01-01"]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "journal/weekly/2026-W01.md"
    );
}

#[test]
fn e2e_path_rejects_unknown_granularity() {
    let dir = TempDir::new().unwrap();
    let output = calnote_in(dir.path())
        .args(["path", "fortnight"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// === Open ===

#[test]
fn e2e_open_creates_then_reuses_note() {
    let dir = TempDir::new().unwrap();
    let first = run_json(dir.path(), &["open", "day", "--date", "2026-01-31", "--yes"]);
    assert_eq!(first["path"], "2026-01-31.md");
    assert_eq!(first["uid"], "day-2026-01-31");
    assert_eq!(first["created"], true);
    assert_eq!(first["declined"], false);
    assert_eq!(
        fs::read_to_string(dir.path().join("2026-01-31.md")).unwrap(),
        "# 2026-01-31\n"
    );

    fs::write(dir.path().join("2026-01-31.md"), "edited").unwrap();
    let second = run_json(dir.path(), &["open", "day", "--date", "2026-01-31"]);
    assert_eq!(second["created"], false);
    assert_eq!(
        fs::read_to_string(dir.path().join("2026-01-31.md")).unwrap(),
        "edited"
    );
}

#[test]
fn e2e_open_without_answer_creates_nothing() {
    let dir = vault_with_config("day:\n  folder: daily\n");
    let result = run_json(dir.path(), &["open", "day", "--date", "2026-03-01"]);
    assert_eq!(result["declined"], true);
    assert_eq!(result["created"], false);
    assert!(result["path"].is_null());
    assert!(!dir.path().join("daily").exists());
}

#[test]
fn e2e_open_expands_template_into_nested_folder() {
    let dir = vault_with_config(
        "confirm_before_create: false\nday:\n  folder: journal/daily\n  template: templates/daily\n",
    );
    fs::create_dir_all(dir.path().join("templates")).unwrap();
    fs::write(
        dir.path().join("templates").join("daily.md"),
        "# {{title}}\nprev: [[{{yesterday}}]]\nnext: [[{{date+1d}}]]\n",
    )
    .unwrap();

    let result = run_json(dir.path(), &["open", "day", "--date", "2026-01-31"]);
    assert_eq!(result["path"], "journal/daily/2026-01-31.md");
    assert_eq!(
        fs::read_to_string(dir.path().join("journal/daily/2026-01-31.md")).unwrap(),
        "# 2026-01-31\nprev: [[2026-01-30]]\nnext: [[2026-02-01]]\n"
    );
}

#[test]
fn e2e_open_missing_template_falls_back_to_header() {
    let dir = vault_with_config("confirm_before_create: false\nmonth:\n  template: nowhere\n");
    let output = run_ok(dir.path(), &["open", "month", "--date", "2026-02-10"]);
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("Failed to read the monthly note template"));
    assert_eq!(
        fs::read_to_string(dir.path().join("2026-02.md")).unwrap(),
        "# 2026-02\n"
    );
}

#[test]
fn e2e_open_with_offset_moves_by_periods() {
    let dir = TempDir::new().unwrap();
    let result = run_json(
        dir.path(),
        &["open", "quarter", "--date", "2026-02-10", "--offset", "-1", "--yes"],
    );
    assert_eq!(result["path"], "2025-Q4.md");
    assert_eq!(result["uid"], "quarter-2025-4");
}

#[test]
fn e2e_open_with_offset_past_the_calendar_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let output = calnote_in(dir.path())
        .args(["open", "day", "--date", "2026-10-16", "--offset", "2147483647", "--yes"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("outside the calendar"));

    let notes: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
        .collect();
    assert!(notes.is_empty());
}

// === List ===

#[test]
fn e2e_list_maps_uids_to_paths() {
    let dir = vault_with_config("week:\n  folder: weekly\n");
    fs::create_dir_all(dir.path().join("weekly").join("2026")).unwrap();
    fs::write(dir.path().join("weekly").join("2026-W08.md"), "").unwrap();
    fs::write(dir.path().join("weekly").join("2026").join("2026-W09.md"), "").unwrap();
    fs::write(dir.path().join("weekly").join("notes.md"), "").unwrap();

    let listing = run_json(dir.path(), &["list", "week"]);
    let map = listing.as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(listing["week-2026-02-15"], "weekly/2026-W08.md");
    assert_eq!(listing["week-2026-02-22"], "weekly/2026/2026-W09.md");
}

// === Expand ===

#[test]
fn e2e_expand_prints_rendered_template() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tpl.md"),
        "{{date:YYYY}} {{date-1M:MMMM}} {{monday:D MMM}} {{unknown}}",
    )
    .unwrap();
    let output = run_ok(
        dir.path(),
        &["expand", "--template", "tpl.md", "--date", "2026-03-04"],
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "2026 February 2 Mar {{unknown}}"
    );
}

// === Calendar ===

#[test]
fn e2e_calendar_reports_labels_and_indicators() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("2026-Q1.md"), "").unwrap();
    fs::write(dir.path().join("2026-02-17.md"), "").unwrap();

    let cal = run_json(dir.path(), &["calendar", "--month", "2026-02", "--json"]);
    assert_eq!(cal["month"], "2026-02");

    let labels = cal["labels"].as_array().unwrap();
    let texts: Vec<&str> = labels.iter().map(|l| l["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["February", "Q1", "2026"]);
    assert_eq!(labels[0]["has_note"], false);
    assert_eq!(labels[1]["has_note"], true);
    assert_eq!(labels[1]["uid"], "quarter-2026-1");

    let weeks = cal["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 4);
    assert_eq!(weeks[2]["days"][2]["date"], "2026-02-17");
    assert_eq!(weeks[2]["days"][2]["has_note"], true);
}

#[test]
fn e2e_calendar_grid_marks_notes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("2026.md"), "").unwrap();
    let output = run_ok(dir.path(), &["calendar", "--month", "2026-02"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next().unwrap(), "February  Q1  2026 •");
    assert!(lines.next().unwrap().contains("Su"));
}

// === Completions ===

#[test]
fn e2e_completions_for_bash() {
    let dir = TempDir::new().unwrap();
    let output = run_ok(dir.path(), &["completions", "bash"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("calnote"));
}
