//! Integration tests for the siqi binary.
//!
//! These tests verify end-to-end behavior including:
//! - Prescription analysis output
//! - JSON output mode
//! - History logging and CSV rollup
//! - Catalog listing and lookup

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("siqi"))
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Herbal prescription energetics analyzer",
        ));
}

#[test]
fn test_analyze_warming_formula() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("analyze")
        .arg("fu zi 6, gan jiang 6, zhi gan cao 6")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("STRONGLY WARMING"))
        .stdout(predicate::str::contains("Fu Zi + Gan Jiang"));
}

#[test]
fn test_analyze_logs_record() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("analyze")
        .arg("ma huang 6, gui zhi 9")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    let log_path = temp_dir.path().join("analyses.jsonl");
    let content = fs::read_to_string(&log_path).expect("log should exist");
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn test_analyze_no_log_skips_record() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("analyze")
        .arg("ma huang 6")
        .arg("--no-log")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    assert!(!temp_dir.path().join("analyses.jsonl").exists());
}

#[test]
fn test_analyze_json_output() {
    let temp_dir = setup_test_dir();

    let output = cli()
        .arg("analyze")
        .arg("fu ling 12")
        .arg("--json")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .output()
        .expect("run siqi");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let analysis = &json["analysis"];
    assert_eq!(analysis["total_index"], 0.0);
    assert_eq!(analysis["label"], "balanced");
    assert_eq!(analysis["kinetics"].as_array().unwrap().len(), 25);
}

#[test]
fn test_unresolved_herb_is_reported_not_fatal() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("analyze")
        .arg("mystery weed 9, zhi gan cao 6")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[unresolved]"))
        .stdout(predicate::str::contains("not found in catalog"));
}

#[test]
fn test_rollup_and_history() {
    let temp_dir = setup_test_dir();

    for line in ["ma huang 6", "huang lian 3", "gan cao 6"] {
        cli()
            .arg("analyze")
            .arg(line)
            .arg("--data-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
    }

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 analyses"));

    assert!(temp_dir.path().join("analyses.csv").exists());
    assert!(!temp_dir.path().join("analyses.jsonl").exists());

    // History still sees the archived analyses.
    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ma huang 6"))
        .stdout(predicate::str::contains("huang lian 3"));
}

#[test]
fn test_rollup_cleanup() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("analyze")
        .arg("gan cao 6")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .arg("rollup")
        .arg("--cleanup")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    assert!(!temp_dir.path().join("analyses.jsonl.processed").exists());
}

#[test]
fn test_rollup_with_no_log() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_catalog_listing() {
    cli()
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("gan_cao"))
        .stdout(predicate::str::contains("herbs in catalog"));
}

#[test]
fn test_catalog_lookup_via_alias() {
    cli()
        .arg("catalog")
        .arg("guo")
        .arg("lao")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gan Cao"))
        .stdout(predicate::str::contains("resolved via alias"));
}

#[test]
fn test_catalog_lookup_unknown() {
    cli()
        .arg("catalog")
        .arg("nonexistent")
        .assert()
        .success()
        .stdout(predicate::str::contains("not found in catalog"));
}

#[test]
fn test_custom_catalog_file() {
    let temp_dir = setup_test_dir();

    // Export the default catalog, then point the CLI at the file.
    let catalog = herb_core::build_default_catalog();
    let catalog_path = temp_dir.path().join("catalog.toml");
    fs::write(&catalog_path, toml_string(&catalog)).unwrap();

    cli()
        .arg("analyze")
        .arg("gan cao 6")
        .arg("--catalog")
        .arg(&catalog_path)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BALANCED"));
}

fn toml_string(catalog: &herb_core::Catalog) -> String {
    toml::to_string(catalog).expect("serialize catalog")
}

#[test]
fn test_constitution_profile_adjusts_reading() {
    let temp_dir = setup_test_dir();

    fs::write(
        temp_dir.path().join("profile.json"),
        r#"{ "constitution": "yin_deficient", "sensitivity": 1.0 }"#,
    )
    .unwrap();

    cli()
        .arg("analyze")
        .arg("fu ling 12")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Adjusted for YinDeficient"));
}
