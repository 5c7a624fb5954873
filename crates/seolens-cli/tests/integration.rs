//! Integration tests for the seolens CLI
//!
//! These tests run the binary as a subprocess against pages written to a
//! temporary directory

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const WEAK_PAGE: &str = "<html><head><title>Test</title></head><body><h2>x</h2></body></html>";

const OVERRIDES: [&str; 8] = [
    "SEOLENS_MIN_SCORE",
    "SEOLENS_CYCLES_LIMIT",
    "SEOLENS_AI_THRESHOLD",
    "SEOLENS_AUTOFIX_CRITICAL",
    "SEOLENS_DEFAULT_LANG",
    "SEOLENS_LLM_PROVIDER",
    "SEOLENS_LLM_MODEL",
    "SEOLENS_LLM_BASE_URL",
];

fn seolens() -> Command {
    let mut cmd = Command::cargo_bin("seolens").unwrap();
    for key in OVERRIDES {
        cmd.env_remove(key);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_help() {
    seolens()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("fix"))
        .stdout(predicate::str::contains("optimize"));
}

#[test]
fn test_cli_version() {
    seolens()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("seolens "));
}

#[test]
fn test_analyze_text_output() {
    let dir = TempDir::new().unwrap();
    let page = write_file(&dir, "page.html", WEAK_PAGE);

    seolens()
        .arg("analyze")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("SEO Score"))
        .stdout(predicate::str::contains("Missing H1 heading"));
}

#[test]
fn test_analyze_json_output() {
    let dir = TempDir::new().unwrap();
    let page = write_file(&dir, "page.html", WEAK_PAGE);

    let output = seolens()
        .args(["analyze", "--json"])
        .arg(&page)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["overallScore"].as_u64().unwrap() < 70);
    assert_eq!(value["recommendations"][0]["type"], "critical");
    assert!(!value["priorityActions"].as_array().unwrap().is_empty());
}

#[test]
fn test_analyze_missing_file_fails() {
    seolens()
        .args(["analyze", "/no/such/page.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_fix_from_stdin_to_stdout() {
    seolens()
        .args(["fix", "-"])
        .write_stdin(WEAK_PAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<html lang="ru">"#))
        .stdout(predicate::str::contains("<title>Test</title>"))
        .stderr(predicate::str::contains("added h1 heading"));
}

#[test]
fn test_fix_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let page = write_file(&dir, "page.html", WEAK_PAGE);
    let out = dir.path().join("out/fixed.html");

    seolens()
        .arg("fix")
        .arg(&page)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied fixes"));

    let fixed = fs::read_to_string(out).unwrap();
    assert_eq!(fixed.matches("<h1").count(), 1);
    assert!(fixed.contains(r#"name="viewport""#));
}

#[test]
fn test_fix_uses_config_and_context() {
    let dir = TempDir::new().unwrap();
    let page = write_file(&dir, "page.html", "<html><head></head><body><p>Body</p></body></html>");
    let config = write_file(&dir, "seolens.json", r#"{"autofix": {"default_lang": "de"}}"#);
    let context = write_file(
        &dir,
        "context.json",
        r#"{"title": "Weekend baking guide", "description": "Everything you need for a relaxed weekend bake."}"#,
    );

    seolens()
        .arg("fix")
        .arg(&page)
        .arg("--config")
        .arg(&config)
        .arg("--context")
        .arg(&context)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<html lang="de">"#))
        .stdout(predicate::str::contains("<title>Weekend baking guide</title>"));
}

#[test]
fn test_fix_json_summary() {
    let output = seolens()
        .args(["fix", "-", "--json"])
        .write_stdin(WEAK_PAGE)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["scoreAfter"].as_u64() > value["scoreBefore"].as_u64());
    assert!(value["html"].as_str().unwrap().contains("<h1>"));
}

#[test]
fn test_optimize_json_report() {
    let dir = TempDir::new().unwrap();
    let page = write_file(&dir, "page.html", WEAK_PAGE);
    let out = dir.path().join("optimized.html");

    let output = seolens()
        .args(["optimize", "--json", "--session-id", "cli-test"])
        .arg(&page)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "completed");
    assert_eq!(value["session_id"], "cli-test");
    assert!(value["cycles_performed"].as_u64().unwrap() >= 1);
    assert!(
        value["final_analysis"]["overallScore"].as_u64()
            > value["initial_analysis"]["overallScore"].as_u64()
    );

    let optimized = fs::read_to_string(out).unwrap();
    assert_eq!(optimized, value["optimized_html"].as_str().unwrap());
}

#[test]
fn test_optimize_rejects_bad_environment_override() {
    seolens()
        .args(["optimize", "-"])
        .env("SEOLENS_CYCLES_LIMIT", "-1")
        .write_stdin(WEAK_PAGE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SEOLENS_"));
}

#[test]
fn test_optimize_rejects_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "seolens.json", r#"{"optimizer": {"min_score_threshold": 250}}"#);

    seolens()
        .args(["optimize", "-", "--config"])
        .arg(&config)
        .write_stdin(WEAK_PAGE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
