//! CLI surface tests for the `edgewarden` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn check_accepts_default_config() {
    let file = write_config("");

    Command::cargo_bin("edgewarden")
        .unwrap()
        .arg("check")
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration OK"));
}

#[test]
fn check_accepts_populated_config() {
    let file = write_config(
        r#"
dry_run = true

[orchestrator]
max_concurrent = 8
cooldown_seconds = 15

[risk]
initial_equity = "25000"
ruin_floor = "5000"

[sizing.policy]
policy = "target_utility"
target_equity = "50000"
horizon_days = 60
"#,
    );

    Command::cargo_bin("edgewarden")
        .unwrap()
        .arg("check")
        .arg("--config")
        .arg(file.path())
        .assert()
        .success();
}

#[test]
fn check_rejects_unbalanced_weights() {
    let file = write_config(
        r#"
[scorer.weights]
edge_quality = 0.9
execution_risk = 0.9
regime_fit = 0.15
liquidity = 0.15
route_history = 0.15
"#,
    );

    Command::cargo_bin("edgewarden")
        .unwrap()
        .arg("check")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration invalid"));
}

#[test]
fn check_missing_file_fails() {
    Command::cargo_bin("edgewarden")
        .unwrap()
        .arg("check")
        .arg("--config")
        .arg("/definitely/not/a/config.toml")
        .assert()
        .failure();
}

#[test]
fn run_with_missing_config_fails_fast() {
    Command::cargo_bin("edgewarden")
        .unwrap()
        .arg("run")
        .arg("--config")
        .arg("/definitely/not/a/config.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}
