use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ppg() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("ppg").into();
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Create a data directory with the two-paper fixture.
/// Returns (tempdir_guard, data_path). The tempdir guard must be kept alive.
fn fixture_dir() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();

    write_artifact(&data, "paperA_0_text.txt", "Abstract alpha beta. Conclusion gamma.");
    write_artifact(&data, "paperB_0_text.txt", "Introduction delta.");

    (tmp, data)
}

fn write_artifact(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn build_reports_run_summary() {
    let (_tmp, data) = fixture_dir();

    ppg()
        .args(["build", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("papers: 2")
                .and(predicate::str::contains("sections: 3"))
                .and(predicate::str::contains("related edges: 1")),
        );
}

#[test]
fn build_writes_snapshots_and_inspect_reads_them() {
    let (tmp, data) = fixture_dir();
    let json = tmp.path().join("graph.json");
    let graphml = tmp.path().join("graph.graphml");

    ppg()
        .args([
            "build",
            data.to_str().unwrap(),
            "--json-out",
            json.to_str().unwrap(),
            "--graphml-out",
            graphml.to_str().unwrap(),
        ])
        .assert()
        .success();

    let xml = fs::read_to_string(&graphml).unwrap();
    assert!(xml.contains("graphml"));
    assert!(xml.contains("paper:paperA"));

    ppg()
        .args(["inspect", json.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Paper: 2")
                .and(predicate::str::contains("Section: 3"))
                .and(predicate::str::contains("RELATED: 1")),
        );
}

#[test]
fn build_fails_on_missing_data_directory() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");

    ppg()
        .args(["build", missing.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn build_requires_a_data_directory() {
    ppg().arg("build").assert().failure();
}

#[test]
fn build_accepts_a_config_file() {
    let (tmp, data) = fixture_dir();
    let json = tmp.path().join("graph.json");

    let config = format!(
        r#"
data_dir = {data:?}

[store]
kind = "memory"
json_out = {json:?}

[filter]
scorer = "histogram_entropy"
threshold = 0.5
"#,
        data = data.to_str().unwrap(),
        json = json.to_str().unwrap(),
    );
    let config_path = tmp.path().join("ppg.toml");
    fs::write(&config_path, config).unwrap();

    ppg()
        .args(["build", "--config", config_path.to_str().unwrap()])
        .assert()
        .success();

    assert!(json.exists());
}

#[test]
fn inspect_rejects_garbage_snapshots() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, "{").unwrap();

    ppg()
        .args(["inspect", path.to_str().unwrap()])
        .assert()
        .failure();
}
