use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn docqa(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docqa").expect("binary");
    cmd.env("DOCQA_EMBEDDING_MODE", "stub")
        .env_remove("DOCQA_CONFIG")
        .env_remove("DOCQA_DIMENSION")
        .arg("--quiet")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--dimension")
        .arg("16");
    cmd
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let output = docqa(data_dir).args(args).output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn add_then_search_finds_exact_document() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");

    let added = run_json(&data, &["add", "Rust ownership rules", "--json"]);
    assert_eq!(added["added"], true);
    assert_eq!(added["documents"], 1);
    run_json(&data, &["add", "Tokio runtime internals", "--json"]);

    let hits = run_json(
        &data,
        &["search", "Rust ownership rules", "--top-k", "5", "--threshold", "0", "--json"],
    );
    let hits = hits.as_array().expect("hits array");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["text"], "Rust ownership rules");
    assert_eq!(hits[0]["score"], 1.0);
    assert_eq!(hits[0]["rank"], 1);
    assert_eq!(hits[1]["rank"], 2);
}

#[test]
fn search_on_empty_store_is_empty() {
    let temp = tempdir().unwrap();
    let hits = run_json(&temp.path().join("data"), &["search", "x", "--json"]);
    assert_eq!(hits, Value::Array(vec![]));
}

#[test]
fn threshold_above_one_filters_everything() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    run_json(&data, &["add", "alpha", "--json"]);

    let hits = run_json(&data, &["search", "alpha", "--threshold", "1.1", "--json"]);
    assert_eq!(hits, Value::Array(vec![]));
}

#[test]
fn ingest_labels_chunks_and_inspect_lists_them() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let source = temp.path().join("handbook.txt");
    fs::write(&source, "first second third fourth").unwrap();

    let report = run_json(
        &data,
        &["ingest", source.to_str().unwrap(), "--chunk-size", "13", "--json"],
    );
    assert_eq!(report["source"], "handbook.txt");
    assert_eq!(report["total_chunks"], 2);
    assert_eq!(report["added_chunks"], 2);

    docqa(&data)
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total documents stored: 2"))
        .stdout(predicate::str::contains(
            "[handbook.txt - Page 2] third fourth",
        ));

    let stats = run_json(&data, &["stats", "--json"]);
    assert_eq!(stats["documents"], 2);
    assert_eq!(stats["vectors"], 2);
    assert_eq!(stats["dimension"], 16);
}

#[test]
fn inspect_reports_missing_snapshot() {
    let temp = tempdir().unwrap();
    docqa(&temp.path().join("nothing-here"))
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot not found"));
}

#[test]
fn add_fails_when_embedding_endpoint_is_down() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = format!("http://{addr}/get-embedding");

    docqa(&data)
        .args(["--embed-mode", "http", "--embed-timeout-secs", "2"])
        .args(["--embed-url", url.as_str()])
        .args(["add", "orphan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to add document"));

    let stats = run_json(&data, &["stats", "--json"]);
    assert_eq!(stats["documents"], 0);
}

#[test]
fn config_file_sets_data_dir() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("from-config");
    let config = temp.path().join("docqa.toml");
    fs::write(
        &config,
        format!("data_dir = {:?}\ndimension = 16\n", data.to_str().unwrap()),
    )
    .unwrap();

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("docqa").expect("binary");
    cmd.env("DOCQA_EMBEDDING_MODE", "stub")
        .env_remove("DOCQA_DATA_DIR")
        .env_remove("DOCQA_DIMENSION")
        .args(["--quiet", "--config", config.to_str().unwrap(), "add", "configured"])
        .assert()
        .success();

    assert!(data.join("vectors.bin").exists());
    assert!(data.join("documents.json").exists());
}
