use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn bayes() -> Command {
    Command::cargo_bin("bayes").expect("bayes binary builds")
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, text).expect("write file");
}

fn seed_workspace(root: &Path) {
    write(&root.join("corpus/spam/1.txt"), "buy viagra now");
    write(&root.join("corpus/spam/2.txt"), "buy cheap pills now");
    write(&root.join("corpus/genuine/1.txt"), "meeting notes for monday");
    write(&root.join("corpus/genuine/2.txt"), "project meeting agenda");
    write(
        &root.join("bayes.yaml"),
        "classes:\n  - label: genuine\n    folder: corpus/genuine\n  - label: spam\n    folder: corpus/spam\n",
    );
}

#[test]
fn query_prints_cancer_screening_posterior() {
    bayes()
        .args([
            "query",
            "--prior",
            "not cancer=0.99",
            "--prior",
            "cancer=0.01",
            "--likelihood",
            "not cancer=9.6",
            "--likelihood",
            "cancer=80",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Bayes(not cancer: 92.24%, cancer: 7.76%)",
        ));
}

#[test]
fn query_rejects_malformed_assignment() {
    bayes()
        .args(["query", "--prior", "spam"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected LABEL=VALUE"));
}

#[test]
fn query_reports_degenerate_update() {
    bayes()
        .args([
            "query",
            "--prior",
            "a=1",
            "--prior",
            "b=1",
            "--likelihood",
            "a=0",
            "--likelihood",
            "b=0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("degenerate"));
}

#[test]
fn classify_file_prints_label_per_file() {
    let dir = tempdir().expect("temp dir");
    seed_workspace(dir.path());
    write(&dir.path().join("offer.txt"), "buy pills");

    bayes()
        .arg("classify-file")
        .arg("--config")
        .arg(dir.path().join("bayes.yaml"))
        .arg(dir.path().join("offer.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("offer.txt\tspam"));

    bayes()
        .arg("classify-file")
        .arg("--config")
        .arg(dir.path().join("bayes.yaml"))
        .args(["--format", "json"])
        .arg(dir.path().join("offer.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""label":"spam""#));
}

#[test]
fn classify_file_validate_only_skips_training() {
    let dir = tempdir().expect("temp dir");
    write(
        &dir.path().join("bayes.yaml"),
        "classes:\n  - label: a\n    folder: missing\n",
    );

    bayes()
        .arg("classify-file")
        .arg("--config")
        .arg(dir.path().join("bayes.yaml"))
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration valid: 1 class."));
}

#[test]
fn structured_logging_goes_to_jsonl_file() {
    let dir = tempdir().expect("temp dir");
    write(
        &dir.path().join("bayes.yaml"),
        "classes:\n  - label: a\n    folder: a\nlogging:\n  enable_structured: true\n  tracing_level: info\n  log_dir: logs\n",
    );

    bayes()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["classify-file", "--config", "bayes.yaml", "--validate-only"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Structured log:"));

    let log = fs::read_to_string(dir.path().join("logs/bayes.jsonl")).expect("log file written");
    let first = log.lines().next().expect("at least one event");
    let event: serde_json::Value = serde_json::from_str(first).expect("line is JSON");
    assert_eq!(event["fields"]["message"], "logging initialised");
}

#[test]
fn classify_file_rejects_invalid_config() {
    let dir = tempdir().expect("temp dir");
    write(&dir.path().join("bayes.yaml"), "classes: []\n");

    bayes()
        .arg("classify-file")
        .arg("--config")
        .arg(dir.path().join("bayes.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one class"));
}

#[test]
fn sort_folder_dry_run_leaves_files_in_place() {
    let dir = tempdir().expect("temp dir");
    seed_workspace(dir.path());
    let root = dir.path().join("corpus");
    write(&root.join("offer.txt"), "buy now");

    bayes()
        .arg("sort-folder")
        .arg(&root)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("would move"))
        .stdout(predicate::str::contains("spam"));

    assert!(root.join("offer.txt").exists());
    assert!(!root.join("spam/offer.txt").exists());
}
