//! CLI behavior: payloads on stdout, stable exit codes.

use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use dq_common::SAMPLE_DIM;
use predicates::prelude::*;

fn write_train_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("train.csv");
    let mut file = std::fs::File::create(&path).expect("create train csv");
    // Two classes clustered at 0 and 255, with per-row jitter in the
    // first dimension so each covariance has nonzero rank.
    for (label, base, first) in [
        (0u32, 0.0f64, 1.0f64),
        (0, 0.0, 2.0),
        (1, 255.0, 254.0),
        (1, 255.0, 253.0),
    ] {
        let mut pixels = vec![base; SAMPLE_DIM];
        pixels[0] = first;
        let fields: Vec<String> = pixels.iter().map(|p| p.to_string()).collect();
        writeln!(file, "{label},{}", fields.join(",")).expect("write train csv");
    }
    path
}

fn write_sample_json(dir: &Path, value: f64) -> std::path::PathBuf {
    let path = dir.join("sample.json");
    let payload = serde_json::to_string(&vec![value; SAMPLE_DIM]).expect("serialize sample");
    std::fs::write(&path, payload).expect("write sample json");
    path
}

#[test]
fn predict_prints_a_prediction_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let train = write_train_csv(dir.path());
    let sample = write_sample_json(dir.path(), 0.0);

    Command::cargo_bin("digit-qda")
        .expect("binary")
        .args(["predict"])
        .arg(&sample)
        .arg("--train-data")
        .arg(&train)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"prediction\":0"));
}

#[test]
fn predict_resolves_the_corpus_from_the_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let train = write_train_csv(dir.path());
    let sample = write_sample_json(dir.path(), 255.0);

    Command::cargo_bin("digit-qda")
        .expect("binary")
        .env("DQ_TRAIN_DATA", &train)
        .args(["predict"])
        .arg(&sample)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"prediction\":1"));
}

#[test]
fn predict_with_probabilities_includes_the_distribution() {
    let dir = tempfile::tempdir().expect("tempdir");
    let train = write_train_csv(dir.path());
    let sample = write_sample_json(dir.path(), 0.0);

    Command::cargo_bin("digit-qda")
        .expect("binary")
        .args(["predict", "--probabilities"])
        .arg(&sample)
        .arg("--train-data")
        .arg(&train)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"posteriors\""));
}

#[test]
fn short_sample_exits_2_with_a_structured_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let train = write_train_csv(dir.path());
    let sample = dir.path().join("short.json");
    std::fs::write(&sample, "[1.0, 2.0, 3.0]").expect("write sample");

    Command::cargo_bin("digit-qda")
        .expect("binary")
        .args(["predict"])
        .arg(&sample)
        .arg("--train-data")
        .arg(&train)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("invalid_sample_length"));
}

#[test]
fn missing_training_data_exits_3() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sample = write_sample_json(dir.path(), 0.0);

    Command::cargo_bin("digit-qda")
        .expect("binary")
        .args(["predict"])
        .arg(&sample)
        .arg("--train-data")
        .arg(dir.path().join("absent.csv"))
        .assert()
        .code(3)
        .stdout(predicate::str::contains("data_unavailable"));
}

#[test]
fn malformed_payload_exits_2() {
    let dir = tempfile::tempdir().expect("tempdir");
    let train = write_train_csv(dir.path());
    let sample = dir.path().join("bad.json");
    std::fs::write(&sample, "{\"not\": \"an array\"}").expect("write sample");

    Command::cargo_bin("digit-qda")
        .expect("binary")
        .args(["predict"])
        .arg(&sample)
        .arg("--train-data")
        .arg(&train)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("malformed_payload"));
}

#[test]
fn fit_prints_a_per_class_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let train = write_train_csv(dir.path());

    Command::cargo_bin("digit-qda")
        .expect("binary")
        .args(["fit", "--train-data"])
        .arg(&train)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"covariance_rank\""))
        .stdout(predicate::str::contains("\"prior\":0.5"));
}
