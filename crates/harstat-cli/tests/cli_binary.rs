use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn harstat() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin("harstat"))
}

fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(filename)
}

#[test]
fn test_report_json_output() {
    let output = harstat()
        .arg("report")
        .arg(fixture_path("sample.har"))
        .args(["--format", "json", "--top-n", "3"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_records"], 6);
    assert_eq!(value["top_by_latency"].as_array().unwrap().len(), 3);
    assert_eq!(value["by_url_prefix"]["https://api.example.com/v1/users"], 3);
}

#[test]
fn test_report_pretty_output() {
    harstat()
        .arg("report")
        .arg(fixture_path("sample.har"))
        .assert()
        .success()
        .stdout(predicate::str::contains("HAR Traffic Report"))
        .stdout(predicate::str::contains("Slowest Requests:"))
        .stdout(predicate::str::contains("https://api.example.com/v1/users/3"));
}

#[test]
fn test_report_table_output() {
    harstat()
        .arg("report")
        .arg(fixture_path("sample.har"))
        .args(["--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Metric,Value"))
        .stdout(predicate::str::contains("Transactions,6"))
        .stdout(predicate::str::contains("404,2"));
}

#[test]
fn test_report_quantiles_from_env() {
    let output = harstat()
        .arg("report")
        .arg(fixture_path("sample.har"))
        .args(["--format", "json"])
        .env("HARSTAT_LATENCY_QUANTILES", "0.5")
        .env("HARSTAT_SIZE_QUANTILES", "none")
        .output()
        .unwrap();

    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let latencies = value["latency_percentiles"].as_object().unwrap();
    assert_eq!(latencies.len(), 1);
    assert_eq!(latencies["p50"], 45.0);
    assert!(value.get("request_size_percentiles").is_none());
}

#[test]
fn test_report_rejects_bad_quantile() {
    harstat()
        .arg("report")
        .arg(fixture_path("sample.har"))
        .args(["--latency-quantiles", "0.5,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0, 1]"));
}

#[test]
fn test_report_empty_capture_fails() {
    harstat()
        .arg("report")
        .arg(fixture_path("empty.har"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("zero transaction records"));
}

#[test]
fn test_report_strict_urls_fails() {
    harstat()
        .arg("report")
        .arg(fixture_path("malformed-urls.har"))
        .arg("--strict-urls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed URL 'items/3'"));
}

#[test]
fn test_completion_bash_generates_script() {
    harstat()
        .args(["completion", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_harstat()"))
        .stdout(predicate::str::contains("complete -F _harstat"));
}

#[test]
fn test_completion_zsh_generates_script() {
    harstat()
        .args(["completion", "--shell", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef harstat"));
}

#[test]
fn test_completion_invalid_shell() {
    harstat()
        .args(["completion", "--shell", "invalid-shell"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completion_requires_shell_flag() {
    harstat()
        .arg("completion")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
