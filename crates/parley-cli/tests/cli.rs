use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn good_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
            "providers": {
                "openai": { "kind": "openai", "api_url": "https://api.openai.com/v1/chat/completions", "api_key": "sk-test" }
            },
            "classifier": { "provider": "openai", "model": "gpt-4o-mini" },
            "jury": [ { "name": "judge-gpt", "provider": "openai", "model": "gpt-4o" } ]
        }"#,
    )
    .unwrap();
    file
}

#[test]
fn validate_accepts_a_good_config() {
    let config = good_config();
    Command::cargo_bin("parley")
        .unwrap()
        .args(["validate", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok"));
}

#[test]
fn missing_config_exits_with_config_error() {
    Command::cargo_bin("parley")
        .unwrap()
        .args(["validate", "--config", "/nonexistent/parley.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn run_with_missing_config_processes_nothing() {
    let out = tempfile::tempdir().unwrap();
    Command::cargo_bin("parley")
        .unwrap()
        .args(["run", "--config", "/nonexistent/parley.json", "--input-dir"])
        .arg(out.path())
        .arg("--output-dir")
        .arg(out.path().join("out"))
        .assert()
        .code(2);
    assert!(!out.path().join("out").exists());
}

#[test]
fn version_prints_the_package_version() {
    Command::cargo_bin("parley")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
