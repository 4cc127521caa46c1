//! Integration tests for the `portico` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("manifests")
        .join(name)
}

fn portico() -> Command {
    let mut cmd = Command::cargo_bin("portico").expect("portico bin");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn validate_accepts_well_formed_manifest() {
    portico()
        .arg("validate")
        .arg(fixture("reference.yaml"))
        .assert()
        .success()
        .stdout(contains("Manifest is valid"))
        .stdout(contains("vector_store"))
        .stdout(contains("(disabled)"));
}

#[test]
fn validate_resolve_binds_reference_modules() {
    portico()
        .args(["validate", "--resolve"])
        .arg(fixture("reference.yaml"))
        .assert()
        .success()
        .stdout(contains("All enabled ports resolve"));
}

#[test]
fn validate_reports_missing_required_field() {
    portico()
        .arg("validate")
        .arg(fixture("missing_version.yaml"))
        .assert()
        .failure()
        .stdout(contains("missing required field `version`"))
        .stderr(contains("is invalid"));
}

#[test]
fn validate_without_resolve_ignores_unknown_modules() {
    portico()
        .arg("validate")
        .arg(fixture("unresolvable.json"))
        .assert()
        .success();
}

#[test]
fn validate_resolve_reports_unknown_module() {
    portico()
        .args(["validate", "--resolve"])
        .arg(fixture("unresolvable.json"))
        .assert()
        .failure()
        .stdout(contains("acme::PgVector"))
        .stderr(contains("does not resolve"));
}

#[test]
fn validate_expands_environment_placeholders() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("portico.yml");
    fs::write(
        &path,
        "version: \"${PORTICO_CLI_TEST_VERSION}\"\nenvironment: test\nadapters: {}\n",
    )
    .expect("write manifest");

    portico()
        .arg("validate")
        .arg(&path)
        .env("PORTICO_CLI_TEST_VERSION", "9.9")
        .assert()
        .success()
        .stdout(contains("9.9"))
        .stdout(contains("No adapters declared."));
}

#[test]
fn validate_rejects_unsupported_extension() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("portico.toml");
    fs::write(&path, "version = \"1.0\"\n").expect("write manifest");

    portico()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(contains("unsupported manifest format"));
}

#[test]
fn schema_prints_manifest_fields() {
    let output = portico()
        .arg("schema")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let schema: Value = serde_json::from_slice(&output).expect("schema is JSON");
    assert_eq!(schema["name"], "manifest");
    let keys: Vec<&str> = schema["fields"]
        .as_array()
        .expect("fields array")
        .iter()
        .filter_map(|field| field["key"].as_str())
        .collect();
    assert_eq!(
        keys,
        ["version", "environment", "adapters", "pipelines", "graphs", "telemetry"]
    );
}

#[test]
fn schema_adapter_flag_prints_entry_fields() {
    portico()
        .args(["schema", "--adapter"])
        .assert()
        .success()
        .stdout(contains("\"enabled\""))
        .stdout(contains("\"config\""))
        .stdout(contains("\"version\"").not());
}

#[test]
fn ports_lists_every_contract() {
    portico()
        .arg("ports")
        .assert()
        .success()
        .stdout(contains("vector_store"))
        .stdout(contains("upsert, search, delete"))
        .stdout(contains("tool"));
}

#[test]
fn ports_json_is_machine_readable() {
    let output = portico()
        .args(["ports", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let ports: Value = serde_json::from_slice(&output).expect("ports is JSON");
    let ports = ports.as_array().expect("array");
    assert_eq!(ports.len(), 13);
    assert_eq!(ports[0]["port"], "vector_store");
    assert_eq!(ports[0]["callbacks"], serde_json::json!(["upsert", "search", "delete"]));
}
