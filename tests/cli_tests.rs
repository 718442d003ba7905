//! Command line behavior that needs no backend

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("ile-elements").unwrap();
    // keep the run independent of any ile.toml in the caller's tree
    cmd.current_dir(std::env::temp_dir());
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_types_lists_catalog() {
    cli()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"usecase\""))
        .stdout(predicate::str::contains("\"risk_rating\""))
        .stdout(predicate::str::contains("\"control\""));
}

#[test]
fn test_defaults_for_known_type() {
    cli()
        .args(["defaults", "weakness"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"riskRating\""))
        .stdout(predicate::str::contains("\"ease_of_exploitation\""));
}

#[test]
fn test_defaults_for_unknown_type_fails() {
    cli()
        .args(["defaults", "unknown_type"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown element type: unknown_type"));
}

#[test]
fn test_validate_reports_errors() {
    cli()
        .args(["validate", "control", "--data", r#"{"ref": "C-1", "name": "MFA", "desc": "d"}"#])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"isValid\": false"))
        .stdout(predicate::str::contains("State is required for controls"))
        .stdout(predicate::str::contains("Cost is required for controls"));
}

#[test]
fn test_validate_accepts_data_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"ref": "UC-1", "name": "Login", "desc": "User login"}}"#).unwrap();

    cli()
        .args(["validate", "usecase", "--data-file"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isValid\": true"));
}

#[test]
fn test_non_object_payload_is_rejected() {
    cli()
        .args(["validate", "usecase", "--data", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Element data must be a JSON object"));
}

#[test]
fn test_create_with_invalid_data_fails_before_network() {
    cli()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "create",
            "usecase",
            "--version",
            "v1",
            "--data",
            r#"{"name": ""}"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation errors: Reference is required, Name is required, Description is required"));
}
