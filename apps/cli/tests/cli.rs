use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SETTINGS: &str = r#"
root_name = "Minestom"
feature_previews = ["TYPESAFE_PROJECT_ACCESSORS"]
modules = ["code-generators", "demo", "testing"]

[plugin_management]
repositories = ["gradlePluginPortal"]
include_builds = ["build-logic"]

[dependency_resolution]
repositories = [{ url = "https://jitpack.io" }, "mavenCentral"]
"#;

fn project(settings: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let build_logic = temp.path().join("build-logic");
    fs::create_dir(&build_logic).unwrap();
    fs::write(build_logic.join("settings.gradle.kts"), "").unwrap();
    fs::write(temp.path().join("settings.toml"), settings).unwrap();
    temp
}

fn trellis() -> Command {
    let mut cmd = Command::cargo_bin("trellis").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("TRELLIS__ROOT_NAME");
    cmd
}

#[test]
fn check_accepts_valid_settings() {
    let temp = project(SETTINGS);

    trellis()
        .arg("check")
        .arg("-f")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn check_reports_kind_and_entry() {
    let temp = project(&SETTINGS.replace("\"testing\"", "\"testing\", \"demo\""));

    trellis()
        .args(["check", "-f"])
        .arg(temp.path().join("settings.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[DuplicateModule]: demo"));
}

#[test]
fn check_rejects_unknown_flag() {
    let temp = project(&SETTINGS.replace("TYPESAFE_PROJECT_ACCESSORS", "WARP_SPEED"));

    trellis()
        .args(["check", "-f"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[UnknownFlag]: WARP_SPEED"));
}

#[test]
fn missing_file_fails() {
    let temp = TempDir::new().unwrap();

    trellis()
        .args(["check", "-f"])
        .arg(temp.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[Config]"));
}

#[test]
fn show_json_prints_handoff_object() {
    let temp = project(SETTINGS);

    let output = trellis()
        .args(["show", "--json", "--log-level", "error", "-f"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["root_name"], "Minestom");
    assert_eq!(json["dependency_repositories"][0]["name"], "jitpack");
    assert_eq!(json["included_builds"][0]["name"], "build-logic");
    assert_eq!(json["modules"].as_array().unwrap().len(), 3);
}

#[test]
fn show_renders_tables() {
    let temp = project(SETTINGS);

    trellis()
        .args(["show", "-f"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Root project: Minestom"))
        .stdout(predicate::str::contains(":code-generators"))
        .stdout(predicate::str::contains("codeGenerators"));
}

#[test]
fn flags_lists_previews() {
    trellis()
        .arg("flags")
        .assert()
        .success()
        .stdout(predicate::str::contains("TYPESAFE_PROJECT_ACCESSORS"))
        .stdout(predicate::str::contains("VERSION_CATALOGS"));
}

#[test]
fn invalid_log_level_is_a_usage_error() {
    trellis().args(["flags", "--log-level", "chatty"]).assert().failure().code(2);
}

#[test]
fn environment_overrides_settings_file() {
    let temp = project(SETTINGS);

    let output = trellis()
        .env("TRELLIS__ROOT_NAME", "MinestomNext")
        .args(["show", "--json", "-f"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["root_name"], "MinestomNext");
}
