use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CLUSTER: &str = "tests/fixtures/cluster";
const VARS: &str = "tests/fixtures/cluster/vars.hcl";
const INVALID: &str = "tests/fixtures/invalid/cluster.lokocfg";
const UNKNOWN: &str = "tests/fixtures/unknown/cluster.lokocfg";

fn addonctl() -> Command {
    let mut cmd = Command::cargo_bin("addonctl").unwrap();
    // Keep the user's own config file out of the picture.
    cmd.env("HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn list_shows_builtin_components() {
    addonctl()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("dex"))
        .stdout(predicate::str::contains("gangway"))
        .stdout(predicate::str::contains("reboot-coordinator"));
}

#[test]
fn list_json() {
    let output = addonctl().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["dex", "flatcar-linux-update-operator", "gangway"]);
}

#[test]
fn validate_valid_directory() {
    addonctl()
        .args(["validate", CLUSTER, "--vars", VARS])
        .assert()
        .success();
}

#[test]
fn validate_reports_missing_variable() {
    addonctl()
        .args(["validate", CLUSTER])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unset variable"));
}

#[test]
fn validate_invalid_config_fails() {
    addonctl()
        .args(["validate", INVALID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required argument"))
        .stderr(predicate::str::contains("2 component(s) failed validation"));
}

#[test]
fn validate_unknown_component_fails() {
    addonctl()
        .args(["validate", INVALID, "--component", "prometheus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"prometheus\" is not registered"));
}

#[test]
fn validate_continues_past_unregistered_component() {
    addonctl()
        .args(["validate", UNKNOWN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"prometheus\" is not registered"))
        .stderr(predicate::str::contains("Missing required argument"))
        .stderr(predicate::str::contains("2 component(s) failed validation"));
}

#[test]
fn render_to_stdout() {
    addonctl()
        .args(["render", CLUSTER, "--vars", VARS, "--component", "gangway"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Source: gangway/templates/deployment.yaml"))
        .stdout(predicate::str::contains("namespace: gangway"));
}

#[test]
fn render_to_output_directory() {
    let out = TempDir::new().unwrap();
    addonctl()
        .args(["-q", "render", CLUSTER, "--vars", VARS])
        .args(["-C", "dex", "-C", "flatcar-linux-update-operator"])
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(out.path().join("dex/templates/deployment.yaml").exists());
    assert!(
        out.path()
            .join("flatcar-linux-update-operator/templates/update-agent.yaml")
            .exists()
    );
}

#[test]
fn render_refuses_invalid_config() {
    addonctl()
        .args(["render", INVALID, "--component", "dex"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("issuer_host"));
}

#[test]
fn config_file_sets_output_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("manifests");
    let config = dir.path().join("addonctl.toml");
    std::fs::write(
        &config,
        format!(
            "[render]\noutput_dir = {:?}\nvars_file = {:?}\n",
            out.display().to_string(),
            std::fs::canonicalize(VARS).unwrap().display().to_string()
        ),
    )
    .unwrap();

    addonctl()
        .arg("--config")
        .arg(&config)
        .args(["render", CLUSTER, "--component", "gangway"])
        .assert()
        .success();

    assert!(out.join("gangway/templates/configmap.yaml").exists());
}
