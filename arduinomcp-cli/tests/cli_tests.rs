//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn arduinomcp_cli() -> Command {
    cargo_bin_cmd!("arduinomcp-cli")
}

/// Path to arduinomcp library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("arduinomcp")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Arduino"));
}

#[test]
fn test_cli_version() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_validate_clean_file() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("validate")
        .arg(fixtures_dir().join("led_circuit.json"))
        .arg("--fail-on")
        .arg("low");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No warnings found"))
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn test_cli_validate_faulty_human() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("validate").arg(fixtures_dir().join("faulty_circuit.json"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("HIGH:"))
        .stdout(predicate::str::contains("[POTENTIAL_SHORT]"))
        .stdout(predicate::str::contains("FAIL"));
}

#[test]
fn test_cli_validate_json_output() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("validate")
        .arg(fixtures_dir().join("faulty_circuit.json"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["pass"], false);
    assert_eq!(value["stats"]["high"], 3);
    assert_eq!(value["stats"]["medium"], 1);
    assert_eq!(value["stats"]["low"], 2);
}

#[test]
fn test_cli_fail_on_thresholds() {
    let dangling = fixtures_dir().join("dangling_net.json");

    // only a low-severity warning
    let mut cmd = arduinomcp_cli();
    cmd.arg("validate").arg(&dangling).arg("--fail-on").arg("high");
    cmd.assert().code(0);

    let mut cmd = arduinomcp_cli();
    cmd.arg("validate").arg(&dangling).arg("--fail-on").arg("low");
    cmd.assert().code(1);

    let mut cmd = arduinomcp_cli();
    cmd.arg("validate")
        .arg(fixtures_dir().join("faulty_circuit.json"))
        .arg("--fail-on")
        .arg("high");
    cmd.assert().code(1);
}

#[test]
fn test_cli_validate_nonexistent_file() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("validate").arg("does_not_exist.json");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_validate_malformed_file() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("validate").arg(fixtures_dir().join("not_a_schema.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_cli_render_svg_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("preview.svg");

    let mut cmd = arduinomcp_cli();
    cmd.arg("render")
        .arg(fixtures_dir().join("led_circuit.json"))
        .arg("-o")
        .arg(&out)
        .arg("--power-info")
        .arg("USB 5V");
    cmd.assert().success();

    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("USB 5V"));
}

#[test]
fn test_cli_render_scene_json() {
    let mut cmd = arduinomcp_cli();
    cmd.arg("render")
        .arg(fixtures_dir().join("led_circuit.json"))
        .arg("--scene");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let scene: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(scene["width"], 560.0);
    assert_eq!(scene["groups"][0]["id"], "power-badge");
}

#[test]
fn test_cli_generate() {
    let mut cmd = arduinomcp_cli();
    cmd.arg("generate")
        .arg("--description")
        .arg("servo sweep")
        .arg("--power-supply")
        .arg("6V")
        .arg("--component")
        .arg("Potentiometer");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let generated: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let refs: Vec<&str> = generated["component_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["ref"].as_str().unwrap())
        .collect();
    assert_eq!(refs, vec!["U1", "M1", "X2"]);
    assert_eq!(generated["circuit_schema"]["power"]["input_voltage_v"], 6.0);
}

#[test]
fn test_cli_order_with_config() {
    let mut cmd = arduinomcp_cli();
    cmd.arg("--config")
        .arg(fixtures_dir().join("settings.json"))
        .arg("order")
        .arg(fixtures_dir().join("led_circuit.json"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("mouser.com"))
        .stdout(predicate::str::contains("digikey.com").not())
        .stdout(predicate::str::contains("8.0"));
}

#[test]
fn test_cli_order_vendor_flag() {
    let mut cmd = arduinomcp_cli();
    cmd.arg("order").arg("--vendor").arg("digikey");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("digikey.com"))
        .stdout(predicate::str::contains("mouser.com").not());
}

#[test]
fn test_cli_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.json");
    std::fs::write(&config, r#"{"schematic": {"palette": []}}"#).unwrap();

    let mut cmd = arduinomcp_cli();
    cmd.arg("--config").arg(&config).arg("tools");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("palette"));
}

#[test]
fn test_cli_tools_command() {
    let mut cmd = arduinomcp_cli();

    cmd.arg("tools");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("generate_circuit"))
        .stdout(predicate::str::contains("render_schematic"))
        .stdout(predicate::str::contains("generate_3d_case"));
}

#[test]
fn test_cli_call_tool() {
    let mut cmd = arduinomcp_cli();
    cmd.arg("call")
        .arg("get_datasheet")
        .arg("--args")
        .arg(r#"{"component_name": "LM7805 regulator"}"#);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("key_specs_summary"));
}

#[test]
fn test_cli_call_unknown_tool() {
    let mut cmd = arduinomcp_cli();
    cmd.arg("call").arg("analyze_photo");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool: analyze_photo"));
}

#[test]
fn test_cli_serve_session() {
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"cli-test"}}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"validate_circuit","arguments":{}}}"#,
    ]
    .join("\n");

    let mut cmd = arduinomcp_cli();
    cmd.arg("serve").write_stdin(input + "\n");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let responses: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
    assert!(responses[1]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("\"pass\": true"));
}
