//! End-to-end checks of the certscope binary

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("crates/certscope-chain/tests/fixtures")
        .join(name)
}

fn certscope() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_certscope"));
    cmd.env_remove("CERTSCOPE_CONFIG").env("RUST_LOG", "off");
    cmd
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = certscope()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn certscope");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_decode_certificate_file() {
    let output = certscope()
        .args(["decode", "--no-hex"])
        .arg(fixture("root.pem"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("Encoding: PEM (CERTIFICATE)"));
    assert!(out.contains("X.509 Certificate"));
    assert!(out.contains("OBJECT IDENTIFIER"));
    assert!(!out.contains("00000000"));
}

#[test]
fn test_decode_hex_from_stdin() {
    let output = run_with_stdin(&["decode"], "30 03 02 01 05\n");
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("Encoding: hex"));
    assert!(out.contains("INTEGER"));
    assert!(out.contains("00000000"));
}

#[test]
fn test_decode_truncated_input_fails() {
    let output = run_with_stdin(&["decode"], "3005020105");
    assert!(!output.status.success());

    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("TruncatedInput at offset 2"));
}

#[test]
fn test_decode_highlight_reports_path() {
    let output = certscope()
        .args(["decode", "--highlight", "39:60"])
        .arg(fixture("root.pem"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("Bytes 39..60: SEQUENCE > SEQUENCE"));
    assert!(out.contains("UTF8String"));
    assert!(out.lines().any(|line| line.trim_start().starts_with('^')));
}

#[test]
fn test_decode_tree_json() {
    let output = run_with_stdin(&["decode", "--view", "tree-json"], "020105");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["encoding"]["type"], "hex");
    assert_eq!(value["root"]["type_name"], "INTEGER");
}

#[test]
fn test_rejects_inverted_highlight() {
    let output = run_with_stdin(&["decode", "--highlight", "9:3"], "020105");
    assert!(!output.status.success());
}

#[test]
fn test_guess_ranks_armor_first() {
    let pem = std::fs::read_to_string(fixture("root.pem")).unwrap();
    let output = run_with_stdin(&["guess"], &pem);
    assert!(output.status.success());

    let out = stdout(&output);
    let first = out.lines().next().unwrap();
    assert!(first.contains("X.509 Certificate"));
    assert!(out.contains("Generic ASN.1"));
}

#[test]
fn test_chain_summary_and_pem() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("cas.pem");
    let cas = format!(
        "{}\n{}",
        std::fs::read_to_string(fixture("intermediate.pem")).unwrap(),
        std::fs::read_to_string(fixture("root.pem")).unwrap()
    );
    std::fs::write(&bundle, cas).unwrap();

    let output = certscope()
        .arg("chain")
        .arg("--leaf")
        .arg(fixture("leaf.pem"))
        .arg("--cas")
        .arg(&bundle)
        .output()
        .unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(" 0. CN=certscope Test Root"));
    assert!(out.contains(" 1. CN=certscope Test Intermediate"));
    assert!(out.contains("Complete: ends at a self-signed root"));

    let output = certscope()
        .arg("chain")
        .arg("--leaf")
        .arg(fixture("leaf.pem"))
        .arg("--cas")
        .arg(&bundle)
        .arg("--pem")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output).matches("-----BEGIN CERTIFICATE-----").count(), 3);
}

#[test]
fn test_save_defaults_persists_view() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    let config = dir.path().join("certscope.yaml");
    std::fs::write(
        &config,
        format!("settings:\n  path: {}\n", settings.display()),
    )
    .unwrap();

    let output = run_with_stdin(
        &[
            "--config",
            config.to_str().unwrap(),
            "decode",
            "--view",
            "der",
            "--no-hex",
            "--save-defaults",
        ],
        "020105",
    );
    assert!(output.status.success());
    assert!(settings.exists());

    let output = run_with_stdin(&["--config", config.to_str().unwrap(), "decode"], "020105");
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(!out.contains("00000000"));
    assert!(out.contains("INTEGER"));
}
