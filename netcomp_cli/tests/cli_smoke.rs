use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file_path(prefix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("netcomp-{prefix}-{nonce}.cfg"))
}

const SAMPLE: &str = "hostname edge-1\n\
                      interface GigabitEthernet0/0\n nameif outside\n ip address 192.0.2.1 255.255.255.0\n\
                      access-list OUTSIDE_IN extended deny tcp any any eq 80\n\
                      access-group OUTSIDE_IN in interface outside\n";

#[test]
fn ftd_compile_prints_summary() {
    let path = temp_file_path("summary");
    fs::write(&path, SAMPLE).expect("write sample");

    let output = Command::new(env!("CARGO_BIN_EXE_ftd-compile"))
        .arg(&path)
        .output()
        .expect("run ftd-compile");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hostname edge-1"));
    assert!(stdout.contains("1 zones"));
}

#[test]
fn ftd_compile_emits_json_keyed_by_file() {
    let path = temp_file_path("json");
    fs::write(&path, SAMPLE).expect("write sample");

    let output = Command::new(env!("CARGO_BIN_EXE_ftd-compile"))
        .arg("--format")
        .arg("json")
        .arg(&path)
        .output()
        .expect("run ftd-compile --format json");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let report = &json[path.display().to_string()];
    assert_eq!(report["configuration"]["hostname"], "edge-1");
    assert_eq!(
        report["configuration"]["interfaces"]["GigabitEthernet0/0"]["incoming_filter"],
        "OUTSIDE_IN"
    );
}

#[test]
fn ftd_compile_applies_hostname_default_and_quiet_unknown() {
    let path = temp_file_path("defaults");
    fs::write(&path, "some-unknown-stanza here\ninterface Gi0/0\n nameif inside\n")
        .expect("write sample");

    let output = Command::new(env!("CARGO_BIN_EXE_ftd-compile"))
        .args(["--format", "json", "--hostname-default", "lab-fw", "--quiet-unknown"])
        .arg(&path)
        .output()
        .expect("run ftd-compile");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let report = &json[path.display().to_string()];
    assert_eq!(report["configuration"]["hostname"], "lab-fw");
    assert_eq!(report["warnings"]["entries"], serde_json::json!([]));
}

#[test]
fn ftd_compile_fails_on_binary_input() {
    let path = temp_file_path("binary");
    fs::write(&path, b"hostname x\n\x00\x01\x02").expect("write sample");

    let output = Command::new(env!("CARGO_BIN_EXE_ftd-compile"))
        .arg(&path)
        .output()
        .expect("run ftd-compile");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("error: input looks binary"));
}
