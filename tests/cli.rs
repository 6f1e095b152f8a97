use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn generated_capture_cracks_to_its_key() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("weak.bin");

    Command::cargo_bin("wepcrack")
        .unwrap()
        .arg("generate")
        .arg(&capture)
        .arg("--key")
        .arg("17,42,5,88,63")
        .assert()
        .success();

    let output = Command::cargo_bin("wepcrack")
        .unwrap()
        .arg("crack")
        .arg(&capture)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        format!("Filename: {}\nKey\t: 17 42 5 88 63\n", capture.display())
    );
}

#[test]
fn capture_without_enough_samples_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("sparse.bin");
    // 8 byte key, 2 records.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&8i32.to_le_bytes());
    bytes.extend_from_slice(&2i32.to_le_bytes());
    bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    std::fs::write(&capture, bytes).unwrap();

    let output = Command::cargo_bin("wepcrack")
        .unwrap()
        .args(["crack", "--brute-force-len", "1"])
        .arg(&capture)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        format!("Failed to find key for {}\n", capture.display())
    );
}

#[test]
fn truncated_capture_fails_with_error_exit() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("truncated.bin");
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&8i32.to_le_bytes());
    bytes.extend_from_slice(&5i32.to_le_bytes());
    bytes.extend_from_slice(&[1, 2, 3, 4]);
    std::fs::write(&capture, bytes).unwrap();

    Command::cargo_bin("wepcrack")
        .unwrap()
        .arg("crack")
        .arg(&capture)
        .assert()
        .failure();
}
