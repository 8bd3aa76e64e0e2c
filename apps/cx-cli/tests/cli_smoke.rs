use std::path::{Path, PathBuf};
use std::process::Command;

fn demos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cx-cli"))
}

#[test]
fn validate_accepts_bundled_problems() {
    for name in ["li_jacobs_2024.yaml", "symmetric_binary.json"] {
        let output = cli().arg("validate").arg(demos().join(name)).output().unwrap();
        assert!(
            output.status.success(),
            "{}: {}",
            name,
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(String::from_utf8_lossy(&output.stdout).contains("Problem is valid"));
    }
}

#[test]
fn validate_rejects_missing_file() {
    let output = cli()
        .arg("validate")
        .arg(demos().join("does_not_exist.yaml"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn solve_writes_json_report() {
    let out = std::env::temp_dir().join("cx_cli_symmetric_binary_report.json");
    let output = cli()
        .arg("solve")
        .arg(demos().join("symmetric_binary.json"))
        .arg("--json")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let content = std::fs::read_to_string(&out).unwrap();
    let report: serde_json::Value = serde_json::from_str(&content).unwrap();
    let rounds = report["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0]["converged"], serde_json::Value::Bool(true));
    assert_eq!(rounds[0]["phases"].as_array().unwrap().len(), 2);
    assert!(report.get("merged_clusters").is_none());
}
