use assert_cmd::Command;
use std::io::Write;

fn formsync() -> Command {
    Command::cargo_bin("formsync").expect("binary should be built")
}

#[test]
fn test_help_lists_flags() {
    let output = formsync().arg("--help").assert().success().get_output().clone();
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--headed", "--selectors", "--loading-timeout-ms", "--settle-ms"] {
        assert!(help.contains(flag), "missing {} in:\n{}", flag, help);
    }
}

#[test]
fn test_missing_selectors_file_fails() {
    let output = formsync()
        .args(["--selectors", "/nonexistent/formsync-selectors.json"])
        .write_stdin("")
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config file"), "{}", stderr);
}

#[test]
fn test_malformed_selectors_file_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ \"timing\": {{ \"settleMs\": \"soon\" }} }}").unwrap();

    let output = formsync()
        .arg("--selectors")
        .arg(file.path())
        .write_stdin("")
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse config file"), "{}", stderr);
}

#[test]
fn test_unknown_flag_is_rejected() {
    formsync().arg("--port").arg("9222").assert().failure().code(2);
}
