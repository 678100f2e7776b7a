use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn bin() -> String {
    // Cargo sets this for bin targets in integration tests
    env!("CARGO_BIN_EXE_matrixcalc").to_string()
}

/// Runs the binary against a private config and registry inside `dir`.
fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--registry")
        .arg(dir.join("matrices.json"))
        .args(args)
        .output()
        .expect("run")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn calc_prints_json_results() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["calc", "determinant", "--a", "[[1,2],[3,4]]"]);
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&out)).unwrap();
    assert_eq!(value, serde_json::json!({ "result": -2.0 }));

    let out = run(dir.path(), &["calc", "characteristic", "--a", "[[1,2],[3,4]]"]);
    assert_eq!(stdout_of(&out), r#"{"result":"X**2 - 5*X - 2"}"#);
}

#[test]
fn calc_exact_mode_prints_rationals() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["calc", "inverse", "--a", "[[1,2],[3,4]]", "--exact"]);
    assert_eq!(stdout_of(&out), "a11 = -2  a12 = 1\na21 = 3/2  a22 = -1/2");

    let out = run(
        dir.path(),
        &["calc", "power", "--a", "[[4,0],[0,9]]", "--scalar", "1/2", "--exact"],
    );
    assert_eq!(stdout_of(&out), "a11 = 2  a12 = 0\na21 = 0  a22 = 3");
}

#[test]
fn negative_scalars_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["calc", "scalar_multiply", "--a", "[[1,-2]]", "--scalar", "-3"]);
    assert_eq!(stdout_of(&out), r#"{"result":[[-3.0,6.0]]}"#);
}

#[test]
fn registry_round_trip_through_the_cli() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["store", "set", "A", "[[2,1],[1,1]]"]);
    assert_eq!(stdout_of(&out), "Matrix A saved successfully");
    let out = run(dir.path(), &["store", "set", "A", "[[1,2],[3,4]]"]);
    assert_eq!(stdout_of(&out), "Matrix A updated successfully");

    let out = run(dir.path(), &["calc", "inverse", "--a", "@A", "--store", "Inv"]);
    stdout_of(&out);
    let out = run(dir.path(), &["store", "list"]);
    assert_eq!(stdout_of(&out), "A (2x2)\nInv (2x2)");
    let out = run(dir.path(), &["calc", "multiply", "--a", "@A", "--b", "@Inv", "--exact"]);
    assert_eq!(stdout_of(&out), "a11 = 1  a12 = 0\na21 = 0  a22 = 1");

    let out = run(dir.path(), &["store", "delete", "Inv"]);
    assert_eq!(stdout_of(&out), "Matrix Inv deleted successfully");
    let out = run(dir.path(), &["store", "show", "A"]);
    assert_eq!(stdout_of(&out), "a11 = 1  a12 = 2\na21 = 3  a22 = 4");
    assert!(dir.path().join("matrices.json").exists());
}

#[test]
fn check_prints_the_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["check", "symmetric", "--a", "[[1,2],[2,1]]"]);
    assert_eq!(stdout_of(&out), "Matrix is symmetric");
    let out = run(dir.path(), &["check", "invertible", "--a", "[[1,2],[2,4]]"]);
    assert_eq!(stdout_of(&out), "Matrix is not invertible");
}

#[test]
fn config_precision_rounds_exact_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "precision = 3\n").unwrap();
    let out = run(dir.path(), &["calc", "transpose", "--a", "[[1.23456, 0.5]]", "--exact"]);
    assert_eq!(stdout_of(&out), "a11 = 1.235\na21 = 0.5");
}

#[test]
fn failures_exit_nonzero_with_a_message() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["calc", "inverse", "--a", "[[1,2],[2,4]]"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Singular Matrix"), "stderr:\n{stderr}");

    let out = run(dir.path(), &["calc", "trace", "--a", "@Missing"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("matrix Missing not found"));

    let out = run(dir.path(), &["check", "square", "--a", "[[1]]"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown Property"));
}
