//! 命令行端到端测试

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_cachesim(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cachesim"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn cachesim");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_text_report_from_stdin() {
    let output = run_cachesim(&["--seed", "1"], "0x0\n0x400\n0x400\n");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Number of Sets: 16"));
    assert!(stdout.contains("Hits: 1"));
    assert!(stdout.contains("Misses: 2"));
    assert!(stdout.contains("Evictions: 1"));
    assert!(stdout.contains("Index: 0, Valid: 1, Tag: 1, Dirty: 1"));
}

#[test]
fn test_json_report_fully_associative() {
    let output = run_cachesim(
        &["-m", "full", "--cache-size", "256", "-s", "3", "-f", "json"],
        "0 40 80 c0\n100\n",
    );
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["geometry"]["associativity"], 4);
    assert_eq!(json["counters"]["misses"], 5);
    assert_eq!(json["counters"]["evictions"], 1);
    assert_eq!(json["accesses"][4]["result"]["outcome"], "miss_evicted");
}

#[test]
fn test_invalid_configuration_fails() {
    let output = run_cachesim(&["--cache-size", "1000"], "0\n");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("power of two"));
}

#[test]
fn test_bad_trace_fails_with_line_number() {
    let output = run_cachesim(&[], "10\nnot-hex\n");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("line 2"));
}

#[test]
fn test_oversized_cache_fails_cleanly() {
    let output = run_cachesim(
        &[
            "-m",
            "full",
            "--cache-size",
            "0x4000000000000000",
            "--block-size",
            "0x2000000000000000",
            "--memory-size",
            "0x4000000000000000",
        ],
        "0\n",
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("32-bit address space"));
}
