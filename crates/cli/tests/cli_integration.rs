//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `arbor` binary and verify exit
//! codes, stdout content, and stderr content.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn arbor() -> Command {
    cargo_bin_cmd!("arbor")
}

// ──────────────────────────────────────────────
// Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    arbor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Arbor inventory path and data tool"));
}

#[test]
fn version_exits_0() {
    arbor()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("arbor"));
}

// ──────────────────────────────────────────────
// canon
// ──────────────────────────────────────────────

#[test]
fn canon_passes_through_a_full_path() {
    arbor()
        .args(["canon", "/t;t/e;e/r;r"])
        .assert()
        .success()
        .stdout("/t;t/e;e/r;r\n");
}

#[test]
fn canon_expands_a_reduced_path_under_context() {
    arbor()
        .args(["canon", "/e/c", "--origin", "/t;t", "--expect", "Resource"])
        .assert()
        .success()
        .stdout("/t;t/e;e/r;c\n");
}

#[test]
fn canon_types_a_relative_path() {
    arbor()
        .args([
            "canon",
            "../g",
            "--relative-origin",
            "/t;t/e;e/r;r",
            "--expect",
            "Metric",
        ])
        .assert()
        .success()
        .stdout("../m;g\n");
}

#[test]
fn canon_rejects_ambiguous_input() {
    arbor()
        .args(["canon", "/e/c", "--origin", "/t;t"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ambiguous"));
}

#[test]
fn canon_rejects_unknown_kind() {
    arbor()
        .args(["canon", "/c", "--expect", "Widget"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown entity kind"));
}

// ──────────────────────────────────────────────
// resolve / relativize
// ──────────────────────────────────────────────

#[test]
fn resolve_applies_up_hops() {
    arbor()
        .args(["resolve", "/t;t/e;e/r;r", "../g", "--expect", "Metric"])
        .assert()
        .success()
        .stdout("/t;t/e;e/m;g\n");
}

#[test]
fn resolve_rejects_excess_up_hops() {
    arbor()
        .args(["resolve", "/t;t", "../../x"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("hierarchy violation"));
}

#[test]
fn relativize_prints_the_hop_form() {
    arbor()
        .args(["relativize", "/t;t/e;e/r;r", "/t;t/e;e/m;g"])
        .assert()
        .success()
        .stdout("../m;g\n");
}

#[test]
fn relativize_and_resolve_invert() {
    let out = arbor()
        .args(["relativize", "/t;t/e;e/f;f/r;r", "/t;t/rt;rt/ot;ot"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let rel = String::from_utf8(out.stdout).unwrap();

    arbor()
        .args(["resolve", "/t;t/e;e/f;f/r;r", rel.trim()])
        .assert()
        .success()
        .stdout("/t;t/rt;rt/ot;ot\n");
}

// ──────────────────────────────────────────────
// detype
// ──────────────────────────────────────────────

#[test]
fn detype_reduces_under_context() {
    arbor()
        .args([
            "detype",
            "/t;t/e;e/r;c",
            "--origin",
            "/t;t",
            "--expect",
            "Resource",
        ])
        .assert()
        .success()
        .stdout("/e/c\n");
}

#[test]
fn detype_reduces_relative_paths() {
    arbor()
        .args([
            "detype",
            "../m;g",
            "--relative-origin",
            "/t;t/e;e/r;r",
            "--expect",
            "Metric",
        ])
        .assert()
        .success()
        .stdout("../g\n");
}

// ──────────────────────────────────────────────
// data
// ──────────────────────────────────────────────

#[test]
fn data_normalizes_stdin() {
    arbor()
        .arg("data")
        .write_stdin(r#"{"b": 1, "a": null, "nested": [1, 2.0, "x"]}"#)
        .assert()
        .success()
        .stdout("{\"a\":null,\"b\":1,\"nested\":[1,2.0,\"x\"]}\n");
}

#[test]
fn data_reads_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.json");
    std::fs::write(&path, r#"[true, 42, 42.0]"#).unwrap();

    arbor()
        .arg("data")
        .arg(&path)
        .assert()
        .success()
        .stdout("[true,42,42.0]\n");
}

#[test]
fn data_rejects_malformed_json() {
    arbor()
        .arg("data")
        .write_stdin("{not json")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("parsing JSON"));
}
