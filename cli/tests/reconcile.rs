//! End-to-end runs of the `evidentia` binary against files on disk.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

const PLAN: &str = r#"{
    "planner_agent": [
        { "role": "assistant", "name": "planner_agent",
          "content": { "plan": "1. Open login\n2. Submit credentials\n3. Open reports",
                       "next_step": "Open the login page", "next_step_summary": "open login page" } },
        { "role": "assistant", "name": "planner_agent",
          "content": { "next_step": "Enter the credentials and press Sign in",
                       "next_step_summary": "submit login form" } },
        { "role": "assistant", "name": "planner_agent",
          "content": { "next_step": "Open the monthly reports tab",
                       "next_step_summary": "open monthly reports tab", "terminate": "yes" } }
    ]
}"#;

const BUNDLE: &str = r#"{
    "sources": [
        { "source_id": "screen", "actions": [
            { "timestamp": 1.0, "description": "open login page", "confidence": 0.9 },
            { "timestamp": 4.0, "description": "submit login form", "confidence": 0.9 }
        ] }
    ],
    "test": {
        "outcome": "failed",
        "failure_messages": ["TimeoutError: monthly reports tab never loaded"],
        "assertions": [
            { "description": "reports visible", "outcome": "failed",
              "message": "open monthly reports tab timed out" }
        ]
    }
}"#;

const SOURCES_ONLY: &str = r#"{
    "sources": [
        { "source_id": "screen", "actions": [
            { "timestamp": 1.0, "description": "open login page", "confidence": 0.9 },
            { "timestamp": 4.0, "description": "submit login form", "confidence": 0.9 }
        ] }
    ]
}"#;

const JUNIT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<testsuites>
  <testsuite name="pytest" failures="1" errors="0" tests="1">
    <testcase classname="test_agent" name="test_reports">
      <properties>
        <property name="assert_summary" value="open monthly reports tab timed out"/>
        <property name="is_passed" value="false"/>
      </properties>
      <failure message="TimeoutError: monthly reports tab never loaded">traceback</failure>
    </testcase>
  </testsuite>
</testsuites>"#;

fn evidentia(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_evidentia"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch evidentia")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn reconcile_emits_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write(dir.path(), "plan.json", PLAN);
    let bundle = write(dir.path(), "bundle.json", BUNDLE);

    let out = evidentia(&["reconcile", "--plan", &plan, "--evidence", &bundle, "--format", "json"]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let summary: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["total_steps"], 3);
    assert_eq!(summary["observed_count"], 2);
    assert_eq!(summary["deviation_count"], 1);
    assert_eq!(summary["results"][2]["verdict"]["deviation"], "not_visible");
    assert_eq!(
        summary["results"][2]["test_corroboration"],
        "open monthly reports tab timed out"
    );
    assert_eq!(summary["cross_reference"]["test_outcome"], "failed");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("3 decisions"), "stderr: {stderr}");
}

#[test]
fn reconcile_reads_junit_test_result() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write(dir.path(), "plan.json", PLAN);
    let bundle = write(dir.path(), "bundle.json", SOURCES_ONLY);
    let junit = write(dir.path(), "test_result.xml", JUNIT);

    let out = evidentia(&[
        "reconcile",
        "--plan",
        &plan,
        "--evidence",
        &bundle,
        "--test-result",
        &junit,
        "--format",
        "json",
    ]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let summary: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["cross_reference"]["test_outcome"], "failed");
    assert_eq!(
        summary["cross_reference"]["failure_messages"][0],
        "TimeoutError: monthly reports tab never loaded"
    );
    assert_eq!(summary["results"][2]["verdict"]["deviation"], "not_visible");
    assert_eq!(
        summary["results"][2]["test_corroboration"],
        "open monthly reports tab timed out"
    );
}

#[test]
fn unsupported_test_result_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write(dir.path(), "plan.json", PLAN);
    let bundle = write(dir.path(), "bundle.json", SOURCES_ONLY);
    let report = write(dir.path(), "test_result.txt", "passed");

    let out = evidentia(&[
        "reconcile",
        "--plan",
        &plan,
        "--evidence",
        &bundle,
        "--test-result",
        &report,
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unsupported test result format"));
}

#[test]
fn reconcile_writes_markdown_and_verifiable_audit_log() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write(dir.path(), "plan.json", PLAN);
    let bundle = write(dir.path(), "bundle.json", BUNDLE);
    let report = dir.path().join("out").join("report.md");
    let audit = dir.path().join("audit.json");

    let out = evidentia(&[
        "reconcile",
        "--plan",
        &plan,
        "--evidence",
        &bundle,
        "--output",
        report.to_str().unwrap(),
        "--audit-log",
        audit.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let md = std::fs::read_to_string(&report).unwrap();
    assert!(md.contains("# Deviation Report"));
    assert!(md.contains("- **Observed:** 2"));
    assert!(md.contains("### Deviation 1: not visible (step 3)"));

    let verify = evidentia(&["verify-audit", "--log", audit.to_str().unwrap()]);
    assert!(verify.status.success());
    assert!(String::from_utf8_lossy(&verify.stdout).contains("audit log OK"));
}

#[test]
fn tampered_audit_log_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write(dir.path(), "plan.json", PLAN);
    let bundle = write(dir.path(), "bundle.json", BUNDLE);
    let audit = dir.path().join("audit.json");

    let out = evidentia(&[
        "reconcile",
        "--plan",
        &plan,
        "--evidence",
        &bundle,
        "--format",
        "json",
        "--audit-log",
        audit.to_str().unwrap(),
    ]);
    assert!(out.status.success());

    let mut log: Value = serde_json::from_str(&std::fs::read_to_string(&audit).unwrap()).unwrap();
    log["events"][2]["record"]["result"]["verdict"] = Value::String("observed".to_string());
    std::fs::write(&audit, serde_json::to_string(&log).unwrap()).unwrap();

    let verify = evidentia(&["verify-audit", "--log", audit.to_str().unwrap()]);
    assert_eq!(verify.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&verify.stderr).contains("failed verification"));
}

#[test]
fn threshold_config_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write(dir.path(), "plan.json", PLAN);
    let bundle = write(dir.path(), "bundle.json", BUNDLE);
    let config = write(dir.path(), "thresholds.toml", "[thresholds]\naccept = 1.5\n");

    let out = evidentia(&[
        "reconcile",
        "--plan",
        &plan,
        "--evidence",
        &bundle,
        "--config",
        &config,
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("accept_threshold"));
}

#[test]
fn schema_violations_exit_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write(dir.path(), "plan.json", PLAN);
    let bundle = write(dir.path(), "bundle.json", r#"{ "sources": [ { "actions": [] } ] }"#);

    let out = evidentia(&["reconcile", "--plan", &plan, "--evidence", &bundle]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("schema validation error"));
}

#[test]
fn missing_input_file_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = write(dir.path(), "bundle.json", BUNDLE);
    let missing = dir.path().join("absent.json");

    let out = evidentia(&[
        "reconcile",
        "--plan",
        missing.to_str().unwrap(),
        "--evidence",
        &bundle,
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("absent.json"));
}

#[test]
fn sample_runs_four_steps() {
    let out = evidentia(&["sample", "--format", "json"]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let summary: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["total_steps"], 4);
    assert_eq!(summary["results"][0]["verdict"], "observed");
    assert_eq!(summary["results"][1]["verdict"], "observed");
    assert_eq!(summary["results"][3]["test_corroboration"], "cart is empty");
}

#[test]
fn sample_renders_html() {
    let out = evidentia(&["sample", "--format", "html"]);

    assert!(out.status.success());
    let html = String::from_utf8_lossy(&out.stdout);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Type 'wireless headphones' into the search box"));
}
