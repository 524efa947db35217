//! Common utilities for CLI E2E tests.

#![allow(dead_code)]

use std::process::Command;

use tempfile::TempDir;

/// An isolated data directory for one test.
pub struct Home {
    dir: TempDir,
}

impl Home {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run_cli(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_habitual"))
            .args(args)
            .env("HABITUAL_HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run_cli(args);
        assert_eq!(
            code, 0,
            "CLI command failed with code {}: {:?}\n{}",
            code, args, stderr
        );
        stdout
    }

    /// Invoke a CLI command and expect failure.
    pub fn run_cli_failure(&self, args: &[&str]) -> (String, String, i32) {
        let (stdout, stderr, code) = self.run_cli(args);
        assert!(code != 0, "CLI command unexpectedly succeeded: {:?}", args);
        (stdout, stderr, code)
    }

    /// Run a command and parse its stdout as JSON.
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        parse_json(&self.run_cli_success(args))
    }
}

/// Parse JSON output from CLI.
pub fn parse_json<T: for<'de> serde::Deserialize<'de>>(json: &str) -> T {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Check if string contains substring
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected '{}' to contain '{}'",
        haystack,
        needle
    );
}

/// Check if JSON has a specific field
pub fn assert_json_field(json: &serde_json::Value, field: &str) {
    if let Some(obj) = json.as_object() {
        assert!(
            obj.contains_key(field),
            "Expected JSON to contain field '{}', got keys: {:?}",
            field,
            obj.keys().collect::<Vec<_>>()
        );
    } else {
        panic!("Expected JSON object, got: {:?}", json);
    }
}
