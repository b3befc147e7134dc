//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreakOut {
    current: u32,
    longest: u32,
    #[serde(rename = "totalTasks")]
    total_tasks: u64,
    #[serde(rename = "lastCompleted")]
    last_completed: Option<String>,
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tickoff"))
        .env("TICKOFF_DATA_DIR", data_dir)
        .env_remove("TICKOFF_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command {args:?} failed: {stderr}");
    stdout
}

fn streak(data_dir: &Path, args: &[&str]) -> StreakOut {
    serde_json::from_str(&run_cli_success(data_dir, args)).expect("streak JSON")
}

#[test]
fn test_fresh_user_has_empty_streak() {
    let dir = tempfile::TempDir::new().unwrap();
    let view = streak(dir.path(), &["streak", "show"]);
    assert_eq!(view.current, 0);
    assert_eq!(view.longest, 0);
    assert_eq!(view.total_tasks, 0);
    assert!(view.last_completed.is_none());
}

#[test]
fn test_todo_completion_drives_streak() {
    let dir = tempfile::TempDir::new().unwrap();
    let d = dir.path();

    let out = run_cli_success(d, &["todo", "add", "Water plants", "--today", "2024-05-10"]);
    let created: serde_json::Value = serde_json::from_str(&out).unwrap();
    let id = created["todo"]["id"].as_str().unwrap().to_string();
    assert!(created.get("streak").is_none());

    let out = run_cli_success(d, &["todo", "done", &id, "--today", "2024-05-10"]);
    let done: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(done["todo"]["completed"], true);
    assert_eq!(done["streak"]["current"], 1);

    run_cli_success(d, &["todo", "add", "Call mum", "--done", "--today", "2024-05-11"]);
    let view = streak(d, &["streak", "show", "--today", "2024-05-12"]);
    assert_eq!(view.current, 2);
    assert_eq!(view.total_tasks, 2);
    assert_eq!(view.last_completed.as_deref(), Some("2024-05-11"));

    let view = streak(d, &["streak", "show", "--today", "2024-05-13"]);
    assert_eq!(view.current, 0);
    assert_eq!(view.longest, 2);

    let list: serde_json::Value =
        serde_json::from_str(&run_cli_success(d, &["todo", "list"])).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[test]
fn test_users_are_separated() {
    let dir = tempfile::TempDir::new().unwrap();
    let d = dir.path();
    run_cli_success(d, &["--user", "alice", "streak", "complete"]);
    run_cli_success(d, &["streak", "complete", "--user", "alice"]);

    assert_eq!(streak(d, &["streak", "show", "--user", "alice"]).total_tasks, 2);
    assert_eq!(streak(d, &["streak", "show", "--user", "bob"]).total_tasks, 0);
}

#[test]
fn test_malformed_today_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    for bad in ["2024-02-30", "2024-5-1", " 2024-05-10"] {
        let (_, stderr, code) = run_cli(dir.path(), &["streak", "complete", "--today", bad]);
        assert_eq!(code, 1, "{bad:?} was accepted");
        assert!(stderr.contains("Invalid calendar day"), "stderr: {stderr}");
    }
    assert_eq!(streak(dir.path(), &["streak", "show"]).total_tasks, 0);
}

#[test]
fn test_unknown_todo_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["todo", "done", "no-such-id"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn test_blank_title_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["todo", "add", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Title is required"), "stderr: {stderr}");
}

#[test]
fn test_config_get_set_and_backdate_policy() {
    let dir = tempfile::TempDir::new().unwrap();
    let d = dir.path();
    assert_eq!(run_cli_success(d, &["config", "get", "clock.mode"]).trim(), "local");

    run_cli_success(d, &["streak", "complete", "--today", "2024-05-10"]);

    // Default policy counts a backdated completion without moving the streak.
    let view = streak(d, &["streak", "complete", "--today", "2024-05-08"]);
    assert_eq!(view.total_tasks, 2);
    assert_eq!(view.last_completed.as_deref(), Some("2024-05-10"));

    run_cli_success(d, &["config", "set", "streak.backdate_policy", "reject"]);
    assert_eq!(
        run_cli_success(d, &["config", "get", "streak.backdate_policy"]).trim(),
        "reject"
    );
    let (_, stderr, code) = run_cli(d, &["streak", "complete", "--today", "2024-05-08"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("earlier than last completion"), "stderr: {stderr}");

    let (_, _, code) = run_cli(d, &["config", "set", "clock.mode", "mars"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(d, &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);

    run_cli_success(d, &["config", "reset"]);
    assert_eq!(
        run_cli_success(d, &["config", "get", "streak.backdate_policy"]).trim(),
        "count_only"
    );
}

#[test]
fn test_completions() {
    let dir = tempfile::TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["completions", "bash"]);
    assert!(out.contains("tickoff"));
}
