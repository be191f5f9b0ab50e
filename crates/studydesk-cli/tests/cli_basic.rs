//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(dir: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_studydesk-cli"))
        .args(args)
        .env("STUDYDESK_DATA_DIR", dir.path())
        .env_remove("STUDYDESK_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn fresh() -> TempDir {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&dir, &["config", "set", "notifications.sound", "none"]);
    assert_eq!(code, 0, "silencing cues failed");
    dir
}

fn list_json(dir: &TempDir) -> Vec<serde_json::Value> {
    let (code, stdout, _) = run_cli(dir, &["timer", "list", "--json"]);
    assert_eq!(code, 0, "timer list --json failed");
    serde_json::from_str::<serde_json::Value>(&stdout)
        .unwrap()
        .as_array()
        .cloned()
        .unwrap()
}

fn add(dir: &TempDir, name: &str, seconds: &str) -> String {
    let (code, stdout, _) = run_cli(dir, &["timer", "add", name, "--seconds", seconds]);
    assert_eq!(code, 0, "timer add failed");
    let event: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(event["type"], "TimerCreated");
    event["id"].as_str().unwrap().to_string()
}

#[test]
fn test_timer_add_and_list() {
    let dir = fresh();
    let id = add(&dir, "Study", "5");

    let timers = list_json(&dir);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0]["id"], id.as_str());
    assert_eq!(timers[0]["name"], "Study");
    assert_eq!(timers[0]["duration"], 5);
    assert_eq!(timers[0]["remaining"], 5);
    assert_eq!(timers[0]["isRunning"], false);
    assert_eq!(timers[0]["display"], "00:00:05");
}

#[test]
fn test_timer_add_rejects_invalid_input() {
    let dir = fresh();
    let (code, _, stderr) = run_cli(&dir, &["timer", "add", "Nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (code, _, _) = run_cli(&dir, &["timer", "add", "   ", "--seconds", "10"]);
    assert_eq!(code, 1);

    assert!(list_json(&dir).is_empty());
}

#[test]
fn test_timer_toggle_and_tick_to_completion() {
    let dir = fresh();
    let id = add(&dir, "Quick", "2");

    let (code, stdout, _) = run_cli(&dir, &["timer", "toggle", &id[..8]]);
    assert_eq!(code, 0);
    assert!(stdout.contains("TimerStarted"));

    let (code, stdout, stderr) = run_cli(&dir, &["timer", "tick", "--count", "3"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.matches("TimerCompleted").count(), 1);
    assert!(stderr.contains("Time's up: Quick"));

    let timers = list_json(&dir);
    assert_eq!(timers[0]["remaining"], 0);
    assert_eq!(timers[0]["isRunning"], false);
    assert_eq!(timers[0]["phase"], "completed");

    // Completed timers stay completed.
    let (code, stdout, _) = run_cli(&dir, &["timer", "toggle", &id]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert_eq!(list_json(&dir)[0]["isRunning"], false);
}

#[test]
fn test_timer_pause_keeps_remaining() {
    let dir = fresh();
    let id = add(&dir, "Read", "10");
    run_cli(&dir, &["timer", "toggle", &id]);
    run_cli(&dir, &["timer", "tick", "--count", "4"]);

    let (code, stdout, _) = run_cli(&dir, &["timer", "toggle", &id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("TimerPaused"));

    run_cli(&dir, &["timer", "tick", "--count", "4"]);
    assert_eq!(list_json(&dir)[0]["remaining"], 6);
}

#[test]
fn test_timer_delete() {
    let dir = fresh();
    let keep = add(&dir, "Keep", "30");
    let gone = add(&dir, "Gone", "30");

    let (code, stdout, _) = run_cli(&dir, &["timer", "delete", &gone]);
    assert_eq!(code, 0);
    assert!(stdout.contains("TimerDeleted"));

    let timers = list_json(&dir);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0]["id"], keep.as_str());
}

#[test]
fn test_unknown_ids_are_ignored() {
    let dir = fresh();
    add(&dir, "Only", "30");

    let (code, _, _) = run_cli(&dir, &["timer", "toggle", "no-such-timer"]);
    assert_eq!(code, 0);
    let (code, _, _) = run_cli(&dir, &["timer", "delete", "no-such-timer"]);
    assert_eq!(code, 0);

    let timers = list_json(&dir);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0]["isRunning"], false);
}

#[test]
fn test_timer_run_until_idle() {
    let dir = fresh();
    run_cli(&dir, &["config", "set", "timer.tick_interval_ms", "10"]);
    let id = add(&dir, "Sprint", "2");
    run_cli(&dir, &["timer", "toggle", &id]);

    let (code, stdout, _) = run_cli(&dir, &["timer", "run", "--until-idle"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.matches("TimerCompleted").count(), 1);
    assert_eq!(list_json(&dir)[0]["remaining"], 0);
}

#[test]
fn test_timer_run_exits_while_stdin_stays_open() {
    let dir = fresh();
    run_cli(&dir, &["config", "set", "timer.tick_interval_ms", "10"]);
    let id = add(&dir, "Open stdin", "3");
    run_cli(&dir, &["timer", "toggle", &id]);

    let mut child = Command::new(env!("CARGO_BIN_EXE_studydesk-cli"))
        .args(["timer", "run", "--until-idle"])
        .env("STUDYDESK_DATA_DIR", dir.path())
        .env_remove("STUDYDESK_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn CLI");
    // Held open until the end of the test.
    let _stdin = child.stdin.take();

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break Some(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        thread::sleep(Duration::from_millis(20));
    };

    let status = status.expect("session did not exit after its timers went idle");
    assert!(status.success());
    assert_eq!(list_json(&dir)[0]["remaining"], 0);
}

#[test]
fn test_timer_run_until_idle_exits_without_running_timers() {
    let dir = fresh();
    add(&dir, "Idle", "60");
    let (code, _, _) = run_cli(&dir, &["timer", "run", "--until-idle"]);
    assert_eq!(code, 0);
    assert_eq!(list_json(&dir)[0]["remaining"], 60);
}

#[test]
fn test_config_get_set() {
    let dir = fresh();
    let (code, stdout, _) = run_cli(&dir, &["config", "get", "timer.tick_interval_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1000");

    let (code, _, _) = run_cli(&dir, &["config", "set", "language", "ar"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["config", "get", "language"]);
    assert_eq!(stdout.trim(), "ar");

    let (code, _, _) = run_cli(&dir, &["config", "set", "timer.tick_interval_ms", "0"]);
    assert_eq!(code, 1);
    let (code, _, _) = run_cli(&dir, &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("studydesk-cli"));
}
