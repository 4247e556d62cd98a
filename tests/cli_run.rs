use assert_cmd::Command;
use predicates::prelude::*;

fn netdiag() -> Command {
    Command::cargo_bin("netdiag-cli").expect("binary builds")
}

#[test]
fn lists_the_command_catalog() {
    netdiag()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Check connectivity to Google"))
        .stdout(predicate::str::contains("ping google.com"))
        .stdout(predicate::str::contains("netsh wlan show profiles"));
}

#[test]
fn unknown_label_is_an_error() {
    netdiag()
        .args(["--label", "No such diagnostic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown catalog label"));
}

#[test]
fn running_nothing_is_an_error() {
    netdiag()
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to run"));
}

#[cfg(unix)]
#[test]
fn streams_command_output_to_stdout() {
    netdiag()
        .args(["--command", "echo hello-from-netdiag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-from-netdiag"))
        .stderr(predicate::str::contains("Outcome: completed"));
}

#[cfg(unix)]
#[test]
fn timed_out_runs_exit_nonzero() {
    netdiag()
        .args(["--command", "sleep 30", "--timeout", "300ms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out"));
}

#[cfg(unix)]
#[test]
fn json_mode_emits_event_lines() {
    let assert = netdiag()
        .args(["--command", "echo json-line", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();

    let mut saw_line = false;
    let mut saw_completed = false;
    for line in stdout.lines() {
        let event: serde_json::Value = serde_json::from_str(line).expect("each line is JSON");
        if let Some(received) = event.get("LineReceived") {
            saw_line = received["text"] == "json-line";
        }
        if event.get("RunCompleted").is_some() {
            saw_completed = true;
        }
    }
    assert!(saw_line, "expected a LineReceived event: {stdout}");
    assert!(saw_completed, "expected a RunCompleted event: {stdout}");
}
