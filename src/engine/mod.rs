//! Process-execution engine: one shell command per run, monitored by an
//! output streamer, a status ticker and a deadline watchdog.

pub(crate) mod lifecycle;
mod stream;
mod ticker;
mod watchdog;

use crate::model::{CommandSpec, RunnerConfig};
use lifecycle::RunLifecycle;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Build the shell invocation for a command line. The catalog string is
/// passed through verbatim; stdout and stderr are both piped so their lines
/// merge into one event stream. `kill_on_drop` backstops the watchdog's
/// explicit kill.
fn shell_invocation(config: &RunnerConfig, command_line: &str) -> Command {
    let mut cmd = if let Some(shell) = config.shell.as_deref() {
        let mut cmd = Command::new(shell);
        cmd.arg("-c").arg(command_line);
        cmd
    } else if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command_line);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    };
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Spawn the OS process for `spec`. A refused spawn is the caller's cue to
/// mark the run `Failed`; no monitoring tasks exist at that point.
pub(crate) fn spawn_process(spec: &CommandSpec, config: &RunnerConfig) -> std::io::Result<Child> {
    let child = shell_invocation(config, &spec.command_line).spawn()?;
    tracing::debug!(pid = ?child.id(), command = %spec.command_line, "spawned process");
    Ok(child)
}

/// Launch the monitoring task group for a spawned process: two output pumps,
/// the ticker, and the supervising watchdog that owns the child. Returns the
/// supervision handle; awaiting it serializes run replacement.
pub(crate) fn monitor(
    mut child: Child,
    config: &RunnerConfig,
    lifecycle: Arc<RunLifecycle>,
) -> JoinHandle<()> {
    let stdout = child
        .stdout
        .take()
        .map(|pipe| tokio::spawn(stream::pump_lines(pipe, lifecycle.clone())));
    let stderr = child
        .stderr
        .take()
        .map(|pipe| tokio::spawn(stream::pump_lines(pipe, lifecycle.clone())));
    let ticker = tokio::spawn(ticker::run_ticker(lifecycle.clone(), config.tick_interval));

    let tasks = watchdog::MonitorTasks {
        stdout,
        stderr,
        ticker,
    };
    tokio::spawn(watchdog::supervise(child, lifecycle, config.timeout, tasks))
}
