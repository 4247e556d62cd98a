//! Deadline enforcement and process supervision for a single run.

use crate::engine::lifecycle::RunLifecycle;
use crate::model::RunOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Grace period for pumping trailing output after a natural exit. EOF arrives
/// as soon as the dead process's pipes close; the bound only matters when a
/// grandchild inherited them and keeps them open.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

pub(crate) struct MonitorTasks {
    pub stdout: Option<JoinHandle<()>>,
    pub stderr: Option<JoinHandle<()>>,
    pub ticker: JoinHandle<()>,
}

/// Await process exit up to `timeout` from now, racing the deadline and any
/// externally won terminal transition (cancel/replace). Whatever the path,
/// the process is dead and reaped and the whole task group has wound down
/// before this returns.
pub(crate) async fn supervise(
    mut child: Child,
    lifecycle: Arc<RunLifecycle>,
    timeout: Duration,
    mut tasks: MonitorTasks,
) {
    let mut state_rx = lifecycle.watch();
    let deadline = Instant::now() + timeout;
    tokio::select! {
        status = child.wait() => {
            // Exit code is deliberately not interpreted: any exit, zero or
            // not, is a completion. Trailing output is drained first so the
            // last lines precede the completion event.
            match status {
                Ok(status) => tracing::debug!(run = %lifecycle.id(), ?status, "process exited"),
                Err(err) => tracing::debug!(run = %lifecycle.id(), %err, "waiting on process failed"),
            }
            drain_output(&mut tasks).await;
            lifecycle.try_finish(RunOutcome::Completed, None);
        }
        _ = tokio::time::sleep_until(deadline) => {
            kill_and_reap(&mut child).await;
            lifecycle.try_finish(
                RunOutcome::TimedOut,
                Some(format!(
                    "Command timed out after {}s and was terminated.",
                    timeout.as_secs()
                )),
            );
        }
        _ = async { let _ = state_rx.wait_for(|state| !state.is_running()).await; } => {
            // Cancel or replace won the transition; only the kill is ours.
            kill_and_reap(&mut child).await;
        }
    }
    shutdown_tasks(tasks).await;
}

/// Forceful termination, then reap so no zombie outlives the run.
async fn kill_and_reap(child: &mut Child) {
    if let Err(err) = child.start_kill() {
        tracing::debug!(%err, "kill failed, process likely already gone");
    }
    let _ = child.wait().await;
}

async fn drain_output(tasks: &mut MonitorTasks) {
    for mut task in [tasks.stdout.take(), tasks.stderr.take()]
        .into_iter()
        .flatten()
    {
        if tokio::time::timeout(DRAIN_GRACE, &mut task).await.is_err() {
            task.abort();
        }
    }
}

/// The pumps and ticker observe the terminal state through the watch channel;
/// joining them here keeps the task group 1:1 with its run.
async fn shutdown_tasks(tasks: MonitorTasks) {
    for task in [tasks.stdout, tasks.stderr].into_iter().flatten() {
        let _ = task.await;
    }
    let _ = tasks.ticker.await;
}
