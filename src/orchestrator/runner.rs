//! The process runner: owns the current run and its state machine.

use crate::engine::{self, lifecycle::RunLifecycle};
use crate::model::{CommandSpec, RunEvent, RunId, RunOutcome, RunState, RunnerConfig};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

struct ActiveRun {
    lifecycle: Arc<RunLifecycle>,
    supervisor: Option<JoinHandle<()>>,
}

/// Coordinates one run at a time: start, cancel, reset. At most one process
/// is ever alive; starting while a run is in flight cancels it and waits for
/// its process to be dead and reaped before the new one is spawned.
pub(crate) struct ProcessRunner {
    config: RunnerConfig,
    events: UnboundedSender<RunEvent>,
    current: Option<ActiveRun>,
}

impl ProcessRunner {
    pub fn new(config: RunnerConfig, events: UnboundedSender<RunEvent>) -> Self {
        Self {
            config,
            events,
            current: None,
        }
    }

    /// `Idle` when no run exists; otherwise the current run's state, which
    /// stays at its terminal value until the next `start` or `reset`.
    pub fn state(&self) -> RunState {
        self.current
            .as_ref()
            .map(|run| run.lifecycle.state())
            .unwrap_or(RunState::Idle)
    }

    /// Accumulated output lines of the current (or last finished) run.
    pub fn output(&self) -> Vec<String> {
        self.current
            .as_ref()
            .map(|run| run.lifecycle.transcript())
            .unwrap_or_default()
    }

    /// Start a run, replacing any run still in flight.
    pub async fn start(&mut self, spec: CommandSpec) -> RunId {
        self.cancel().await;

        let id = RunId::new();
        match engine::spawn_process(&spec, &self.config) {
            Ok(child) => {
                let lifecycle = RunLifecycle::new(id, self.events.clone());
                let _ = self.events.send(RunEvent::RunStarted {
                    id,
                    label: spec.label.clone(),
                });
                let supervisor = engine::monitor(child, &self.config, lifecycle.clone());
                self.current = Some(ActiveRun {
                    lifecycle,
                    supervisor: Some(supervisor),
                });
            }
            Err(err) => {
                tracing::warn!(%err, command = %spec.command_line, "failed to spawn process");
                let lifecycle = RunLifecycle::failed(
                    id,
                    self.events.clone(),
                    format!("Failed to start `{}`: {err}", spec.command_line),
                );
                self.current = Some(ActiveRun {
                    lifecycle,
                    supervisor: None,
                });
            }
        }
        id
    }

    /// Cancel the current run if it is still running; otherwise a no-op.
    /// Idempotent. Does not return until the run's process is dead and its
    /// task group has wound down.
    pub async fn cancel(&mut self) {
        let Some(run) = self.current.as_mut() else {
            return;
        };
        if run
            .lifecycle
            .try_finish(RunOutcome::Cancelled, Some("Execution cancelled.".to_string()))
        {
            tracing::debug!(run = %run.lifecycle.id(), "run cancelled");
        }
        if let Some(supervisor) = run.supervisor.take() {
            let _ = supervisor.await;
        }
    }

    /// Cancel, then discard all accumulated output and return to `Idle`.
    pub async fn reset(&mut self) {
        self.cancel().await;
        self.current = None;
    }
}
