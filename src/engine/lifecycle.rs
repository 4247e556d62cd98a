//! Shared per-run state and the exclusive terminal transition.

use crate::model::{RunEvent, RunId, RunOutcome, RunState};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// State shared by the tasks monitoring one run.
///
/// The run state lives inside a `watch` channel; every read, every terminal
/// transition, and every line/tick emission goes through the sender's internal
/// lock via `send_if_modified`. Exactly one task can therefore win the race
/// between completion, timeout and cancellation, and no line or tick can be
/// emitted once the run has left `Running`. Receivers from
/// [`RunLifecycle::watch`] give the monitoring tasks a cancellable wait on the
/// terminal transition.
pub(crate) struct RunLifecycle {
    id: RunId,
    started_at: Instant,
    state: watch::Sender<RunState>,
    events: mpsc::UnboundedSender<RunEvent>,
    transcript: Mutex<Vec<String>>,
}

impl RunLifecycle {
    pub fn new(id: RunId, events: mpsc::UnboundedSender<RunEvent>) -> Arc<Self> {
        let (state, _) = watch::channel(RunState::Running);
        Arc::new(Self {
            id,
            started_at: Instant::now(),
            state,
            events,
            transcript: Mutex::new(Vec::new()),
        })
    }

    /// A run whose process never came up. Terminal from the start; the failure
    /// is reported immediately and no monitoring task ever binds to it.
    pub fn failed(id: RunId, events: mpsc::UnboundedSender<RunEvent>, message: String) -> Arc<Self> {
        let (state, _) = watch::channel(RunState::Failed);
        let _ = events.send(RunEvent::RunCompleted {
            id,
            outcome: RunOutcome::Failed,
            message: Some(message),
        });
        Arc::new(Self {
            id,
            started_at: Instant::now(),
            state,
            events,
            transcript: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().clone()
    }

    /// Emit one decoded output line, unless the run has left `Running`.
    /// Returns whether the line was emitted.
    pub fn emit_line(&self, text: String) -> bool {
        let mut emitted = false;
        self.state.send_if_modified(|state| {
            if state.is_running() {
                self.transcript.lock().push(text.clone());
                let _ = self.events.send(RunEvent::LineReceived { id: self.id, text });
                emitted = true;
            }
            false
        });
        emitted
    }

    /// Emit an elapsed-time tick, unless the run has left `Running`.
    pub fn emit_tick(&self) -> bool {
        let mut emitted = false;
        self.state.send_if_modified(|state| {
            if state.is_running() {
                let _ = self.events.send(RunEvent::StatusTick {
                    id: self.id,
                    elapsed_secs: self.started_at.elapsed().as_secs(),
                });
                emitted = true;
            }
            false
        });
        emitted
    }

    /// The exclusive `Running → terminal` transition. The single winner emits
    /// the completion event; losers observe `false` and must not emit.
    pub fn try_finish(&self, outcome: RunOutcome, message: Option<String>) -> bool {
        self.state.send_if_modified(|state| {
            if !state.is_running() {
                return false;
            }
            *state = outcome.state();
            let _ = self.events.send(RunEvent::RunCompleted {
                id: self.id,
                outcome,
                message,
            });
            true
        })
    }
}
