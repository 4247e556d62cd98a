use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A runnable diagnostic: human-readable label plus the literal command line
/// handed to the OS shell verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub label: String,
    pub command_line: String,
}

impl CommandSpec {
    pub fn new(label: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command_line: command_line.into(),
        }
    }

    /// A spec for a raw command line outside the catalog; the command doubles
    /// as its own label.
    pub fn raw(command_line: impl Into<String>) -> Self {
        let command_line = command_line.into();
        Self {
            label: command_line.clone(),
            command_line,
        }
    }
}

/// Opaque token identifying a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(u64);

impl RunId {
    pub fn new() -> Self {
        Self(rand::thread_rng().next_u64())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a run. Exactly one value holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    TimedOut,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::TimedOut | RunState::Cancelled | RunState::Failed
        )
    }
}

/// How a run ended. Maps onto the terminal subset of [`RunState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed,
    TimedOut,
    Cancelled,
    Failed,
}

impl RunOutcome {
    pub fn state(self) -> RunState {
        match self {
            RunOutcome::Completed => RunState::Completed,
            RunOutcome::TimedOut => RunState::TimedOut,
            RunOutcome::Cancelled => RunState::Cancelled,
            RunOutcome::Failed => RunState::Failed,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::TimedOut => "timed out",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    RunStarted {
        id: RunId,
        label: String,
    },
    /// One decoded output line, in arrival order.
    LineReceived {
        id: RunId,
        text: String,
    },
    /// Elapsed-time status update, roughly once per tick interval.
    StatusTick {
        id: RunId,
        elapsed_secs: u64,
    },
    RunCompleted {
        id: RunId,
        outcome: RunOutcome,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Hard deadline for a run; the process is killed when it expires.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Interval between elapsed-time status ticks.
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Shell binary override. Defaults to `cmd /C` on Windows and `sh -c`
    /// elsewhere; an override is invoked as `<shell> -c <command line>`.
    #[serde(default)]
    pub shell: Option<std::path::PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            tick_interval: Duration::from_secs(1),
            shell: None,
        }
    }
}

/// Final summary of one finished run, as rendered by the front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub timestamp_utc: String,
    pub label: String,
    pub command_line: String,
    pub outcome: RunOutcome,
    #[serde(default)]
    pub message: Option<String>,
    pub elapsed_ms: u64,
    pub lines: u64,
}

impl RunReport {
    pub fn new(
        spec: &CommandSpec,
        outcome: RunOutcome,
        message: Option<String>,
        elapsed: Duration,
        lines: u64,
    ) -> Self {
        Self {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            label: spec.label.clone(),
            command_line: spec.command_line.clone(),
            outcome,
            message,
            elapsed_ms: elapsed.as_millis() as u64,
            lines,
        }
    }
}
