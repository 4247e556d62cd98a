//! Run lifecycle controller.
//!
//! Adapts a UI-facing command channel onto the process runner and emits
//! events for presentation layers.

use crate::model::{CommandSpec, RunEvent, RunnerConfig};
use crate::orchestrator::runner::ProcessRunner;
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by UI layers to control the runner.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Start(CommandSpec),
    Cancel,
    Reset,
    Quit,
}

/// Drive the runner from UI commands until `Quit` or the channel closes.
/// Start while a run is in flight replaces it; the runner serializes the
/// cancellation so two live processes never coexist.
pub(crate) async fn run_controller(
    config: RunnerConfig,
    event_tx: UnboundedSender<RunEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut runner = ProcessRunner::new(config, event_tx);
    loop {
        match cmd_rx.recv().await {
            Some(UiCommand::Start(spec)) => {
                runner.start(spec).await;
            }
            Some(UiCommand::Cancel) => runner.cancel().await,
            Some(UiCommand::Reset) => runner.reset().await,
            Some(UiCommand::Quit) | None => break,
        }
    }
    // Quit leaves no orphan: any active run is cancelled before we return.
    runner.cancel().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunOutcome;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[cfg(unix)]
    #[tokio::test]
    async fn controller_runs_and_quits_cleanly() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let controller = tokio::spawn(run_controller(RunnerConfig::default(), event_tx, cmd_rx));

        cmd_tx
            .send(UiCommand::Start(CommandSpec::raw("echo from-controller")))
            .expect("controller alive");

        let mut saw_line = false;
        let completed = tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(event) = event_rx.recv().await {
                match event {
                    RunEvent::LineReceived { text, .. } => saw_line = text == "from-controller",
                    RunEvent::RunCompleted { outcome, .. } => return outcome,
                    _ => {}
                }
            }
            panic!("event channel closed before completion");
        })
        .await
        .expect("run completes");

        assert!(saw_line);
        assert_eq!(completed, RunOutcome::Completed);

        cmd_tx.send(UiCommand::Quit).expect("controller alive");
        tokio::time::timeout(Duration::from_secs(5), controller)
            .await
            .expect("controller exits")
            .expect("controller task")
            .expect("controller result");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn quit_cancels_an_active_run() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let controller = tokio::spawn(run_controller(RunnerConfig::default(), event_tx, cmd_rx));

        cmd_tx
            .send(UiCommand::Start(CommandSpec::raw("sleep 30")))
            .expect("controller alive");
        tokio::time::sleep(Duration::from_millis(200)).await;
        cmd_tx.send(UiCommand::Quit).expect("controller alive");

        tokio::time::timeout(Duration::from_secs(5), controller)
            .await
            .expect("quit does not wait out the sleep")
            .expect("controller task")
            .expect("controller result");

        let outcome = tokio::time::timeout(Duration::from_secs(1), async {
            while let Some(event) = event_rx.recv().await {
                if let RunEvent::RunCompleted { outcome, .. } = event {
                    return outcome;
                }
            }
            panic!("no completion event");
        })
        .await
        .expect("completion event present");
        assert_eq!(outcome, RunOutcome::Cancelled);
    }
}
