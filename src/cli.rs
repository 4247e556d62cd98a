use crate::catalog::CommandCatalog;
use crate::model::{CommandSpec, RunEvent, RunOutcome, RunReport, RunnerConfig};
use crate::orchestrator::controller::{run_controller, UiCommand};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "netdiag-cli",
    version,
    about = "Run network diagnostic commands with live output streaming"
)]
pub struct Cli {
    /// Catalog label of the command to run (see --list)
    #[arg(long, conflicts_with = "command")]
    pub label: Option<String>,

    /// Raw command line to run instead of a catalog entry
    #[arg(long)]
    pub command: Option<String>,

    /// List the command catalog and exit
    #[arg(long)]
    pub list: bool,

    /// Hard deadline for the run; the process is killed when it expires
    #[arg(long, default_value = "60s")]
    pub timeout: humantime::Duration,

    /// Interval between elapsed-time status updates
    #[arg(long, default_value = "1s")]
    pub tick_interval: humantime::Duration,

    /// Shell used to run the command line (default: cmd on Windows, sh elsewhere)
    #[arg(long)]
    pub shell: Option<std::path::PathBuf>,

    /// Print events as JSON lines instead of text output
    #[arg(long)]
    pub json: bool,

    /// Write the final run report as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,
}

/// Build a `RunnerConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunnerConfig {
    RunnerConfig {
        timeout: Duration::from(args.timeout),
        tick_interval: Duration::from(args.tick_interval),
        shell: args.shell.clone(),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let catalog = CommandCatalog::builtin();
    if args.list {
        return list_catalog(&catalog);
    }
    let spec = resolve_spec(&args, &catalog)?;
    run_command(args, spec).await
}

fn list_catalog(catalog: &CommandCatalog) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for spec in catalog.iter() {
        writeln!(out, "{:<45} {}", spec.label, spec.command_line)?;
    }
    Ok(())
}

fn resolve_spec(args: &Cli, catalog: &CommandCatalog) -> Result<CommandSpec> {
    if let Some(label) = args.label.as_deref() {
        return catalog.get(label).cloned().with_context(|| {
            format!("unknown catalog label `{label}`; use --list to see available commands")
        });
    }
    if let Some(command) = args.command.as_deref() {
        anyhow::ensure!(!command.trim().is_empty(), "--command must not be empty");
        return Ok(CommandSpec::raw(command));
    }
    anyhow::bail!("nothing to run: pass --label <LABEL> or --command <CMDLINE>, or --list")
}

/// Run one command to completion, streaming its events as they arrive.
/// Output lines go to stdout; status and the final summary go to stderr.
/// Ctrl-C cancels the run.
async fn run_command(args: Cli, spec: CommandSpec) -> Result<()> {
    let config = build_config(&args);
    let (out_tx, out_handle) = spawn_output_writer();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RunEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let controller = tokio::spawn(run_controller(config, event_tx, cmd_rx));
    let _ = cmd_tx.send(UiCommand::Start(spec.clone()));

    let started = Instant::now();
    let mut lines_emitted: u64 = 0;
    let mut finished: Option<(RunOutcome, Option<String>)> = None;
    let mut cancel_requested = false;

    while finished.is_none() {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                if args.json {
                    if let Ok(encoded) = serde_json::to_string(&event) {
                        let _ = out_tx.send(OutputLine::Stdout(encoded));
                    }
                }
                match event {
                    RunEvent::RunStarted { label, .. } => {
                        if !args.json {
                            let _ = out_tx.send(OutputLine::Stderr(format!("== {label} ==")));
                        }
                    }
                    RunEvent::LineReceived { text, .. } => {
                        lines_emitted += 1;
                        if !args.json {
                            let _ = out_tx.send(OutputLine::Stdout(text));
                        }
                    }
                    RunEvent::StatusTick { elapsed_secs, .. } => {
                        if !args.json {
                            let _ = out_tx.send(OutputLine::Stderr(format!(
                                "Executing… {elapsed_secs}s elapsed"
                            )));
                        }
                    }
                    RunEvent::RunCompleted { outcome, message, .. } => {
                        finished = Some((outcome, message));
                    }
                }
            }
            _ = tokio::signal::ctrl_c(), if !cancel_requested => {
                cancel_requested = true;
                let _ = cmd_tx.send(UiCommand::Cancel);
                let _ = out_tx.send(OutputLine::Stderr("Cancelling…".into()));
            }
        }
    }

    let _ = cmd_tx.send(UiCommand::Quit);
    controller.await.context("controller task failed")??;

    let (outcome, message) = finished.context("run ended without a completion event")?;
    let report = RunReport::new(&spec, outcome, message, started.elapsed(), lines_emitted);

    if let Some(path) = args.export_json.as_deref() {
        export_report(path, &report)?;
    }
    if !args.json {
        for line in crate::summary::build_text_summary(&report).lines {
            let _ = out_tx.send(OutputLine::Stderr(line));
        }
    }
    drop(out_tx);
    let _ = out_handle.await;

    match report.outcome {
        RunOutcome::Completed | RunOutcome::Cancelled => Ok(()),
        RunOutcome::TimedOut | RunOutcome::Failed => Err(anyhow::anyhow!(report
            .message
            .clone()
            .unwrap_or_else(|| format!("command {}", report.outcome.describe())))),
    }
}

fn export_report(path: &std::path::Path, report: &RunReport) -> Result<()> {
    let encoded = serde_json::to_string_pretty(report)?;
    std::fs::write(path, encoded)
        .with_context(|| format!("failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("netdiag-cli").chain(args.iter().copied()))
    }

    #[test]
    fn config_reflects_cli_durations() {
        let args = parse(&["--command", "echo hi", "--timeout", "90s", "--tick-interval", "250ms"]);
        let config = build_config(&args);
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert!(config.shell.is_none());
    }

    #[test]
    fn labels_resolve_through_the_catalog() {
        let catalog = CommandCatalog::builtin();
        let args = parse(&["--label", "Get device hostname"]);
        let spec = resolve_spec(&args, &catalog).expect("known label");
        assert_eq!(spec.command_line, "hostname");

        let args = parse(&["--label", "Not in the catalog"]);
        let err = resolve_spec(&args, &catalog).expect_err("unknown label");
        assert!(err.to_string().contains("unknown catalog label"));
    }

    #[test]
    fn raw_commands_pass_through_verbatim() {
        let catalog = CommandCatalog::builtin();
        let args = parse(&["--command", "ping -c 1 localhost"]);
        let spec = resolve_spec(&args, &catalog).expect("raw command");
        assert_eq!(spec.command_line, "ping -c 1 localhost");

        let args = parse(&["--command", "   "]);
        assert!(resolve_spec(&args, &catalog).is_err());
    }

    #[test]
    fn running_nothing_is_an_error() {
        let catalog = CommandCatalog::builtin();
        let args = parse(&[]);
        assert!(resolve_spec(&args, &catalog).is_err());
    }
}
