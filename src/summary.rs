//! Text summary builder for CLI output.
//!
//! Formats the final human-readable lines for a finished run.

use crate::model::RunReport;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a short summary from the final run report.
pub(crate) fn build_text_summary(report: &RunReport) -> TextSummary {
    let mut lines = Vec::new();

    if report.label == report.command_line {
        lines.push(format!("Command: {}", report.command_line));
    } else {
        lines.push(format!("Command: {} ({})", report.label, report.command_line));
    }

    let elapsed = report.elapsed_ms as f64 / 1000.0;
    lines.push(format!(
        "Outcome: {} in {:.1}s ({} output lines)",
        report.outcome.describe(),
        elapsed,
        report.lines
    ));
    if let Some(message) = report.message.as_deref() {
        lines.push(message.to_string());
    }

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommandSpec, RunOutcome};
    use std::time::Duration;

    #[test]
    fn summary_names_outcome_and_elapsed() {
        let spec = CommandSpec::new("Get device hostname", "hostname");
        let report = RunReport::new(
            &spec,
            RunOutcome::TimedOut,
            Some("Command timed out after 60s and was terminated.".into()),
            Duration::from_millis(60_200),
            4,
        );
        let summary = build_text_summary(&report);
        assert_eq!(summary.lines.len(), 3);
        assert_eq!(summary.lines[0], "Command: Get device hostname (hostname)");
        assert_eq!(summary.lines[1], "Outcome: timed out in 60.2s (4 output lines)");
        assert!(summary.lines[2].contains("timed out"));
    }

    #[test]
    fn raw_commands_are_not_repeated() {
        let report = RunReport::new(
            &CommandSpec::raw("echo hi"),
            RunOutcome::Completed,
            None,
            Duration::from_millis(120),
            1,
        );
        let summary = build_text_summary(&report);
        assert_eq!(summary.lines[0], "Command: echo hi");
        assert_eq!(summary.lines.len(), 2);
    }
}
