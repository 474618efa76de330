// src/console.rs

//! Human-facing console output.
//!
//! The coordinator reports progress through the [`Reporter`] trait instead of
//! printing directly, so colors and layout stay out of the run logic and
//! tests can run silently.

use std::io::{self, Write};
use std::path::Path;

use colored::{Color, Colorize};

use crate::exec::Invocation;
use crate::registry::{ModelSpec, Registry};
use crate::report::{FailureKind, RunReport, RunResult, RunStatus};
use crate::run::RunPlan;

const RULE_WIDTH: usize = 60;
const STDERR_TAIL_LINES: usize = 5;

/// Progress sink for a run.
pub trait Reporter: Send {
    fn run_started(&mut self, plan: &RunPlan);
    /// A model's turn has come; its prerequisites are about to be checked.
    fn model_pending(&mut self, model: &str);
    fn model_started(&mut self, spec: &ModelSpec, invocation: &Invocation);
    fn model_finished(&mut self, result: &RunResult);
    fn run_finished(&mut self, report: &RunReport, report_path: &Path);
}

/// Reporter that prints nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn run_started(&mut self, _plan: &RunPlan) {}
    fn model_pending(&mut self, _model: &str) {}
    fn model_started(&mut self, _spec: &ModelSpec, _invocation: &Invocation) {}
    fn model_finished(&mut self, _result: &RunResult) {}
    fn run_finished(&mut self, _report: &RunReport, _report_path: &Path) {}
}

/// Colored, line-oriented reporter. Write errors are ignored.
pub struct ConsoleReporter<W: Write + Send = io::Stdout> {
    out: W,
    color: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        paint(text, color, self.color)
    }

    fn rule(&mut self, ch: char, width: usize, color: Color) {
        let line = ch.to_string().repeat(width);
        let line = self.paint(&line, color);
        let _ = writeln!(self.out, "{line}");
    }

    fn status(&mut self, marker: &str, msg: &str, color: Color) {
        let line = self.paint(&format!("[{marker}] {msg}"), color);
        let _ = writeln!(self.out, "{line}");
    }
}

fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn run_started(&mut self, plan: &RunPlan) {
        let _ = writeln!(self.out);
        self.rule('=', RULE_WIDTH, Color::Magenta);
        let title = self.paint("  OMR Models Inference Runner", Color::Magenta);
        let _ = writeln!(self.out, "{title}");
        self.rule('=', RULE_WIDTH, Color::Magenta);
        let _ = writeln!(self.out, "  Input: {}", plan.input.display());
        let _ = writeln!(self.out, "  Output: {}", plan.output_root.display());
        let _ = writeln!(self.out, "  Models: {}", plan.models.join(", "));
        let _ = writeln!(self.out, "  Device: {}", plan.device);
        let _ = writeln!(self.out, "  Environments: {}", plan.env_manager);
        self.rule('=', RULE_WIDTH, Color::Magenta);
    }

    fn model_pending(&mut self, _model: &str) {
        let _ = writeln!(self.out);
        self.rule('─', 50, Color::Blue);
    }

    fn model_started(&mut self, spec: &ModelSpec, invocation: &Invocation) {
        self.status("*", &format!("Running {}...", spec.id), Color::Cyan);
        let _ = writeln!(self.out, "    Command: {}", invocation.command);
    }

    fn model_finished(&mut self, result: &RunResult) {
        match result.status() {
            RunStatus::Succeeded => {
                self.status(
                    "+",
                    &format!("{} completed in {:.2}s", result.model, result.duration),
                    Color::Green,
                );
                match &result.output {
                    Some(path) => {
                        let _ = writeln!(self.out, "    Output: {}", path.display());
                    }
                    None => {
                        let _ = writeln!(self.out, "    Output: (none located)");
                    }
                }
            }
            RunStatus::Skipped => {
                let reason = result.error.as_deref().unwrap_or("missing prerequisite");
                self.status("!", &format!("{} skipped: {reason}", result.model), Color::Yellow);
            }
            RunStatus::Failed => {
                let msg = match result.failure {
                    Some(FailureKind::ProcessTimeout) => format!(
                        "{} timed out after {:.0}s",
                        result.model, result.duration
                    ),
                    _ => format!("{} failed", result.model),
                };
                self.status("-", &msg, Color::Red);
                if let Some(err) = result.error.as_deref() {
                    for line in tail_lines(err, STDERR_TAIL_LINES) {
                        let _ = writeln!(self.out, "    {line}");
                    }
                }
            }
        }
    }

    fn run_finished(&mut self, report: &RunReport, report_path: &Path) {
        let s = report.summary;
        let _ = writeln!(self.out);
        self.rule('=', RULE_WIDTH, Color::Magenta);
        let title = self.paint("  Summary", Color::Magenta);
        let _ = writeln!(self.out, "{title}");
        self.rule('=', RULE_WIDTH, Color::Magenta);
        let ok = self.paint(&format!("  Successful: {}", s.successful), Color::Green);
        let failed = self.paint(&format!("  Failed: {}", s.failed), Color::Red);
        let skipped = self.paint(&format!("  Skipped: {}", s.skipped), Color::Yellow);
        let _ = writeln!(self.out, "{ok}\n{failed}\n{skipped}");
        self.rule('=', RULE_WIDTH, Color::Magenta);
        let _ = writeln!(self.out, "\nResults saved to: {}", report_path.display());
    }
}

fn tail_lines(text: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].to_vec()
}

/// Print the registry for `--list-models`.
pub fn write_model_list(out: &mut dyn Write, registry: &Registry, color: bool) -> io::Result<()> {
    writeln!(out, "\nAvailable OMR Models:")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    for spec in registry.models() {
        let deprecated = if spec.deprecated { " (deprecated)" } else { "" };
        let auth = if spec.requires_auth { " [HF Auth]" } else { "" };
        writeln!(
            out,
            "  {:20} - {}{deprecated}{auth}",
            spec.id, spec.description
        )?;

        let python = spec
            .python_version
            .as_deref()
            .map(|v| format!("Python {v}, "))
            .unwrap_or_default();
        writeln!(out, "  {:20}   {python}Output: {}", "", spec.output_format)?;
        if let Some(hub) = spec.huggingface_model.as_deref() {
            writeln!(out, "  {:20}   Weights: {hub}", "")?;
        }

        let status = if spec.is_ready() {
            paint("✓ Ready", Color::Green, color)
        } else {
            paint("⚠ Needs setup", Color::Yellow, color)
        };
        writeln!(out, "  {:20}   Status: {status}", "")?;
        if let Some(note) = spec.model_note.as_deref() {
            writeln!(out, "  {:20}   Note: {note}", "")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::registry::builtin_registry;

    #[test]
    fn model_list_shows_flags_and_readiness() {
        let mut buf = Vec::new();
        write_model_list(&mut buf, &builtin_registry(), false).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("SMT-plusplus"));
        assert!(text.contains("(deprecated)"));
        assert!(text.contains("[HF Auth]"));
        assert!(text.contains("Python 3.11, Output: musicxml"));
        assert!(text.contains("⚠ Needs setup"));
        assert!(text.contains("Weights: PRAIG/smt-grandstaff"));
        assert!(text.contains("Note: Requires trained model."));
    }

    #[test]
    fn failure_prints_stderr_tail_without_color() {
        let mut reporter = ConsoleReporter::new(Vec::new(), false);
        let result = RunResult::failed(
            "homr",
            "musicxml",
            FailureKind::ProcessFailure,
            "l1\nl2\nl3\nl4\nl5\nl6\n",
            Duration::from_secs(1),
        );
        reporter.model_finished(&result);
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        assert!(text.contains("[-] homr failed"));
        assert!(!text.contains("l1"));
        assert!(text.contains("    l6"));
        assert!(!text.contains('\u{1b}'));
    }
}
