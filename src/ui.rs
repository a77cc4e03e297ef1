//! Terminal UI: spinners, stage lines and the final summary.
//!
//! While a stage runs the user sees a spinner and a short label.  restic's
//! own output is captured by [`crate::restic`] and only replayed when a
//! stage fails.  With `-v` the spinner is hidden so the logged command echo
//! is not drawn over.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ResticError;

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames, same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of a single stage, e.g. "Backup /srv/data".
#[derive(Debug)]
pub struct StageOutcome {
    pub label: String,
    pub success: bool,
    /// Short note printed dimmed after the label, e.g. "created".
    pub detail: Option<String>,
    /// restic's stderr, replayed on failure.
    pub stderr: String,
    pub error: Option<String>,
}

impl StageOutcome {
    pub fn ok(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            success: true,
            detail: None,
            stderr: String::new(),
            error: None,
        }
    }

    pub fn from_error(label: impl Into<String>, err: &ResticError) -> Self {
        Self {
            label: label.into(),
            success: false,
            detail: None,
            stderr: err.stderr().to_string(),
            error: Some(error_chain(err)),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Print the one-line summary, plus the error and stderr on failure.
    pub fn print(&self) {
        let detail = self
            .detail
            .as_deref()
            .map(|d| format!("  {}", style(d).dim()))
            .unwrap_or_default();

        if self.success {
            println!("  {}  {}{detail}", icon_ok(), style(&self.label).bold());
            return;
        }

        println!("  {}  {}{detail}", icon_err(), style(&self.label).bold());
        if let Some(ref msg) = self.error {
            eprintln!();
            eprintln!("  {} {}", style("Error:").red().bold(), msg);
        }
        if !self.stderr.is_empty() {
            eprintln!();
            eprintln!("  {} stderr:", style("►").dim());
            for line in self.stderr.lines() {
                eprintln!("    {line}");
            }
        }
    }

    pub const fn failed(&self) -> bool {
        !self.success
    }
}

/// `err` and its sources joined with `: `.
fn error_chain(err: &ResticError) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

fn make_spinner(label: &str) -> ProgressBar {
    if log::max_level() >= log::LevelFilter::Info {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── High-level stage runner ──────────────────────────────────────────────────

/// Run `f` behind a spinner labelled `label`.
///
/// Returns the printed-ready outcome and, on success, whatever `f` produced.
pub fn run_stage<T>(
    label: &str,
    f: impl FnOnce() -> Result<T, ResticError>,
) -> (StageOutcome, Option<T>) {
    let spinner = make_spinner(label);
    let result = f();
    spinner.finish_and_clear();

    match result {
        Ok(v) => (StageOutcome::ok(label), Some(v)),
        Err(e) => (StageOutcome::from_error(label, &e), None),
    }
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Success banner when every stage passed, otherwise the list of failures.
pub fn print_summary(outcomes: &[StageOutcome]) {
    let failed: Vec<&StageOutcome> = outcomes.iter().filter(|o| o.failed()).collect();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style("All stages completed successfully.").cyan().bold()
        );
    } else {
        eprintln!("  {}  {}", icon_err(), style("Some stages failed.").red().bold());
        for o in &failed {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────
