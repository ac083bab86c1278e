//! The reporting sink: one line per outcome, for whoever is watching.
//!
//! This is deliberately separate from `tracing`. Logs are for diagnosing the
//! tool; the report is the tool's output.

use crate::task::RecoveryResult;
use std::io::{Stdout, Write};
use std::sync::{Mutex, PoisonError};

/// Receives every task's result, from every worker. Implementations must
/// keep one result's lines together.
pub trait Reporter: Send + Sync {
    fn report(&self, result: &RecoveryResult);
}

/// Writes `[OK]`, `[ERROR]` and `[SECRET]` lines.
///
/// The writer sits behind a single lock, held for one line at a time, so
/// lines from different workers never interleave mid-line.
///
/// ```
/// use dotgit_dump::{ConsoleReporter, Outcome, RecoveryResult, Reporter};
///
/// let reporter = ConsoleReporter::new(Vec::new());
/// reporter.report(&RecoveryResult {
///     path: "README.md".into(),
///     outcome: Outcome::Succeeded,
///     detail: "0 bytes".to_string(),
///     findings: Vec::new(),
/// });
/// assert_eq!(reporter.into_inner(), b"[OK] README.md\n");
/// ```
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    out: Mutex<W>,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn line(&self, line: std::fmt::Arguments<'_>) {
        // Poisoned only if another worker panicked mid-line; keep reporting.
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            tracing::debug!(%err, "Could not write report line");
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn report(&self, result: &RecoveryResult) {
        let path = result.path.display();
        if !result.outcome.is_success() {
            self.line(format_args!("[ERROR] {path}: {}: {}", result.outcome, result.detail));
            return;
        }
        self.line(format_args!("[OK] {path}"));
        for finding in &result.findings {
            self.line(format_args!("[SECRET] {path}: {}: {}", finding.category, finding.redacted));
        }
    }
}

/// Keeps every result in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    results: Mutex<Vec<RecoveryResult>>,
}

impl CollectingReporter {
    pub fn results(&self) -> Vec<RecoveryResult> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, result: &RecoveryResult) {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).push(result.clone());
    }
}
