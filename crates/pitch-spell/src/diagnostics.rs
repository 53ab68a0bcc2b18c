//! Diagnostics gathered during a spelling run.
//!
//! Most anomalies do not abort the run: an ambiguous estimate keeps its first
//! candidate, an unspelled bar is skipped. They are logged through `tracing`
//! and also collected here so callers can inspect them after the fact.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// Bar concerned, `None` for the piece as a whole.
    pub bar: Option<usize>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, bar: Option<usize>) -> Self {
        Diagnostic {
            level: DiagnosticLevel::Error,
            message: message.into(),
            bar,
        }
    }

    pub fn warning(message: impl Into<String>, bar: Option<usize>) -> Self {
        Diagnostic {
            level: DiagnosticLevel::Warning,
            message: message.into(),
            bar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    /// A bar or estimate could not be produced
    Error,
    /// Resolved by a fallback or an arbitrary choice
    Warning,
}

/// Collector for diagnostics during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    tie_break_failures: usize,
    /// Count tie-break failures without recording a warning.
    #[serde(skip)]
    quiet_ties: bool,
}

impl Diagnostics {
    pub fn new(tie_break_warnings: bool) -> Self {
        Diagnostics {
            quiet_ties: !tie_break_warnings,
            ..Default::default()
        }
    }

    pub fn error(&mut self, message: impl Into<String>, bar: Option<usize>) {
        let diag = Diagnostic::error(message, bar);
        error!(bar = ?diag.bar, "{}", diag.message);
        self.entries.push(diag);
    }

    pub fn warning(&mut self, message: impl Into<String>, bar: Option<usize>) {
        let diag = Diagnostic::warning(message, bar);
        warn!(bar = ?diag.bar, "{}", diag.message);
        self.entries.push(diag);
    }

    /// Several candidates stayed equal after every tie-break criterion.
    pub fn tie_break_failure(&mut self, message: impl Into<String>, bar: Option<usize>) {
        self.tie_break_failures += 1;
        if self.quiet_ties {
            let message: String = message.into();
            debug!(bar = ?bar, "{}", message);
        } else {
            self.warning(message, bar);
        }
    }

    pub fn tie_break_failures(&self) -> usize {
        self.tie_break_failures
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.tie_break_failures == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_quiet_ties_still_logged_at_debug() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut diags = Diagnostics::new(false);
        tracing::subscriber::with_default(subscriber, || {
            diags.tie_break_failure("G and F tied", Some(4));
        });

        let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("DEBUG"), "{out}");
        assert!(out.contains("G and F tied"), "{out}");
        assert!(out.contains("bar=Some(4)"), "{out}");
        assert!(diags.entries().is_empty());
    }

    #[test]
    fn test_collects_levels() {
        let mut diags = Diagnostics::new(true);
        assert!(diags.is_empty());
        diags.warning("index empty, using defaults", None);
        diags.error("no spelling", Some(3));
        assert!(diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.errors().next().and_then(|d| d.bar), Some(3));
    }

    #[test]
    fn test_quiet_ties_are_counted() {
        let mut diags = Diagnostics::new(false);
        diags.tie_break_failure("two locals", Some(0));
        diags.tie_break_failure("two globals", None);
        assert_eq!(diags.tie_break_failures(), 2);
        assert!(diags.entries().is_empty());
        assert!(!diags.is_empty());

        let mut loud = Diagnostics::new(true);
        loud.tie_break_failure("two locals", Some(0));
        assert_eq!(loud.warnings().count(), 1);
    }
}
