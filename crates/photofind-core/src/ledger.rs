//! Result ledger shared by every worker of a run.
//!
//! [`ResultLedger`] wraps a single mutex around a [`LedgerReport`]. Every public
//! method takes that lock exactly once, so a two-sequence update such as
//! "not copied + error" is never observed half-applied.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::ops::Add;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Which command produced the ledger; selects the summary layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Discovery only
    Search,
    /// Discovery and copy
    Copy,
}

/// Plain snapshot of a ledger.
///
/// Entries within a sequence are in completion order, which is not traversal
/// order. `found[i]` has no positional relation to `copied[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReport {
    /// Files that satisfied the requirements
    pub found: Vec<PathBuf>,
    /// Found files copied into the destination
    pub copied: Vec<PathBuf>,
    /// Found files that were not copied
    pub not_copied: Vec<PathBuf>,
    /// Failures, one message per entry
    pub errors: Vec<String>,
    /// Recoverable problems, one message per entry
    pub warnings: Vec<String>,
}

impl LedgerReport {
    /// Append every sequence of `other` after the matching sequence of `self`.
    pub fn merge(mut self, other: LedgerReport) -> Self {
        self.found.extend(other.found);
        self.copied.extend(other.copied);
        self.not_copied.extend(other.not_copied);
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Counts line followed by inline warnings and errors.
    pub fn short_summary(&self, mode: RunMode) -> String {
        let mut out = match mode {
            RunMode::Search => format!(
                "Result: found={}, warnings={}, errors={}",
                self.found.len(),
                self.warnings.len(),
                self.errors.len()
            ),
            RunMode::Copy => format!(
                "Result: found={}, copied={}, not_copied={}, warnings={}, errors={}",
                self.found.len(),
                self.copied.len(),
                self.not_copied.len(),
                self.warnings.len(),
                self.errors.len()
            ),
        };
        push_section(&mut out, "WARNINGS", &self.warnings);
        push_section(&mut out, "ERRORS", &self.errors);
        out
    }

    /// Short summary followed by the full path listings.
    pub fn detailed_summary(&self, mode: RunMode) -> String {
        let mut out = self.short_summary(mode);
        push_section(&mut out, "FOUND", &display_paths(&self.found));
        if mode == RunMode::Copy {
            push_section(&mut out, "COPIED", &display_paths(&self.copied));
            push_section(&mut out, "NOT COPIED", &display_paths(&self.not_copied));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Add for LedgerReport {
    type Output = LedgerReport;

    fn add(self, rhs: LedgerReport) -> LedgerReport {
        self.merge(rhs)
    }
}

fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

fn push_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "\n{title}:");
    for item in items {
        let _ = write!(out, "\n{item}");
    }
}

/// Concurrently shared outcome record for one or more runs.
#[derive(Debug, Default)]
pub struct ResultLedger {
    inner: Mutex<LedgerReport>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing report, e.g. one loaded from a previous run.
    pub fn from_report(report: LedgerReport) -> Self {
        Self {
            inner: Mutex::new(report),
        }
    }

    // A worker that panicked mid-append cannot leave a sequence half-written, so a
    // poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, LedgerReport> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_found(&self, path: &Path) {
        self.lock().found.push(path.to_path_buf());
    }

    pub fn record_copied(&self, path: &Path) {
        self.lock().copied.push(path.to_path_buf());
    }

    pub fn record_error(&self, message: impl Into<String>) {
        self.lock().errors.push(message.into());
    }

    pub fn record_warning(&self, message: impl Into<String>) {
        self.lock().warnings.push(message.into());
    }

    /// Mark `path` as not copied and explain why with an error.
    pub fn record_not_copied_error(&self, path: &Path, message: impl Into<String>) {
        let mut report = self.lock();
        report.not_copied.push(path.to_path_buf());
        report.errors.push(message.into());
    }

    /// Mark `path` as not copied and explain why with a warning.
    pub fn record_not_copied_warning(&self, path: &Path, message: impl Into<String>) {
        let mut report = self.lock();
        report.not_copied.push(path.to_path_buf());
        report.warnings.push(message.into());
    }

    /// Append every entry of `other` to this ledger.
    ///
    /// `other` is snapshotted before this ledger is locked, so merging a ledger
    /// into itself duplicates its entries instead of deadlocking.
    pub fn merge(&self, other: &ResultLedger) {
        let incoming = other.snapshot();
        self.merge_report(incoming);
    }

    /// Append every entry of a plain report to this ledger.
    pub fn merge_report(&self, incoming: LedgerReport) {
        let mut report = self.lock();
        let current = std::mem::take(&mut *report);
        *report = current.merge(incoming);
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> LedgerReport {
        self.lock().clone()
    }

    pub fn error_count(&self) -> usize {
        self.lock().errors.len()
    }

    pub fn found_count(&self) -> usize {
        self.lock().found.len()
    }

    pub fn short_summary(&self, mode: RunMode) -> String {
        self.snapshot().short_summary(mode)
    }

    pub fn detailed_summary(&self, mode: RunMode) -> String {
        self.snapshot().detailed_summary(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn report(found: &[&str], errors: &[&str]) -> LedgerReport {
        LedgerReport {
            found: found.iter().map(PathBuf::from).collect(),
            errors: errors.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_preserves_per_input_order() {
        let merged = report(&["p1"], &[]) + report(&["p2"], &["e1"]);
        assert_eq!(merged.found, vec![PathBuf::from("p1"), PathBuf::from("p2")]);
        assert_eq!(merged.errors, vec!["e1".to_string()]);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = report(&["a"], &["ea"]);
        let b = report(&["b"], &[]);
        let c = report(&["c"], &["ec"]);
        let left = (a.clone() + b.clone()) + c.clone();
        let right = a + (b + c);
        assert_eq!(left, right);
    }

    #[test]
    fn test_ledger_merge_appends_other() {
        let a = ResultLedger::from_report(report(&["p1"], &[]));
        let b = ResultLedger::from_report(report(&["p2"], &["e1"]));
        a.merge(&b);
        assert_eq!(a.snapshot(), report(&["p1", "p2"], &["e1"]));
        // b is untouched
        assert_eq!(b.found_count(), 1);
    }

    #[test]
    fn test_ledger_self_merge_does_not_deadlock() {
        let a = ResultLedger::from_report(report(&["p1"], &[]));
        a.merge(&a);
        assert_eq!(a.found_count(), 2);
    }

    #[test]
    fn test_paired_updates_touch_both_sequences() {
        let ledger = ResultLedger::new();
        ledger.record_not_copied_warning(Path::new("a.png"), "collision");
        ledger.record_not_copied_error(Path::new("b.png"), "disk full");
        let snap = ledger.snapshot();
        assert_eq!(snap.not_copied.len(), 2);
        assert_eq!(snap.warnings, vec!["collision".to_string()]);
        assert_eq!(snap.errors, vec!["disk full".to_string()]);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let ledger = Arc::new(ResultLedger::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        let path = PathBuf::from(format!("{t}-{i}.png"));
                        ledger.record_found(&path);
                        ledger.record_not_copied_error(&path, "e");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = ledger.snapshot();
        assert_eq!(snap.found.len(), 2000);
        assert_eq!(snap.not_copied.len(), 2000);
        assert_eq!(snap.errors.len(), 2000);
    }

    #[test]
    fn test_short_summary_search() {
        let snap = report(&["a.png"], &[]);
        assert_eq!(
            snap.short_summary(RunMode::Search),
            "Result: found=1, warnings=0, errors=0"
        );
    }

    #[test]
    fn test_short_summary_lists_warnings_and_errors() {
        let mut snap = report(&[], &["boom"]);
        snap.warnings.push("careful".into());
        assert_eq!(
            snap.short_summary(RunMode::Copy),
            "Result: found=0, copied=0, not_copied=0, warnings=1, errors=1\n\
             WARNINGS:\ncareful\nERRORS:\nboom"
        );
    }

    #[test]
    fn test_detailed_summary_copy_lists_paths() {
        let snap = LedgerReport {
            found: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
            copied: vec![PathBuf::from("a.png")],
            not_copied: vec![PathBuf::from("b.png")],
            ..Default::default()
        };
        let text = snap.detailed_summary(RunMode::Copy);
        assert!(text.contains("\nFOUND:\na.png\nb.png"));
        assert!(text.contains("\nCOPIED:\na.png"));
        assert!(text.contains("\nNOT COPIED:\nb.png"));

        let search = snap.detailed_summary(RunMode::Search);
        assert!(search.contains("FOUND:"));
        assert!(!search.contains("COPIED:"));
    }

    #[test]
    fn test_report_json_round_trip() {
        let snap = report(&["a.png"], &["e"]);
        let json = snap.to_json().unwrap();
        let back: LedgerReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
