//! Shared diagnostics model for the bundling pipeline.
//!
//! The pipeline never unwinds on user errors: every phase appends to a
//! [`DeferLog`] and the driver decides between phases whether to continue.
//! Draining the log sorts diagnostics by `(path, offset, severity, message)`
//! so output is deterministic regardless of scan parallelism.
//!
//! ```
//! use diagnostics::{DeferLog, Diagnostic, Loc, Severity};
//!
//! let log = DeferLog::new();
//! log.add(Diagnostic::error("/entry.js", Loc(10, 12), "Could not resolve \"fs\""));
//! let msgs = log.drain();
//! assert_eq!(msgs[0].severity, Severity::Error);
//! ```

pub mod render;

use parking_lot::Mutex;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// A byte range in a source file. `Loc(0, 0)` is used for diagnostics that
/// have no meaningful position (e.g. entry path resolution).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub const NONE: Loc = Loc(0, 0);

  pub fn extend(self, other: Loc) -> Loc {
    Loc(self.0.min(other.0), self.1.max(other.1))
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
  Error,
  Warning,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Error => "error",
      Severity::Warning => "warning",
    }
  }
}

impl Display for Severity {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A user-facing message tied to a position in a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
  pub path: String,
  pub loc: Loc,
  pub severity: Severity,
  pub message: String,
}

impl Diagnostic {
  pub fn new(
    severity: Severity,
    path: impl Into<String>,
    loc: Loc,
    message: impl Into<String>,
  ) -> Self {
    Self {
      path: path.into(),
      loc,
      severity,
      message: message.into(),
    }
  }

  pub fn error(path: impl Into<String>, loc: Loc, message: impl Into<String>) -> Self {
    Self::new(Severity::Error, path, loc, message)
  }

  pub fn warning(path: impl Into<String>, loc: Loc, message: impl Into<String>) -> Self {
    Self::new(Severity::Warning, path, loc, message)
  }
}

/// Thread-safe accumulator with a deterministic drain order.
///
/// Phases append from worker threads; [`DeferLog::drain`] sorts by
/// `(path, offset, severity, message)` so two runs over identical inputs
/// report identical text.
#[derive(Default)]
pub struct DeferLog {
  msgs: Mutex<Vec<Diagnostic>>,
}

impl DeferLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&self, diagnostic: Diagnostic) {
    self.msgs.lock().push(diagnostic);
  }

  pub fn add_error(&self, path: impl Into<String>, loc: Loc, message: impl Into<String>) {
    self.add(Diagnostic::error(path, loc, message));
  }

  pub fn add_warning(&self, path: impl Into<String>, loc: Loc, message: impl Into<String>) {
    self.add(Diagnostic::warning(path, loc, message));
  }

  pub fn has_errors(&self) -> bool {
    self
      .msgs
      .lock()
      .iter()
      .any(|m| m.severity == Severity::Error)
  }

  pub fn is_empty(&self) -> bool {
    self.msgs.lock().is_empty()
  }

  /// Remove and return all accumulated diagnostics in deterministic order.
  pub fn drain(&self) -> Vec<Diagnostic> {
    let mut msgs = std::mem::take(&mut *self.msgs.lock());
    msgs.sort_by(|a, b| {
      (&a.path, a.loc.0, a.severity, &a.message).cmp(&(&b.path, b.loc.0, b.severity, &b.message))
    });
    msgs
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn drain_is_sorted_and_stable() {
    let log = DeferLog::new();
    log.add_error("/b.js", Loc(5, 6), "second");
    log.add_error("/a.js", Loc(9, 10), "third");
    log.add_error("/a.js", Loc(2, 3), "first");
    let msgs = log.drain();
    assert_eq!(
      msgs.iter().map(|m| m.message.as_str()).collect::<Vec<_>>(),
      vec!["first", "third", "second"]
    );
    assert!(log.is_empty());
  }

  #[test]
  fn errors_sort_before_warnings_at_same_offset() {
    let log = DeferLog::new();
    log.add_warning("/a.js", Loc(0, 1), "warn");
    log.add_error("/a.js", Loc(0, 1), "err");
    let msgs = log.drain();
    assert_eq!(msgs[0].severity, Severity::Error);
    assert_eq!(msgs[1].severity, Severity::Warning);
  }

  #[test]
  fn has_errors_ignores_warnings() {
    let log = DeferLog::new();
    log.add_warning("/a.js", Loc::NONE, "warn");
    assert!(!log.has_errors());
    log.add_error("/a.js", Loc::NONE, "err");
    assert!(log.has_errors());
  }
}
