//! Text rendering for diagnostics.
//!
//! Two forms are provided: the terse `path: severity: message` form used by
//! the bundle snapshot tests, and a located `path:line:col: severity:
//! message` form the CLI prints when the source text is available.

use crate::Diagnostic;

/// 1-based line and column for a byte offset. Columns count bytes.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
  let offset = offset.min(text.len());
  let mut line = 1;
  let mut line_start = 0;
  for (i, b) in text.bytes().enumerate().take(offset) {
    if b == b'\n' {
      line += 1;
      line_start = i + 1;
    }
  }
  (line, offset - line_start + 1)
}

pub fn render_terse(diagnostic: &Diagnostic) -> String {
  format!(
    "{}: {}: {}",
    diagnostic.path, diagnostic.severity, diagnostic.message
  )
}

pub fn render_located(diagnostic: &Diagnostic, source_text: Option<&str>) -> String {
  match source_text {
    Some(text) => {
      let (line, col) = line_col(text, diagnostic.loc.0);
      format!(
        "{}:{}:{}: {}: {}",
        diagnostic.path, line, col, diagnostic.severity, diagnostic.message
      )
    }
    None => render_terse(diagnostic),
  }
}
