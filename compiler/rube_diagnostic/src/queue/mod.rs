//! Per-parse diagnostic collection.
//!
//! Errors past the limit are dropped and replaced by one "too many errors"
//! entry. Separate constructs on one line may report the same message, so
//! every report is kept unless `deduplicate` is set. `flush` orders by line,
//! keeping report order within a line.

use crate::{Diagnostic, ErrorCode};

/// Limits applied by a [`DiagnosticQueue`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before further errors are dropped (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued for the same line.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: false,
        }
    }
}

impl DiagnosticConfig {
    /// Keep everything.
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Errors and warnings of one parse, in report order until flushed.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    /// Set once an error was dropped because of the limit.
    overflowed: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Queue `diag`; `false` when the limit or deduplication dropped it.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            self.overflowed = true;
            return false;
        }

        if self.config.deduplicate && self.is_duplicate(&diag) {
            return false;
        }

        if is_error {
            self.error_count += 1;
        } else {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// No further errors will be kept.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of warnings collected.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// True when any error was reported, including ones dropped by the limit.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0 || self.overflowed
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sort diagnostics by line and return them.
    ///
    /// Clears the queue after flushing. Diagnostics on the same line keep
    /// their report order. When errors were dropped by the limit, a final
    /// "too many errors" diagnostic is appended.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let already_sorted = self.diagnostics.windows(2).all(|w| w[0].line <= w[1].line);
        if !already_sorted {
            self.diagnostics.sort_by_key(|d| d.line);
        }

        let mut result = std::mem::take(&mut self.diagnostics);
        if self.overflowed {
            let line = result.last().map_or(0, |d| d.line);
            result.push(too_many_errors(self.config.error_limit, line));
        }

        self.error_count = 0;
        self.warning_count = 0;
        self.overflowed = false;

        result
    }

    /// Queued diagnostics in report order.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    fn is_duplicate(&self, diag: &Diagnostic) -> bool {
        self.diagnostics.iter().rev().any(|d| {
            d.line == diag.line && d.code == diag.code && d.message == diag.message
        })
    }
}

/// Marker appended once errors overflow the limit.
#[cold]
pub fn too_many_errors(limit: usize, line: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .at_line(line)
}
