use std::fmt;

use crate::ErrorCode;

/// Error or warning.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic tied to a source line.
///
/// Positions are line-granular: the grammar automaton reports errors by
/// line, and nodes carry only a line.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main message.
    pub message: String,
    /// 1-based source line.
    pub line: u32,
    /// Rendered after the message, one `= note:` line each.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            line: 0,
            notes: Vec::new(),
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] line {}: {}",
            self.severity, self.code, self.line, self.message
        )?;
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

/// Create a "syntax error" diagnostic for a message from the automaton.
pub fn syntax_error(message: impl Into<String>, line: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(message)
        .at_line(line)
}

/// Create a "duplicated argument name" diagnostic.
pub fn duplicated_argument(line: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message("duplicated argument name")
        .at_line(line)
}

/// Create a "shadowing outer local variable" warning.
pub fn shadowing_outer_local(name: &str, line: u32) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W1001)
        .with_message(format!("shadowing outer local variable - {name}"))
        .at_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let diag = Diagnostic::error(ErrorCode::E2003)
            .with_message("dynamic constant assignment")
            .at_line(4)
            .with_note("constants cannot be assigned inside a method body");
        assert!(diag.is_error());
        assert_eq!(diag.line, 4);
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn test_display() {
        let diag = syntax_error("unexpected keyword_end", 7);
        assert_eq!(
            diag.to_string(),
            "error [E1001] line 7: unexpected keyword_end"
        );
    }

    #[test]
    fn test_helpers() {
        assert_eq!(duplicated_argument(2).code, ErrorCode::E2001);
        let warn = shadowing_outer_local("x", 3);
        assert!(!warn.is_error());
        assert_eq!(warn.message, "shadowing outer local variable - x");
    }
}
