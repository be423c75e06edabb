//! Diagnostic Emitters
//!
//! Plain-text output in the conventional `file:line: message` shape that
//! editors and `grep` understand. Warnings carry a `warning:` prefix;
//! errors do not.

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

/// Render a single diagnostic as one or more lines (no trailing newline).
pub fn render(diag: &Diagnostic, file: &str) -> String {
    let mut out = match diag.severity {
        Severity::Error => format!("{file}:{}: {}", diag.line, diag.message),
        Severity::Warning => format!("{file}:{}: warning: {}", diag.line, diag.message),
    };
    for note in &diag.notes {
        out.push_str("\n    ");
        out.push_str(note);
    }
    out
}

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()>;

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        for diag in diagnostics {
            self.emit(diag)?;
        }
        Ok(())
    }

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize) -> io::Result<()>;
}

/// Text emitter writing to any `io::Write`.
pub struct TextEmitter<W: Write> {
    writer: W,
    file: String,
}

impl<W: Write> TextEmitter<W> {
    pub fn new(writer: W, file: impl Into<String>) -> Self {
        TextEmitter {
            writer,
            file: file.into(),
        }
    }

    /// Consume the emitter and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticEmitter for TextEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        writeln!(self.writer, "{}", render(diagnostic, &self.file))
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) -> io::Result<()> {
        if error_count == 0 && warning_count == 0 {
            return Ok(());
        }
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        writeln!(
            self.writer,
            "{}, {}",
            plural(error_count, "error"),
            plural(warning_count, "warning")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_error_and_warning() {
        let err = Diagnostic::error(ErrorCode::E2003)
            .with_message("dynamic constant assignment")
            .at_line(3);
        assert_eq!(render(&err, "a.rb"), "a.rb:3: dynamic constant assignment");

        let warn = Diagnostic::warning(ErrorCode::W1001)
            .with_message("shadowing outer local variable - x")
            .at_line(1);
        assert_eq!(
            render(&warn, "a.rb"),
            "a.rb:1: warning: shadowing outer local variable - x"
        );
    }

    #[test]
    fn test_render_notes() {
        let diag = Diagnostic::error(ErrorCode::E0007)
            .with_message("unknown encoding name: klingon")
            .at_line(1)
            .with_note("supported: UTF-8, US-ASCII, ASCII-8BIT, EUC-JP, Shift_JIS");
        assert_eq!(
            render(&diag, "x.rb"),
            "x.rb:1: unknown encoding name: klingon\n    supported: UTF-8, US-ASCII, ASCII-8BIT, EUC-JP, Shift_JIS"
        );
    }

    #[test]
    fn test_text_emitter() -> io::Result<()> {
        let mut emitter = TextEmitter::new(Vec::new(), "t.rb");
        let diags = vec![
            Diagnostic::warning(ErrorCode::W1002)
                .with_message("possibly useless use of a literal in void context")
                .at_line(2),
            Diagnostic::error(ErrorCode::E2001)
                .with_message("duplicated argument name")
                .at_line(4),
        ];
        emitter.emit_all(&diags)?;
        emitter.emit_summary(1, 1)?;
        let out = String::from_utf8_lossy(&emitter.into_inner()).into_owned();
        assert_eq!(
            out,
            "t.rb:2: warning: possibly useless use of a literal in void context\n\
             t.rb:4: duplicated argument name\n\
             1 error, 1 warning\n"
        );
        Ok(())
    }
}
