//! Scanner errors and warnings as diagnostics.

use rube_diagnostic::{Diagnostic, ErrorCode};
use rube_lexer::{LexError, LexErrorKind, LexWarning, LexWarningKind};

/// Error code for a scanner error.
pub fn lex_error_code(kind: &LexErrorKind) -> ErrorCode {
    use LexErrorKind as K;
    match kind {
        K::Unterminated { .. } | K::IncompleteCharSyntax => ErrorCode::E0001,
        K::InvalidChar { .. } | K::InvalidMultibyteChar { .. } => ErrorCode::E0002,
        K::NumericWithoutDigits
        | K::InvalidOctalDigit
        | K::TrailingInNumber { .. }
        | K::TrailingIdentifierInNumber { .. }
        | K::NoLeadingDigitFloat => ErrorCode::E0003,
        K::InvalidEscape
        | K::InvalidHexEscape
        | K::InvalidUnicodeEscape
        | K::UnicodeCodepointTooLarge
        | K::InvalidUnicodeCodepoint
        | K::UnterminatedUnicodeEscape
        | K::MixedEncoding { .. } => ErrorCode::E0004,
        K::UnknownPercentLiteral => ErrorCode::E0005,
        K::UnterminatedEmbeddedDocument => ErrorCode::E0006,
        K::UnknownEncoding { .. } => ErrorCode::E0007,
        K::InvalidInstanceVariable { .. }
        | K::InvalidClassVariable { .. }
        | K::InvalidGlobalVariable { .. } => ErrorCode::E0008,
        K::UnterminatedHeredoc { .. } | K::UnterminatedHeredocIdentifier => ErrorCode::E0009,
        K::UnknownRegexpOption { .. } => ErrorCode::E0010,
        K::Io(_) | K::SymbolTable(_) => ErrorCode::E9001,
    }
}

/// Convert a fatal scanner error.
pub fn lex_error_to_diagnostic(err: &LexError) -> Diagnostic {
    let diag = Diagnostic::error(lex_error_code(&err.kind))
        .with_message(err.kind.to_string())
        .at_line(err.line);
    match &err.kind {
        LexErrorKind::UnknownEncoding { .. } => {
            diag.with_note("supported: UTF-8, US-ASCII, ASCII-8BIT, EUC-JP, Shift_JIS")
        }
        LexErrorKind::NoLeadingDigitFloat => diag.with_note("write `0.5`, not `.5`"),
        _ => diag,
    }
}

/// Convert a scanner warning.
pub fn lex_warning_to_diagnostic(warning: &LexWarning) -> Diagnostic {
    let code = match warning.kind {
        LexWarningKind::Ambiguous => ErrorCode::W0001,
        LexWarningKind::InvalidCharSyntax => ErrorCode::W0002,
        LexWarningKind::FloatOutOfRange => ErrorCode::W0003,
    };
    Diagnostic::warning(code)
        .with_message(warning.message.clone())
        .at_line(warning.line)
}
