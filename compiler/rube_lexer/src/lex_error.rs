//! Scanner errors and warnings.
//!
//! Every [`LexError`] is fatal: once returned, the scanner keeps returning
//! it. Errors inside a literal carry the line the literal started on, so an
//! unterminated string is reported where it opened rather than at end of
//! input.
//!
//! Warnings are collected on the side and never interrupt scanning.

/// A fatal scanner error.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    /// 1-based source line.
    pub line: u32,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: u32) -> Self {
        LexError { kind, line }
    }
}

/// What went wrong.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LexErrorKind {
    // === Unterminated constructs ===
    #[error("unterminated {what} meets end of file")]
    Unterminated { what: &'static str },
    #[error("can't find string \"{id}\" anywhere before EOF")]
    UnterminatedHeredoc { id: String },
    #[error("unterminated here document identifier")]
    UnterminatedHeredocIdentifier,
    #[error("embedded document meets end of file")]
    UnterminatedEmbeddedDocument,
    #[error("incomplete character syntax")]
    IncompleteCharSyntax,

    // === Escapes ===
    #[error("Invalid escape character syntax")]
    InvalidEscape,
    #[error("invalid hex escape")]
    InvalidHexEscape,
    #[error("invalid Unicode escape")]
    InvalidUnicodeEscape,
    #[error("invalid Unicode codepoint (too large)")]
    UnicodeCodepointTooLarge,
    #[error("invalid Unicode codepoint")]
    InvalidUnicodeCodepoint,
    #[error("unterminated Unicode escape")]
    UnterminatedUnicodeEscape,
    #[error("UTF-8 mixed within {encoding} source")]
    MixedEncoding { encoding: &'static str },

    // === Literal prefixes ===
    #[error("unknown type of %string")]
    UnknownPercentLiteral,
    #[error("unknown regexp option{} - {options}", plural_s(.options))]
    UnknownRegexpOption { options: String },

    // === Numbers ===
    #[error("numeric literal without digits")]
    NumericWithoutDigits,
    #[error("Invalid octal digit")]
    InvalidOctalDigit,
    #[error("trailing `{ch}' in number")]
    TrailingInNumber { ch: char },
    #[error("unexpected `{ch}' after numeric literal")]
    TrailingIdentifierInNumber { ch: char },
    #[error("no .<digit> floating literal anymore; put 0 before dot")]
    NoLeadingDigitFloat,

    // === Names and characters ===
    #[error("`{name}' is not allowed as an instance variable name")]
    InvalidInstanceVariable { name: String },
    #[error("`{name}' is not allowed as a class variable name")]
    InvalidClassVariable { name: String },
    #[error("`{name}' is not allowed as a global variable name")]
    InvalidGlobalVariable { name: String },
    #[error("Invalid char `\\x{byte:02X}' in expression")]
    InvalidChar { byte: u8 },
    #[error("invalid multibyte char ({encoding})")]
    InvalidMultibyteChar { encoding: &'static str },
    #[error("unknown encoding name: {name}")]
    UnknownEncoding { name: String },

    // === Collaborators ===
    #[error("error reading source: {0}")]
    Io(String),
    #[error("{0}")]
    SymbolTable(String),
}

fn plural_s(options: &str) -> &'static str {
    if options.len() > 1 {
        "s"
    } else {
        ""
    }
}

/// Category of a scanner warning.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LexWarningKind {
    /// An operator was read one way although the spacing suggests another.
    Ambiguous,
    /// `? ` followed by whitespace.
    InvalidCharSyntax,
    /// A float literal too large or too small to represent.
    FloatOutOfRange,
}

/// A non-fatal observation made while scanning.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexWarning {
    pub kind: LexWarningKind,
    pub message: String,
    pub line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = LexError::new(
            LexErrorKind::Unterminated {
                what: "string",
            },
            3,
        );
        assert_eq!(err.to_string(), "unterminated string meets end of file");
        assert_eq!(err.line, 3);

        assert_eq!(
            LexErrorKind::UnknownRegexpOption {
                options: "qz".into()
            }
            .to_string(),
            "unknown regexp options - qz"
        );
        assert_eq!(
            LexErrorKind::UnknownRegexpOption {
                options: "q".into()
            }
            .to_string(),
            "unknown regexp option - q"
        );
        assert_eq!(
            LexErrorKind::InvalidChar { byte: 0x01 }.to_string(),
            "Invalid char `\\x01' in expression"
        );
        assert_eq!(
            LexErrorKind::TrailingInNumber { ch: '_' }.to_string(),
            "trailing `_' in number"
        );
    }
}
