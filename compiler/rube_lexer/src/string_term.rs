//! State of a literal being scanned.
//!
//! A [`LiteralTerm`] is created when a quote, `%` literal, symbol quote or
//! heredoc opener is scanned, consulted on every call that continues the
//! literal, and dropped at its terminator. While an embedded `#{...}` is
//! scanned the term is parked on the scanner's interpolation stack, so the
//! literal resumes with its nesting depth and heredoc cursor intact.

use bitflags::bitflags;
use rube_lexer_core::SavedLine;

bitflags! {
    /// How a literal's content is scanned.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct StrFunc: u8 {
        /// Keep escapes raw (regexp source).
        const ESCAPE = 1 << 0;
        /// `#{}` interpolation and escape expansion.
        const EXPAND = 1 << 1;
        const REGEXP = 1 << 2;
        /// Whitespace separates words.
        const QWORDS = 1 << 3;
        const SYMBOL = 1 << 4;
        /// Heredoc terminator may be indented (`<<-`).
        const INDENT = 1 << 5;
    }
}

impl StrFunc {
    pub const SQUOTE: StrFunc = StrFunc::empty();
    pub const DQUOTE: StrFunc = StrFunc::EXPAND;
    pub const XQUOTE: StrFunc = StrFunc::EXPAND;
    pub const REGEXP_LIT: StrFunc = StrFunc::REGEXP
        .union(StrFunc::ESCAPE)
        .union(StrFunc::EXPAND);
    pub const SWORD: StrFunc = StrFunc::QWORDS;
    pub const DWORD: StrFunc = StrFunc::QWORDS.union(StrFunc::EXPAND);
    pub const SSYM: StrFunc = StrFunc::SYMBOL;
    pub const DSYM: StrFunc = StrFunc::SYMBOL.union(StrFunc::EXPAND);
}

/// A quoted literal in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrTerm {
    pub func: StrFunc,
    /// Closing delimiter.
    pub term: u8,
    /// Opening delimiter of a paired form (`%q(`), counted for nesting.
    pub paren: Option<u8>,
    /// Unclosed `paren`s seen inside the literal.
    pub nest: u32,
    pub start_line: u32,
}

impl StrTerm {
    pub fn new(func: StrFunc, term: u8, paren: Option<u8>, start_line: u32) -> Self {
        StrTerm {
            func,
            term,
            paren,
            nest: 0,
            start_line,
        }
    }

    /// Noun used in "unterminated ... meets end of file".
    pub fn description(&self) -> &'static str {
        if self.func.contains(StrFunc::REGEXP) {
            "regexp"
        } else {
            "string"
        }
    }
}

/// A heredoc body in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeredocTerm {
    /// Terminator word.
    pub id: Vec<u8>,
    pub func: StrFunc,
    pub start_line: u32,
    /// Opening line, positioned right after the heredoc identifier.
    pub resume: SavedLine,
}

impl HeredocTerm {
    pub fn indent(&self) -> bool {
        self.func.contains(StrFunc::INDENT)
    }
}

/// The literal the scanner is inside of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralTerm {
    Str(StrTerm),
    Heredoc(HeredocTerm),
    /// All content was produced; the next token is the end marker.
    Finished,
}

/// Matching closer for a paired `%` literal opener.
pub fn closing_delimiter(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// Option bits of a finished regexp literal.
pub mod regexp_options {
    pub const IGNORECASE: u32 = 1;
    pub const EXTENDED: u32 = 2;
    pub const MULTILINE: u32 = 4;
    /// `n`: no encoding.
    pub const ENC_NONE: u32 = 0x20;
    pub const ENC_EUC: u32 = 0x100;
    pub const ENC_SJIS: u32 = 0x200;
    pub const ENC_UTF8: u32 = 0x400;
    /// `o`: interpolate once.
    pub const ONCE: u32 = 0x1_0000;

    /// Bit for one option letter.
    pub fn from_letter(c: u8) -> Option<u32> {
        let bit = match c {
            b'i' => IGNORECASE,
            b'x' => EXTENDED,
            b'm' => MULTILINE,
            b'o' => ONCE,
            b'n' => ENC_NONE,
            b'e' => ENC_EUC,
            b's' => ENC_SJIS,
            b'u' => ENC_UTF8,
            _ => return None,
        };
        Some(bit)
    }
}
