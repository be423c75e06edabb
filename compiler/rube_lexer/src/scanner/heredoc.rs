//! Here documents.
//!
//! The body starts on the line after the opener, but the rest of the opening
//! line still has to be scanned. The opener saves the cursor and skips to
//! the end of the line; the body is read from the following lines; at the
//! terminator the saved line is restored, and scanning continues right after
//! the heredoc identifier. Lines after the opening line then resume after
//! the terminator.
//!
//! ```text
//! foo(<<EOS, 1)     StringBeg  [body]  StringEnd  , 1 )
//! body line
//! EOS
//! ```

use rube_ir::is_ident_char;
use rube_lexer_core::LineSource;
use tracing::debug;

use super::{Lexer, Produced};
use crate::lex_error::{LexError, LexErrorKind};
use crate::string_term::{HeredocTerm, LiteralTerm, StrFunc};
use crate::TokenKind;

impl<S: LineSource> Lexer<'_, S> {
    /// Identifier after `<<`; both `<` were read.
    ///
    /// Returns `None`, with nothing consumed past `<<`, when no identifier
    /// follows (a shift operator).
    pub(super) fn heredoc_identifier(&mut self) -> Result<Option<TokenKind>, LexError> {
        let mut func = StrFunc::empty();
        let mut c = self.nextc()?;
        let dash = c == Some(b'-');
        if dash {
            c = self.nextc()?;
            func |= StrFunc::INDENT;
        }

        self.tokbuf.clear();
        let kind = match c {
            Some(quote @ (b'\'' | b'"' | b'`')) => {
                let (quoted, kind) = match quote {
                    b'\'' => (StrFunc::SQUOTE, TokenKind::StringBeg),
                    b'"' => (StrFunc::DQUOTE, TokenKind::StringBeg),
                    _ => (StrFunc::XQUOTE, TokenKind::XStringBeg),
                };
                func |= quoted;
                loop {
                    match self.nextc()? {
                        None => {
                            return Err(self.error(LexErrorKind::UnterminatedHeredocIdentifier));
                        }
                        Some(ch) if ch == quote => break,
                        Some(ch) => self.tokadd_mbchar(ch)?,
                    }
                }
                kind
            }
            Some(b) if is_ident_char(b) => {
                func |= StrFunc::DQUOTE;
                let after = self.read_ident_run(b)?;
                self.pushback(after);
                TokenKind::StringBeg
            }
            _ => {
                self.pushback(c);
                if dash {
                    self.pushback(Some(b'-'));
                }
                return Ok(None);
            }
        };

        let id = std::mem::take(&mut self.tokbuf);
        let start_line = self.cursor.line_no();
        debug!(
            id = %String::from_utf8_lossy(&id),
            line = start_line,
            indent = func.contains(StrFunc::INDENT),
            "heredoc"
        );
        let resume = self.cursor.save();
        self.cursor.goto_eol();
        self.literal = Some(LiteralTerm::Heredoc(HeredocTerm {
            id,
            func,
            start_line,
            resume,
        }));
        Ok(Some(kind))
    }

    /// Next piece of a heredoc body.
    pub(super) fn here_document(&mut self, term: HeredocTerm) -> Result<Produced, LexError> {
        use TokenKind::*;

        let Some(c) = self.nextc()? else {
            return Err(Self::unterminated_heredoc(&term));
        };
        // The byte may come from a body line fetched just now.
        self.token_line = self.cursor.line_no();
        self.token_start = self.cursor.offset().saturating_sub(1);
        if self.cursor.was_bol() && self.cursor.whole_line_matches(&term.id, term.indent()) {
            self.cursor.restore(term.resume);
            return Ok(Produced::new(StringEnd));
        }

        self.tokbuf.clear();
        if term.func.contains(StrFunc::EXPAND) {
            let mut first = Some(c);
            if c == b'#' {
                let next = self.nextc()?;
                match next {
                    Some(b'$' | b'@') => {
                        self.pushback(next);
                        self.suspend_for_dvar(LiteralTerm::Heredoc(term));
                        return Ok(Produced::new(StringDVar));
                    }
                    Some(b'{') => {
                        self.suspend_for_interpolation(LiteralTerm::Heredoc(term));
                        return Ok(Produced::new(StringDBeg));
                    }
                    _ => {}
                }
                self.tokbuf.push(b'#');
                first = next;
            }
            self.pushback(first);
            loop {
                match self.tokadd_string(term.func, b'\n', None, &mut 0)? {
                    None => return Err(Self::unterminated_heredoc(&term)),
                    Some(b'\n') => {}
                    // Stopped at `#{`, `#@` or `#$`.
                    Some(_) => {
                        self.literal = Some(LiteralTerm::Heredoc(term));
                        return Ok(Produced::with(StringContent, self.take_tok()));
                    }
                }
                self.nextc()?;
                self.tokbuf.push(b'\n');
                let next = self.nextc()?;
                if next.is_none() {
                    return Err(Self::unterminated_heredoc(&term));
                }
                if self.cursor.whole_line_matches(&term.id, term.indent()) {
                    break;
                }
                self.pushback(next);
            }
        } else {
            loop {
                let line = self.cursor.line_bytes();
                let (body, newline) = match line {
                    [body @ .., b'\r', b'\n'] | [body @ .., b'\n'] => (body, true),
                    _ => (line, false),
                };
                self.tokbuf.extend_from_slice(body);
                if newline {
                    self.tokbuf.push(b'\n');
                }
                self.cursor.goto_eol();
                if self.nextc()?.is_none() {
                    return Err(Self::unterminated_heredoc(&term));
                }
                if self.cursor.whole_line_matches(&term.id, term.indent()) {
                    break;
                }
            }
        }

        self.cursor.restore(term.resume);
        self.literal = Some(LiteralTerm::Finished);
        Ok(Produced::with(StringContent, self.take_tok()))
    }

    fn unterminated_heredoc(term: &HeredocTerm) -> LexError {
        LexError::new(
            LexErrorKind::UnterminatedHeredoc {
                id: String::from_utf8_lossy(&term.id).into_owned(),
            },
            term.start_line,
        )
    }
}
