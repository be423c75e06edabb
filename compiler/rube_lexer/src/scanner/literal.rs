//! Quoted literals: strings, symbols, words, regexps, command strings.
//!
//! A literal is produced as a run of tokens:
//!
//! ```text
//! "a#{b}c"   StringBeg StringContent StringDBeg ...b... StringDEnd StringContent StringEnd
//! %w(a b)    QWordsBeg StringContent WordSep StringContent WordSep StringEnd
//! /x/i       RegexpBeg StringContent RegexpEnd(options)
//! ```

use rube_lexer_core::LineSource;

use super::{is_space, Lexer, Produced};
use crate::lex_error::{LexError, LexErrorKind, LexWarningKind};
use crate::string_term::{closing_delimiter, regexp_options, LiteralTerm, StrFunc, StrTerm};
use crate::{TokenKind, TokenValue};

impl<S: LineSource> Lexer<'_, S> {
    /// Next piece of the quoted literal described by `term`.
    pub(super) fn parse_string(&mut self, mut term: StrTerm) -> Result<Produced, LexError> {
        use TokenKind::*;

        let func = term.func;
        let mut c = self.nextc()?;
        let mut space = false;
        if func.contains(StrFunc::QWORDS) && c.is_some_and(is_space) {
            while c.is_some_and(is_space) {
                c = self.nextc()?;
            }
            space = true;
        }

        if c == Some(term.term) && term.nest == 0 {
            if func.contains(StrFunc::QWORDS) {
                self.literal = Some(LiteralTerm::Finished);
                return Ok(Produced::new(WordSep));
            }
            if !func.contains(StrFunc::REGEXP) {
                return Ok(Produced::new(StringEnd));
            }
            let options = self.regexp_options()?;
            return Ok(Produced::with(
                RegexpEnd,
                TokenValue::RegexpOptions(options),
            ));
        }
        if space {
            self.pushback(c);
            self.literal = Some(LiteralTerm::Str(term));
            return Ok(Produced::new(WordSep));
        }

        self.tokbuf.clear();
        if func.contains(StrFunc::EXPAND) && c == Some(b'#') {
            let next = self.nextc()?;
            match next {
                Some(b'$' | b'@') => {
                    self.pushback(next);
                    self.suspend_for_dvar(LiteralTerm::Str(term));
                    return Ok(Produced::new(StringDVar));
                }
                Some(b'{') => {
                    self.suspend_for_interpolation(LiteralTerm::Str(term));
                    return Ok(Produced::new(StringDBeg));
                }
                _ => {}
            }
            self.tokbuf.push(b'#');
            c = next;
        }
        self.pushback(c);

        if self
            .tokadd_string(func, term.term, term.paren, &mut term.nest)?
            .is_none()
        {
            return Err(LexError::new(
                LexErrorKind::Unterminated {
                    what: term.description(),
                },
                term.start_line,
            ));
        }
        self.literal = Some(LiteralTerm::Str(term));
        Ok(Produced::with(StringContent, self.take_tok()))
    }

    /// Collect literal content up to (not including) the terminator, an
    /// interpolation start, or a word break.
    ///
    /// Returns the byte that stopped the scan, left unread, or `None` at end
    /// of input.
    pub(super) fn tokadd_string(
        &mut self,
        func: StrFunc,
        term: u8,
        paren: Option<u8>,
        nest: &mut u32,
    ) -> Result<Option<u8>, LexError> {
        loop {
            let Some(c) = self.nextc()? else {
                return Ok(None);
            };

            if paren == Some(c) {
                *nest += 1;
            } else if c == term {
                if *nest == 0 {
                    self.pushback(Some(c));
                    return Ok(Some(c));
                }
                *nest -= 1;
            } else if func.contains(StrFunc::EXPAND)
                && c == b'#'
                && matches!(self.peek(), Some(b'$' | b'@' | b'{'))
            {
                self.pushback(Some(c));
                return Ok(Some(c));
            } else if c == b'\\' {
                let Some(escaped) = self.nextc()? else {
                    return Ok(None);
                };
                match escaped {
                    b'\n' => {
                        if func.contains(StrFunc::QWORDS) {
                            self.tokbuf.push(b'\n');
                        } else if !func.contains(StrFunc::EXPAND) {
                            self.tokbuf.extend_from_slice(b"\\\n");
                        }
                        continue;
                    }
                    b'\\' => {
                        if func.contains(StrFunc::ESCAPE) {
                            self.tokbuf.push(b'\\');
                        }
                        self.tokbuf.push(b'\\');
                        continue;
                    }
                    b'u' if func.contains(StrFunc::EXPAND) => {
                        self.tokadd_utf8(true, func.contains(StrFunc::REGEXP))?;
                        continue;
                    }
                    _ if !escaped.is_ascii() => {
                        if !func.contains(StrFunc::EXPAND) {
                            self.tokbuf.push(b'\\');
                        }
                        self.tokadd_mbchar(escaped)?;
                        continue;
                    }
                    _ if func.contains(StrFunc::REGEXP) => {
                        self.pushback(Some(escaped));
                        self.tokadd_regexp_escape()?;
                        continue;
                    }
                    _ if func.contains(StrFunc::EXPAND) => {
                        self.pushback(Some(escaped));
                        let byte = self.read_escape(false, false)?;
                        self.tokbuf.push(byte);
                        continue;
                    }
                    _ if func.contains(StrFunc::QWORDS) && is_space(escaped) => {}
                    _ if escaped != term && paren != Some(escaped) => {
                        self.tokbuf.push(b'\\');
                    }
                    _ => {}
                }
                self.tokbuf.push(escaped);
                continue;
            } else if !c.is_ascii() {
                self.tokadd_mbchar(c)?;
                continue;
            } else if func.contains(StrFunc::QWORDS) && is_space(c) {
                self.pushback(Some(c));
                return Ok(Some(c));
            }
            self.tokbuf.push(c);
        }
    }

    /// `%` literal; `c` is the byte after `%`, read.
    pub(super) fn percent_literal(&mut self, c: Option<u8>) -> Result<Produced, LexError> {
        use TokenKind::*;

        let line = self.cursor.line_no();
        let (kind_char, open) = match c {
            Some(ch) if ch.is_ascii_alphanumeric() => {
                let open = self.nextc()?;
                if open.is_some_and(|b| b.is_ascii_alphanumeric() || !b.is_ascii()) {
                    return Err(self.error(LexErrorKind::UnknownPercentLiteral));
                }
                (ch, open)
            }
            other => (b'Q', other),
        };
        let Some(open) = open else {
            return Err(LexError::new(
                LexErrorKind::Unterminated {
                    what: "quoted string",
                },
                line,
            ));
        };
        if !open.is_ascii() {
            return Err(self.error(LexErrorKind::UnknownPercentLiteral));
        }
        let (term, paren) = match closing_delimiter(open) {
            Some(close) => (close, Some(open)),
            None => (open, None),
        };

        let (func, kind) = match kind_char {
            b'Q' => (StrFunc::DQUOTE, StringBeg),
            b'q' => (StrFunc::SQUOTE, StringBeg),
            b'W' => (StrFunc::DWORD, WordsBeg),
            b'w' => (StrFunc::SWORD, QWordsBeg),
            b'x' => (StrFunc::XQUOTE, XStringBeg),
            b'r' => (StrFunc::REGEXP_LIT, RegexpBeg),
            b's' => (StrFunc::SSYM, SymBeg),
            _ => return Err(self.error(LexErrorKind::UnknownPercentLiteral)),
        };

        if func.contains(StrFunc::QWORDS) {
            loop {
                let next = self.nextc()?;
                if !next.is_some_and(is_space) {
                    self.pushback(next);
                    break;
                }
            }
        }
        self.literal = Some(LiteralTerm::Str(StrTerm::new(func, term, paren, line)));
        Ok(Produced::new(kind))
    }

    /// `?` was read: a character literal or the ternary operator.
    pub(super) fn char_literal(&mut self) -> Result<Produced, LexError> {
        let prev = self.state;
        if prev.is_end() {
            return Ok(Produced::new(TokenKind::Question));
        }
        let Some(c) = self.nextc()? else {
            return Err(self.error(LexErrorKind::IncompleteCharSyntax));
        };

        if is_space(c) {
            if !prev.is_arg() {
                let escape = match c {
                    b' ' => Some('s'),
                    b'\n' => Some('n'),
                    b'\t' => Some('t'),
                    0x0b => Some('v'),
                    b'\r' => Some('r'),
                    0x0c => Some('f'),
                    _ => None,
                };
                if let Some(escape) = escape {
                    self.warn(
                        LexWarningKind::InvalidCharSyntax,
                        format!("invalid character syntax; use ?\\{escape}"),
                    );
                }
            }
            self.pushback(Some(c));
            return Ok(Produced::new(TokenKind::Question));
        }

        self.tokbuf.clear();
        if !c.is_ascii() {
            self.tokadd_mbchar(c)?;
        } else if (c.is_ascii_alphanumeric() || c == b'_')
            && self.peek().is_some_and(rube_ir::is_ident_char)
        {
            // `cond ?a_b : c`
            self.pushback(Some(c));
            return Ok(Produced::new(TokenKind::Question));
        } else if c == b'\\' {
            if self.cursor.eat(b'u') {
                self.tokadd_utf8(false, false)?;
            } else if let Some(b) = self.peek().filter(|b| !b.is_ascii()) {
                self.cursor.advance(1);
                self.tokadd_mbchar(b)?;
            } else {
                let byte = self.read_escape(false, false)?;
                self.tokbuf.push(byte);
            }
        } else {
            self.tokbuf.push(c);
        }
        Ok(Produced::with(TokenKind::Char, self.take_tok()))
    }

    /// Option letters after a closing regexp delimiter.
    fn regexp_options(&mut self) -> Result<u32, LexError> {
        let mut options = 0;
        let mut unknown = String::new();
        loop {
            let c = self.nextc()?;
            match c {
                Some(b) if b.is_ascii_alphabetic() => match regexp_options::from_letter(b) {
                    Some(bit) => options |= bit,
                    None => unknown.push(char::from(b)),
                },
                _ => {
                    self.pushback(c);
                    break;
                }
            }
        }
        if !unknown.is_empty() {
            return Err(self.error(LexErrorKind::UnknownRegexpOption { options: unknown }));
        }
        Ok(options)
    }
}
