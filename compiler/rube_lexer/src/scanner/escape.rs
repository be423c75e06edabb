//! Backslash escapes and multi-byte characters.
//!
//! Strings get escapes *expanded* into the bytes they denote
//! ([`Lexer::read_escape`]); regexps keep them *raw* so the regexp engine
//! sees the original spelling ([`Lexer::tokadd_regexp_escape`]). `\u`
//! escapes go through [`Lexer::tokadd_utf8`] in both cases.

use rube_lexer_core::LineSource;

use super::Lexer;
use crate::lex_error::{LexError, LexErrorKind};

/// Value and length of up to `max` leading hex digits.
pub(super) fn scan_hex(bytes: &[u8], max: usize) -> (u32, usize) {
    let mut value = 0u32;
    let mut len = 0;
    for &b in bytes.iter().take(max) {
        let Some(digit) = char::from(b).to_digit(16) else {
            break;
        };
        value = (value << 4) | digit;
        len += 1;
    }
    (value, len)
}

/// Value and length of up to `max` leading octal digits.
pub(super) fn scan_oct(bytes: &[u8], max: usize) -> (u32, usize) {
    let mut value = 0u32;
    let mut len = 0;
    for &b in bytes.iter().take(max) {
        if !(b'0'..=b'7').contains(&b) {
            break;
        }
        value = (value << 3) | u32::from(b - b'0');
        len += 1;
    }
    (value, len)
}

impl<S: LineSource> Lexer<'_, S> {
    /// Append the character starting with `c` (already read) to the token.
    pub(super) fn tokadd_mbchar(&mut self, c: u8) -> Result<(), LexError> {
        if c.is_ascii() {
            self.tokbuf.push(c);
            return Ok(());
        }
        let rest = self.cursor.rest();
        let extra = rest.len().min(3);
        let mut probe = [c, 0, 0, 0];
        probe[1..=extra].copy_from_slice(&rest[..extra]);
        let Some(len) = self.encoding.char_len(&probe[..=extra]) else {
            return Err(self.error(LexErrorKind::InvalidMultibyteChar {
                encoding: self.encoding.name(),
            }));
        };
        self.tokbuf.push(c);
        self.tokbuf.extend_from_slice(&self.cursor.rest()[..len - 1]);
        self.cursor.advance(len - 1);
        Ok(())
    }

    /// Expand the escape after a `\` into the byte it denotes.
    pub(super) fn read_escape(&mut self, meta: bool, control: bool) -> Result<u8, LexError> {
        let c = self.nextc()?;
        let byte = match c {
            Some(b'\\') => b'\\',
            Some(b'n') => b'\n',
            Some(b't') => b'\t',
            Some(b'r') => b'\r',
            Some(b'f') => 0x0c,
            Some(b'v') => 0x0b,
            Some(b'a') => 0x07,
            Some(b'e') => 0x1b,
            Some(b'b') => 0x08,
            Some(b's') => b' ',
            Some(b'0'..=b'7') => {
                self.pushback(c);
                let (value, len) = scan_oct(self.cursor.rest(), 3);
                self.cursor.advance(len);
                value as u8
            }
            Some(b'x') => {
                let (value, len) = scan_hex(self.cursor.rest(), 2);
                if len == 0 {
                    return Err(self.error(LexErrorKind::InvalidHexEscape));
                }
                self.cursor.advance(len);
                value as u8
            }
            Some(b'M') => {
                if meta || !self.cursor.eat(b'-') {
                    return Err(self.error(LexErrorKind::InvalidEscape));
                }
                match self.nextc()? {
                    Some(b'\\') => {
                        if self.cursor.peek_is(b'u') {
                            return Err(self.error(LexErrorKind::InvalidEscape));
                        }
                        self.read_escape(true, control)? | 0x80
                    }
                    Some(ch) if ch.is_ascii() => ch | 0x80,
                    _ => return Err(self.error(LexErrorKind::InvalidEscape)),
                }
            }
            Some(b'C') => {
                if !self.cursor.eat(b'-') {
                    return Err(self.error(LexErrorKind::InvalidEscape));
                }
                self.read_control(meta, control)?
            }
            Some(b'c') => self.read_control(meta, control)?,
            Some(other) => other,
            None => return Err(self.error(LexErrorKind::InvalidEscape)),
        };
        Ok(byte)
    }

    /// `\C-x`, `\cx`: the control character for `x`; `?` gives DEL.
    fn read_control(&mut self, meta: bool, control: bool) -> Result<u8, LexError> {
        if control {
            return Err(self.error(LexErrorKind::InvalidEscape));
        }
        match self.nextc()? {
            Some(b'\\') => {
                if self.cursor.peek_is(b'u') {
                    return Err(self.error(LexErrorKind::InvalidEscape));
                }
                Ok(self.read_escape(meta, true)? & 0x9f)
            }
            Some(b'?') => Ok(0x7f),
            Some(ch) if ch.is_ascii() => Ok(ch & 0x9f),
            _ => Err(self.error(LexErrorKind::InvalidEscape)),
        }
    }

    /// Copy a regexp escape through unexpanded; the `\` was read.
    pub(super) fn tokadd_regexp_escape(&mut self) -> Result<(), LexError> {
        self.tokadd_raw_escape(false, false)
    }

    fn tokadd_raw_escape(&mut self, meta: bool, control: bool) -> Result<(), LexError> {
        let c = self.nextc()?;
        match c {
            // Line continuation.
            Some(b'\n') => {}
            Some(b'0'..=b'7') => {
                self.pushback(c);
                let (_, len) = scan_oct(self.cursor.rest(), 3);
                self.tokbuf.push(b'\\');
                self.tokbuf.extend_from_slice(&self.cursor.rest()[..len]);
                self.cursor.advance(len);
            }
            Some(b'x') => {
                let (_, len) = scan_hex(self.cursor.rest(), 2);
                if len == 0 {
                    return Err(self.error(LexErrorKind::InvalidHexEscape));
                }
                self.tokbuf.extend_from_slice(b"\\x");
                self.tokbuf.extend_from_slice(&self.cursor.rest()[..len]);
                self.cursor.advance(len);
            }
            Some(b'M') => {
                if meta || !self.cursor.eat(b'-') {
                    return Err(self.error(LexErrorKind::InvalidEscape));
                }
                self.tokbuf.extend_from_slice(b"\\M-");
                self.tokadd_raw_escaped(true, control)?;
            }
            Some(b'C') => {
                if control || !self.cursor.eat(b'-') {
                    return Err(self.error(LexErrorKind::InvalidEscape));
                }
                self.tokbuf.extend_from_slice(b"\\C-");
                self.tokadd_raw_escaped(meta, true)?;
            }
            Some(b'c') => {
                if control {
                    return Err(self.error(LexErrorKind::InvalidEscape));
                }
                self.tokbuf.extend_from_slice(b"\\c");
                self.tokadd_raw_escaped(meta, true)?;
            }
            Some(other) => {
                self.tokbuf.push(b'\\');
                self.tokadd_mbchar(other)?;
            }
            None => return Err(self.error(LexErrorKind::InvalidEscape)),
        }
        Ok(())
    }

    /// Target of a raw `\M-` / `\C-` / `\c`.
    fn tokadd_raw_escaped(&mut self, meta: bool, control: bool) -> Result<(), LexError> {
        match self.nextc()? {
            Some(b'\\') => self.tokadd_raw_escape(meta, control),
            Some(ch) => self.tokadd_mbchar(ch),
            None => Err(self.error(LexErrorKind::InvalidEscape)),
        }
    }

    /// Append a `\u` escape; the `\u` was read.
    ///
    /// `multiple` allows `\u{41 42}` (strings only). Regexps keep the escape
    /// spelled out.
    pub(super) fn tokadd_utf8(&mut self, multiple: bool, regexp: bool) -> Result<(), LexError> {
        if regexp {
            self.tokbuf.extend_from_slice(b"\\u");
        }
        if !self.cursor.peek_is(b'{') {
            let (codepoint, len) = scan_hex(self.cursor.rest(), 4);
            if len < 4 {
                return Err(self.error(LexErrorKind::InvalidUnicodeEscape));
            }
            if regexp {
                self.tokbuf.extend_from_slice(&self.cursor.rest()[..4]);
            } else {
                self.add_codepoint(codepoint)?;
            }
            self.cursor.advance(4);
            return Ok(());
        }

        loop {
            // `{` on the first pass, the separating blank after that.
            if regexp {
                if let Some(b) = self.peek() {
                    self.tokbuf.push(b);
                }
            }
            self.cursor.advance(1);
            let (codepoint, len) = scan_hex(self.cursor.rest(), 6);
            if len == 0 {
                return Err(self.error(LexErrorKind::InvalidUnicodeEscape));
            }
            if codepoint > 0x10_ffff {
                return Err(self.error(LexErrorKind::UnicodeCodepointTooLarge));
            }
            if regexp {
                self.tokbuf.extend_from_slice(&self.cursor.rest()[..len]);
            } else {
                self.add_codepoint(codepoint)?;
            }
            self.cursor.advance(len);
            if !(multiple && matches!(self.peek(), Some(b' ' | b'\t'))) {
                break;
            }
        }
        if !self.cursor.eat(b'}') {
            return Err(self.error(LexErrorKind::UnterminatedUnicodeEscape));
        }
        if regexp {
            self.tokbuf.push(b'}');
        }
        Ok(())
    }

    fn add_codepoint(&mut self, codepoint: u32) -> Result<(), LexError> {
        if codepoint < 0x80 {
            self.tokbuf.push(codepoint as u8);
            return Ok(());
        }
        if !self.encoding.accepts_utf8_escapes() {
            return Err(self.error(LexErrorKind::MixedEncoding {
                encoding: self.encoding.name(),
            }));
        }
        let Some(ch) = char::from_u32(codepoint) else {
            return Err(self.error(LexErrorKind::InvalidUnicodeCodepoint));
        };
        let mut buf = [0; 4];
        self.tokbuf
            .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }
}
