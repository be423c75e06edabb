//! Numeric literals.
//!
//! Integers: decimal, `0x`, `0b`, `0d`, `0o`/`0_`/leading-zero octal, with
//! single `_` separators between digits. Floats: decimal with a fraction
//! and/or exponent. Integers past `i64` are kept as digits.

use rube_lexer_core::LineSource;

use super::{Lexer, Produced};
use crate::lex_error::{LexError, LexErrorKind, LexWarningKind};
use crate::{TokenKind, TokenValue};

fn is_digit_of(b: u8, radix: u32) -> bool {
    char::from(b).is_digit(radix)
}

impl<S: LineSource> Lexer<'_, S> {
    /// Scan a number whose first digit `first` was read.
    pub(super) fn scan_number(&mut self, first: u8) -> Result<Produced, LexError> {
        self.tokbuf.clear();

        if first == b'0' {
            let mut nondigit: Option<u8> = None;
            let mut c = self.nextc()?;
            let radix = match c {
                Some(b'x' | b'X') => Some(16),
                Some(b'b' | b'B') => Some(2),
                Some(b'd' | b'D') => Some(10),
                _ => None,
            };
            if let Some(radix) = radix {
                return self.scan_radix_digits(radix);
            }

            let mut octal = c == Some(b'_');
            if matches!(c, Some(b'o' | b'O')) {
                c = self.nextc()?;
                if !c.is_some_and(|b| b.is_ascii_digit()) {
                    self.pushback(c);
                    return Err(self.error(LexErrorKind::NumericWithoutDigits));
                }
                octal = true;
            }
            if octal || matches!(c, Some(b'0'..=b'7')) {
                loop {
                    match c {
                        Some(b'_') => {
                            if nondigit.is_some() {
                                break;
                            }
                            nondigit = Some(b'_');
                        }
                        Some(b'8' | b'9') => {
                            return Err(self.error(LexErrorKind::InvalidOctalDigit));
                        }
                        Some(d @ b'0'..=b'7') => {
                            nondigit = None;
                            self.tokbuf.push(d);
                        }
                        _ => break,
                    }
                    c = self.nextc()?;
                }
                self.pushback(c);
                if let Some(ch) = nondigit {
                    return Err(self.trailing(ch));
                }
                if !self.tokbuf.is_empty() {
                    self.check_number_suffix()?;
                    return Ok(self.integer_token(8));
                }
            } else if matches!(c, Some(b'8' | b'9')) {
                return Err(self.error(LexErrorKind::InvalidOctalDigit));
            } else if matches!(c, Some(b'.' | b'e' | b'E')) {
                self.tokbuf.push(b'0');
                return self.scan_decimal(c);
            } else {
                self.pushback(c);
                self.check_number_suffix()?;
                return Ok(Produced::with(TokenKind::Integer, TokenValue::Int(0)));
            }
            self.check_number_suffix()?;
            return Ok(Produced::with(TokenKind::Integer, TokenValue::Int(0)));
        }

        self.scan_decimal(Some(first))
    }

    /// Digits after a `0x`/`0b`/`0d` prefix.
    fn scan_radix_digits(&mut self, radix: u32) -> Result<Produced, LexError> {
        let mut nondigit = None;
        let mut c = self.nextc()?;
        if c.is_some_and(|b| is_digit_of(b, radix)) {
            loop {
                match c {
                    Some(b'_') => {
                        if nondigit.is_some() {
                            break;
                        }
                        nondigit = Some(b'_');
                    }
                    Some(b) if is_digit_of(b, radix) => {
                        nondigit = None;
                        self.tokbuf.push(b);
                    }
                    _ => break,
                }
                c = self.nextc()?;
            }
        }
        self.pushback(c);
        if self.tokbuf.is_empty() {
            return Err(self.error(LexErrorKind::NumericWithoutDigits));
        }
        if let Some(ch) = nondigit {
            return Err(self.trailing(ch));
        }
        self.check_number_suffix()?;
        Ok(self.integer_token(radix))
    }

    /// Decimal integer or float; `c` is the next unprocessed byte, read.
    fn scan_decimal(&mut self, mut c: Option<u8>) -> Result<Produced, LexError> {
        let mut nondigit: Option<u8> = None;
        let mut seen_point = false;
        let mut seen_e = false;

        loop {
            match c {
                Some(d @ b'0'..=b'9') => {
                    nondigit = None;
                    self.tokbuf.push(d);
                }
                Some(b'.') => {
                    if let Some(ch) = nondigit {
                        return Err(self.trailing(ch));
                    }
                    if seen_point || seen_e {
                        break;
                    }
                    let after = self.nextc()?;
                    let Some(digit) = after.filter(u8::is_ascii_digit) else {
                        self.pushback(after);
                        break;
                    };
                    self.tokbuf.push(b'.');
                    self.tokbuf.push(digit);
                    seen_point = true;
                    nondigit = None;
                }
                Some(e @ (b'e' | b'E')) => {
                    if let Some(ch) = nondigit {
                        return Err(self.trailing(ch));
                    }
                    if seen_e {
                        break;
                    }
                    self.tokbuf.push(e);
                    seen_e = true;
                    nondigit = Some(e);
                    c = self.nextc()?;
                    match c {
                        Some(sign @ (b'+' | b'-')) => {
                            self.tokbuf.push(sign);
                            nondigit = Some(sign);
                        }
                        _ => continue,
                    }
                }
                Some(b'_') => {
                    if nondigit.is_some() {
                        break;
                    }
                    nondigit = Some(b'_');
                }
                _ => break,
            }
            c = self.nextc()?;
        }
        self.pushback(c);
        if let Some(ch) = nondigit {
            return Err(self.trailing(ch));
        }
        self.check_number_suffix()?;

        if seen_point || seen_e {
            Ok(self.float_token())
        } else {
            Ok(self.integer_token(10))
        }
    }

    fn trailing(&self, ch: u8) -> LexError {
        self.error(LexErrorKind::TrailingInNumber { ch: char::from(ch) })
    }

    /// A numeral must not run straight into a name (`1if`, `0x1g`).
    fn check_number_suffix(&self) -> Result<(), LexError> {
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' || !b.is_ascii() => {
                Err(self.error(LexErrorKind::TrailingIdentifierInNumber { ch: char::from(b) }))
            }
            _ => Ok(()),
        }
    }

    fn integer_token(&mut self, radix: u32) -> Produced {
        let digits = String::from_utf8_lossy(&self.tokbuf).into_owned();
        let value = match i64::from_str_radix(&digits, radix) {
            Ok(value) => TokenValue::Int(value),
            Err(_) => TokenValue::BigInt {
                digits,
                radix: radix as u8,
            },
        };
        Produced::with(TokenKind::Integer, value)
    }

    fn float_token(&mut self) -> Produced {
        let text = String::from_utf8_lossy(&self.tokbuf).into_owned();
        let value = text.parse::<f64>().unwrap_or(f64::INFINITY);
        if value.is_infinite() {
            self.warn_verbose(
                LexWarningKind::FloatOutOfRange,
                format!("Float {text} out of range"),
            );
        }
        Produced::with(TokenKind::Float, TokenValue::Float(value))
    }
}
