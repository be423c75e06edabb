//! Byte cursor over the current physical line.
//!
//! The cursor owns the line most recently pulled from a [`LineSource`] and a
//! read position inside it. Running off the end of a line fetches the next
//! one. The scanner never needs to look across a line boundary except through
//! [`LineCursor::next_byte`], so a line is the unit of buffering.
//!
//! # Heredoc resume
//!
//! A heredoc body is read from the lines *after* the opening line, but the
//! rest of the opening line must still be scanned afterwards. The scanner
//! [`save`](LineCursor::save)s the opening line before reading the body and
//! [`restore`](LineCursor::restore)s it at the terminator. Lines fetched after
//! that continue after the terminator line, because the underlying source
//! has already moved past the body; [`set_pending_line_no`] makes the line
//! counter jump past it too.
//!
//! [`set_pending_line_no`]: LineCursor::set_pending_line_no

use std::io;

use crate::LineSource;

/// Snapshot of the current line, enough to resume scanning it later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedLine {
    bytes: Vec<u8>,
    pos: usize,
    line_no: u32,
    line_start: u32,
}

impl SavedLine {
    /// Line number of the saved line.
    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    /// The saved line's bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Cursor over the current line of a [`LineSource`].
#[derive(Debug)]
pub struct LineCursor<S> {
    source: S,
    line: Vec<u8>,
    pos: usize,
    /// 1-based number of the current line; 0 before the first fetch when
    /// starting at line 1.
    line_no: u32,
    /// Byte offset of the current line from the start of the input.
    line_start: u32,
    /// Total bytes pulled from the source so far.
    consumed: u32,
    /// Line number to jump to on the next fetch (end of a heredoc body).
    pending_line_no: Option<u32>,
    eof: bool,
}

impl<S: LineSource> LineCursor<S> {
    /// Create a cursor whose first line will be numbered `start_line`.
    pub fn new(source: S, start_line: u32) -> Self {
        LineCursor {
            source,
            line: Vec::new(),
            pos: 0,
            line_no: start_line.saturating_sub(1),
            line_start: 0,
            consumed: 0,
            pending_line_no: None,
            eof: false,
        }
    }

    /// Pull the next physical line into the buffer.
    ///
    /// Returns `Ok(false)` at end of input; end of input is sticky.
    pub fn fetch_line(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }
        let Some(line) = self.source.next_line()? else {
            self.eof = true;
            self.pos = self.line.len();
            return Ok(false);
        };
        if let Some(jump) = self.pending_line_no.take() {
            self.line_no = jump;
        }
        self.line_no += 1;
        self.line_start = self.consumed;
        self.consumed += line.len() as u32;
        self.line = line;
        self.pos = 0;
        Ok(true)
    }

    /// Read one byte, fetching a new line when the current one is used up.
    ///
    /// `\r\n` is read as a single `\n`. Returns `Ok(None)` at end of input.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.line.len() && !self.fetch_line()? {
            return Ok(None);
        }
        // An empty line from the source cannot happen, but don't index it.
        let Some(&b) = self.line.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;
        if b == b'\r' && self.line.get(self.pos) == Some(&b'\n') {
            self.pos += 1;
            return Ok(Some(b'\n'));
        }
        Ok(Some(b))
    }

    /// Undo the last [`next_byte`](Self::next_byte) within the current line.
    ///
    /// `None` (end of input) is a no-op, so the result of `next_byte` can be
    /// handed back unconditionally.
    pub fn pushback(&mut self, b: Option<u8>) {
        if b.is_none() || self.pos == 0 {
            return;
        }
        self.pos -= 1;
        if self.pos > 0 && self.line[self.pos] == b'\n' && self.line[self.pos - 1] == b'\r' {
            self.pos -= 1;
        }
    }

    /// Byte at the read position without consuming it or fetching.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.line.get(self.pos).copied()
    }

    /// Byte `n` positions past the read position, within the current line.
    #[inline]
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.line.get(self.pos + n).copied()
    }

    #[inline]
    pub fn peek_is(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Consume the next byte of the current line if it equals `b`.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek_is(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip `n` bytes of the current line.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.line.len());
    }

    /// Unread bytes of the current line.
    #[inline]
    pub fn rest(&self) -> &[u8] {
        &self.line[self.pos.min(self.line.len())..]
    }

    /// The whole current line.
    #[inline]
    pub fn line_bytes(&self) -> &[u8] {
        &self.line
    }

    /// Offset of the first occurrence of `b` in the unread part of the line.
    pub fn find_in_rest(&self, b: u8) -> Option<usize> {
        memchr::memchr(b, self.rest())
    }

    /// Discard the rest of the current line.
    #[inline]
    pub fn goto_eol(&mut self) {
        self.pos = self.line.len();
    }

    /// True when the unread part of the line is empty.
    #[inline]
    pub fn at_eol(&self) -> bool {
        self.pos >= self.line.len()
    }

    /// True right after the first byte of a line was read.
    #[inline]
    pub fn was_bol(&self) -> bool {
        self.pos == 1
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.line.len());
    }

    /// 1-based number of the current line.
    #[inline]
    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    /// Byte offset of the read position from the start of the input.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.line_start + self.pos as u32
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Number the next fetched line `line_no + 1`.
    pub fn set_pending_line_no(&mut self, line_no: u32) {
        self.pending_line_no = Some(line_no);
    }

    /// Snapshot the current line and read position.
    pub fn save(&self) -> SavedLine {
        SavedLine {
            bytes: self.line.clone(),
            pos: self.pos,
            line_no: self.line_no,
            line_start: self.line_start,
        }
    }

    /// Resume a saved line, keeping the line count reached so far as the
    /// pending number for the next fetch.
    pub fn restore(&mut self, saved: SavedLine) {
        if self.line_no > saved.line_no {
            self.pending_line_no = Some(self.line_no);
        }
        self.line = saved.bytes;
        self.pos = saved.pos;
        self.line_no = saved.line_no;
        self.line_start = saved.line_start;
        // Reaching end of input inside the body does not end the saved line.
        self.eof = false;
    }

    /// Whether the current line, from its start, is exactly `word`
    /// (optionally after leading whitespace) followed by a line end.
    pub fn whole_line_matches(&self, word: &[u8], skip_indent: bool) -> bool {
        let mut line = self.line.as_slice();
        if skip_indent {
            let indent = line
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t'))
                .count();
            line = &line[indent..];
        }
        let Some(tail) = line.strip_prefix(word) else {
            return false;
        };
        matches!(tail, [] | [b'\n'] | [b'\r', b'\n'])
    }

    /// Give the line source back.
    pub fn into_source(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests;
