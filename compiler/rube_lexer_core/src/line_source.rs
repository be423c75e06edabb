//! Line-source collaborators.
//!
//! The scanner never sees the whole input at once: it pulls one physical
//! line at a time, so the same scanner runs over an in-memory string, a file
//! or an interactive reader.

use std::io::{self, BufRead};

/// Producer of physical lines.
///
/// Each returned line includes its trailing `\n` when the input had one.
/// `Ok(None)` marks end of input; after that, every further call must also
/// return `Ok(None)`.
pub trait LineSource {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>>;
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        (**self).next_line()
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        (**self).next_line()
    }
}

/// Lines of an in-memory byte string.
#[derive(Clone, Debug)]
pub struct StrLines<'a> {
    rest: &'a [u8],
}

impl<'a> StrLines<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        StrLines { rest: source }
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> &'a [u8] {
        self.rest
    }
}

impl<'a> From<&'a str> for StrLines<'a> {
    fn from(source: &'a str) -> Self {
        StrLines::new(source.as_bytes())
    }
}

impl LineSource for StrLines<'_> {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        let end = memchr::memchr(b'\n', self.rest).map_or(self.rest.len(), |i| i + 1);
        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(Some(line.to_vec()))
    }
}

/// Lines of any buffered reader.
#[derive(Debug)]
pub struct ReaderLines<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        ReaderLines {
            reader,
            done: false,
        }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.done {
            return Ok(None);
        }
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            self.done = true;
            return Ok(None);
        }
        Ok(Some(line))
    }
}
