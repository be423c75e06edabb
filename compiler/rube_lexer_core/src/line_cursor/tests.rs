use super::*;
use crate::StrLines;
use pretty_assertions::assert_eq;

fn cursor(text: &str) -> LineCursor<StrLines<'_>> {
    LineCursor::new(StrLines::from(text), 1)
}

fn read_all<S: LineSource>(cursor: &mut LineCursor<S>) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(b) = cursor.next_byte()? {
        out.push(b);
    }
    Ok(out)
}

#[test]
fn test_reads_across_lines() -> io::Result<()> {
    let mut c = cursor("ab\ncd");
    assert_eq!(read_all(&mut c)?, b"ab\ncd".to_vec());
    assert_eq!(c.line_no(), 2);
    assert!(c.is_eof());
    // End of input is sticky.
    assert_eq!(c.next_byte()?, None);
    Ok(())
}

#[test]
fn test_crlf_reads_as_newline() -> io::Result<()> {
    let mut c = cursor("a\r\nb");
    assert_eq!(read_all(&mut c)?, b"a\nb".to_vec());
    Ok(())
}

#[test]
fn test_pushback_crlf() -> io::Result<()> {
    let mut c = cursor("a\r\n");
    assert_eq!(c.next_byte()?, Some(b'a'));
    let nl = c.next_byte()?;
    assert_eq!(nl, Some(b'\n'));
    c.pushback(nl);
    assert_eq!(c.pos(), 1);
    assert_eq!(c.next_byte()?, Some(b'\n'));
    Ok(())
}

#[test]
fn test_pushback_eof_is_noop() -> io::Result<()> {
    let mut c = cursor("x");
    assert_eq!(c.next_byte()?, Some(b'x'));
    let end = c.next_byte()?;
    assert_eq!(end, None);
    let pos = c.pos();
    c.pushback(end);
    assert_eq!(c.pos(), pos);
    Ok(())
}

#[test]
fn test_start_line() -> io::Result<()> {
    let mut c = LineCursor::new(StrLines::from("x\ny\n"), 10);
    c.next_byte()?;
    assert_eq!(c.line_no(), 10);
    c.next_byte()?;
    c.next_byte()?;
    assert_eq!(c.line_no(), 11);
    Ok(())
}

#[test]
fn test_peek_and_eat() -> io::Result<()> {
    let mut c = cursor("<<-EOS\n");
    assert_eq!(c.next_byte()?, Some(b'<'));
    assert_eq!(c.peek(), Some(b'<'));
    assert_eq!(c.peek_at(1), Some(b'-'));
    assert!(c.eat(b'<'));
    assert!(!c.eat(b'x'));
    assert_eq!(c.rest(), b"-EOS\n");
    assert_eq!(c.find_in_rest(b'S'), Some(3));
    Ok(())
}

#[test]
fn test_was_bol() -> io::Result<()> {
    let mut c = cursor("=begin\n");
    assert_eq!(c.next_byte()?, Some(b'='));
    assert!(c.was_bol());
    c.next_byte()?;
    assert!(!c.was_bol());
    Ok(())
}

#[test]
fn test_offsets_track_input() -> io::Result<()> {
    let mut c = cursor("ab\ncd\n");
    for _ in 0..4 {
        c.next_byte()?;
    }
    // Read "ab\nc": now inside line 2 at position 1.
    assert_eq!(c.offset(), 4);
    Ok(())
}

#[test]
fn test_save_restore_resumes_opening_line() -> io::Result<()> {
    // Opening line, two body lines, terminator, trailing line.
    let mut c = cursor("f(<<E, 1)\nbody1\nbody2\nE\nnext\n");
    for _ in 0..6 {
        c.next_byte()?;
    }
    assert_eq!(c.rest(), b" 1)\n");
    let saved = c.save();
    c.goto_eol();

    // Body
    let mut body = Vec::new();
    loop {
        let Some(b) = c.next_byte()? else { break };
        if c.was_bol() && c.whole_line_matches(b"E", false) {
            break;
        }
        body.push(b);
        let rest = c.rest().to_vec();
        body.extend_from_slice(&rest);
        c.goto_eol();
    }
    assert_eq!(body, b"body1\nbody2\n".to_vec());
    assert_eq!(c.line_no(), 4);

    c.restore(saved);
    assert_eq!(c.line_no(), 1);
    assert_eq!(c.rest(), b" 1)\n");
    c.goto_eol();

    // The next line is the one after the terminator, numbered accordingly.
    assert_eq!(c.next_byte()?, Some(b'n'));
    assert_eq!(c.line_no(), 5);
    assert_eq!(c.line_bytes(), b"next\n");
    Ok(())
}

#[test]
fn test_whole_line_matches() -> io::Result<()> {
    let mut c = cursor("  EOS\n");
    c.fetch_line()?;
    assert!(!c.whole_line_matches(b"EOS", false));
    assert!(c.whole_line_matches(b"EOS", true));
    assert!(!c.whole_line_matches(b"EO", true));

    let mut c = cursor("EOS\r\n");
    c.fetch_line()?;
    assert!(c.whole_line_matches(b"EOS", false));

    let mut c = cursor("EOS ");
    c.fetch_line()?;
    assert!(!c.whole_line_matches(b"EOS", false));
    Ok(())
}

mod proptest_lines {
    use super::super::*;
    use crate::StrLines;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn reading_every_byte_reproduces_input(text in "[a-z \n]{0,64}") {
            let mut c = LineCursor::new(StrLines::from(text.as_str()), 1);
            let mut out = Vec::new();
            while let Ok(Some(b)) = c.next_byte() {
                out.push(b);
            }
            prop_assert_eq!(out, text.as_bytes().to_vec());
            let newlines = text.bytes().filter(|&b| b == b'\n').count() as u32;
            let expected_lines = if text.is_empty() {
                0
            } else if text.ends_with('\n') {
                newlines
            } else {
                newlines + 1
            };
            prop_assert_eq!(c.line_no(), expected_lines);
        }
    }
}
