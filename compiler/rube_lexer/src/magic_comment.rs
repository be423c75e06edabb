//! Encoding declarations in leading comments.
//!
//! Recognized spellings, all keyed on the word `coding` followed by `:` or
//! `=` (optionally after blanks):
//!
//! ```text
//! # -*- coding: euc-jp -*-
//! # coding: utf-8
//! # encoding: Shift_JIS
//! # vim: set fileencoding=sjis :
//! ```

/// The encoding name declared by a comment's text, if any.
///
/// `comment` is the text after the `#`.
pub fn encoding_declaration(comment: &[u8]) -> Option<&[u8]> {
    const WORD: &[u8] = b"coding";

    let mut from = 0;
    while from + WORD.len() <= comment.len() {
        let at = comment[from..]
            .windows(WORD.len())
            .position(|w| w.eq_ignore_ascii_case(WORD))?
            + from;
        let after = at + WORD.len();
        if let Some(name) = value_after_separator(&comment[after..]) {
            return Some(name);
        }
        from = after;
    }
    None
}

/// `[ \t]*[:=][ \t]*name`, returning `name`.
fn value_after_separator(text: &[u8]) -> Option<&[u8]> {
    let rest = skip_blanks(text);
    let (&sep, rest) = rest.split_first()?;
    if sep != b':' && sep != b'=' {
        return None;
    }
    let rest = skip_blanks(rest);
    let len = rest
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        .count();
    (len > 0).then(|| &rest[..len])
}

fn skip_blanks(text: &[u8]) -> &[u8] {
    let n = text.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
    &text[n..]
}
