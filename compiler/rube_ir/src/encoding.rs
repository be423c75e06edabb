//! Source encodings understood by the scanner.
//!
//! Only what multi-byte-safe scanning needs: the byte length of the
//! character starting at a position, and name lookup for magic comments.
//! All supported encodings are ASCII-compatible.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    UsAscii,
    /// Raw bytes (`ASCII-8BIT`, alias `BINARY`).
    Ascii8Bit,
    EucJp,
    ShiftJis,
}

impl Encoding {
    /// Resolve an encoding name as written in a magic comment.
    ///
    /// Matching is ASCII case-insensitive and accepts the common aliases.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        const TABLE: &[(&str, Encoding)] = &[
            ("utf-8", Encoding::Utf8),
            ("utf8", Encoding::Utf8),
            ("us-ascii", Encoding::UsAscii),
            ("ascii", Encoding::UsAscii),
            ("ascii-8bit", Encoding::Ascii8Bit),
            ("binary", Encoding::Ascii8Bit),
            ("euc-jp", Encoding::EucJp),
            ("eucjp", Encoding::EucJp),
            ("shift_jis", Encoding::ShiftJis),
            ("sjis", Encoding::ShiftJis),
            ("windows-31j", Encoding::ShiftJis),
            ("cp932", Encoding::ShiftJis),
        ];
        TABLE
            .iter()
            .find(|(alias, _)| alias.as_bytes().eq_ignore_ascii_case(name))
            .map(|&(_, enc)| enc)
    }

    /// Canonical name, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::UsAscii => "US-ASCII",
            Encoding::Ascii8Bit => "ASCII-8BIT",
            Encoding::EucJp => "EUC-JP",
            Encoding::ShiftJis => "Shift_JIS",
        }
    }

    /// Whether `\u` escapes may be embedded in literals of this encoding.
    pub const fn accepts_utf8_escapes(self) -> bool {
        matches!(self, Encoding::Utf8 | Encoding::UsAscii | Encoding::Ascii8Bit)
    }

    /// Byte length of the character starting at `bytes[0]`.
    ///
    /// Returns `None` when the bytes do not form a valid (complete)
    /// character in this encoding. An empty slice yields `None`.
    pub fn char_len(self, bytes: &[u8]) -> Option<usize> {
        let &lead = bytes.first()?;
        if lead < 0x80 {
            return Some(1);
        }
        let need = match self {
            Encoding::Ascii8Bit => return Some(1),
            Encoding::UsAscii => return None,
            Encoding::Utf8 => match lead {
                0xC2..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF4 => 4,
                _ => return None,
            },
            Encoding::EucJp => match lead {
                0x8E | 0xA1..=0xFE => 2,
                0x8F => 3,
                _ => return None,
            },
            Encoding::ShiftJis => match lead {
                0xA1..=0xDF => return Some(1),
                0x81..=0x9F | 0xE0..=0xFC => 2,
                _ => return None,
            },
        };
        if bytes.len() < need {
            return None;
        }
        let trail_ok = bytes[1..need].iter().all(|&b| match self {
            Encoding::Utf8 => (0x80..=0xBF).contains(&b),
            Encoding::EucJp => (0xA1..=0xFE).contains(&b),
            Encoding::ShiftJis => matches!(b, 0x40..=0x7E | 0x80..=0xFC),
            Encoding::UsAscii | Encoding::Ascii8Bit => false,
        });
        trail_ok.then_some(need)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
