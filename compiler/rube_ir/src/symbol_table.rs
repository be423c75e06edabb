//! Process-wide symbol table.
//!
//! A total bijection between `(spelling, encoding)` and [`Id`]. Interning is
//! append-only: once handed out, an id and its spelling never change and are
//! never freed. Spellings are leaked to `'static` so lookups can return
//! borrowed slices without holding the lock.
//!
//! # Thread Safety
//! The tables sit behind a single `RwLock`, so a `SymbolTable` can be shared
//! between parses running on different threads (see [`SymbolTable::global`]
//! and [`SharedSymbolTable`]). Each individual parse uses it sequentially.

use crate::{Encoding, Id, IdKind};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::{Arc, OnceLock};

/// Spellings of the pre-seeded operator ids, in id order (`index + 1`).
const OPERATOR_TABLE: &[&str] = &[
    "+", "-", "*", "/", "%", "**", "==", "===", "!=", "=~", "!~", "<=>", "<", "<=", ">", ">=",
    "<<", ">>", "&", "|", "^", "~", "!", "+@", "-@", "[]", "[]=", "`", "::", "..", "...", "&&",
    "||",
];

/// Well-known operator ids.
pub mod op {
    use crate::Id;

    pub const PLUS: Id = Id::operator(1);
    pub const MINUS: Id = Id::operator(2);
    pub const MUL: Id = Id::operator(3);
    pub const DIV: Id = Id::operator(4);
    pub const MOD: Id = Id::operator(5);
    pub const POW: Id = Id::operator(6);
    pub const EQ: Id = Id::operator(7);
    pub const EQQ: Id = Id::operator(8);
    pub const NEQ: Id = Id::operator(9);
    pub const MATCH: Id = Id::operator(10);
    pub const NMATCH: Id = Id::operator(11);
    pub const CMP: Id = Id::operator(12);
    pub const LT: Id = Id::operator(13);
    pub const LEQ: Id = Id::operator(14);
    pub const GT: Id = Id::operator(15);
    pub const GEQ: Id = Id::operator(16);
    pub const LSHIFT: Id = Id::operator(17);
    pub const RSHIFT: Id = Id::operator(18);
    pub const AND: Id = Id::operator(19);
    pub const OR: Id = Id::operator(20);
    pub const XOR: Id = Id::operator(21);
    pub const NEG: Id = Id::operator(22);
    pub const NOT: Id = Id::operator(23);
    pub const UPLUS: Id = Id::operator(24);
    pub const UMINUS: Id = Id::operator(25);
    pub const AREF: Id = Id::operator(26);
    pub const ASET: Id = Id::operator(27);
    pub const BACKTICK: Id = Id::operator(28);
    pub const COLON2: Id = Id::operator(29);
    pub const DOT2: Id = Id::operator(30);
    pub const DOT3: Id = Id::operator(31);
    pub const ANDOP: Id = Id::operator(32);
    pub const OROP: Id = Id::operator(33);
}

/// Look up a pre-seeded operator id by spelling. Lock-free.
pub fn operator_id(spelling: &[u8]) -> Option<Id> {
    OPERATOR_TABLE
        .iter()
        .position(|op| op.as_bytes() == spelling)
        .map(|i| Id::operator(i as u32 + 1))
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// The serial counter ran out of room next to the kind tag.
    SerialOverflow { serial: u32 },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::SerialOverflow { serial } => write!(
                f,
                "symbol table exhausted: serial {} exceeds maximum {}",
                serial,
                Id::MAX_SERIAL
            ),
        }
    }
}

impl std::error::Error for InternError {}

type Spelling = (&'static [u8], Encoding);

struct Tables {
    /// Spelling -> ids, one per encoding the spelling was interned under.
    by_name: FxHashMap<&'static [u8], SmallVec<[(Encoding, Id); 1]>>,
    by_id: FxHashMap<Id, Spelling>,
    next_serial: u32,
}

impl Tables {
    fn seeded() -> Self {
        let mut tables = Tables {
            by_name: FxHashMap::default(),
            by_id: FxHashMap::default(),
            next_serial: Id::FIRST_SERIAL,
        };
        for (i, spelling) in OPERATOR_TABLE.iter().enumerate() {
            let id = Id::operator(i as u32 + 1);
            let bytes = spelling.as_bytes();
            tables
                .by_name
                .entry(bytes)
                .or_default()
                .push((Encoding::UsAscii, id));
            tables.by_id.insert(id, (bytes, Encoding::UsAscii));
        }
        tables
    }

    fn lookup(&self, bytes: &[u8], enc: Encoding) -> Option<Id> {
        self.by_name
            .get(bytes)?
            .iter()
            .find(|(e, _)| *e == enc)
            .map(|&(_, id)| id)
    }

    fn register(&mut self, bytes: &[u8], enc: Encoding, id: Id) {
        let leaked: &'static [u8] = match self.by_name.get_key_value(bytes) {
            Some((&existing, _)) => existing,
            None => Box::leak(bytes.to_vec().into_boxed_slice()),
        };
        self.by_name.entry(leaked).or_default().push((enc, id));
        self.by_id.insert(id, (leaked, enc));
    }
}

/// Interning service mapping spellings to dense ids.
pub struct SymbolTable {
    tables: RwLock<Tables>,
}

impl SymbolTable {
    /// Create a table holding only the operator ids.
    pub fn new() -> Self {
        SymbolTable {
            tables: RwLock::new(Tables::seeded()),
        }
    }

    /// The process-wide table.
    pub fn global() -> &'static SymbolTable {
        static GLOBAL: OnceLock<SymbolTable> = OnceLock::new();
        GLOBAL.get_or_init(SymbolTable::new)
    }

    /// Intern a spelling, returning its id or an error on exhaustion.
    pub fn try_intern(&self, bytes: &[u8], enc: Encoding) -> Result<Id, InternError> {
        let enc = key_encoding(bytes, enc);

        // Fast path: already interned
        if let Some(id) = self.tables.read().lookup(bytes, enc) {
            return Ok(id);
        }

        let kind = match classify(bytes) {
            Classified::Kind(kind) => kind,
            Classified::Setter => {
                let base = self.try_intern(&bytes[..bytes.len() - 1], enc)?;
                if !base.is_operator() && !base.is_attrset() {
                    let id = base.with_kind(IdKind::AttrSet);
                    let mut tables = self.tables.write();
                    if let Some(existing) = tables.lookup(bytes, enc) {
                        return Ok(existing);
                    }
                    tables.register(bytes, enc, id);
                    return Ok(id);
                }
                IdKind::Junk
            }
        };

        let mut tables = self.tables.write();
        // Double-check after acquiring write lock
        if let Some(id) = tables.lookup(bytes, enc) {
            return Ok(id);
        }
        let serial = tables.next_serial;
        if serial > Id::MAX_SERIAL {
            return Err(InternError::SerialOverflow { serial });
        }
        tables.next_serial += 1;
        let id = Id::dynamic(serial, kind);
        tables.register(bytes, enc, id);
        Ok(id)
    }

    /// Intern a spelling.
    ///
    /// # Panics
    /// Panics if the serial space is exhausted (over 500 million names).
    /// Use `try_intern` for fallible interning.
    #[inline]
    pub fn intern(&self, bytes: &[u8], enc: Encoding) -> Id {
        self.try_intern(bytes, enc).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Convenience for ASCII/UTF-8 spellings written in Rust source.
    #[inline]
    pub fn intern_str(&self, s: &str) -> Id {
        self.intern(s.as_bytes(), Encoding::Utf8)
    }

    /// Reverse lookup.
    ///
    /// Setter ids obtained through [`attrset`](Self::attrset) whose spelling
    /// was never interned get `base=` synthesized and registered here.
    pub fn name(&self, id: Id) -> Option<&'static [u8]> {
        if let Some(&(bytes, _)) = self.tables.read().by_id.get(&id) {
            return Some(bytes);
        }
        if !id.is_attrset() {
            return None;
        }
        let (base, enc) = {
            let tables = self.tables.read();
            [IdKind::Local, IdKind::Const]
                .iter()
                .find_map(|&kind| tables.by_id.get(&id.with_kind(kind)).copied())?
        };
        let mut spelling = Vec::with_capacity(base.len() + 1);
        spelling.extend_from_slice(base);
        spelling.push(b'=');
        let mut tables = self.tables.write();
        if let Some(&(bytes, _)) = tables.by_id.get(&id) {
            return Some(bytes);
        }
        tables.register(&spelling, enc, id);
        tables.by_id.get(&id).map(|&(bytes, _)| bytes)
    }

    /// Reverse lookup rendered for messages.
    pub fn display(&self, id: Id) -> String {
        match self.name(id) {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => format!("{id:?}"),
        }
    }

    /// Encoding recorded for an id's spelling.
    pub fn encoding(&self, id: Id) -> Option<Encoding> {
        self.tables.read().by_id.get(&id).map(|&(_, enc)| enc)
    }

    /// The setter id (`name=`) paired with a local or constant id.
    pub fn attrset(&self, id: Id) -> Id {
        id.with_kind(IdKind::AttrSet)
    }

    /// Number of interned spellings, operators included.
    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    /// Only the operator table is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= OPERATOR_TABLE.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared symbol table for handing one table to several owners.
#[derive(Clone)]
pub struct SharedSymbolTable(Arc<SymbolTable>);

impl SharedSymbolTable {
    pub fn new() -> Self {
        SharedSymbolTable(Arc::new(SymbolTable::new()))
    }
}

impl Default for SharedSymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedSymbolTable {
    type Target = SymbolTable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// ASCII-only spellings mean the same thing in every supported encoding.
fn key_encoding(bytes: &[u8], enc: Encoding) -> Encoding {
    if bytes.is_ascii() {
        Encoding::UsAscii
    } else {
        enc
    }
}

enum Classified {
    Kind(IdKind),
    /// Identifier followed by a single `=`.
    Setter,
}

#[inline]
pub fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

fn ident_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| is_ident_char(b)).count()
}

fn classify(bytes: &[u8]) -> Classified {
    let Some(&first) = bytes.first() else {
        return Classified::Kind(IdKind::Junk);
    };
    match first {
        b'$' => {
            if is_special_global_name(&bytes[1..]) {
                Classified::Kind(IdKind::Global)
            } else {
                Classified::Kind(IdKind::Junk)
            }
        }
        b'@' => {
            let (kind, rest) = if bytes.get(1) == Some(&b'@') {
                (IdKind::Class, &bytes[2..])
            } else {
                (IdKind::Instance, &bytes[1..])
            };
            let valid = rest.first().is_some_and(|&b| !b.is_ascii_digit())
                && ident_run(rest) == rest.len();
            Classified::Kind(if valid { kind } else { IdKind::Junk })
        }
        _ => {
            if first.is_ascii_digit() || !is_ident_char(first) {
                return Classified::Kind(IdKind::Junk);
            }
            let kind = if first.is_ascii_uppercase() {
                IdKind::Const
            } else {
                IdKind::Local
            };
            let run = ident_run(bytes);
            match &bytes[run..] {
                [] => Classified::Kind(kind),
                [b'='] => Classified::Setter,
                // `foo?`, `foo!` and anything malformed
                _ => Classified::Kind(IdKind::Junk),
            }
        }
    }
}

/// Body of a global variable name after the `$`.
pub fn is_special_global_name(rest: &[u8]) -> bool {
    let Some(&first) = rest.first() else {
        return false;
    };
    match first {
        b'~' | b'*' | b'$' | b'?' | b'!' | b'@' | b'/' | b'\\' | b';' | b',' | b'.' | b'='
        | b':' | b'<' | b'>' | b'"' | b'&' | b'`' | b'\'' | b'+' | b'0' => rest.len() == 1,
        b'-' => rest.len() == 2 && is_ident_char(rest[1]),
        b'1'..=b'9' => rest.iter().all(u8::is_ascii_digit),
        _ => ident_run(rest) == rest.len(),
    }
}
