//! Interned symbol identifier.
//!
//! An [`Id`] is a 32-bit handle handed out by the
//! [`SymbolTable`](crate::SymbolTable). Operator ids occupy the fixed range
//! `1..Id::LAST_OP`; every other id packs a serial counter and a scope-kind
//! tag:
//!
//! - Bits 31-3: serial (monotonically increasing, starts at `Id::FIRST_SERIAL`)
//! - Bits 2-0: kind tag (see [`IdKind`])

use std::fmt;

/// Lexical category of an interned name, derived from its spelling.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IdKind {
    /// `foo`, `_bar`
    Local,
    /// `@foo`
    Instance,
    /// `$foo`, `$0`, `$~`
    Global,
    /// `foo=`
    AttrSet,
    /// `Foo`
    Const,
    /// `@@foo`
    Class,
    /// Method names that are not assignable (`foo?`, `foo!`) or otherwise
    /// malformed spellings.
    Junk,
    /// Pre-seeded operator spellings (`+`, `[]=`, `<=>`).
    Operator,
}

impl IdKind {
    const fn tag(self) -> u32 {
        match self {
            IdKind::Local => 0,
            IdKind::Instance => 1,
            IdKind::Global => 3,
            IdKind::AttrSet => 4,
            IdKind::Const => 5,
            IdKind::Class => 6,
            IdKind::Junk | IdKind::Operator => 7,
        }
    }

    const fn from_tag(tag: u32) -> Self {
        match tag {
            0 => IdKind::Local,
            1 => IdKind::Instance,
            3 => IdKind::Global,
            4 => IdKind::AttrSet,
            5 => IdKind::Const,
            6 => IdKind::Class,
            _ => IdKind::Junk,
        }
    }
}

/// Interned symbol identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Id(u32);

impl Id {
    /// The absent id. Never returned by interning.
    pub const NONE: Id = Id(0);

    /// Number of low bits holding the kind tag.
    pub const SCOPE_SHIFT: u32 = 3;

    const SCOPE_MASK: u32 = (1 << Self::SCOPE_SHIFT) - 1;

    /// Every operator id is strictly below this value; every dynamic id is
    /// at or above it.
    pub const LAST_OP: u32 = 128;

    /// First serial handed out to dynamically interned names.
    pub const FIRST_SERIAL: u32 = Self::LAST_OP >> Self::SCOPE_SHIFT;

    /// Largest serial that still fits after shifting in the kind tag.
    pub const MAX_SERIAL: u32 = u32::MAX >> Self::SCOPE_SHIFT;

    /// Create an operator id from its 1-based index in the operator table.
    #[inline]
    pub(crate) const fn operator(index: u32) -> Self {
        debug_assert!(index > 0 && index < Self::LAST_OP);
        Id(index)
    }

    /// Create a dynamic id from a serial and a kind.
    #[inline]
    pub(crate) const fn dynamic(serial: u32, kind: IdKind) -> Self {
        debug_assert!(serial >= Self::FIRST_SERIAL && serial <= Self::MAX_SERIAL);
        Id((serial << Self::SCOPE_SHIFT) | kind.tag())
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Id(raw)
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True for the pre-seeded operator range.
    #[inline]
    pub const fn is_operator(self) -> bool {
        self.0 != 0 && self.0 < Self::LAST_OP
    }

    /// Serial counter of a dynamic id; `None` for operators and `NONE`.
    #[inline]
    pub const fn serial(self) -> Option<u32> {
        if self.0 < Self::LAST_OP {
            None
        } else {
            Some(self.0 >> Self::SCOPE_SHIFT)
        }
    }

    /// Lexical category of this id.
    #[inline]
    pub const fn kind(self) -> IdKind {
        if self.0 < Self::LAST_OP {
            if self.0 == 0 {
                IdKind::Junk
            } else {
                IdKind::Operator
            }
        } else {
            IdKind::from_tag(self.0 & Self::SCOPE_MASK)
        }
    }

    /// Same serial, different kind tag. Operators and `NONE` are returned
    /// unchanged.
    #[inline]
    #[must_use]
    pub const fn with_kind(self, kind: IdKind) -> Self {
        if self.0 < Self::LAST_OP {
            self
        } else {
            Id((self.0 & !Self::SCOPE_MASK) | kind.tag())
        }
    }

    #[inline]
    pub const fn is_local(self) -> bool {
        matches!(self.kind(), IdKind::Local)
    }

    #[inline]
    pub const fn is_const(self) -> bool {
        matches!(self.kind(), IdKind::Const)
    }

    #[inline]
    pub const fn is_instance(self) -> bool {
        matches!(self.kind(), IdKind::Instance)
    }

    #[inline]
    pub const fn is_global(self) -> bool {
        matches!(self.kind(), IdKind::Global)
    }

    #[inline]
    pub const fn is_class_var(self) -> bool {
        matches!(self.kind(), IdKind::Class)
    }

    #[inline]
    pub const fn is_attrset(self) -> bool {
        matches!(self.kind(), IdKind::AttrSet)
    }

    #[inline]
    pub const fn is_junk(self) -> bool {
        matches!(self.kind(), IdKind::Junk)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.serial() {
            Some(serial) => write!(f, "Id({:?} #{})", self.kind(), serial),
            None if self.is_none() => write!(f, "Id::NONE"),
            None => write!(f, "Id(op #{})", self.0),
        }
    }
}
