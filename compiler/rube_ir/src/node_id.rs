//! Handles into the [`NodeArena`](crate::NodeArena).
//!
//! Children are referenced by 32-bit index instead of `Box<Node>`, so tree
//! rewrites (literal concatenation, wrapper removal) replace indices and can
//! never leave a dangling reference.

use std::fmt;

macro_rules! arena_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

arena_handle!(
    /// Index of a node.
    NodeId
);
arena_handle!(
    /// Index of a growable node list (statement sequences, array elements,
    /// interpolation parts).
    ListId
);
arena_handle!(
    /// Index of a byte-string literal body.
    StrId
);
arena_handle!(
    /// Index of a local-variable table recorded when a scope closes.
    TableId
);
arena_handle!(
    /// Index of a parameter list.
    ParamsId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roundtrip() {
        let id = NodeId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.raw(), 7);
        assert_eq!(format!("{id:?}"), "NodeId(7)");
        assert_eq!(format!("{:?}", ListId::new(3)), "ListId(3)");
    }
}
