//! Rube IR - shared data structures for the front end
//!
//! This crate contains the types every other front-end crate agrees on:
//! - Interned symbol ids and the symbol table
//! - Source encodings
//! - Spans for source locations
//! - Syntax tree nodes and their arena
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: names become `Id(u32)`; equality is a compare
//! - **Flatten Everything**: no `Box<Node>`, children are `NodeId(u32)`
//!
//! Node kinds that contain floats store them as u64 bits for Hash
//! compatibility.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod encoding;
mod id;
mod node_id;
mod span;
mod symbol_table;

pub use ast::{Node, NodeArena, NodeKind, NodeList, Params};
pub use encoding::Encoding;
pub use id::{Id, IdKind};
pub use node_id::{ListId, NodeId, ParamsId, StrId, TableId};
pub use span::Span;
pub use symbol_table::{
    is_ident_char, is_special_global_name, op, operator_id, InternError, SharedSymbolTable,
    SymbolTable,
};

static_assert_size!(Id, 4);
static_assert_size!(NodeId, 4);
static_assert_size!(Span, 8);
