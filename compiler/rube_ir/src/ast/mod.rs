//! Syntax tree: node types and their arena.

mod arena;
mod node;

pub use arena::{NodeArena, NodeList};
pub use node::{Node, NodeKind, Params};
