//! Arena allocation for the syntax tree.
//!
//! - Contiguous storage for all nodes
//! - Child references use `NodeId` indices
//! - Statement sequences and argument lists are growable `ListId` entries,
//!   since the builder appends to them one reduction at a time

use smallvec::SmallVec;

use super::{Node, NodeKind, Params};
use crate::{Id, ListId, NodeId, ParamsId, StrId, TableId};

/// Inline capacity for node lists; most argument lists and blocks are short.
pub type NodeList = SmallVec<[NodeId; 4]>;

/// Contiguous storage for every node produced by one parse.
#[derive(Clone, Default, Debug)]
pub struct NodeArena {
    /// All nodes (indexed by `NodeId`).
    nodes: Vec<Node>,

    /// Growable node lists.
    lists: Vec<NodeList>,

    /// Byte-string literal bodies (indexed by `StrId`).
    strings: Vec<Vec<u8>>,

    /// Local-variable tables of closed scopes.
    tables: Vec<Vec<Id>>,

    /// Parameter lists.
    params: Vec<Params>,
}

impl NodeArena {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with estimated capacity based on source size.
    /// Heuristic: ~1 node per 8 bytes of source.
    pub fn with_capacity(source_len: usize) -> Self {
        let estimated = source_len / 8;
        NodeArena {
            nodes: Vec::with_capacity(estimated),
            lists: Vec::with_capacity(estimated / 4),
            strings: Vec::with_capacity(estimated / 8),
            tables: Vec::new(),
            params: Vec::new(),
        }
    }

    // ===== Nodes =====

    /// Allocate node, return ID.
    #[inline]
    pub fn alloc(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, line));
        id
    }

    /// Get node by ID.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get mutable node by ID.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Shorthand for `get(id).kind`.
    #[inline]
    #[track_caller]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    /// Replace a node's kind in place, keeping its line.
    #[inline]
    #[track_caller]
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    #[inline]
    #[track_caller]
    pub fn line(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].line
    }

    /// Get number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ===== Lists =====

    /// Allocate a list, return its ID.
    pub fn alloc_list(&mut self, items: impl IntoIterator<Item = NodeId>) -> ListId {
        let id = ListId::new(self.lists.len() as u32);
        self.lists.push(items.into_iter().collect());
        id
    }

    #[inline]
    #[track_caller]
    pub fn list(&self, id: ListId) -> &[NodeId] {
        &self.lists[id.index()]
    }

    #[inline]
    #[track_caller]
    pub fn list_push(&mut self, id: ListId, item: NodeId) {
        self.lists[id.index()].push(item);
    }

    #[inline]
    #[track_caller]
    pub fn list_prepend(&mut self, id: ListId, item: NodeId) {
        self.lists[id.index()].insert(0, item);
    }

    /// Append every element of `other` to `id`.
    #[track_caller]
    pub fn list_extend(&mut self, id: ListId, other: ListId) {
        if id == other {
            let copy = self.lists[other.index()].clone();
            self.lists[id.index()].extend(copy);
        } else {
            let tail = std::mem::take(&mut self.lists[other.index()]);
            self.lists[id.index()].extend(tail.iter().copied());
            self.lists[other.index()] = tail;
        }
    }

    #[inline]
    #[track_caller]
    pub fn list_pop(&mut self, id: ListId) -> Option<NodeId> {
        self.lists[id.index()].pop()
    }

    #[inline]
    #[track_caller]
    pub fn list_last(&self, id: ListId) -> Option<NodeId> {
        self.lists[id.index()].last().copied()
    }

    // ===== Strings =====

    /// Store a literal body, return its ID.
    pub fn alloc_str(&mut self, bytes: impl Into<Vec<u8>>) -> StrId {
        let id = StrId::new(self.strings.len() as u32);
        self.strings.push(bytes.into());
        id
    }

    #[inline]
    #[track_caller]
    pub fn str(&self, id: StrId) -> &[u8] {
        &self.strings[id.index()]
    }

    /// Append to an existing literal body (adjacent literal concatenation).
    #[track_caller]
    pub fn str_append(&mut self, id: StrId, bytes: &[u8]) {
        self.strings[id.index()].extend_from_slice(bytes);
    }

    // ===== Scope tables =====

    pub fn alloc_table(&mut self, locals: Vec<Id>) -> TableId {
        let id = TableId::new(self.tables.len() as u32);
        self.tables.push(locals);
        id
    }

    #[inline]
    #[track_caller]
    pub fn table(&self, id: TableId) -> &[Id] {
        &self.tables[id.index()]
    }

    // ===== Parameters =====

    pub fn alloc_params(&mut self, params: Params) -> ParamsId {
        let id = ParamsId::new(self.params.len() as u32);
        self.params.push(params);
        id
    }

    #[inline]
    #[track_caller]
    pub fn params(&self, id: ParamsId) -> &Params {
        &self.params[id.index()]
    }

    #[inline]
    #[track_caller]
    pub fn params_mut(&mut self, id: ParamsId) -> &mut Params {
        &mut self.params[id.index()]
    }
}
