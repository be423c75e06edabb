//! Arrays, hashes and argument lists.
//!
//! Argument lists reuse the array node: `f(a, b)` carries `Array[a, b]`.
//! Splats split a list into `ArgsCat` (list followed by a splatted value)
//! and `ArgsPush` (splatted list followed by one more value).

use rube_ir::{NodeId, NodeKind};

use super::Builder;

impl Builder<'_> {
    /// One-element list.
    pub fn new_array(&mut self, first: NodeId) -> NodeId {
        let list = self.arena.alloc_list([first]);
        let array = self.node(NodeKind::Array(list));
        self.fixpos(array, Some(first));
        array
    }

    /// `[]`
    pub fn new_zarray(&mut self) -> NodeId {
        self.node(NodeKind::ZArray)
    }

    /// Append `item` to the list `list`, starting one if absent.
    pub fn list_append(&mut self, list: Option<NodeId>, item: NodeId) -> NodeId {
        let Some(list) = list else {
            return self.new_array(item);
        };
        match self.kind(list) {
            NodeKind::Array(items) => {
                self.arena.list_push(items, item);
                list
            }
            _ => {
                let items = self.arena.alloc_list([list, item]);
                let array = self.node(NodeKind::Array(items));
                self.fixpos(array, Some(list));
                array
            }
        }
    }

    /// Join two lists.
    pub fn list_concat(&mut self, head: NodeId, tail: NodeId) -> NodeId {
        match (self.kind(head), self.kind(tail)) {
            (NodeKind::Array(items), NodeKind::Array(more)) => {
                self.arena.list_extend(items, more);
                head
            }
            (NodeKind::Array(_), _) => self.list_append(Some(head), tail),
            _ => self.arg_concat(head, Some(tail)),
        }
    }

    /// `head, *tail`
    pub fn arg_concat(&mut self, head: NodeId, tail: Option<NodeId>) -> NodeId {
        let Some(tail) = tail else {
            return head;
        };
        if let NodeKind::BlockPass { args, body } = self.kind(head) {
            let args = match args {
                Some(args) => self.arg_concat(args, Some(tail)),
                None => tail,
            };
            self.arena.set_kind(head, NodeKind::BlockPass { args: Some(args), body });
            return head;
        }
        let cat = self.node(NodeKind::ArgsCat { head, tail });
        self.fixpos(cat, Some(head));
        cat
    }

    /// `*head, value`
    pub fn arg_append(&mut self, head: NodeId, value: NodeId) -> NodeId {
        match self.kind(head) {
            NodeKind::Array(_) => self.list_append(Some(head), value),
            NodeKind::BlockPass { args, body } => {
                let args = match args {
                    Some(args) => self.arg_append(args, value),
                    None => self.new_array(value),
                };
                self.arena.set_kind(head, NodeKind::BlockPass { args: Some(args), body });
                head
            }
            NodeKind::ArgsPush { head: inner, value: last } => {
                let tail = self.new_array(last);
                let tail = self.list_append(Some(tail), value);
                self.arena.set_kind(head, NodeKind::ArgsCat { head: inner, tail });
                head
            }
            _ => {
                let push = self.node(NodeKind::ArgsPush { head, value });
                self.fixpos(push, Some(head));
                push
            }
        }
    }

    /// `*value`
    pub fn new_splat(&mut self, value: NodeId) -> NodeId {
        self.value_expr(value);
        let splat = self.node(NodeKind::Splat(value));
        self.fixpos(splat, Some(value));
        splat
    }

    /// `{k => v, ...}` from a flat key/value list.
    pub fn new_hash(&mut self, pairs: Option<NodeId>) -> NodeId {
        let list = match pairs.map(|p| self.kind(p)) {
            Some(NodeKind::Array(items)) => items,
            Some(_) => self.arena.alloc_list(pairs),
            None => self.arena.alloc_list(std::iter::empty()),
        };
        let hash = self.node(NodeKind::Hash(list));
        self.fixpos(hash, pairs);
        hash
    }
}
