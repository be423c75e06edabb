//! Literal nodes.
//!
//! Quoted literals arrive as pieces: the automaton turns each
//! `StringContent` into a `Str` and each `#{...}` into an `EvStr`, then
//! folds them left to right with [`Builder::literal_concat`]. The final
//! node is handed to the constructor for the literal's flavor (`new_xstr`,
//! `new_dsym`, `new_regexp`), which retags it.
//!
//! ```text
//! "a#{b}c"   Str("a") + EvStr(b) + Str("c")  =>  DStr { head: "a", parts: [EvStr(b), Str("c")] }
//! "a" "b"    Str("a") + Str("b")             =>  Str("ab")
//! ```

use rube_diagnostic::ErrorCode;
use rube_ir::{Id, ListId, NodeId, NodeKind, StrId};
use rube_lexer::TokenValue;

use super::Builder;

impl Builder<'_> {
    // ===== Numbers =====

    pub fn new_int(&mut self, value: i64) -> NodeId {
        self.node(NodeKind::Int(value))
    }

    /// Integer too large for `i64`, kept as digits in `radix`.
    pub fn new_bignum(&mut self, digits: &str, radix: u8) -> NodeId {
        let digits = self.arena.alloc_str(digits.as_bytes());
        self.node(NodeKind::BigInt {
            digits,
            radix,
            negative: false,
        })
    }

    pub fn new_float(&mut self, value: f64) -> NodeId {
        self.node(NodeKind::Float(value.to_bits()))
    }

    /// Numeric literal from a scanned `Integer` or `Float` token value.
    pub fn new_numeric(&mut self, value: &TokenValue) -> NodeId {
        match value {
            TokenValue::Int(v) => self.new_int(*v),
            TokenValue::BigInt { digits, radix } => self.new_bignum(digits, *radix),
            TokenValue::Float(v) => self.new_float(*v),
            other => self.error_node(ErrorCode::E9001, format!("not a numeric literal: {other:?}")),
        }
    }

    /// Apply a unary minus to a numeric literal in place.
    pub fn negate_lit(&mut self, node: NodeId) -> NodeId {
        let negated = match self.kind(node) {
            NodeKind::Int(v) => match v.checked_neg() {
                Some(n) => NodeKind::Int(n),
                None => {
                    let digits = self.arena.alloc_str(i64::MIN.unsigned_abs().to_string());
                    NodeKind::BigInt {
                        digits,
                        radix: 10,
                        negative: false,
                    }
                }
            },
            NodeKind::BigInt {
                digits,
                radix,
                negative,
            } => {
                let text = String::from_utf8_lossy(self.arena.str(digits)).into_owned();
                let fits = if negative {
                    None
                } else {
                    i64::from_str_radix(&format!("-{text}"), u32::from(radix)).ok()
                };
                match fits {
                    Some(v) => NodeKind::Int(v),
                    None => NodeKind::BigInt {
                        digits,
                        radix,
                        negative: !negative,
                    },
                }
            }
            NodeKind::Float(bits) => NodeKind::Float((-f64::from_bits(bits)).to_bits()),
            _ => return node,
        };
        self.arena.set_kind(node, negated);
        node
    }

    // ===== Strings =====

    pub fn new_str(&mut self, bytes: impl Into<Vec<u8>>) -> NodeId {
        let s = self.arena.alloc_str(bytes);
        self.node(NodeKind::Str(s))
    }

    /// `?a`
    pub fn new_char(&mut self, bytes: impl Into<Vec<u8>>) -> NodeId {
        self.new_str(bytes)
    }

    /// Piece for `#{...}`; literal contents pass through unwrapped.
    pub fn new_evstr(&mut self, node: Option<NodeId>) -> NodeId {
        if let Some(node) = node {
            if matches!(
                self.kind(node),
                NodeKind::Str(_) | NodeKind::DStr { .. } | NodeKind::EvStr(_)
            ) {
                return node;
            }
        }
        let evstr = self.node(NodeKind::EvStr(node));
        self.fixpos(evstr, node);
        evstr
    }

    /// Join two adjacent literal pieces.
    ///
    /// Literal text merges into literal text; anything interpolated turns
    /// the result into a `DStr`.
    pub fn literal_concat(&mut self, head: Option<NodeId>, tail: Option<NodeId>) -> Option<NodeId> {
        let Some(tail) = tail else {
            return head;
        };
        let Some(mut head) = head else {
            return Some(tail);
        };
        if let NodeKind::EvStr(_) = self.kind(head) {
            head = self.dstr_of(head);
        }

        match (self.kind(head), self.kind(tail)) {
            (NodeKind::Str(h), NodeKind::Str(t)) => {
                let bytes = self.arena.str(t).to_vec();
                self.arena.str_append(h, &bytes);
            }
            (NodeKind::DStr { parts, .. }, NodeKind::Str(t)) => {
                self.push_str_part(parts, t, Some(tail));
            }
            (NodeKind::Str(h), NodeKind::DStr { head: th, parts }) => {
                let mut bytes = self.arena.str(h).to_vec();
                bytes.extend_from_slice(self.arena.str(th));
                let joined = self.arena.alloc_str(bytes);
                self.arena.set_kind(tail, NodeKind::DStr { head: joined, parts });
                self.fixpos(tail, Some(head));
                return Some(tail);
            }
            (NodeKind::DStr { parts, .. }, NodeKind::DStr { head: th, parts: tp }) => {
                if !self.arena.str(th).is_empty() {
                    self.push_str_part(parts, th, None);
                }
                self.arena.list_extend(parts, tp);
            }
            (NodeKind::Str(h), NodeKind::EvStr(_)) => {
                let parts = self.arena.alloc_list([tail]);
                self.arena.set_kind(head, NodeKind::DStr { head: h, parts });
            }
            (NodeKind::DStr { parts, .. }, NodeKind::EvStr(_)) => {
                self.arena.list_push(parts, tail);
            }
            // An error placeholder on either side.
            _ => {}
        }
        Some(head)
    }

    /// `DStr` with an empty prefix holding just `piece`.
    fn dstr_of(&mut self, piece: NodeId) -> NodeId {
        let head = self.arena.alloc_str(Vec::new());
        let parts = self.arena.alloc_list([piece]);
        let dstr = self.node(NodeKind::DStr { head, parts });
        self.fixpos(dstr, Some(piece));
        dstr
    }

    /// Append literal text to `parts`, merging into a trailing `Str`.
    fn push_str_part(&mut self, parts: ListId, text: StrId, node: Option<NodeId>) {
        if let Some(last) = self.arena.list_last(parts) {
            if let NodeKind::Str(s) = self.kind(last) {
                let bytes = self.arena.str(text).to_vec();
                self.arena.str_append(s, &bytes);
                return;
            }
        }
        let node = match node {
            Some(node) => node,
            None => self.node(NodeKind::Str(text)),
        };
        self.arena.list_push(parts, node);
    }

    /// Split a literal body into prefix and parts.
    fn literal_parts(&mut self, node: NodeId) -> (StrId, ListId) {
        match self.kind(node) {
            NodeKind::DStr { head, parts } => (head, parts),
            _ => {
                let head = self.arena.alloc_str(Vec::new());
                (head, self.arena.alloc_list([node]))
            }
        }
    }

    /// `` `cmd` ``
    pub fn new_xstr(&mut self, node: Option<NodeId>) -> NodeId {
        let Some(node) = node else {
            let empty = self.arena.alloc_str(Vec::new());
            return self.node(NodeKind::XStr(empty));
        };
        let kind = match self.kind(node) {
            NodeKind::Str(s) => NodeKind::XStr(s),
            NodeKind::Error => return node,
            _ => {
                let (head, parts) = self.literal_parts(node);
                NodeKind::DXStr { head, parts }
            }
        };
        self.retag(node, kind)
    }

    pub fn new_sym(&mut self, id: Id) -> NodeId {
        self.node(NodeKind::Sym(id))
    }

    /// `:"..."`; static contents are interned.
    pub fn new_dsym(&mut self, node: Option<NodeId>) -> NodeId {
        let Some(node) = node else {
            return self.error_node(ErrorCode::E1001, "empty symbol literal");
        };
        let kind = match self.kind(node) {
            NodeKind::Str(s) => {
                let bytes = self.arena.str(s).to_vec();
                if bytes.is_empty() {
                    return self.error_node(ErrorCode::E1001, "empty symbol literal");
                }
                match self.symbols.try_intern(&bytes, self.encoding) {
                    Ok(id) => NodeKind::Sym(id),
                    Err(err) => return self.error_node(ErrorCode::E9001, err.to_string()),
                }
            }
            NodeKind::Error => return node,
            _ => {
                let (head, parts) = self.literal_parts(node);
                NodeKind::DSym { head, parts }
            }
        };
        self.retag(node, kind)
    }

    /// `/re/opts`
    pub fn new_regexp(&mut self, node: Option<NodeId>, options: u32) -> NodeId {
        let Some(node) = node else {
            let source = self.arena.alloc_str(Vec::new());
            return self.node(NodeKind::Regex { source, options });
        };
        let kind = match self.kind(node) {
            NodeKind::Str(source) => NodeKind::Regex { source, options },
            NodeKind::Error => return node,
            _ => {
                let (head, parts) = self.literal_parts(node);
                NodeKind::DRegex {
                    head,
                    parts,
                    options,
                }
            }
        };
        self.retag(node, kind)
    }

    /// Retag a `Str`/`DStr` in place, or wrap an `EvStr` in a new node.
    fn retag(&mut self, node: NodeId, kind: NodeKind) -> NodeId {
        if let NodeKind::EvStr(_) = self.kind(node) {
            let wrapped = self.node(kind);
            self.fixpos(wrapped, Some(node));
            return wrapped;
        }
        self.arena.set_kind(node, kind);
        node
    }

    /// `%w(...)` / `%W(...)`: each word becomes a string element.
    pub fn new_words(&mut self, words: &[NodeId]) -> NodeId {
        if words.is_empty() {
            return self.node(NodeKind::ZArray);
        }
        let mut items = Vec::with_capacity(words.len());
        for &word in words {
            let item = match self.kind(word) {
                NodeKind::EvStr(_) => self.dstr_of(word),
                _ => word,
            };
            items.push(item);
        }
        let list = self.arena.alloc_list(items);
        let array = self.node(NodeKind::Array(list));
        self.fixpos(array, words.first().copied());
        array
    }
}
