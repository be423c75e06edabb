//! Node types.
//!
//! One named variant per construct, carrying only the fields that construct
//! needs. Optional children are `Option<NodeId>`; lists live in the arena.

use std::fmt;

use crate::{Encoding, Id, ListId, NodeId, ParamsId, StrId, TableId};

/// AST node: a construct plus the source line it was built on.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub kind: NodeKind,
    pub line: u32,
}

impl Node {
    pub fn new(kind: NodeKind, line: u32) -> Self {
        Node { kind, line }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ line {}", self.kind, self.line)
    }
}

/// Node variants.
///
/// Floats are stored as bits so the type stays `Eq + Hash`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    // ===== Literals =====
    Nil,
    True,
    False,
    SelfRef,
    Int(i64),
    /// Integer literal that does not fit in `i64`; digits are kept in `radix`.
    BigInt {
        digits: StrId,
        radix: u8,
        negative: bool,
    },
    Float(u64),
    Str(StrId),
    /// Command string: `` `ls` ``
    XStr(StrId),
    Sym(Id),
    Regex {
        source: StrId,
        options: u32,
    },
    /// `__ENCODING__`
    EncodingLit(Encoding),
    /// Interpolated string. `head` is the literal prefix; `parts` holds
    /// `Str` and `EvStr` nodes in order.
    DStr {
        head: StrId,
        parts: ListId,
    },
    DXStr {
        head: StrId,
        parts: ListId,
    },
    DSym {
        head: StrId,
        parts: ListId,
    },
    DRegex {
        head: StrId,
        parts: ListId,
        options: u32,
    },
    /// Embedded expression `#{...}` inside an interpolated literal.
    EvStr(Option<NodeId>),

    // ===== Collections =====
    Array(ListId),
    ZArray,
    /// Key/value nodes alternating.
    Hash(ListId),
    Splat(NodeId),
    /// `[*a, *b]`, `f(a, *b)`
    ArgsCat {
        head: NodeId,
        tail: NodeId,
    },
    /// `f(*a, b)`
    ArgsPush {
        head: NodeId,
        value: NodeId,
    },
    BlockPass {
        args: Option<NodeId>,
        body: NodeId,
    },
    Dot2 {
        beg: Option<NodeId>,
        end: Option<NodeId>,
    },
    Dot3 {
        beg: Option<NodeId>,
        end: Option<NodeId>,
    },
    /// Range in a condition: flip-flop.
    Flip2 {
        beg: NodeId,
        end: NodeId,
    },
    Flip3 {
        beg: NodeId,
        end: NodeId,
    },

    // ===== Variable references =====
    LVar(Id),
    /// Block-local (dynamic) variable.
    DVar(Id),
    IVar(Id),
    GVar(Id),
    CVar(Id),
    Const(Id),
    /// `Scope::Name`
    Colon2 {
        scope: NodeId,
        name: Id,
    },
    /// `::Name`
    Colon3(Id),
    /// `$1`
    NthRef(u32),
    /// `` $& $` $' $+ ``
    BackRef(u8),

    // ===== Assignment =====
    LAsgn {
        id: Id,
        value: Option<NodeId>,
    },
    DAsgn {
        id: Id,
        value: Option<NodeId>,
    },
    IAsgn {
        id: Id,
        value: Option<NodeId>,
    },
    GAsgn {
        id: Id,
        value: Option<NodeId>,
    },
    CvAsgn {
        id: Id,
        value: Option<NodeId>,
    },
    /// Constant declaration. `path` is a `Colon2`/`Colon3` for scoped names.
    CDecl {
        id: Id,
        path: Option<NodeId>,
        value: Option<NodeId>,
    },
    /// `recv.attr = v`, `recv[i] = v`
    AttrAsgn {
        recv: Option<NodeId>,
        mid: Id,
        args: Option<NodeId>,
    },
    /// Bare `*` in a multiple-assignment target list.
    AnonRest,
    /// `a, b = ...`; `lhs` is an `Array` of assignables.
    MAsgn {
        lhs: Option<NodeId>,
        splat: Option<NodeId>,
        value: Option<NodeId>,
    },
    /// `recv[args] op= value`
    OpAsgn1 {
        recv: NodeId,
        op: Id,
        args: Option<NodeId>,
        value: NodeId,
    },
    /// `recv.attr op= value`
    OpAsgn2 {
        recv: NodeId,
        attr: Id,
        op: Id,
        value: NodeId,
    },
    /// `var ||= value`
    OpAsgnOr {
        head: NodeId,
        value: NodeId,
    },
    /// `var &&= value`
    OpAsgnAnd {
        head: NodeId,
        value: NodeId,
    },

    // ===== Calls =====
    Call {
        recv: NodeId,
        mid: Id,
        args: Option<NodeId>,
    },
    /// Receiverless call with arguments or parentheses.
    FCall {
        mid: Id,
        args: Option<NodeId>,
    },
    /// Bare identifier that is not a known local.
    VCall(Id),
    Super(Option<NodeId>),
    ZSuper,
    Yield(Option<NodeId>),
    /// Call with a literal block.
    Iter {
        call: NodeId,
        scope: NodeId,
    },
    Lambda(NodeId),
    /// Regexp literal tested against `$_` in a condition.
    Match(NodeId),
    /// `/re/ =~ value`
    Match2 {
        regexp: NodeId,
        value: NodeId,
    },
    /// `value =~ /re/`
    Match3 {
        regexp: NodeId,
        value: NodeId,
    },
    Defined(NodeId),

    // ===== Control flow =====
    If {
        cond: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: Option<NodeId>,
        /// `begin ... end while cond`
        do_while: bool,
    },
    Until {
        cond: NodeId,
        body: Option<NodeId>,
        do_while: bool,
    },
    For {
        var: NodeId,
        iter: NodeId,
        body: Option<NodeId>,
    },
    Case {
        subject: Option<NodeId>,
        whens: Option<NodeId>,
    },
    /// `when conds then body`; `next` chains to the following `When` or to
    /// the `else` body.
    When {
        conds: NodeId,
        body: Option<NodeId>,
        next: Option<NodeId>,
    },
    And {
        left: NodeId,
        right: NodeId,
    },
    Or {
        left: NodeId,
        right: NodeId,
    },
    Not(NodeId),
    Break(Option<NodeId>),
    Next(Option<NodeId>),
    Redo,
    Retry,
    Return(Option<NodeId>),
    /// Statement sequence.
    Block(ListId),
    /// `begin ... end` / `( ... )` wrapper.
    Begin(Option<NodeId>),
    Rescue {
        body: Option<NodeId>,
        handlers: Option<NodeId>,
        else_branch: Option<NodeId>,
    },
    /// One `rescue` clause; `next` chains to the following clause.
    ResBody {
        exceptions: Option<NodeId>,
        body: Option<NodeId>,
        next: Option<NodeId>,
    },
    Ensure {
        body: Option<NodeId>,
        ensure: Option<NodeId>,
    },
    /// `END { ... }`
    PostExe(NodeId),

    // ===== Definitions =====
    /// A closed scope: method body, class body, block body or program.
    Scope {
        locals: TableId,
        params: Option<ParamsId>,
        body: Option<NodeId>,
    },
    Defn {
        mid: Id,
        scope: NodeId,
    },
    Defs {
        recv: NodeId,
        mid: Id,
        scope: NodeId,
    },
    Class {
        cpath: NodeId,
        superclass: Option<NodeId>,
        scope: NodeId,
    },
    Module {
        cpath: NodeId,
        scope: NodeId,
    },
    /// `class << recv`
    SClass {
        recv: NodeId,
        scope: NodeId,
    },
    Alias {
        new_name: Id,
        old_name: Id,
    },
    /// `alias $new $old`
    VAlias {
        new_name: Id,
        old_name: Id,
    },
    Undef(Id),

    /// Placeholder built when a construct is invalid; the error is recorded
    /// in the diagnostics.
    Error,
}

impl NodeKind {
    /// Literals with no side effects and no sub-expressions.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::Int(_)
                | NodeKind::BigInt { .. }
                | NodeKind::Float(_)
                | NodeKind::Str(_)
                | NodeKind::Sym(_)
                | NodeKind::Regex { .. }
                | NodeKind::DStr { .. }
                | NodeKind::DSym { .. }
                | NodeKind::DRegex { .. }
                | NodeKind::EncodingLit(_)
        )
    }

    /// Variable reads.
    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            NodeKind::LVar(_)
                | NodeKind::DVar(_)
                | NodeKind::IVar(_)
                | NodeKind::GVar(_)
                | NodeKind::CVar(_)
                | NodeKind::NthRef(_)
                | NodeKind::BackRef(_)
        )
    }

    /// Nodes that transfer control and never produce a value.
    pub fn is_void_value(&self) -> bool {
        matches!(
            self,
            NodeKind::Return(_)
                | NodeKind::Break(_)
                | NodeKind::Next(_)
                | NodeKind::Redo
                | NodeKind::Retry
        )
    }

    /// Assignment nodes whose value slot is attached later.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            NodeKind::LAsgn { .. }
                | NodeKind::DAsgn { .. }
                | NodeKind::IAsgn { .. }
                | NodeKind::GAsgn { .. }
                | NodeKind::CvAsgn { .. }
                | NodeKind::CDecl { .. }
                | NodeKind::AttrAsgn { .. }
                | NodeKind::MAsgn { .. }
        )
    }
}

/// Parameter list of a method, block or lambda.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Params {
    /// Leading required parameters.
    pub required: Vec<Id>,
    /// Optional parameters: `LAsgn`/`DAsgn` nodes holding the default.
    pub optional: Vec<NodeId>,
    /// `*rest`; `Some(Id::NONE)` for an anonymous `*`.
    pub rest: Option<Id>,
    /// Required parameters after the rest parameter.
    pub post: Vec<Id>,
    /// `&block`
    pub block: Option<Id>,
}

impl Params {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
            && self.optional.is_empty()
            && self.rest.is_none()
            && self.post.is_empty()
            && self.block.is_none()
    }
}
