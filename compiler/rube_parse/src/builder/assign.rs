//! Variable references and assignment.
//!
//! Assignment is built in two steps: the target first (`assignable`,
//! `new_attr_assign`, `new_masgn`, ...), then the value is attached with
//! `node_assign`. Declaring happens at the target, so in `x = x` the right
//! side already sees `x` as a local.

use rube_diagnostic::ErrorCode;
use rube_ir::{op, Id, IdKind, NodeId, NodeKind};

use super::{Builder, Pseudo};
use crate::scope::Resolution;

impl Builder<'_> {
    /// Read of a name.
    ///
    /// A local name that is not a variable here reads as a method call
    /// (`VCall`). Pseudo-variables produce their value.
    pub fn gettable(&mut self, id: Id) -> NodeId {
        if let Some(pseudo) = self.known.pseudo(id) {
            let kind = match pseudo {
                Pseudo::SelfRef => NodeKind::SelfRef,
                Pseudo::Nil => NodeKind::Nil,
                Pseudo::True => NodeKind::True,
                Pseudo::False => NodeKind::False,
                Pseudo::File => NodeKind::Str(self.arena.alloc_str(self.file.as_bytes())),
                Pseudo::Line => NodeKind::Int(i64::from(self.line)),
                Pseudo::Encoding => NodeKind::EncodingLit(self.encoding),
            };
            return self.node(kind);
        }

        let kind = match id.kind() {
            IdKind::Local => match self.scopes.resolve(id) {
                Resolution::Dynamic => NodeKind::DVar(id),
                Resolution::Local => NodeKind::LVar(id),
                Resolution::Unknown => NodeKind::VCall(id),
            },
            IdKind::Instance => NodeKind::IVar(id),
            IdKind::Global => NodeKind::GVar(id),
            IdKind::Const => NodeKind::Const(id),
            IdKind::Class => NodeKind::CVar(id),
            _ => {
                let message = format!("identifier {} is not valid to get", self.name(id));
                return self.error_node(ErrorCode::E9001, message);
            }
        };
        self.node(kind)
    }

    /// Assignment target for a name, declaring new locals.
    pub fn assignable(&mut self, id: Id, value: Option<NodeId>) -> NodeId {
        if let Some(pseudo) = self.known.pseudo(id) {
            return self.error_node(ErrorCode::E2004, pseudo.assign_error());
        }

        let kind = match id.kind() {
            IdKind::Local => {
                let resolution = match self.scopes.resolve(id) {
                    Resolution::Unknown => {
                        self.scopes.declare_local(id);
                        self.scopes.resolve(id)
                    }
                    known => known,
                };
                match resolution {
                    Resolution::Dynamic => NodeKind::DAsgn { id, value },
                    _ => NodeKind::LAsgn { id, value },
                }
            }
            IdKind::Global => NodeKind::GAsgn { id, value },
            IdKind::Instance => NodeKind::IAsgn { id, value },
            IdKind::Const => {
                if self.in_def() {
                    return self.error_node(ErrorCode::E2003, "dynamic constant assignment");
                }
                NodeKind::CDecl {
                    id,
                    path: None,
                    value,
                }
            }
            IdKind::Class => NodeKind::CvAsgn { id, value },
            _ => {
                let message = format!("identifier {} is not valid to set", self.name(id));
                return self.error_node(ErrorCode::E9001, message);
            }
        };
        self.node(kind)
    }

    /// `$1 = v`, `$& = v`
    pub fn backref_assign(&mut self, node: NodeId) -> NodeId {
        let name = match self.kind(node) {
            NodeKind::NthRef(n) => format!("${n}"),
            NodeKind::BackRef(c) => format!("${}", char::from(c)),
            _ => return node,
        };
        self.error_node(ErrorCode::E2004, format!("Can't set variable {name}"))
    }

    /// Attach the value to an assignment target.
    pub fn node_assign(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.value_expr(rhs);
        let assigned = match self.kind(lhs) {
            NodeKind::AttrAsgn { recv, mid, args } => {
                let args = match args {
                    Some(args) => self.arg_append(args, rhs),
                    None => self.new_array(rhs),
                };
                NodeKind::AttrAsgn {
                    recv,
                    mid,
                    args: Some(args),
                }
            }
            kind => match with_value(kind, rhs) {
                Some(kind) => kind,
                None => return lhs,
            },
        };
        self.arena.set_kind(lhs, assigned);
        lhs
    }

    /// `var op= value`, including `||=` and `&&=`.
    pub fn new_op_assign(&mut self, lhs: NodeId, op_id: Id, rhs: NodeId) -> NodeId {
        self.value_expr(rhs);
        let Some(vid) = assigned_id(self.kind(lhs)) else {
            return lhs;
        };
        if op_id == op::OROP || op_id == op::ANDOP {
            self.node_assign(lhs, rhs);
            let head = self.gettable(vid);
            let kind = if op_id == op::OROP {
                NodeKind::OpAsgnOr { head, value: lhs }
            } else {
                NodeKind::OpAsgnAnd { head, value: lhs }
            };
            let node = self.node(kind);
            self.fixpos(node, Some(lhs));
            return node;
        }
        let current = self.gettable(vid);
        let value = self.call_bin_op(current, op_id, rhs);
        if let Some(kind) = with_value(self.kind(lhs), value) {
            self.arena.set_kind(lhs, kind);
        }
        lhs
    }

    /// `recv.attr op= value`
    pub fn new_attr_op_assign(&mut self, recv: NodeId, attr: Id, op_id: Id, rhs: NodeId) -> NodeId {
        self.value_expr(rhs);
        let node = self.node(NodeKind::OpAsgn2 {
            recv,
            attr,
            op: op_id,
            value: rhs,
        });
        self.fixpos(node, Some(recv));
        node
    }

    /// `recv[args] op= value`
    pub fn new_index_op_assign(
        &mut self,
        recv: NodeId,
        args: Option<NodeId>,
        op_id: Id,
        rhs: NodeId,
    ) -> NodeId {
        self.value_expr(rhs);
        let node = self.node(NodeKind::OpAsgn1 {
            recv,
            op: op_id,
            args,
            value: rhs,
        });
        self.fixpos(node, Some(recv));
        node
    }

    /// `a, b, *c = ...` target; the value comes from `node_assign`.
    pub fn new_masgn(&mut self, lhs: Option<NodeId>, splat: Option<NodeId>) -> NodeId {
        let node = self.node(NodeKind::MAsgn {
            lhs,
            splat,
            value: None,
        });
        self.fixpos(node, lhs);
        node
    }

    /// Bare `*` target.
    pub fn new_anon_rest(&mut self) -> NodeId {
        self.node(NodeKind::AnonRest)
    }

    /// `recv.attr = ...` target. An explicit `self` receiver is dropped so
    /// private setters stay callable.
    pub fn new_attr_assign(&mut self, recv: NodeId, attr: Id) -> NodeId {
        let mid = self.symbols.attrset(attr);
        let recv_kind = self.kind(recv);
        let node = self.node(NodeKind::AttrAsgn {
            recv: (recv_kind != NodeKind::SelfRef).then_some(recv),
            mid,
            args: None,
        });
        self.fixpos(node, Some(recv));
        node
    }

    /// `recv[args] = ...` target.
    pub fn new_index_assign(&mut self, recv: NodeId, args: Option<NodeId>) -> NodeId {
        let node = self.node(NodeKind::AttrAsgn {
            recv: Some(recv),
            mid: op::ASET,
            args,
        });
        self.fixpos(node, Some(recv));
        node
    }

    /// `Scope::NAME = ...` / `::NAME = ...` target.
    pub fn new_const_decl(&mut self, path: NodeId) -> NodeId {
        if self.in_def() {
            return self.error_node(ErrorCode::E2003, "dynamic constant assignment");
        }
        let id = match self.kind(path) {
            NodeKind::Colon2 { name, .. } | NodeKind::Colon3(name) => name,
            _ => return path,
        };
        let node = self.node(NodeKind::CDecl {
            id,
            path: Some(path),
            value: None,
        });
        self.fixpos(node, Some(path));
        node
    }

    pub fn new_colon2(&mut self, scope: NodeId, name: Id) -> NodeId {
        let node = self.node(NodeKind::Colon2 { scope, name });
        self.fixpos(node, Some(scope));
        node
    }

    pub fn new_colon3(&mut self, name: Id) -> NodeId {
        self.node(NodeKind::Colon3(name))
    }

    /// `$1`
    pub fn new_nth_ref(&mut self, n: u32) -> NodeId {
        self.node(NodeKind::NthRef(n))
    }

    /// `` $& $` $' $+ ``
    pub fn new_back_ref(&mut self, c: u8) -> NodeId {
        self.node(NodeKind::BackRef(c))
    }
}

/// Name assigned by a variable assignment node.
fn assigned_id(kind: NodeKind) -> Option<Id> {
    match kind {
        NodeKind::LAsgn { id, .. }
        | NodeKind::DAsgn { id, .. }
        | NodeKind::IAsgn { id, .. }
        | NodeKind::GAsgn { id, .. }
        | NodeKind::CvAsgn { id, .. }
        | NodeKind::CDecl { id, .. } => Some(id),
        _ => None,
    }
}

/// The same assignment with its value slot filled.
fn with_value(kind: NodeKind, value: NodeId) -> Option<NodeKind> {
    let value = Some(value);
    Some(match kind {
        NodeKind::LAsgn { id, .. } => NodeKind::LAsgn { id, value },
        NodeKind::DAsgn { id, .. } => NodeKind::DAsgn { id, value },
        NodeKind::IAsgn { id, .. } => NodeKind::IAsgn { id, value },
        NodeKind::GAsgn { id, .. } => NodeKind::GAsgn { id, value },
        NodeKind::CvAsgn { id, .. } => NodeKind::CvAsgn { id, value },
        NodeKind::CDecl { id, path, .. } => NodeKind::CDecl { id, path, value },
        NodeKind::MAsgn { lhs, splat, .. } => NodeKind::MAsgn { lhs, splat, value },
        _ => return None,
    })
}
