//! Method, class and module definitions, parameter lists and aliases.
//!
//! Every definition is bracketed by an `open_*` call when the automaton
//! shifts its keyword and the matching `new_*` call when it reduces the
//! `end`. The `new_*` call closes the scope and wraps the body in a
//! `Scope` node holding the local table.

use rube_diagnostic::ErrorCode;
use rube_ir::{Id, IdKind, NodeId, NodeKind, Params, ParamsId};

use super::Builder;

impl Builder<'_> {
    // ===== Scopes =====

    /// `def name`
    pub fn open_def(&mut self) {
        self.in_def += 1;
        self.scopes.open_method_scope();
    }

    /// `def recv.name`
    pub fn open_defs(&mut self) {
        self.in_single += 1;
        self.scopes.open_method_scope();
    }

    /// `class Name`
    pub fn open_class(&mut self) {
        if self.in_def() {
            self.error(ErrorCode::E2012, "class definition in method body");
        }
        self.scopes.open_class_scope();
    }

    /// `module Name`
    pub fn open_module(&mut self) {
        if self.in_def() {
            self.error(ErrorCode::E2012, "module definition in method body");
        }
        self.scopes.open_class_scope();
    }

    /// `class << recv`; its body is not inside any method.
    pub fn open_sclass(&mut self) {
        self.saved_defs.push((self.in_def, self.in_single));
        self.in_def = 0;
        self.in_single = 0;
        self.scopes.open_class_scope();
    }

    pub(crate) fn close_block_scope_node(
        &mut self,
        params: Option<ParamsId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let locals = self.scopes.close_block_scope();
        self.scope_node(locals, params, body)
    }

    pub(crate) fn close_method_scope_node(
        &mut self,
        params: Option<ParamsId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let locals = self.scopes.close_method_scope();
        self.scope_node(locals, params, body)
    }

    pub(crate) fn scope_node(
        &mut self,
        locals: Vec<Id>,
        params: Option<ParamsId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let locals = self.arena.alloc_table(locals);
        let scope = self.node(NodeKind::Scope {
            locals,
            params,
            body,
        });
        self.fixpos(scope, body);
        scope
    }

    // ===== Parameters =====

    /// `name = default` parameter; declares `name` first.
    pub fn new_opt_arg(&mut self, id: Id, value: NodeId) -> NodeId {
        self.declare_arg(id);
        self.value_expr(value);
        self.assignable(id, Some(value))
    }

    /// `*name`, or a bare `*` when `id` is `None`.
    pub fn new_rest_arg(&mut self, id: Option<Id>) -> Id {
        match id {
            Some(id) => {
                self.declare_arg(id);
                id
            }
            None => Id::NONE,
        }
    }

    /// `&name`
    pub fn new_block_arg(&mut self, id: Id) -> Id {
        self.declare_arg(id);
        id
    }

    /// Store a finished parameter list.
    pub fn new_args(&mut self, params: Params) -> ParamsId {
        self.arena.alloc_params(params)
    }

    // ===== Definitions =====

    /// `def mid(params) body end`
    pub fn new_defn(&mut self, mid: Id, params: Option<ParamsId>, body: Option<NodeId>) -> NodeId {
        let scope = self.close_method_scope_node(params, body);
        self.in_def = self.in_def.saturating_sub(1);
        self.node(NodeKind::Defn { mid, scope })
    }

    /// `def recv.mid(params) body end`
    pub fn new_defs(
        &mut self,
        recv: NodeId,
        mid: Id,
        params: Option<ParamsId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let scope = self.close_method_scope_node(params, body);
        self.in_single = self.in_single.saturating_sub(1);

        let recv = self.remove_begin(Some(recv)).unwrap_or(recv);
        self.value_expr(recv);
        if is_literal_receiver(self.kind(recv)) {
            let line = self.arena.line(recv);
            self.error_at(
                ErrorCode::E2007,
                "can't define singleton method for literals",
                line,
            );
        }
        let node = self.node(NodeKind::Defs { recv, mid, scope });
        self.fixpos(node, Some(recv));
        node
    }

    /// `class cpath < superclass; body; end`
    pub fn new_class(
        &mut self,
        cpath: NodeId,
        superclass: Option<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        if let Some(superclass) = superclass {
            self.value_expr(superclass);
        }
        let scope = self.close_method_scope_node(None, body);
        let node = self.node(NodeKind::Class {
            cpath,
            superclass,
            scope,
        });
        self.fixpos(node, Some(cpath));
        node
    }

    /// `class << recv; body; end`
    pub fn new_sclass(&mut self, recv: NodeId, body: Option<NodeId>) -> NodeId {
        self.value_expr(recv);
        let scope = self.close_method_scope_node(None, body);
        if let Some((in_def, in_single)) = self.saved_defs.pop() {
            self.in_def = in_def;
            self.in_single = in_single;
        }
        let node = self.node(NodeKind::SClass { recv, scope });
        self.fixpos(node, Some(recv));
        node
    }

    /// `module cpath; body; end`
    pub fn new_module(&mut self, cpath: NodeId, body: Option<NodeId>) -> NodeId {
        let scope = self.close_method_scope_node(None, body);
        let node = self.node(NodeKind::Module { cpath, scope });
        self.fixpos(node, Some(cpath));
        node
    }

    /// Name of a class or module: `Name`, `Outer::Name` or `::Name`.
    pub fn new_cpath(&mut self, scope: Option<NodeId>, name: Id, top: bool) -> NodeId {
        if name.kind() != IdKind::Const {
            return self.error_node(ErrorCode::E2008, "class/module name must be CONSTANT");
        }
        match scope {
            _ if top => self.new_colon3(name),
            Some(scope) => self.new_colon2(scope, name),
            None => self.node(NodeKind::Const(name)),
        }
    }

    // ===== Aliases =====

    /// `alias new old`
    pub fn new_alias(&mut self, new_name: Id, old_name: Id) -> NodeId {
        self.node(NodeKind::Alias { new_name, old_name })
    }

    /// `alias $new $old`; `$old` may also be `` $& $` $' $+ ``.
    pub fn new_valias(&mut self, new_name: NodeId, old_name: NodeId) -> NodeId {
        let NodeKind::GVar(new_id) = self.kind(new_name) else {
            return self.error_node(ErrorCode::E9001, "alias target is not a global variable");
        };
        let old_id = match self.kind(old_name) {
            NodeKind::GVar(id) => id,
            NodeKind::BackRef(c) => self.symbols.intern_str(&format!("${}", char::from(c))),
            NodeKind::NthRef(_) => {
                return self.error_node(ErrorCode::E2009, "can't make alias for the number variables");
            }
            _ => return self.error_node(ErrorCode::E9001, "alias source is not a global variable"),
        };
        self.node(NodeKind::VAlias {
            new_name: new_id,
            old_name: old_id,
        })
    }

    /// `undef name`
    pub fn new_undef(&mut self, name: Id) -> NodeId {
        self.node(NodeKind::Undef(name))
    }
}

/// Receivers that cannot carry singleton methods.
fn is_literal_receiver(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Str(_)
            | NodeKind::DStr { .. }
            | NodeKind::XStr(_)
            | NodeKind::DXStr { .. }
            | NodeKind::Regex { .. }
            | NodeKind::DRegex { .. }
            | NodeKind::Int(_)
            | NodeKind::BigInt { .. }
            | NodeKind::Float(_)
            | NodeKind::Sym(_)
            | NodeKind::DSym { .. }
            | NodeKind::Array(_)
            | NodeKind::ZArray
            | NodeKind::Hash(_)
    )
}
