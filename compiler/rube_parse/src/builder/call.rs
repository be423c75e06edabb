//! Message sends, blocks, `super` and `yield`.

use rube_diagnostic::ErrorCode;
use rube_ir::{op, Id, NodeId, NodeKind, ParamsId};

use super::Builder;

impl Builder<'_> {
    /// `recv.mid(args)`
    pub fn new_call(&mut self, recv: NodeId, mid: Id, args: Option<NodeId>) -> NodeId {
        let call = self.node(NodeKind::Call { recv, mid, args });
        self.fixpos(call, Some(recv));
        call
    }

    /// `mid(args)`
    pub fn new_fcall(&mut self, mid: Id, args: Option<NodeId>) -> NodeId {
        let call = self.node(NodeKind::FCall { mid, args });
        self.fixpos(call, args);
        call
    }

    /// Bare `mid` known to be a call, e.g. `foo` followed by a block.
    pub fn new_vcall(&mut self, mid: Id) -> NodeId {
        self.node(NodeKind::VCall(mid))
    }

    /// `recv op arg`
    pub fn call_bin_op(&mut self, recv: NodeId, mid: Id, arg: NodeId) -> NodeId {
        self.value_expr(recv);
        self.value_expr(arg);
        let args = self.new_array(arg);
        self.new_call(recv, mid, Some(args))
    }

    /// `op recv`, with `mid` one of the unary operator ids.
    pub fn call_uni_op(&mut self, recv: NodeId, mid: Id) -> NodeId {
        self.value_expr(recv);
        self.new_call(recv, mid, None)
    }

    /// `left =~ right`; a regexp literal on either side matches directly.
    pub fn match_op(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.value_expr(left);
        self.value_expr(right);
        let regexp = |kind: NodeKind| matches!(kind, NodeKind::Regex { .. } | NodeKind::DRegex { .. });
        let kind = if regexp(self.kind(left)) {
            NodeKind::Match2 {
                regexp: left,
                value: right,
            }
        } else if regexp(self.kind(right)) {
            NodeKind::Match3 {
                regexp: right,
                value: left,
            }
        } else {
            return self.call_bin_op(left, op::MATCH, right);
        };
        let node = self.node(kind);
        self.fixpos(node, Some(left));
        node
    }

    /// `super(args)`; `super` with no parentheses is [`Builder::new_zsuper`].
    pub fn new_super(&mut self, args: Option<NodeId>) -> NodeId {
        let sup = self.node(NodeKind::Super(args));
        self.method_with_block_pass(sup)
    }

    pub fn new_zsuper(&mut self) -> NodeId {
        self.node(NodeKind::ZSuper)
    }

    /// `yield args`
    pub fn new_yield(&mut self, args: Option<NodeId>) -> NodeId {
        if let Some(args) = args {
            self.no_block_pass(args);
        }
        self.node(NodeKind::Yield(args))
    }

    /// `&blk` argument. The `BlockPass` wraps the argument list; the call is
    /// hung into it by [`Builder::method_with_block_pass`].
    pub fn block_pass(&mut self, args: Option<NodeId>, body: NodeId) -> NodeId {
        self.value_expr(body);
        let pass = self.node(NodeKind::BlockPass { args, body });
        self.fixpos(pass, Some(body));
        pass
    }

    /// Finish a call whose argument list may carry a `&blk`.
    ///
    /// `recv.m(a, &b)` is built as `BlockPass { args: Call(recv.m(a)), body: b }`.
    pub fn method_with_block_pass(&mut self, call: NodeId) -> NodeId {
        let args = match self.kind(call) {
            NodeKind::Call { args, .. } | NodeKind::FCall { args, .. } | NodeKind::Super(args) => {
                args
            }
            _ => None,
        };
        let Some(pass) = args else {
            return call;
        };
        let NodeKind::BlockPass { args: inner, body } = self.kind(pass) else {
            return call;
        };
        let rebuilt = match self.kind(call) {
            NodeKind::Call { recv, mid, .. } => NodeKind::Call {
                recv,
                mid,
                args: inner,
            },
            NodeKind::FCall { mid, .. } => NodeKind::FCall { mid, args: inner },
            _ => NodeKind::Super(inner),
        };
        self.arena.set_kind(call, rebuilt);
        self.arena.set_kind(pass, NodeKind::BlockPass { args: Some(call), body });
        pass
    }

    /// Open the scope of a `{ |params| ... }` / `do ... end` block.
    pub fn open_block(&mut self) {
        self.scopes.open_block_scope(true);
    }

    /// Close the current block scope into an `Iter` with no call yet.
    pub fn new_iter(&mut self, params: Option<ParamsId>, body: Option<NodeId>) -> NodeId {
        let scope = self.close_block_scope_node(params, body);
        let iter = self.node(NodeKind::Iter { call: scope, scope });
        self.fixpos(iter, body);
        iter
    }

    /// Attach a literal block to a call.
    ///
    /// A call that already passes `&blk` cannot also take a literal block.
    pub fn method_add_block(&mut self, call: NodeId, iter: NodeId) -> NodeId {
        if let NodeKind::BlockPass { .. } = self.kind(call) {
            return self.error_node(ErrorCode::E2006, "both block arg and actual block given");
        }
        let NodeKind::Iter { scope, .. } = self.kind(iter) else {
            return call;
        };
        self.arena.set_kind(iter, NodeKind::Iter { call, scope });
        self.fixpos(iter, Some(call));
        iter
    }

    /// `-> (params) { body }`
    pub fn new_lambda(&mut self, params: Option<ParamsId>, body: Option<NodeId>) -> NodeId {
        let scope = self.close_block_scope_node(params, body);
        let lambda = self.node(NodeKind::Lambda(scope));
        self.fixpos(lambda, body);
        lambda
    }

    /// `defined?(expr)`
    pub fn new_defined(&mut self, expr: NodeId) -> NodeId {
        let expr = self.remove_begin(Some(expr)).unwrap_or(expr);
        let node = self.node(NodeKind::Defined(expr));
        self.fixpos(node, Some(expr));
        node
    }

    /// Report a `&blk` where no block can be passed.
    fn no_block_pass(&mut self, args: NodeId) -> bool {
        if let NodeKind::BlockPass { .. } = self.kind(args) {
            let line = self.arena.line(args);
            self.error_at(ErrorCode::E2011, "block argument should not be given", line);
            return false;
        }
        true
    }

    /// Arguments of `return`, `break` and `next`.
    ///
    /// A single argument is unwrapped; `&blk` is rejected.
    pub fn ret_args(&mut self, args: Option<NodeId>) -> Option<NodeId> {
        let args = args?;
        if !self.no_block_pass(args) {
            return Some(args);
        }
        match self.kind(args) {
            NodeKind::Array(list) if self.arena.list(list).len() == 1 => {
                self.arena.list_last(list)
            }
            _ => Some(args),
        }
    }
}
