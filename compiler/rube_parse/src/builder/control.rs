//! Conditionals, loops, jumps and exception handling.

use rube_diagnostic::ErrorCode;
use rube_ir::{NodeId, NodeKind};

use super::Builder;

impl Builder<'_> {
    /// `if cond then a else b end`, `a if cond`
    pub fn new_if(
        &mut self,
        cond: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
    ) -> NodeId {
        let cond = self.cond(cond);
        let node = self.node(NodeKind::If {
            cond,
            then_branch,
            else_branch,
        });
        self.fixpos(node, Some(cond));
        node
    }

    /// `cond ? a : b`
    pub fn new_ternary(&mut self, cond: NodeId, then_branch: NodeId, else_branch: NodeId) -> NodeId {
        self.new_if(cond, Some(then_branch), Some(else_branch))
    }

    /// `unless`: an `if` with the branches swapped.
    pub fn new_unless(
        &mut self,
        cond: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
    ) -> NodeId {
        self.new_if(cond, else_branch, then_branch)
    }

    /// `while cond; body; end` or `body while cond`.
    ///
    /// With `modifier` set and a `begin ... end` body, the body runs once
    /// before the first test.
    pub fn new_while(&mut self, cond: NodeId, body: Option<NodeId>, modifier: bool) -> NodeId {
        let (cond, body, do_while) = self.loop_parts(cond, body, modifier);
        let node = self.node(NodeKind::While {
            cond,
            body,
            do_while,
        });
        self.fixpos(node, Some(cond));
        node
    }

    pub fn new_until(&mut self, cond: NodeId, body: Option<NodeId>, modifier: bool) -> NodeId {
        let (cond, body, do_while) = self.loop_parts(cond, body, modifier);
        let node = self.node(NodeKind::Until {
            cond,
            body,
            do_while,
        });
        self.fixpos(node, Some(cond));
        node
    }

    fn loop_parts(
        &mut self,
        cond: NodeId,
        body: Option<NodeId>,
        modifier: bool,
    ) -> (NodeId, Option<NodeId>, bool) {
        let cond = self.cond(cond);
        let do_while = modifier && matches!(body.map(|b| self.kind(b)), Some(NodeKind::Begin(_)));
        let body = if do_while {
            body.and_then(|b| match self.kind(b) {
                NodeKind::Begin(inner) => inner,
                _ => Some(b),
            })
        } else {
            body
        };
        (cond, body, do_while)
    }

    /// `for var in iter; body; end`
    pub fn new_for(&mut self, var: NodeId, iter: NodeId, body: Option<NodeId>) -> NodeId {
        self.value_expr(iter);
        let node = self.node(NodeKind::For { var, iter, body });
        self.fixpos(node, Some(var));
        node
    }

    /// `case subject; whens; end`
    pub fn new_case(&mut self, subject: Option<NodeId>, whens: Option<NodeId>) -> NodeId {
        if let Some(subject) = subject {
            self.value_expr(subject);
        }
        let node = self.node(NodeKind::Case { subject, whens });
        self.fixpos(node, subject);
        node
    }

    /// `when conds then body`, chained to the next clause or `else` body.
    pub fn new_when(&mut self, conds: NodeId, body: Option<NodeId>, next: Option<NodeId>) -> NodeId {
        let node = self.node(NodeKind::When { conds, body, next });
        self.fixpos(node, Some(conds));
        node
    }

    /// `left and right`; a chain nests to the right.
    pub fn new_and(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.logop(true, left, right)
    }

    pub fn new_or(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.logop(false, left, right)
    }

    fn logop(&mut self, and: bool, left: NodeId, right: NodeId) -> NodeId {
        self.value_expr(left);
        let same = |kind: NodeKind| match kind {
            NodeKind::And { right, .. } if and => Some(right),
            NodeKind::Or { right, .. } if !and => Some(right),
            _ => None,
        };

        // `(a and b) and c` becomes `a and (b and c)`.
        if let Some(mut tail) = same(self.kind(left)) {
            let mut parent = left;
            while let Some(next) = same(self.kind(tail)) {
                parent = tail;
                tail = next;
            }
            let joined = self.make_logop(and, tail, right);
            let rebuilt = match self.kind(parent) {
                NodeKind::And { left, .. } => NodeKind::And {
                    left,
                    right: joined,
                },
                NodeKind::Or { left, .. } => NodeKind::Or {
                    left,
                    right: joined,
                },
                other => other,
            };
            self.arena.set_kind(parent, rebuilt);
            return left;
        }
        self.make_logop(and, left, right)
    }

    fn make_logop(&mut self, and: bool, left: NodeId, right: NodeId) -> NodeId {
        let kind = if and {
            NodeKind::And { left, right }
        } else {
            NodeKind::Or { left, right }
        };
        let node = self.node(kind);
        self.fixpos(node, Some(left));
        node
    }

    /// `not expr` / `!expr`
    pub fn new_not(&mut self, expr: NodeId) -> NodeId {
        self.value_expr(expr);
        let expr = self.cond(expr);
        let node = self.node(NodeKind::Not(expr));
        self.fixpos(node, Some(expr));
        node
    }

    // ===== Ranges =====

    /// `beg..end` / `beg...end`
    pub fn range(&mut self, beg: Option<NodeId>, end: Option<NodeId>, exclusive: bool) -> NodeId {
        if exclusive {
            self.new_dot3(beg, end)
        } else {
            self.new_dot2(beg, end)
        }
    }

    pub fn new_dot2(&mut self, beg: Option<NodeId>, end: Option<NodeId>) -> NodeId {
        self.range_ends(beg, end);
        let node = self.node(NodeKind::Dot2 { beg, end });
        self.fixpos(node, beg.or(end));
        node
    }

    pub fn new_dot3(&mut self, beg: Option<NodeId>, end: Option<NodeId>) -> NodeId {
        self.range_ends(beg, end);
        let node = self.node(NodeKind::Dot3 { beg, end });
        self.fixpos(node, beg.or(end));
        node
    }

    fn range_ends(&mut self, beg: Option<NodeId>, end: Option<NodeId>) {
        for node in [beg, end].into_iter().flatten() {
            self.value_expr(node);
        }
    }

    // ===== Jumps =====

    pub fn new_break(&mut self, args: Option<NodeId>) -> NodeId {
        let args = self.ret_args(args);
        self.node(NodeKind::Break(args))
    }

    pub fn new_next(&mut self, args: Option<NodeId>) -> NodeId {
        let args = self.ret_args(args);
        self.node(NodeKind::Next(args))
    }

    pub fn new_return(&mut self, args: Option<NodeId>) -> NodeId {
        let args = self.ret_args(args);
        self.node(NodeKind::Return(args))
    }

    pub fn new_redo(&mut self) -> NodeId {
        self.node(NodeKind::Redo)
    }

    pub fn new_retry(&mut self) -> NodeId {
        self.node(NodeKind::Retry)
    }

    // ===== begin / rescue / ensure =====

    /// `begin body end`; an empty body still yields a node.
    pub fn new_begin(&mut self, body: Option<NodeId>) -> NodeId {
        let node = self.node(NodeKind::Begin(body));
        self.fixpos(node, body);
        node
    }

    /// `rescue exceptions => var then body`, chained to the next clause.
    pub fn new_resbody(
        &mut self,
        exceptions: Option<NodeId>,
        body: Option<NodeId>,
        next: Option<NodeId>,
    ) -> NodeId {
        let node = self.node(NodeKind::ResBody {
            exceptions,
            body,
            next,
        });
        self.fixpos(node, exceptions.or(body));
        node
    }

    /// Body with its `rescue` clauses and `else` branch.
    ///
    /// Without any `rescue` clause the `else` branch simply runs after the
    /// body.
    pub fn new_rescue(
        &mut self,
        body: Option<NodeId>,
        handlers: Option<NodeId>,
        else_branch: Option<NodeId>,
    ) -> Option<NodeId> {
        if handlers.is_none() {
            if let Some(else_branch) = else_branch {
                let line = self.arena.line(else_branch);
                self.warning_at(ErrorCode::W1005, "else without rescue is useless", line);
                return self.block_append(body, Some(else_branch));
            }
            return body;
        }
        let node = self.node(NodeKind::Rescue {
            body,
            handlers,
            else_branch,
        });
        self.fixpos(node, body.or(handlers));
        Some(node)
    }

    /// `body ensure ensure_body`
    pub fn new_ensure(&mut self, body: Option<NodeId>, ensure: Option<NodeId>) -> Option<NodeId> {
        let Some(ensure) = ensure else {
            return body;
        };
        if body.is_none() {
            let nil = self.node(NodeKind::Nil);
            return self.block_append(Some(ensure), Some(nil));
        }
        let node = self.node(NodeKind::Ensure {
            body,
            ensure: Some(ensure),
        });
        self.fixpos(node, body);
        Some(node)
    }

    /// `BEGIN { body }`: hoisted to the start of the program.
    pub fn new_preexe(&mut self, body: Option<NodeId>) -> NodeId {
        if self.in_def() {
            return self.error_node(ErrorCode::E2010, "BEGIN in method");
        }
        if let Some(body) = body {
            self.preexe.push(body);
        }
        self.node(NodeKind::Begin(None))
    }

    /// `END { body }`
    pub fn new_postexe(&mut self, body: Option<NodeId>) -> NodeId {
        if self.in_def() {
            self.warning(ErrorCode::W1004, "END in method; use at_exit");
        }
        let body = match body {
            Some(body) => body,
            None => self.node(NodeKind::Nil),
        };
        let node = self.node(NodeKind::PostExe(body));
        self.fixpos(node, Some(body));
        node
    }
}
