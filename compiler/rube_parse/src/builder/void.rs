//! Value checks, void-context lint and conditions.

use rube_diagnostic::ErrorCode;
use rube_ir::{op, Id, NodeId, NodeKind};

use super::Builder;

impl Builder<'_> {
    /// Check that `node` produces a value.
    ///
    /// A `return`, `break`, `next`, `redo` or `retry` in value position is a
    /// "void value expression" error. Follows the value through sequences,
    /// wrappers, both `if` branches and the left side of `and`/`or`.
    pub fn value_expr(&mut self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            match self.kind(n) {
                kind if kind.is_void_value() => {
                    let line = self.arena.line(n);
                    self.error_at(ErrorCode::E2005, "void value expression", line);
                    return false;
                }
                NodeKind::Block(list) => current = self.arena.list_last(list),
                NodeKind::Begin(body) => current = body,
                NodeKind::If {
                    then_branch,
                    else_branch,
                    ..
                } => match (then_branch, else_branch) {
                    (Some(then_branch), Some(else_branch)) => {
                        if !self.value_expr(then_branch) {
                            return false;
                        }
                        current = Some(else_branch);
                    }
                    (branch, None) | (None, branch) => current = branch,
                },
                NodeKind::And { left, .. } | NodeKind::Or { left, .. } => current = Some(left),
                _ => return true,
            }
        }
        true
    }

    /// Warn about statements whose value is thrown away.
    ///
    /// Every statement of a sequence except the last is checked.
    pub fn void_stmts(&mut self, node: Option<NodeId>) {
        if !self.verbose {
            return;
        }
        let Some(NodeKind::Block(list)) = node.map(|n| self.kind(n)) else {
            return;
        };
        let stmts = self.arena.list(list).to_vec();
        if let Some((_, init)) = stmts.split_last() {
            for &stmt in init {
                let stmt = self.remove_begin(Some(stmt)).unwrap_or(stmt);
                self.void_expr(stmt);
            }
        }
    }

    fn void_expr(&mut self, node: NodeId) {
        let kind = self.kind(node);
        let useless = match kind {
            NodeKind::Call { mid, .. } if is_pure_operator(mid) => Some(self.name(mid)),
            _ if kind.is_variable() => Some("a variable".to_owned()),
            NodeKind::Const(_) => Some("a constant".to_owned()),
            _ if kind.is_literal() => Some("a literal".to_owned()),
            NodeKind::Colon2 { .. } | NodeKind::Colon3(_) => Some("::".to_owned()),
            NodeKind::Dot2 { .. } => Some("..".to_owned()),
            NodeKind::Dot3 { .. } => Some("...".to_owned()),
            NodeKind::SelfRef => Some("self".to_owned()),
            NodeKind::Nil => Some("nil".to_owned()),
            NodeKind::True => Some("true".to_owned()),
            NodeKind::False => Some("false".to_owned()),
            NodeKind::Defined(_) => Some("defined?".to_owned()),
            _ => None,
        };
        if let Some(what) = useless {
            let line = self.arena.line(node);
            self.warning_at(
                ErrorCode::W1002,
                format!("possibly useless use of {what} in void context"),
                line,
            );
        }
    }

    /// Rewrite an expression used as a condition.
    ///
    /// A regexp literal matches against `$_`, a range becomes a flip-flop
    /// and literals draw warnings.
    pub fn cond(&mut self, node: NodeId) -> NodeId {
        self.assign_in_cond(node);
        let line = self.arena.line(node);
        match self.kind(node) {
            NodeKind::Str(_) | NodeKind::DStr { .. } | NodeKind::EvStr(_) => {
                self.warning_at(ErrorCode::W1003, "string literal in condition", line);
                node
            }
            NodeKind::DRegex { .. } => {
                if self.verbose {
                    self.warning_at(ErrorCode::W1003, "regex literal in condition", line);
                }
                self.match_last_line(node, true)
            }
            NodeKind::Regex { .. } => {
                self.warning_at(ErrorCode::W1003, "regex literal in condition", line);
                self.match_last_line(node, false)
            }
            NodeKind::And { left, right } => {
                let left = self.cond(left);
                let right = self.cond(right);
                self.arena.set_kind(node, NodeKind::And { left, right });
                node
            }
            NodeKind::Or { left, right } => {
                let left = self.cond(left);
                let right = self.cond(right);
                self.arena.set_kind(node, NodeKind::Or { left, right });
                node
            }
            NodeKind::Dot2 {
                beg: Some(beg),
                end: Some(end),
            } => self.flip_flop(node, beg, end, false),
            NodeKind::Dot3 {
                beg: Some(beg),
                end: Some(end),
            } => self.flip_flop(node, beg, end, true),
            NodeKind::DSym { .. }
            | NodeKind::Int(_)
            | NodeKind::BigInt { .. }
            | NodeKind::Float(_)
            | NodeKind::Sym(_) => {
                if self.verbose {
                    self.warning_at(ErrorCode::W1003, "literal in condition", line);
                }
                node
            }
            _ => node,
        }
    }

    /// Regexp literal tested against the last line read.
    fn match_last_line(&mut self, regexp: NodeId, dynamic: bool) -> NodeId {
        let matched = if dynamic {
            let last_line = self.node(NodeKind::GVar(self.known.last_line));
            self.node(NodeKind::Match2 {
                regexp,
                value: last_line,
            })
        } else {
            self.node(NodeKind::Match(regexp))
        };
        self.fixpos(matched, Some(regexp));
        matched
    }

    fn flip_flop(&mut self, node: NodeId, beg: NodeId, end: NodeId, exclusive: bool) -> NodeId {
        let beg = self.range_op(beg);
        let end = self.range_op(end);
        let kind = if exclusive {
            NodeKind::Flip3 { beg, end }
        } else {
            NodeKind::Flip2 { beg, end }
        };
        self.arena.set_kind(node, kind);

        let (b, e) = (self.literal_rank(beg), self.literal_rank(end));
        if (b == 1 && e == 1) || (b + e >= 2 && self.verbose) {
            let line = self.arena.line(node);
            self.warning_at(ErrorCode::W1003, "range literal in condition", line);
        }
        node
    }

    /// End of a flip-flop; an integer compares against `$.`.
    fn range_op(&mut self, node: NodeId) -> NodeId {
        self.value_expr(node);
        if let NodeKind::Int(_) = self.kind(node) {
            let line = self.arena.line(node);
            self.warning_at(
                ErrorCode::W1003,
                "integer literal in conditional range",
                line,
            );
            let input_line = self.node(NodeKind::GVar(self.known.last_input_line));
            let args = self.new_array(input_line);
            let call = self.node(NodeKind::Call {
                recv: node,
                mid: op::EQ,
                args: Some(args),
            });
            self.fixpos(call, Some(node));
            return call;
        }
        self.cond(node)
    }

    /// 2 for value literals, 1 for `true`/`false`/`nil`, 0 otherwise.
    fn literal_rank(&self, node: NodeId) -> u8 {
        match self.kind(node) {
            NodeKind::Nil | NodeKind::True | NodeKind::False => 1,
            kind if kind.is_literal() || matches!(kind, NodeKind::EvStr(_)) => 2,
            _ => 0,
        }
    }

    /// `if (a = 1)` is probably a typo for `==`.
    fn assign_in_cond(&mut self, node: NodeId) {
        let value = match self.kind(node) {
            NodeKind::MAsgn { .. } => {
                let line = self.arena.line(node);
                self.error_at(ErrorCode::E1001, "multiple assignment in conditional", line);
                return;
            }
            NodeKind::LAsgn { value, .. }
            | NodeKind::DAsgn { value, .. }
            | NodeKind::GAsgn { value, .. }
            | NodeKind::IAsgn { value, .. } => value,
            _ => return,
        };
        let Some(value) = value else {
            return;
        };
        let is_static = matches!(
            self.kind(value),
            NodeKind::Int(_)
                | NodeKind::BigInt { .. }
                | NodeKind::Float(_)
                | NodeKind::Sym(_)
                | NodeKind::Regex { .. }
                | NodeKind::Str(_)
                | NodeKind::Nil
                | NodeKind::True
                | NodeKind::False
        );
        if is_static {
            let line = self.arena.line(value);
            self.warning_at(ErrorCode::W1003, "found = in conditional, should be ==", line);
        }
    }
}

/// Operators without side effects, whose result alone is the point.
fn is_pure_operator(mid: Id) -> bool {
    [
        op::PLUS,
        op::MINUS,
        op::MUL,
        op::DIV,
        op::MOD,
        op::POW,
        op::UPLUS,
        op::UMINUS,
        op::OR,
        op::XOR,
        op::AND,
        op::CMP,
        op::GT,
        op::GEQ,
        op::LT,
        op::LEQ,
        op::EQ,
        op::NEQ,
    ]
    .contains(&mid)
}
