//! AST construction.
//!
//! The grammar automaton calls one [`Builder`] method per reduction. Each
//! method allocates into the [`NodeArena`], consults the [`Scopes`] and the
//! symbol table, and records validation problems as diagnostics without
//! stopping: an invalid construct still yields a node (often
//! [`NodeKind::Error`]) so parsing can go on and surface more problems.
//!
//! Nodes are stamped with the builder's current line, which the parser
//! facade moves forward as tokens arrive.
//!
//! - `literal`: numbers, strings, symbols, regexps, interpolation
//! - `collection`: arrays, hashes, argument lists, splats
//! - `assign`: variable reads and every assignment form
//! - `call`: message sends, blocks, `super`, `yield`
//! - `control`: conditionals, loops, jumps, `begin`/`rescue`/`ensure`
//! - `definition`: methods, classes, modules, aliases, parameter lists
//! - `void`: value and void-context checks, conditions

mod assign;
mod collection;
mod call;
mod control;
mod definition;
mod literal;
mod void;

use rube_diagnostic::{
    duplicated_argument, shadowing_outer_local, Diagnostic, DiagnosticQueue, ErrorCode,
};
use rube_ir::{Encoding, Id, NodeArena, NodeId, NodeKind, SymbolTable};

use crate::scope::{Declared, ScopeError, Scopes};

/// Names that read as values but cannot be assigned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum Pseudo {
    SelfRef,
    Nil,
    True,
    False,
    File,
    Line,
    Encoding,
}

impl Pseudo {
    const ALL: [(Pseudo, &'static str); 7] = [
        (Pseudo::SelfRef, "self"),
        (Pseudo::Nil, "nil"),
        (Pseudo::True, "true"),
        (Pseudo::False, "false"),
        (Pseudo::File, "__FILE__"),
        (Pseudo::Line, "__LINE__"),
        (Pseudo::Encoding, "__ENCODING__"),
    ];

    fn assign_error(self) -> &'static str {
        match self {
            Pseudo::SelfRef => "Can't change the value of self",
            Pseudo::Nil => "Can't assign to nil",
            Pseudo::True => "Can't assign to true",
            Pseudo::False => "Can't assign to false",
            Pseudo::File => "Can't assign to __FILE__",
            Pseudo::Line => "Can't assign to __LINE__",
            Pseudo::Encoding => "Can't assign to __ENCODING__",
        }
    }
}

/// Ids the builder compares against, interned once.
#[derive(Clone, Debug)]
struct KnownIds {
    pseudo: [(Pseudo, Id); 7],
    last_line: Id,
    last_input_line: Id,
}

impl KnownIds {
    fn new(symbols: &SymbolTable) -> Self {
        KnownIds {
            pseudo: Pseudo::ALL.map(|(pseudo, name)| (pseudo, symbols.intern_str(name))),
            last_line: symbols.intern_str("$_"),
            last_input_line: symbols.intern_str("$."),
        }
    }

    fn pseudo(&self, id: Id) -> Option<Pseudo> {
        self.pseudo
            .iter()
            .find(|&&(_, known)| known == id)
            .map(|&(pseudo, _)| pseudo)
    }
}

/// Node constructors for one parse.
pub struct Builder<'t> {
    arena: NodeArena,
    scopes: Scopes,
    symbols: &'t SymbolTable,
    diagnostics: DiagnosticQueue,
    known: KnownIds,
    file: String,
    encoding: Encoding,
    verbose: bool,
    line: u32,

    /// Depth of `def` bodies.
    in_def: u32,
    /// Depth of `def recv.name` bodies.
    in_single: u32,
    /// `in_def`/`in_single` outside each open `class << x`.
    saved_defs: Vec<(u32, u32)>,
    /// `BEGIN { }` bodies, in source order.
    preexe: Vec<NodeId>,
}

impl<'t> Builder<'t> {
    pub fn new(
        symbols: &'t SymbolTable,
        file: impl Into<String>,
        encoding: Encoding,
        verbose: bool,
    ) -> Self {
        Builder {
            arena: NodeArena::new(),
            scopes: Scopes::new().with_wildcard(symbols.intern_str("_")),
            symbols,
            diagnostics: DiagnosticQueue::new(),
            known: KnownIds::new(symbols),
            file: file.into(),
            encoding,
            verbose,
            line: 1,
            in_def: 0,
            in_single: 0,
            saved_defs: Vec::new(),
            preexe: Vec::new(),
        }
    }

    // ===== State =====

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut Scopes {
        &mut self.scopes
    }

    pub fn symbols(&self) -> &'t SymbolTable {
        self.symbols
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    /// Line stamped on nodes built from now on.
    pub fn set_line(&mut self, line: u32) {
        self.line = line;
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Source encoding, e.g. after a magic comment switched it.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    pub fn in_def(&self) -> bool {
        self.in_def > 0 || self.in_single > 0
    }

    pub(crate) fn into_parts(self) -> (NodeArena, DiagnosticQueue) {
        (self.arena, self.diagnostics)
    }

    pub(crate) fn take_preexe(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.preexe)
    }

    // ===== Diagnostics =====

    /// Record a diagnostic produced elsewhere (scanner, automaton).
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.add(diagnostic);
    }

    pub(crate) fn error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.error_at(code, message, self.line);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, line: u32) {
        let diag = Diagnostic::error(code).with_message(message).at_line(line);
        self.diagnostics.add(diag);
    }

    /// Record an error and build the placeholder node.
    pub(crate) fn error_node(&mut self, code: ErrorCode, message: impl Into<String>) -> NodeId {
        self.error(code, message);
        self.node(NodeKind::Error)
    }

    pub(crate) fn warning(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.warning_at(code, message, self.line);
    }

    pub(crate) fn warning_at(&mut self, code: ErrorCode, message: impl Into<String>, line: u32) {
        let diag = Diagnostic::warning(code).with_message(message).at_line(line);
        self.diagnostics.add(diag);
    }

    // ===== Nodes =====

    pub(crate) fn node(&mut self, kind: NodeKind) -> NodeId {
        self.arena.alloc(kind, self.line)
    }

    pub(crate) fn kind(&self, id: NodeId) -> NodeKind {
        self.arena.kind(id)
    }

    fn name(&self, id: Id) -> String {
        self.symbols.display(id)
    }

    /// Give `node` the line of `orig`.
    pub fn fixpos(&mut self, node: NodeId, orig: Option<NodeId>) {
        if let Some(orig) = orig {
            let line = self.arena.line(orig);
            self.arena.get_mut(node).line = line;
        }
    }

    // ===== Scope declarations =====

    /// Declare a parameter, reporting duplicates, invalid names and
    /// shadowed outer locals.
    pub fn declare_arg(&mut self, id: Id) {
        match self.scopes.declare_arg(id) {
            Ok(Declared::Fresh) => {}
            Ok(Declared::Shadowing) => {
                if self.verbose {
                    let diag = shadowing_outer_local(&self.name(id), self.line);
                    self.diagnostics.add(diag);
                }
            }
            Err(ScopeError::DuplicatedArgument) => {
                self.diagnostics.add(duplicated_argument(self.line));
            }
            Err(err) => self.error(ErrorCode::E2002, err.to_string()),
        }
    }

    // ===== Statement sequences =====

    /// One-statement sequence.
    pub fn new_block(&mut self, first: NodeId) -> NodeId {
        let list = self.arena.alloc_list([first]);
        let block = self.node(NodeKind::Block(list));
        self.fixpos(block, Some(first));
        block
    }

    /// Append `tail` to the statement sequence `head`.
    ///
    /// Statements after an unconditional jump draw a verbose warning.
    pub fn block_append(&mut self, head: Option<NodeId>, tail: Option<NodeId>) -> Option<NodeId> {
        let Some(tail) = tail else {
            return head;
        };
        let Some(head) = head else {
            return Some(tail);
        };

        let head = match self.kind(head) {
            NodeKind::Block(_) => head,
            _ => self.new_block(head),
        };
        let NodeKind::Block(list) = self.kind(head) else {
            return Some(head);
        };
        if let Some(last) = self.arena.list_last(list) {
            if self.kind(last).is_void_value() && self.verbose {
                let line = self.arena.line(tail);
                self.warning_at(ErrorCode::W1006, "statement not reached", line);
            }
        }
        match self.kind(tail) {
            NodeKind::Block(tail_list) => self.arena.list_extend(list, tail_list),
            _ => self.arena.list_push(list, tail),
        }
        Some(head)
    }

    /// Strip `begin ... end` and `( ... )` wrappers around a single body.
    pub fn remove_begin(&self, node: Option<NodeId>) -> Option<NodeId> {
        let mut node = node?;
        while let NodeKind::Begin(Some(inner)) = self.kind(node) {
            node = inner;
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests;
