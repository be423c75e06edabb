//! Local-variable scopes.
//!
//! Every scope is a record in one arena, addressed by [`ScopeId`]. Method
//! scopes (program top, `def`, class bodies) see nothing outside themselves.
//! Block scopes (`{ }`, `do ... end`, lambda bodies) either continue the
//! lookup in the scope they were opened in or start a fresh chain:
//!
//! ```text
//! def m(a)            Method  args [a]   Fresh
//!   each { |x|        Block   args [x]   ChildOf(method)
//!     each { |y| }    Block   args [y]   ChildOf(block)
//! ```
//!
//! A top-level scope opened against a [`RuntimeBinding`] bottoms out in
//! `InheritRuntime`: names the binding already knows are locals too.
//!
//! Scopes open and close strictly nested, so closing pops the arena.

use rube_ir::{Id, IdKind};
use rube_lexer::LocalLookup;
use rustc_hash::FxHashSet;
use tracing::trace;

/// Handle of a scope record.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    /// Program top level.
    Top,
    /// `def` body.
    Method,
    /// `class`, `module` or `class << x` body.
    Class,
    /// Block or lambda body.
    Block,
}

/// Where lookup continues after missing in a scope.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeLink {
    /// Lookup stops.
    Fresh,
    /// Lookup continues in the enclosing scope.
    ChildOf(ScopeId),
    /// Lookup continues in the runtime binding's locals.
    InheritRuntime,
}

/// One scope: parameters and other locals, in declaration order.
#[derive(Clone, Debug)]
pub struct ScopeRecord {
    pub kind: ScopeKind,
    pub args: Vec<Id>,
    pub vars: Vec<Id>,
    pub link: ScopeLink,
}

impl ScopeRecord {
    fn new(kind: ScopeKind, link: ScopeLink) -> Self {
        ScopeRecord {
            kind,
            args: Vec::new(),
            vars: Vec::new(),
            link,
        }
    }

    fn contains(&self, id: Id) -> bool {
        self.args.contains(&id) || self.vars.contains(&id)
    }

    /// Local table: parameters first, then the other locals.
    fn locals(&self) -> Vec<Id> {
        self.args.iter().chain(&self.vars).copied().collect()
    }
}

/// Local names of a live evaluation context.
///
/// Parsing against a binding lets code see locals declared by an earlier
/// parse, e.g. the `top_locals` of its result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeBinding {
    locals: FxHashSet<Id>,
}

impl RuntimeBinding {
    pub fn new(locals: impl IntoIterator<Item = Id>) -> Self {
        RuntimeBinding {
            locals: locals.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.locals.contains(&id)
    }

    /// Add names declared since the binding was captured.
    pub fn extend(&mut self, locals: impl IntoIterator<Item = Id>) {
        self.locals.extend(locals);
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }
}

/// How a bare name reads.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Resolution {
    /// A block-local (or binding) variable.
    Dynamic,
    /// A method-level local variable.
    Local,
    /// Not a variable here: a method call.
    Unknown,
}

/// Outcome of a successful parameter declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Declared {
    Fresh,
    /// The name was already visible from an enclosing scope.
    Shadowing,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("duplicated argument name")]
    DuplicatedArgument,
    #[error("formal argument cannot be a constant")]
    FormalConstant,
    #[error("formal argument cannot be an instance variable")]
    FormalInstance,
    #[error("formal argument cannot be a global variable")]
    FormalGlobal,
    #[error("formal argument cannot be a class variable")]
    FormalClass,
}

/// The scope tracker.
#[derive(Clone, Debug, Default)]
pub struct Scopes {
    records: Vec<ScopeRecord>,
    binding: Option<RuntimeBinding>,
    /// Exempt from duplicate and shadowing checks (`_`).
    wildcard: Id,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_wildcard(mut self, id: Id) -> Self {
        self.wildcard = id;
        self
    }

    // ===== Opening and closing =====

    /// Program top level, optionally continuing into a runtime binding.
    pub fn open_top_scope(&mut self, binding: Option<RuntimeBinding>) -> ScopeId {
        let link = if binding.is_some() {
            ScopeLink::InheritRuntime
        } else {
            ScopeLink::Fresh
        };
        self.binding = binding;
        self.push(ScopeKind::Top, link)
    }

    pub fn open_method_scope(&mut self) -> ScopeId {
        self.push(ScopeKind::Method, ScopeLink::Fresh)
    }

    pub fn open_class_scope(&mut self) -> ScopeId {
        self.push(ScopeKind::Class, ScopeLink::Fresh)
    }

    /// Block scope; with `inherit` unset, lookup stops at the block.
    pub fn open_block_scope(&mut self, inherit: bool) -> ScopeId {
        let link = match self.current_id() {
            Some(parent) if inherit => ScopeLink::ChildOf(parent),
            _ => ScopeLink::Fresh,
        };
        self.push(ScopeKind::Block, link)
    }

    /// Close a top, method or class scope and return its local table.
    pub fn close_method_scope(&mut self) -> Vec<Id> {
        debug_assert!(
            !matches!(self.records.last(), Some(r) if r.kind == ScopeKind::Block),
            "closing a block scope as a method scope"
        );
        self.pop()
    }

    /// Close a block scope and return its local table.
    pub fn close_block_scope(&mut self) -> Vec<Id> {
        debug_assert!(
            !matches!(self.records.last(), Some(r) if r.kind != ScopeKind::Block),
            "closing a method scope as a block scope"
        );
        self.pop()
    }

    fn push(&mut self, kind: ScopeKind, link: ScopeLink) -> ScopeId {
        let id = ScopeId(self.records.len() as u32);
        trace!(?id, ?kind, ?link, "open scope");
        self.records.push(ScopeRecord::new(kind, link));
        id
    }

    /// Drop every scope above `depth`, e.g. those left open by a syntax
    /// error.
    pub fn unwind_to(&mut self, depth: usize) {
        while self.records.len() > depth {
            self.pop();
        }
    }

    fn pop(&mut self) -> Vec<Id> {
        let Some(record) = self.records.pop() else {
            return Vec::new();
        };
        trace!(
            depth = self.records.len(),
            kind = ?record.kind,
            locals = record.args.len() + record.vars.len(),
            "close scope"
        );
        record.locals()
    }

    // ===== Declarations =====

    /// Reject names that cannot be parameters.
    pub fn formal_argument(id: Id) -> Result<(), ScopeError> {
        match id.kind() {
            IdKind::Const => Err(ScopeError::FormalConstant),
            IdKind::Instance => Err(ScopeError::FormalInstance),
            IdKind::Global => Err(ScopeError::FormalGlobal),
            IdKind::Class => Err(ScopeError::FormalClass),
            _ => Ok(()),
        }
    }

    /// Check a new parameter against the names already visible.
    ///
    /// In a block, a name already declared in the same block is a
    /// duplicate and a name visible from outside shadows it. Elsewhere any
    /// name already in the scope is a duplicate.
    pub fn shadowing_check(&self, id: Id) -> Result<Declared, ScopeError> {
        if id == self.wildcard && !id.is_none() {
            return Ok(Declared::Fresh);
        }
        let Some(current) = self.records.last() else {
            return Ok(Declared::Fresh);
        };
        if current.contains(id) {
            return Err(ScopeError::DuplicatedArgument);
        }
        if current.kind == ScopeKind::Block && self.resolve(id) != Resolution::Unknown {
            return Ok(Declared::Shadowing);
        }
        Ok(Declared::Fresh)
    }

    /// Declare a parameter of the current scope.
    pub fn declare_arg(&mut self, id: Id) -> Result<Declared, ScopeError> {
        Self::formal_argument(id)?;
        let declared = self.shadowing_check(id)?;
        if let Some(current) = self.records.last_mut() {
            current.args.push(id);
        }
        Ok(declared)
    }

    /// Declare a local of the current scope; no-op when already there.
    pub fn declare_local(&mut self, id: Id) {
        if let Some(current) = self.records.last_mut() {
            if !current.contains(id) {
                current.vars.push(id);
            }
        }
    }

    // ===== Lookup =====

    pub fn resolve(&self, id: Id) -> Resolution {
        let mut index = self.records.len().checked_sub(1);
        while let Some(i) = index {
            let record = &self.records[i];
            if record.contains(id) {
                return if record.kind == ScopeKind::Block
                    || record.link == ScopeLink::InheritRuntime
                {
                    Resolution::Dynamic
                } else {
                    Resolution::Local
                };
            }
            index = match record.link {
                ScopeLink::Fresh => None,
                ScopeLink::ChildOf(parent) => Some(parent.index()),
                ScopeLink::InheritRuntime => {
                    return match &self.binding {
                        Some(binding) if binding.contains(id) => Resolution::Dynamic,
                        _ => Resolution::Unknown,
                    };
                }
            };
        }
        Resolution::Unknown
    }

    pub fn is_local(&self, id: Id) -> bool {
        self.resolve(id) != Resolution::Unknown
    }

    /// Declared in the innermost scope itself.
    pub fn is_current(&self, id: Id) -> bool {
        self.records.last().is_some_and(|r| r.contains(id))
    }

    pub fn in_block(&self) -> bool {
        self.records
            .last()
            .is_some_and(|r| r.kind == ScopeKind::Block)
    }

    /// Local table of the innermost scope.
    pub fn current_locals(&self) -> Vec<Id> {
        self.records.last().map(ScopeRecord::locals).unwrap_or_default()
    }

    pub fn current_id(&self) -> Option<ScopeId> {
        self.records
            .len()
            .checked_sub(1)
            .map(|i| ScopeId(i as u32))
    }

    pub fn record(&self, id: ScopeId) -> Option<&ScopeRecord> {
        self.records.get(id.index())
    }

    pub fn depth(&self) -> usize {
        self.records.len()
    }

    pub fn binding(&self) -> Option<&RuntimeBinding> {
        self.binding.as_ref()
    }
}

impl LocalLookup for Scopes {
    fn is_local(&self, id: Id) -> bool {
        Scopes::is_local(self, id)
    }
}

#[cfg(test)]
mod tests;
