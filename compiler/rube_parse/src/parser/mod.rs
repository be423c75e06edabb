//! The object the grammar automaton drives.
//!
//! A [`Parser`] owns everything one parse needs: the scanner, the scope
//! tracker, the node arena and the diagnostics. The automaton pulls tokens
//! with [`Parser::next_token`], calls a [`Builder`] method on every
//! reduction, reports its own syntax errors through
//! [`Parser::report_error`], and hands the program body to
//! [`Parser::finish`].
//!
//! ```text
//! automaton --next_token--> Parser --Lexer::next_token(&scopes)--> Token
//!     |                       |
//!     +--builder_mut().new_*--+--> Builder --> NodeArena / Scopes
//! ```

mod error;

use rube_diagnostic::{syntax_error, Diagnostic, ErrorCode};
use rube_ir::{Encoding, Id, NodeArena, NodeId, SymbolTable};
use rube_lexer::{LexError, LexOptions, Lexer, Token};
use rube_lexer_core::LineSource;
use tracing::debug;

use crate::builder::Builder;
use crate::scope::RuntimeBinding;

pub use error::{lex_error_code, lex_error_to_diagnostic, lex_warning_to_diagnostic};

/// Options for one parse.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Name reported in diagnostics and produced by `__FILE__`.
    pub file_name: String,
    /// Number of the first source line.
    pub start_line: u32,
    /// Report warnings that only matter to careful readers.
    pub verbose: bool,
    /// Source encoding until a magic comment says otherwise.
    pub encoding: Encoding,
    /// Locals of a live scope the source is evaluated against.
    pub binding: Option<RuntimeBinding>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            file_name: "-".to_owned(),
            start_line: 1,
            verbose: true,
            encoding: Encoding::default(),
            binding: None,
        }
    }
}

/// Finished parse.
#[derive(Debug)]
pub struct ParseResult {
    /// Program `Scope` node; `None` when any error was reported.
    pub root: Option<NodeId>,
    pub arena: NodeArena,
    pub file: String,
    pub start_line: u32,
    /// Locals of the top-level scope, in declaration order.
    pub top_locals: Vec<Id>,
    /// Binding the parse ran against, if any.
    pub inherited: Option<RuntimeBinding>,
    /// Errors and warnings, ordered by line.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// True when no error was reported. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Binding for evaluating more source against this program's locals,
    /// including those it inherited.
    pub fn binding(&self) -> RuntimeBinding {
        let mut binding = self.inherited.clone().unwrap_or_default();
        binding.extend(self.top_locals.iter().copied());
        binding
    }
}

/// Scanner, scopes, arena and diagnostics of one parse.
pub struct Parser<'t, S> {
    lexer: Lexer<'t, S>,
    builder: Builder<'t>,
    file: String,
    start_line: u32,
    /// Set once a scanner error was recorded.
    fatal: bool,
}

impl<'t, S: LineSource> Parser<'t, S> {
    pub fn new(source: S, symbols: &'t SymbolTable, options: ParseOptions) -> Self {
        let ParseOptions {
            file_name,
            start_line,
            verbose,
            encoding,
            binding,
        } = options;

        let lexer = Lexer::new(
            source,
            symbols,
            LexOptions {
                start_line,
                encoding,
                verbose,
            },
        );
        let mut builder = Builder::new(symbols, file_name.clone(), encoding, verbose);
        builder.set_line(start_line);
        builder.scopes_mut().open_top_scope(binding);
        debug!(file = %file_name, start_line, "parse started");

        Parser {
            lexer,
            builder,
            file: file_name,
            start_line,
            fatal: false,
        }
    }

    /// Scan the next token against the current local-variable scopes.
    ///
    /// Scanner warnings land in the diagnostics as they appear. A scanner
    /// error is recorded once and returned on every later call.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let result = self.lexer.next_token(self.builder.scopes());
        for warning in self.lexer.take_warnings() {
            self.builder.report(lex_warning_to_diagnostic(&warning));
        }
        self.builder.set_encoding(self.lexer.encoding());
        match result {
            Ok(token) => {
                self.builder.set_line(token.line);
                Ok(token)
            }
            Err(err) => {
                if !self.fatal {
                    self.fatal = true;
                    self.builder.report(lex_error_to_diagnostic(&err));
                }
                Err(err)
            }
        }
    }

    /// Syntax error found by the automaton.
    pub fn report_error(&mut self, message: impl Into<String>, line: u32) {
        self.builder.report(syntax_error(message, line));
    }

    /// Warning raised by the automaton.
    pub fn warn(&mut self, message: impl Into<String>, line: u32) {
        let diag = Diagnostic::warning(ErrorCode::W1007)
            .with_message(message)
            .at_line(line);
        self.builder.report(diag);
    }

    pub fn builder(&self) -> &Builder<'t> {
        &self.builder
    }

    /// Node constructors, called on each reduction.
    pub fn builder_mut(&mut self) -> &mut Builder<'t> {
        &mut self.builder
    }

    pub fn lexer(&self) -> &Lexer<'t, S> {
        &self.lexer
    }

    /// Scanner hooks (`cond_push`, `set_state`, ...) for the automaton.
    pub fn lexer_mut(&mut self) -> &mut Lexer<'t, S> {
        &mut self.lexer
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Close the program and hand back the tree.
    ///
    /// `BEGIN { }` bodies run first, the top-level scope closes into the
    /// root `Scope` node, and the root is withheld if anything failed.
    pub fn finish(mut self, body: Option<NodeId>) -> ParseResult {
        let builder = &mut self.builder;
        builder.void_stmts(body);

        let mut body = body;
        for pre in builder.take_preexe().into_iter().rev() {
            body = match body {
                Some(rest) => builder.block_append(Some(pre), Some(rest)),
                None => Some(pre),
            };
        }
        builder.scopes_mut().unwind_to(1);
        let inherited = builder.scopes().binding().cloned();
        let top_locals = builder.scopes_mut().close_method_scope();
        let root = builder.scope_node(top_locals.clone(), None, body);

        let (arena, mut queue) = self.builder.into_parts();
        let has_errors = queue.has_errors();
        let diagnostics = queue.flush();
        debug!(
            file = %self.file,
            nodes = arena.node_count(),
            diagnostics = diagnostics.len(),
            "parse finished"
        );

        ParseResult {
            root: (!has_errors).then_some(root),
            arena,
            file: self.file,
            start_line: self.start_line,
            top_locals,
            inherited,
            diagnostics,
        }
    }
}
