//! The scanner: one token per call, pulled by the grammar automaton.
//!
//! # Architecture
//!
//! ```text
//! LineSource -> LineCursor -> Lexer::scan ----------> Token
//!                                 |                  ^
//!                                 +-> continue_literal (strings, heredocs)
//! ```
//!
//! [`Lexer::next_token`] either continues the literal in progress or scans a
//! fresh token, then moves the [`ScannerState`] on with [`next_state`].
//! Everything that decides how an ambiguous character is read looks at the
//! state *before* that update.
//!
//! Submodules add literal scanning to `Lexer`:
//! - `literal`: quoted strings, `%` literals, character literals, regexp options
//! - `escape`: backslash escapes and multi-byte characters
//! - `number`: numeric literals
//! - `heredoc`: heredoc openers and bodies

mod escape;
mod heredoc;
mod literal;
mod number;

use rube_ir::{is_ident_char, op, Encoding, Id, Span, SymbolTable};
use rube_lexer_core::{LineCursor, LineSource, StrLines};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::keywords;
use crate::lex_error::{LexError, LexErrorKind, LexWarning, LexWarningKind};
use crate::magic_comment::encoding_declaration;
use crate::state::{next_state, BitStack, StateContext};
use crate::string_term::{LiteralTerm, StrFunc, StrTerm};
use crate::{ScannerState, Token, TokenKind, TokenValue};

/// Scanner configuration.
#[derive(Clone, Debug)]
pub struct LexOptions {
    /// Number of the first source line.
    pub start_line: u32,
    /// Encoding assumed until a magic comment says otherwise.
    pub encoding: Encoding,
    /// Report warnings that only matter to careful readers (ambiguous operators).
    pub verbose: bool,
}

impl Default for LexOptions {
    fn default() -> Self {
        LexOptions {
            start_line: 1,
            encoding: Encoding::default(),
            verbose: true,
        }
    }
}

/// Answers "is this name a local variable here?" for the scanner.
///
/// A known local followed by `-1`, `[` or `/` is an operand, not a command
/// taking an argument, so the scanner needs the parser's scope view.
pub trait LocalLookup {
    fn is_local(&self, id: Id) -> bool;
}

impl<F: Fn(Id) -> bool> LocalLookup for F {
    fn is_local(&self, id: Id) -> bool {
        self(id)
    }
}

/// Lookup for contexts without local variables.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoLocals;

impl LocalLookup for NoLocals {
    fn is_local(&self, _id: Id) -> bool {
        false
    }
}

/// Kind and value of a token before position and state bookkeeping.
#[derive(Debug)]
struct Produced {
    kind: TokenKind,
    value: TokenValue,
    closes_paren_arg: bool,
}

impl Produced {
    fn new(kind: TokenKind) -> Self {
        Produced {
            kind,
            value: TokenValue::None,
            closes_paren_arg: false,
        }
    }

    fn with(kind: TokenKind, value: TokenValue) -> Self {
        Produced {
            kind,
            value,
            closes_paren_arg: false,
        }
    }
}

/// A literal parked while its `#{...}` is scanned.
#[derive(Debug)]
struct Interpolation {
    term: LiteralTerm,
    /// Unclosed `{` inside the embedded expression.
    braces: u32,
}

/// Context-sensitive scanner over a [`LineSource`].
pub struct Lexer<'t, S> {
    cursor: LineCursor<S>,
    symbols: &'t SymbolTable,
    encoding: Encoding,
    verbose: bool,
    start_line: u32,

    state: ScannerState,
    literal: Option<LiteralTerm>,
    interpolations: Vec<Interpolation>,
    /// Literal to resume after the variable following a `#@`/`#$`.
    dvar_resume: Option<LiteralTerm>,
    cond: BitStack,
    cmdarg: BitStack,
    command_start: bool,
    paren_nest: i32,
    /// Paren depth at which `{`/`do` opens a lambda body; 0 when none.
    lpar_beg: i32,
    /// `lpar_beg` of enclosing lambdas.
    lambda_outer: SmallVec<[i32; 4]>,
    /// Per open `(`: whether it was an argument paren.
    paren_args: SmallVec<[bool; 8]>,

    tokbuf: Vec<u8>,
    space_seen: bool,
    token_line: u32,
    token_start: u32,

    warnings: Vec<LexWarning>,
    error: Option<LexError>,
    finished: bool,
    end_seen: bool,
}

impl<'t, S: LineSource> Lexer<'t, S> {
    pub fn new(source: S, symbols: &'t SymbolTable, options: LexOptions) -> Self {
        Lexer {
            cursor: LineCursor::new(source, options.start_line),
            symbols,
            encoding: options.encoding,
            verbose: options.verbose,
            start_line: options.start_line,
            state: ScannerState::Begin,
            literal: None,
            interpolations: Vec::new(),
            dvar_resume: None,
            cond: BitStack::default(),
            cmdarg: BitStack::default(),
            command_start: true,
            paren_nest: 0,
            lpar_beg: 0,
            lambda_outer: SmallVec::new(),
            paren_args: SmallVec::new(),
            tokbuf: Vec::new(),
            space_seen: false,
            token_line: options.start_line,
            token_start: 0,
            warnings: Vec::new(),
            error: None,
            finished: false,
            end_seen: false,
        }
    }

    /// Scan the next token.
    ///
    /// Returns [`TokenKind::Eof`] at end of input, repeatedly. After a
    /// lexical error every further call returns the same error.
    pub fn next_token(&mut self, locals: &dyn LocalLookup) -> Result<Token, LexError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let prev = self.state;
        let cmd_state = std::mem::replace(&mut self.command_start, false);
        let resume = self.dvar_resume.take();

        let result = match self.literal.take() {
            Some(term) => self.continue_literal(term),
            None => self.scan(cmd_state),
        };
        let produced = match result {
            Ok(produced) => produced,
            Err(err) => {
                debug!(line = err.line, error = %err, "lexical error");
                self.error = Some(err.clone());
                return Err(err);
            }
        };
        if resume.is_some() {
            self.literal = resume;
        }

        let known_local = produced.kind == TokenKind::Identifier
            && !prev.is_after_operator()
            && produced
                .value
                .id()
                .is_some_and(|id| id.is_local() && locals.is_local(id));
        let ctx = StateContext {
            cmd_start: cmd_state,
            known_local,
            closes_paren_arg: produced.closes_paren_arg,
        };
        self.state = next_state(prev, produced.kind, ctx);

        let end = self.cursor.offset().max(self.token_start);
        let token = Token::new(
            produced.kind,
            produced.value,
            self.token_line,
            Span::new(self.token_start, end),
        );
        trace!(
            line = token.line,
            kind = %token.kind,
            state = %self.state,
            "token"
        );
        Ok(token)
    }

    // === Automaton hooks ===

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn set_state(&mut self, state: ScannerState) {
        self.state = state;
    }

    pub fn cond_push(&mut self, bit: bool) {
        self.cond.push(bit);
    }

    pub fn cond_pop(&mut self) {
        self.cond.pop();
    }

    pub fn cond_lexpop(&mut self) {
        self.cond.lexpop();
    }

    /// Inside a `while`/`until`/`for` condition.
    pub fn cond_p(&self) -> bool {
        self.cond.is_set()
    }

    pub fn cmdarg_push(&mut self, bit: bool) {
        self.cmdarg.push(bit);
    }

    pub fn cmdarg_pop(&mut self) {
        self.cmdarg.pop();
    }

    pub fn cmdarg_lexpop(&mut self) {
        self.cmdarg.lexpop();
    }

    /// Inside the arguments of a command call.
    pub fn cmdarg_p(&self) -> bool {
        self.cmdarg.is_set()
    }

    /// Mark the next token as the start of a command.
    pub fn set_command_start(&mut self, value: bool) {
        self.command_start = value;
    }

    pub fn paren_nest(&self) -> i32 {
        self.paren_nest
    }

    pub fn lpar_beg(&self) -> i32 {
        self.lpar_beg
    }

    pub fn set_lpar_beg(&mut self, depth: i32) {
        self.lpar_beg = depth;
    }

    /// Line of the most recent token.
    pub fn line(&self) -> u32 {
        self.token_line
    }

    /// Source encoding currently in effect.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn symbols(&self) -> &'t SymbolTable {
        self.symbols
    }

    /// Warnings collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<LexWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Input stopped at an `__END__` line.
    pub fn end_marker_seen(&self) -> bool {
        self.end_seen
    }

    pub fn into_source(self) -> S {
        self.cursor.into_source()
    }

    // === Cursor helpers ===

    #[inline]
    fn nextc(&mut self) -> Result<Option<u8>, LexError> {
        self.cursor
            .next_byte()
            .map_err(|e| LexError::new(LexErrorKind::Io(e.to_string()), self.cursor.line_no()))
    }

    #[inline]
    fn pushback(&mut self, c: Option<u8>) {
        self.cursor.pushback(c);
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.cursor.peek()
    }

    /// The next byte is whitespace or the line ended.
    fn next_is_space(&self) -> bool {
        self.peek().map_or(true, is_space)
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError::new(kind, self.cursor.line_no())
    }

    fn intern(&self, bytes: &[u8]) -> Result<Id, LexError> {
        self.symbols
            .try_intern(bytes, self.encoding)
            .map_err(|e| self.error(LexErrorKind::SymbolTable(e.to_string())))
    }

    fn intern_tok(&self) -> Result<TokenValue, LexError> {
        self.intern(&self.tokbuf).map(TokenValue::Id)
    }

    fn take_tok(&mut self) -> TokenValue {
        TokenValue::Str(std::mem::take(&mut self.tokbuf))
    }

    fn mark_token_start(&mut self) {
        self.token_line = self.cursor.line_no();
        self.token_start = self.cursor.offset();
    }

    fn warn(&mut self, kind: LexWarningKind, message: impl Into<String>) {
        let line = self.cursor.line_no();
        self.warnings.push(LexWarning {
            kind,
            message: message.into(),
            line,
        });
    }

    fn warn_verbose(&mut self, kind: LexWarningKind, message: impl Into<String>) {
        if self.verbose {
            self.warn(kind, message);
        }
    }

    /// An argument-position operator directly followed by its operand.
    fn is_spcarg(&self) -> bool {
        self.state.is_arg() && self.space_seen && !self.next_is_space()
    }

    /// Warn that an operator after an argument was read as a unary prefix.
    fn arg_ambiguous(&mut self) -> bool {
        self.warn_verbose(
            LexWarningKind::Ambiguous,
            "ambiguous first argument; put parentheses or even spaces",
        );
        true
    }

    /// Warn when spacing suggests a prefix but a binary operator was read.
    fn warn_balanced(&mut self, op: &str, syntax: &str) {
        let prev = self.state;
        if !matches!(
            prev,
            ScannerState::Class | ScannerState::Dot | ScannerState::FName | ScannerState::EndArg
        ) && self.space_seen
            && !self.next_is_space()
        {
            self.warn_verbose(
                LexWarningKind::Ambiguous,
                format!(
                    "`{op}' after local variable is interpreted as binary operator even though it seems like {syntax}"
                ),
            );
        }
    }

    fn op_asgn(id: Id) -> Result<Produced, LexError> {
        Ok(Produced::with(TokenKind::OpAsgn, TokenValue::Id(id)))
    }

    fn open_paren_level(&mut self) {
        self.cond.push(false);
        self.cmdarg.push(false);
    }

    fn close_paren_level(&mut self) {
        self.cond.lexpop();
        self.cmdarg.lexpop();
    }

    // === Main dispatch ===

    fn continue_literal(&mut self, term: LiteralTerm) -> Result<Produced, LexError> {
        self.mark_token_start();
        match term {
            LiteralTerm::Finished => Ok(Produced::new(TokenKind::StringEnd)),
            LiteralTerm::Str(term) => self.parse_string(term),
            LiteralTerm::Heredoc(term) => self.here_document(term),
        }
    }

    /// Park `term` until the `}` closing the embedded expression.
    fn suspend_for_interpolation(&mut self, term: LiteralTerm) {
        self.interpolations.push(Interpolation { term, braces: 0 });
        self.open_paren_level();
    }

    /// Park `term` for the one variable token after `#`.
    fn suspend_for_dvar(&mut self, term: LiteralTerm) {
        self.dvar_resume = Some(term);
    }

    fn scan(&mut self, cmd_state: bool) -> Result<Produced, LexError> {
        use TokenKind::*;

        self.space_seen = false;
        if self.finished {
            self.mark_token_start();
            return Ok(Produced::new(Eof));
        }
        let prev = self.state;

        loop {
            let c = self.nextc()?;
            self.token_line = self.cursor.line_no();
            self.token_start = self.cursor.offset().saturating_sub(1);
            let Some(c) = c else {
                self.mark_token_start();
                self.finished = true;
                return Ok(Produced::new(Eof));
            };

            let produced = match c {
                // End of script.
                0 | 0x04 | 0x1a => {
                    self.finished = true;
                    Produced::new(Eof)
                }
                b' ' | b'\t' | 0x0c | b'\r' | 0x0b => {
                    self.space_seen = true;
                    continue;
                }
                b'#' => {
                    self.magic_comment()?;
                    self.cursor.goto_eol();
                    if !self.newline()? {
                        continue;
                    }
                    Produced::new(Newline)
                }
                b'\n' => {
                    if !self.newline()? {
                        continue;
                    }
                    Produced::new(Newline)
                }

                b'*' => {
                    if self.cursor.eat(b'*') {
                        if self.cursor.eat(b'=') {
                            return Self::op_asgn(op::POW);
                        }
                        Produced::new(Pow)
                    } else if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::MUL);
                    } else if self.is_spcarg() {
                        self.warn_verbose(
                            LexWarningKind::Ambiguous,
                            "`*' interpreted as argument prefix",
                        );
                        Produced::new(Splat)
                    } else if prev.is_beg() {
                        Produced::new(Splat)
                    } else {
                        self.warn_balanced("*", "argument prefix");
                        Produced::new(Mul)
                    }
                }

                b'!' => {
                    if prev.is_after_operator() && self.cursor.eat(b'@') {
                        Produced::new(Bang)
                    } else if self.cursor.eat(b'=') {
                        Produced::new(Neq)
                    } else if self.cursor.eat(b'~') {
                        Produced::new(NMatch)
                    } else {
                        Produced::new(Bang)
                    }
                }

                b'=' => {
                    if self.cursor.was_bol()
                        && self.cursor.rest().starts_with(b"begin")
                        && self.cursor.peek_at(5).map_or(true, is_space)
                    {
                        self.skip_embedded_document()?;
                        continue;
                    }
                    if self.cursor.eat(b'=') {
                        if self.cursor.eat(b'=') {
                            Produced::new(Eqq)
                        } else {
                            Produced::new(Eq)
                        }
                    } else if self.cursor.eat(b'~') {
                        Produced::new(Match)
                    } else if self.cursor.eat(b'>') {
                        Produced::new(Assoc)
                    } else {
                        Produced::new(Assign)
                    }
                }

                b'<' => {
                    if self.cursor.peek_is(b'<')
                        && prev != ScannerState::Dot
                        && prev != ScannerState::Class
                        && !prev.is_end()
                        && (!prev.is_arg() || self.space_seen)
                    {
                        self.cursor.advance(1);
                        if let Some(kind) = self.heredoc_identifier()? {
                            return Ok(Produced::new(kind));
                        }
                        self.pushback(Some(b'<'));
                    }
                    if prev == ScannerState::Class {
                        self.command_start = true;
                    }
                    if self.cursor.eat(b'=') {
                        if self.cursor.eat(b'>') {
                            Produced::new(Cmp)
                        } else {
                            Produced::new(Leq)
                        }
                    } else if self.cursor.eat(b'<') {
                        if self.cursor.eat(b'=') {
                            return Self::op_asgn(op::LSHIFT);
                        }
                        self.warn_balanced("<<", "here document");
                        Produced::new(LShift)
                    } else {
                        Produced::new(Lt)
                    }
                }

                b'>' => {
                    if self.cursor.eat(b'=') {
                        Produced::new(Geq)
                    } else if self.cursor.eat(b'>') {
                        if self.cursor.eat(b'=') {
                            return Self::op_asgn(op::RSHIFT);
                        }
                        Produced::new(RShift)
                    } else {
                        Produced::new(Gt)
                    }
                }

                b'"' => self.begin_literal(StrFunc::DQUOTE, b'"', StringBeg),
                b'\'' => self.begin_literal(StrFunc::SQUOTE, b'\'', StringBeg),
                b'`' => {
                    if prev.is_after_operator() {
                        Produced::with(Backtick, TokenValue::Id(op::BACKTICK))
                    } else {
                        self.begin_literal(StrFunc::XQUOTE, b'`', XStringBeg)
                    }
                }

                b'?' => self.char_literal()?,

                b'&' => {
                    if self.cursor.eat(b'&') {
                        if self.cursor.eat(b'=') {
                            return Self::op_asgn(op::ANDOP);
                        }
                        Produced::new(AndOp)
                    } else if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::AND);
                    } else if self.is_spcarg() {
                        self.warn_verbose(
                            LexWarningKind::Ambiguous,
                            "`&' interpreted as argument prefix",
                        );
                        Produced::new(Amper)
                    } else if prev.is_beg() {
                        Produced::new(Amper)
                    } else {
                        self.warn_balanced("&", "argument prefix");
                        Produced::new(Amp)
                    }
                }

                b'|' => {
                    if self.cursor.eat(b'|') {
                        if self.cursor.eat(b'=') {
                            return Self::op_asgn(op::OROP);
                        }
                        Produced::new(OrOp)
                    } else if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::OR);
                    } else {
                        Produced::new(Pipe)
                    }
                }

                b'+' => {
                    if prev.is_after_operator() {
                        if self.cursor.eat(b'@') {
                            Produced::new(UPlus)
                        } else {
                            Produced::new(Plus)
                        }
                    } else if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::PLUS);
                    } else if prev.is_beg() || (self.is_spcarg() && self.arg_ambiguous()) {
                        if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                            let Some(digit) = self.nextc()? else {
                                return Ok(Produced::new(UPlus));
                            };
                            return self.scan_number(digit);
                        }
                        Produced::new(UPlus)
                    } else {
                        self.warn_balanced("+", "unary operator");
                        Produced::new(Plus)
                    }
                }

                b'-' => {
                    if prev.is_after_operator() {
                        if self.cursor.eat(b'@') {
                            Produced::new(UMinus)
                        } else {
                            Produced::new(Minus)
                        }
                    } else if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::MINUS);
                    } else if self.cursor.eat(b'>') {
                        self.lambda_outer.push(self.lpar_beg);
                        self.paren_nest += 1;
                        self.lpar_beg = self.paren_nest;
                        Produced::new(Lambda)
                    } else if prev.is_beg() || (self.is_spcarg() && self.arg_ambiguous()) {
                        if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                            Produced::new(UMinusNum)
                        } else {
                            Produced::new(UMinus)
                        }
                    } else {
                        self.warn_balanced("-", "unary operator");
                        Produced::new(Minus)
                    }
                }

                b'.' => {
                    if self.cursor.eat(b'.') {
                        if self.cursor.eat(b'.') {
                            Produced::new(Dot3)
                        } else {
                            Produced::new(Dot2)
                        }
                    } else if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                        return Err(self.error(LexErrorKind::NoLeadingDigitFloat));
                    } else {
                        Produced::new(Dot)
                    }
                }

                b'0'..=b'9' => return self.scan_number(c),

                b')' => {
                    self.paren_nest -= 1;
                    self.close_paren_level();
                    let mut produced = Produced::new(RParen);
                    produced.closes_paren_arg = self.paren_args.pop().unwrap_or(false);
                    produced
                }
                b']' => {
                    self.paren_nest -= 1;
                    self.close_paren_level();
                    Produced::new(RBracket)
                }
                b'}' => {
                    if let Some(top) = self.interpolations.last_mut() {
                        if top.braces == 0 {
                            if let Some(done) = self.interpolations.pop() {
                                self.literal = Some(done.term);
                            }
                            self.close_paren_level();
                            return Ok(Produced::new(StringDEnd));
                        }
                        top.braces -= 1;
                    }
                    self.close_paren_level();
                    Produced::new(RBrace)
                }

                b':' => {
                    let c = self.nextc()?;
                    if c == Some(b':') {
                        if prev.is_beg()
                            || prev == ScannerState::Class
                            || (prev.is_arg() && self.space_seen)
                        {
                            Produced::new(Colon3)
                        } else {
                            Produced::new(Colon2)
                        }
                    } else if prev.is_end() || c.map_or(true, is_space) || c == Some(b'#') {
                        self.pushback(c);
                        self.warn_balanced(":", "symbol literal");
                        Produced::new(Colon)
                    } else {
                        match c {
                            Some(b'\'') => {
                                self.begin_literal(StrFunc::SSYM, b'\'', SymBeg);
                            }
                            Some(b'"') => {
                                self.begin_literal(StrFunc::DSYM, b'"', SymBeg);
                            }
                            _ => self.pushback(c),
                        }
                        Produced::new(SymBeg)
                    }
                }

                b'/' => {
                    if prev.is_beg() {
                        self.begin_literal(StrFunc::REGEXP_LIT, b'/', RegexpBeg)
                    } else if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::DIV);
                    } else if self.is_spcarg() {
                        self.arg_ambiguous();
                        self.begin_literal(StrFunc::REGEXP_LIT, b'/', RegexpBeg)
                    } else {
                        self.warn_balanced("/", "regexp literal");
                        Produced::new(Div)
                    }
                }

                b'^' => {
                    if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::XOR);
                    }
                    Produced::new(Caret)
                }

                b';' => {
                    self.command_start = true;
                    Produced::new(Semicolon)
                }
                b',' => Produced::new(Comma),

                b'~' => {
                    if prev.is_after_operator() {
                        self.cursor.eat(b'@');
                    }
                    Produced::new(Tilde)
                }

                b'(' => {
                    let kind = if prev.is_beg() {
                        LParenBeg
                    } else if self.space_seen && prev.is_arg() {
                        self.warn_verbose(
                            LexWarningKind::Ambiguous,
                            "(...) interpreted as grouped expression",
                        );
                        LParenArg
                    } else {
                        LParen
                    };
                    self.paren_nest += 1;
                    self.paren_args.push(kind == LParenArg);
                    self.open_paren_level();
                    Produced::new(kind)
                }

                b'[' => {
                    self.paren_nest += 1;
                    if prev.is_after_operator() {
                        if self.cursor.eat(b']') {
                            self.paren_nest -= 1;
                            if self.cursor.eat(b'=') {
                                return Ok(Produced::with(Aset, TokenValue::Id(op::ASET)));
                            }
                            return Ok(Produced::with(Aref, TokenValue::Id(op::AREF)));
                        }
                        self.open_paren_level();
                        Produced::new(LBracket)
                    } else {
                        let kind = if prev.is_beg() || (prev.is_arg() && self.space_seen) {
                            LBrackArray
                        } else {
                            LBracket
                        };
                        self.open_paren_level();
                        Produced::new(kind)
                    }
                }

                b'{' => {
                    if let Some(top) = self.interpolations.last_mut() {
                        top.braces += 1;
                    }
                    if self.lpar_beg != 0 && self.lpar_beg == self.paren_nest {
                        self.lpar_beg = self.lambda_outer.pop().unwrap_or(0);
                        self.paren_nest -= 1;
                        self.open_paren_level();
                        return Ok(Produced::new(LambdaBeg));
                    }
                    let kind = if prev.is_arg() || prev == ScannerState::End {
                        LBraceBlock
                    } else if prev == ScannerState::EndArg {
                        LBraceArg
                    } else {
                        LBraceHash
                    };
                    self.open_paren_level();
                    if kind != LBraceHash {
                        self.command_start = true;
                    }
                    Produced::new(kind)
                }

                b'\\' => {
                    let c = self.nextc()?;
                    if c == Some(b'\n') {
                        self.space_seen = true;
                        continue;
                    }
                    self.pushback(c);
                    return Err(self.error(LexErrorKind::InvalidChar { byte: b'\\' }));
                }

                b'%' => {
                    if prev.is_beg() {
                        let c = self.nextc()?;
                        return self.percent_literal(c);
                    }
                    if self.cursor.eat(b'=') {
                        return Self::op_asgn(op::MOD);
                    }
                    if self.is_spcarg() {
                        let c = self.nextc()?;
                        return self.percent_literal(c);
                    }
                    self.warn_balanced("%%", "string literal");
                    Produced::new(Mod)
                }

                b'$' => return self.scan_gvar(),
                b'@' => return self.scan_ivar(),

                b'_' if self.cursor.was_bol() && self.cursor.whole_line_matches(b"__END__", false) => {
                    debug!(line = self.cursor.line_no(), "__END__");
                    self.end_seen = true;
                    self.finished = true;
                    Produced::new(Eof)
                }

                _ if is_ident_char(c) => return self.scan_identifier(c, cmd_state),
                _ => return Err(self.error(LexErrorKind::InvalidChar { byte: c })),
            };
            return Ok(produced);
        }
    }

    fn begin_literal(&mut self, func: StrFunc, term: u8, kind: TokenKind) -> Produced {
        let line = self.cursor.line_no();
        self.literal = Some(LiteralTerm::Str(StrTerm::new(func, term, None, line)));
        Produced::new(kind)
    }

    /// Decide whether a line end is a token.
    ///
    /// Returns `false` when the newline is insignificant, including when the
    /// next line continues a method chain with a leading `.`.
    fn newline(&mut self) -> Result<bool, LexError> {
        if !self.state.newline_significant() {
            return Ok(false);
        }
        loop {
            match self.nextc()? {
                Some(b' ' | b'\t' | 0x0c | b'\r' | 0x0b) => self.space_seen = true,
                Some(b'.') => {
                    let c = self.nextc()?;
                    if c != Some(b'.') {
                        self.pushback(c);
                        self.pushback(Some(b'.'));
                        return Ok(false);
                    }
                    self.cursor.set_pos(0);
                    break;
                }
                None => break,
                Some(_) => {
                    // Rescan the looked-at line from its start.
                    self.cursor.set_pos(0);
                    break;
                }
            }
        }
        self.command_start = true;
        Ok(true)
    }

    /// Skip `=begin` .. `=end`; the `=` of `=begin` was read.
    fn skip_embedded_document(&mut self) -> Result<(), LexError> {
        let start = self.cursor.line_no();
        loop {
            self.cursor.goto_eol();
            let Some(c) = self.nextc()? else {
                return Err(LexError::new(
                    LexErrorKind::UnterminatedEmbeddedDocument,
                    start,
                ));
            };
            if c == b'='
                && self.cursor.rest().starts_with(b"end")
                && self.cursor.peek_at(3).map_or(true, is_space)
            {
                break;
            }
        }
        self.cursor.goto_eol();
        Ok(())
    }

    /// Switch encodings on a declaration in one of the first two lines.
    fn magic_comment(&mut self) -> Result<(), LexError> {
        let relative_line = self.cursor.line_no().saturating_sub(self.start_line) + 1;
        if relative_line > 2 {
            return Ok(());
        }
        let hash_at = self.cursor.pos().saturating_sub(1);
        let line = self.cursor.line_bytes();
        if !line[..hash_at].iter().all(|&b| b == b' ' || b == b'\t') {
            return Ok(());
        }
        let Some(name) = encoding_declaration(&line[hash_at + 1..]) else {
            return Ok(());
        };
        match Encoding::from_name(name) {
            Some(encoding) => {
                debug!(%encoding, line = self.cursor.line_no(), "magic comment");
                self.encoding = encoding;
                Ok(())
            }
            None => {
                let name = String::from_utf8_lossy(name).into_owned();
                Err(self.error(LexErrorKind::UnknownEncoding { name }))
            }
        }
    }

    // === Names ===

    /// Append `first` and the identifier characters after it to `tokbuf`.
    ///
    /// Returns the first byte past the run, consumed.
    fn read_ident_run(&mut self, first: u8) -> Result<Option<u8>, LexError> {
        let mut c = first;
        loop {
            self.tokadd_mbchar(c)?;
            match self.nextc()? {
                Some(next) if is_ident_char(next) => c = next,
                other => return Ok(other),
            }
        }
    }

    fn scan_identifier(&mut self, first: u8, cmd_state: bool) -> Result<Produced, LexError> {
        use TokenKind::*;

        let prev = self.state;
        self.tokbuf.clear();
        let after = self.read_ident_run(first)?;

        let absorb_suffix = matches!(after, Some(b'!' | b'?'))
            && (!self.cursor.peek_is(b'=') || matches!(self.cursor.peek_at(1), Some(b'=' | b'~')));
        let mut kind = if absorb_suffix {
            if let Some(suffix) = after {
                self.tokbuf.push(suffix);
            }
            Fid
        } else {
            self.pushback(after);
            if prev == ScannerState::FName
                && self.cursor.peek_is(b'=')
                && !matches!(self.cursor.peek_at(1), Some(b'~' | b'>'))
                && (self.cursor.peek_at(1) != Some(b'=') || self.cursor.peek_at(2) == Some(b'>'))
            {
                self.cursor.advance(1);
                self.tokbuf.push(b'=');
                Identifier
            } else if first.is_ascii_uppercase() {
                Constant
            } else {
                Identifier
            }
        };

        let label_possible = (prev == ScannerState::Begin && !cmd_state) || prev.is_arg();
        if label_possible && self.cursor.peek_is(b':') && self.cursor.peek_at(1) != Some(b':') {
            self.cursor.advance(1);
            return Ok(Produced::with(Label, self.intern_tok()?));
        }

        if prev != ScannerState::Dot && self.tokbuf.is_ascii() {
            if let Some(keyword) = keywords::lookup(&self.tokbuf) {
                if prev == ScannerState::FName {
                    return Ok(Produced::with(keyword.kind, self.intern_tok()?));
                }
                if keyword.kind == KwDo {
                    return Ok(Produced::new(self.do_keyword(prev)));
                }
                kind = if prev == ScannerState::Begin || prev == ScannerState::Value {
                    keyword.kind
                } else {
                    keyword.modifier.unwrap_or(keyword.kind)
                };
                return Ok(Produced::new(kind));
            }
        }

        Ok(Produced::with(kind, self.intern_tok()?))
    }

    /// Which `do` this is: lambda body, loop condition end, or block.
    fn do_keyword(&mut self, prev: ScannerState) -> TokenKind {
        self.command_start = true;
        if self.lpar_beg != 0 && self.lpar_beg == self.paren_nest {
            self.lpar_beg = self.lambda_outer.pop().unwrap_or(0);
            self.paren_nest -= 1;
            return TokenKind::KwDoLambda;
        }
        if self.cond.is_set() {
            return TokenKind::KwDoCond;
        }
        if self.cmdarg.is_set() && prev != ScannerState::CmdArg {
            return TokenKind::KwDoBlock;
        }
        if prev == ScannerState::EndArg || prev == ScannerState::Begin {
            return TokenKind::KwDoBlock;
        }
        TokenKind::KwDo
    }

    /// `$` was read.
    fn scan_gvar(&mut self) -> Result<Produced, LexError> {
        use TokenKind::*;

        let prev = self.state;
        self.tokbuf.clear();
        self.tokbuf.push(b'$');
        let c = self.nextc()?;
        match c {
            Some(b'_') => {
                let next = self.nextc()?;
                if let Some(next) = next.filter(|&b| is_ident_char(b)) {
                    self.tokbuf.push(b'_');
                    let after = self.read_ident_run(next)?;
                    self.pushback(after);
                } else {
                    self.pushback(next);
                    self.tokbuf.push(b'_');
                }
                Ok(Produced::with(GVar, self.intern_tok()?))
            }
            Some(
                special @ (b'~' | b'*' | b'$' | b'?' | b'!' | b'@' | b'/' | b'\\' | b';' | b','
                | b'.' | b'=' | b':' | b'<' | b'>' | b'"'),
            ) => {
                self.tokbuf.push(special);
                Ok(Produced::with(GVar, self.intern_tok()?))
            }
            Some(b'-') => {
                self.tokbuf.push(b'-');
                let next = self.nextc()?;
                match next {
                    Some(b) if is_ident_char(b) => self.tokadd_mbchar(b)?,
                    _ => self.pushback(next),
                }
                Ok(Produced::with(GVar, self.intern_tok()?))
            }
            Some(r @ (b'&' | b'`' | b'\'' | b'+')) => {
                if prev == ScannerState::FName {
                    self.tokbuf.push(r);
                    return Ok(Produced::with(GVar, self.intern_tok()?));
                }
                Ok(Produced::with(BackRef, TokenValue::BackRef(r)))
            }
            Some(d @ b'1'..=b'9') => {
                let mut n: u32 = u32::from(d - b'0');
                self.tokbuf.push(d);
                loop {
                    let next = self.nextc()?;
                    match next {
                        Some(d @ b'0'..=b'9') => {
                            self.tokbuf.push(d);
                            n = n.saturating_mul(10).saturating_add(u32::from(d - b'0'));
                        }
                        _ => {
                            self.pushback(next);
                            break;
                        }
                    }
                }
                if prev == ScannerState::FName {
                    return Ok(Produced::with(GVar, self.intern_tok()?));
                }
                Ok(Produced::with(NthRef, TokenValue::NthRef(n)))
            }
            Some(b) if is_ident_char(b) => {
                let after = self.read_ident_run(b)?;
                self.pushback(after);
                Ok(Produced::with(GVar, self.intern_tok()?))
            }
            _ => {
                self.pushback(c);
                Err(self.error(LexErrorKind::InvalidGlobalVariable { name: "$".into() }))
            }
        }
    }

    /// `@` was read.
    fn scan_ivar(&mut self) -> Result<Produced, LexError> {
        self.tokbuf.clear();
        self.tokbuf.push(b'@');
        let mut c = self.nextc()?;
        if c == Some(b'@') {
            self.tokbuf.push(b'@');
            c = self.nextc()?;
        }
        let class_var = self.tokbuf.len() == 2;
        match c {
            Some(b) if is_ident_char(b) && !b.is_ascii_digit() => {
                let after = self.read_ident_run(b)?;
                self.pushback(after);
                let kind = if class_var {
                    TokenKind::CVar
                } else {
                    TokenKind::IVar
                };
                Ok(Produced::with(kind, self.intern_tok()?))
            }
            _ => {
                if let Some(b) = c.filter(u8::is_ascii_digit) {
                    self.tokbuf.push(b);
                } else {
                    self.pushback(c);
                }
                let name = String::from_utf8_lossy(&self.tokbuf).into_owned();
                let kind = if class_var {
                    LexErrorKind::InvalidClassVariable { name }
                } else {
                    LexErrorKind::InvalidInstanceVariable { name }
                };
                Err(self.error(kind))
            }
        }
    }
}

/// Scan a whole string, for tools and tests.
///
/// Stops after [`TokenKind::Eof`], which is included.
pub fn tokenize(
    source: &str,
    symbols: &SymbolTable,
    locals: &dyn LocalLookup,
) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(StrLines::from(source), symbols, LexOptions::default());
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token(locals)?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

#[cfg(test)]
mod tests;
