//! Scanner state machine.
//!
//! The scanner state records what the grammar expects next and is the only
//! input (besides preceding whitespace) to disambiguating characters such as
//! `/`, `-`, `[` and `{`. After every token the state moves on through
//! [`next_state`], a pure function of the previous state, the token kind and
//! a little context.

use std::fmt;

use crate::keywords;
use crate::TokenKind;

/// Expression context consulted when scanning ambiguous characters.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ScannerState {
    /// Start of an expression; a value is expected.
    #[default]
    Begin,
    /// A complete value was produced; an operator is expected.
    End,
    /// Right after a parenthesized command argument.
    EndArg,
    /// After a method name that may take arguments without parentheses.
    Arg,
    /// Like `Arg`, after the first word of a command.
    CmdArg,
    /// After `return`, `break`, `next`, `rescue`: a value may follow.
    Mid,
    /// A method name is expected (`def`, `alias`, `undef`, `:`).
    FName,
    /// After `.` or `::`; keywords are plain names here.
    Dot,
    /// After `class`; `<<` is the singleton-class operator.
    Class,
    /// A value is expected, but labels are not recognized.
    Value,
}

impl ScannerState {
    /// Value-expected states.
    #[inline]
    pub fn is_beg(self) -> bool {
        matches!(
            self,
            ScannerState::Begin | ScannerState::Mid | ScannerState::Value | ScannerState::Class
        )
    }

    #[inline]
    pub fn is_arg(self) -> bool {
        matches!(self, ScannerState::Arg | ScannerState::CmdArg)
    }

    #[inline]
    pub fn is_end(self) -> bool {
        matches!(self, ScannerState::End | ScannerState::EndArg)
    }

    /// An operator here is a method name (`def +`, `obj.-`).
    #[inline]
    pub fn is_after_operator(self) -> bool {
        matches!(self, ScannerState::FName | ScannerState::Dot)
    }

    /// States in which a newline ends a statement.
    #[inline]
    pub fn newline_significant(self) -> bool {
        !matches!(
            self,
            ScannerState::Begin
                | ScannerState::FName
                | ScannerState::Dot
                | ScannerState::Class
                | ScannerState::Value
        )
    }
}

impl fmt::Display for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScannerState::Begin => "BEG",
            ScannerState::End => "END",
            ScannerState::EndArg => "ENDARG",
            ScannerState::Arg => "ARG",
            ScannerState::CmdArg => "CMDARG",
            ScannerState::Mid => "MID",
            ScannerState::FName => "FNAME",
            ScannerState::Dot => "DOT",
            ScannerState::Class => "CLASS",
            ScannerState::Value => "VALUE",
        };
        f.write_str(name)
    }
}

/// Facts about the token just produced that its kind alone does not carry.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct StateContext {
    /// The token started a command (start of statement).
    pub cmd_start: bool,
    /// The identifier names a local variable in scope.
    pub known_local: bool,
    /// The `)` closes a [`LParenArg`](TokenKind::LParenArg).
    pub closes_paren_arg: bool,
}

/// State after producing `kind` in state `prev`.
pub fn next_state(prev: ScannerState, kind: TokenKind, ctx: StateContext) -> ScannerState {
    use ScannerState as S;
    use TokenKind::*;

    if let Some(state) = keywords::keyword_state(kind) {
        return state;
    }

    match kind {
        Identifier | Constant | Fid => {
            if ctx.known_local && !prev.is_after_operator() {
                S::End
            } else if prev.is_beg() || prev.is_arg() || prev == S::Dot {
                if ctx.cmd_start {
                    S::CmdArg
                } else {
                    S::Arg
                }
            } else {
                S::End
            }
        }
        Backtick => match prev {
            S::Dot if ctx.cmd_start => S::CmdArg,
            S::Dot => S::Arg,
            _ => S::End,
        },

        GVar | IVar | CVar | NthRef | BackRef | Integer | Float | Char | StringEnd
        | RegexpEnd | StringDEnd | RBracket | RBrace => S::End,
        RParen if ctx.closes_paren_arg => S::EndArg,
        RParen => S::End,

        // Literal bodies keep the state the literal started in.
        StringBeg | XStringBeg | RegexpBeg | WordsBeg | QWordsBeg | StringContent | WordSep
        | Eof => prev,
        SymBeg => S::FName,

        Label | Newline | Semicolon | Comma | Colon | Colon3 | OpAsgn | AndOp | OrOp | Dot2
        | Dot3 | UMinusNum | StringDBeg | StringDVar | LParenBeg | LParenArg | LParen
        | LBrackArray | LBraceHash | LBraceBlock | LBraceArg | LambdaBeg => S::Begin,

        Dot | Colon2 => S::Dot,
        Question => S::Value,
        Lambda | Aref | Aset => S::Arg,

        // Operators name a method after `def` or `.`, otherwise a value follows.
        _ if prev.is_after_operator() => S::Arg,
        _ => S::Begin,
    }
}

/// One-bit-per-level stack used for `cond` and `cmdarg` tracking.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct BitStack(u64);

impl BitStack {
    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.0 = (self.0 << 1) | u64::from(bit);
    }

    #[inline]
    pub fn pop(&mut self) {
        self.0 >>= 1;
    }

    /// Pop, folding the popped bit into the new top.
    #[inline]
    pub fn lexpop(&mut self) {
        let top = self.0 & 1;
        self.0 = (self.0 >> 1) | top;
    }

    #[inline]
    pub fn is_set(self) -> bool {
        self.0 & 1 != 0
    }
}
