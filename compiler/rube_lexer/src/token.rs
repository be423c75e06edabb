//! Token kinds and values produced by the scanner.

use std::fmt;

use rube_ir::{op, Id, Span};

/// Closed set of token kinds handed to the grammar automaton.
///
/// Names follow the role a token plays, not its spelling: `(` is
/// [`LParenBeg`](TokenKind::LParenBeg) at the start of an expression,
/// [`LParenArg`](TokenKind::LParenArg) after a command name and a space, and
/// [`LParen`](TokenKind::LParen) for a call's argument list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // Keywords
    KwClass,
    KwModule,
    KwDef,
    KwUndef,
    KwBegin,
    KwRescue,
    KwEnsure,
    KwEnd,
    KwIf,
    KwUnless,
    KwThen,
    KwElsif,
    KwElse,
    KwCase,
    KwWhen,
    KwWhile,
    KwUntil,
    KwFor,
    KwBreak,
    KwNext,
    KwRedo,
    KwRetry,
    KwIn,
    KwDo,
    /// `do` closing a `while`/`until`/`for` condition.
    KwDoCond,
    /// `do` opening a block attached to a command call.
    KwDoBlock,
    /// `do` opening a `->` lambda body.
    KwDoLambda,
    KwReturn,
    KwYield,
    KwSuper,
    KwSelf,
    KwNil,
    KwTrue,
    KwFalse,
    KwAnd,
    KwOr,
    KwNot,
    KwAlias,
    KwDefined,
    /// `BEGIN`
    KwPreExe,
    /// `END`
    KwPostExe,
    /// `__LINE__`
    KwLine,
    /// `__FILE__`
    KwFile,
    /// `__ENCODING__`
    KwEncoding,
    ModifierIf,
    ModifierUnless,
    ModifierWhile,
    ModifierUntil,
    ModifierRescue,

    // Names
    Identifier,
    /// Method name ending in `!` or `?`.
    Fid,
    GVar,
    IVar,
    CVar,
    Constant,
    /// `name:` in argument position.
    Label,

    // Literal pieces
    Integer,
    Float,
    StringContent,
    /// `?c`
    Char,
    /// `$1`
    NthRef,
    /// `$&`
    BackRef,
    RegexpEnd,
    StringBeg,
    XStringBeg,
    RegexpBeg,
    /// `%W(`
    WordsBeg,
    /// `%w(`
    QWordsBeg,
    SymBeg,
    /// `#{` inside a literal.
    StringDBeg,
    /// `#` before `@ivar`/`$gvar` inside a literal.
    StringDVar,
    /// `}` closing an embedded expression.
    StringDEnd,
    StringEnd,
    /// Separator between words of a word list.
    WordSep,

    // Multi-character operators
    UPlus,
    UMinus,
    /// `-` directly before a numeric literal in value position.
    UMinusNum,
    Pow,
    Cmp,
    Eq,
    Eqq,
    Neq,
    Geq,
    Leq,
    AndOp,
    OrOp,
    Match,
    NMatch,
    Dot2,
    Dot3,
    /// `[]` as a method name.
    Aref,
    /// `[]=` as a method name.
    Aset,
    LShift,
    RShift,
    Colon2,
    /// `::` at the start of an expression.
    Colon3,
    /// Compound assignment; the value carries the operator id.
    OpAsgn,
    /// `=>`
    Assoc,
    /// `->`
    Lambda,
    /// `{` opening a lambda body.
    LambdaBeg,

    // Single-character operators and punctuation
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Pipe,
    Caret,
    Amp,
    Bang,
    Tilde,
    Assign,
    Question,
    Colon,
    Comma,
    Dot,
    Semicolon,
    /// `` ` `` as a method name.
    Backtick,
    /// Splat `*`.
    Splat,
    /// Block-pass `&`.
    Amper,
    /// `(` starting a grouped expression.
    LParenBeg,
    /// `(` after a command name and a space.
    LParenArg,
    /// `(` of a call's argument list.
    LParen,
    RParen,
    /// `[` starting an array literal.
    LBrackArray,
    /// `[` of an index expression.
    LBracket,
    RBracket,
    /// `{` starting a hash literal.
    LBraceHash,
    /// `{` starting a block.
    LBraceBlock,
    /// `{` after a parenthesized command argument.
    LBraceArg,
    RBrace,

    Newline,
    Eof,
}

impl TokenKind {
    /// Whether this is one of the reserved words (modifier forms included).
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            KwClass
                | KwModule
                | KwDef
                | KwUndef
                | KwBegin
                | KwRescue
                | KwEnsure
                | KwEnd
                | KwIf
                | KwUnless
                | KwThen
                | KwElsif
                | KwElse
                | KwCase
                | KwWhen
                | KwWhile
                | KwUntil
                | KwFor
                | KwBreak
                | KwNext
                | KwRedo
                | KwRetry
                | KwIn
                | KwDo
                | KwDoCond
                | KwDoBlock
                | KwDoLambda
                | KwReturn
                | KwYield
                | KwSuper
                | KwSelf
                | KwNil
                | KwTrue
                | KwFalse
                | KwAnd
                | KwOr
                | KwNot
                | KwAlias
                | KwDefined
                | KwPreExe
                | KwPostExe
                | KwLine
                | KwFile
                | KwEncoding
                | ModifierIf
                | ModifierUnless
                | ModifierWhile
                | ModifierUntil
                | ModifierRescue
        )
    }

    /// Tokens that only occur while a literal is being scanned.
    pub fn is_literal_piece(self) -> bool {
        matches!(
            self,
            TokenKind::StringContent
                | TokenKind::StringDBeg
                | TokenKind::StringDVar
                | TokenKind::WordSep
                | TokenKind::StringEnd
                | TokenKind::RegexpEnd
        )
    }

    /// The method id a binary or unary operator token dispatches to.
    pub fn operator_id(self) -> Option<Id> {
        use TokenKind::*;
        let id = match self {
            Plus => op::PLUS,
            Minus => op::MINUS,
            Mul => op::MUL,
            Div => op::DIV,
            Mod => op::MOD,
            Pow => op::POW,
            Eq => op::EQ,
            Eqq => op::EQQ,
            Neq => op::NEQ,
            Match => op::MATCH,
            NMatch => op::NMATCH,
            Cmp => op::CMP,
            Lt => op::LT,
            Leq => op::LEQ,
            Gt => op::GT,
            Geq => op::GEQ,
            LShift => op::LSHIFT,
            RShift => op::RSHIFT,
            Amp => op::AND,
            Pipe => op::OR,
            Caret => op::XOR,
            Tilde => op::NEG,
            Bang => op::NOT,
            UPlus => op::UPLUS,
            UMinus => op::UMINUS,
            Aref => op::AREF,
            Aset => op::ASET,
            Backtick => op::BACKTICK,
            Dot2 => op::DOT2,
            Dot3 => op::DOT3,
            AndOp => op::ANDOP,
            OrOp => op::OROP,
            _ => return None,
        };
        Some(id)
    }

    /// Human-readable name for diagnostics and token dumps.
    pub fn display_name(self) -> &'static str {
        use TokenKind::*;
        match self {
            KwClass => "class",
            KwModule => "module",
            KwDef => "def",
            KwUndef => "undef",
            KwBegin => "begin",
            KwRescue => "rescue",
            KwEnsure => "ensure",
            KwEnd => "end",
            KwIf => "if",
            KwUnless => "unless",
            KwThen => "then",
            KwElsif => "elsif",
            KwElse => "else",
            KwCase => "case",
            KwWhen => "when",
            KwWhile => "while",
            KwUntil => "until",
            KwFor => "for",
            KwBreak => "break",
            KwNext => "next",
            KwRedo => "redo",
            KwRetry => "retry",
            KwIn => "in",
            KwDo => "do",
            KwDoCond => "do (condition)",
            KwDoBlock => "do (block)",
            KwDoLambda => "do (lambda)",
            KwReturn => "return",
            KwYield => "yield",
            KwSuper => "super",
            KwSelf => "self",
            KwNil => "nil",
            KwTrue => "true",
            KwFalse => "false",
            KwAnd => "and",
            KwOr => "or",
            KwNot => "not",
            KwAlias => "alias",
            KwDefined => "defined?",
            KwPreExe => "BEGIN",
            KwPostExe => "END",
            KwLine => "__LINE__",
            KwFile => "__FILE__",
            KwEncoding => "__ENCODING__",
            ModifierIf => "if (modifier)",
            ModifierUnless => "unless (modifier)",
            ModifierWhile => "while (modifier)",
            ModifierUntil => "until (modifier)",
            ModifierRescue => "rescue (modifier)",
            Identifier => "identifier",
            Fid => "method name",
            GVar => "global variable",
            IVar => "instance variable",
            CVar => "class variable",
            Constant => "constant",
            Label => "label",
            Integer => "integer literal",
            Float => "float literal",
            StringContent => "string content",
            Char => "character literal",
            NthRef => "nth reference",
            BackRef => "back reference",
            RegexpEnd => "end of regexp",
            StringBeg => "string begin",
            XStringBeg => "command string begin",
            RegexpBeg => "regexp begin",
            WordsBeg => "%W",
            QWordsBeg => "%w",
            SymBeg => "symbol begin",
            StringDBeg => "#{",
            StringDVar => "#",
            StringDEnd => "} (interpolation)",
            StringEnd => "string end",
            WordSep => "word separator",
            UPlus => "unary +",
            UMinus => "unary -",
            UMinusNum => "unary - (numeric)",
            Pow => "**",
            Cmp => "<=>",
            Eq => "==",
            Eqq => "===",
            Neq => "!=",
            Geq => ">=",
            Leq => "<=",
            AndOp => "&&",
            OrOp => "||",
            Match => "=~",
            NMatch => "!~",
            Dot2 => "..",
            Dot3 => "...",
            Aref => "[]",
            Aset => "[]=",
            LShift => "<<",
            RShift => ">>",
            Colon2 => "::",
            Colon3 => ":: (top level)",
            OpAsgn => "operator assignment",
            Assoc => "=>",
            Lambda => "->",
            LambdaBeg => "{ (lambda)",
            Plus => "+",
            Minus => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Lt => "<",
            Gt => ">",
            Pipe => "|",
            Caret => "^",
            Amp => "&",
            Bang => "!",
            Tilde => "~",
            Assign => "=",
            Question => "?",
            Colon => ":",
            Comma => ",",
            Dot => ".",
            Semicolon => ";",
            Backtick => "`",
            Splat => "* (splat)",
            Amper => "& (block pass)",
            LParenBeg => "( (group)",
            LParenArg => "( (argument)",
            LParen => "(",
            RParen => ")",
            LBrackArray => "[ (array)",
            LBracket => "[",
            RBracket => "]",
            LBraceHash => "{ (hash)",
            LBraceBlock => "{ (block)",
            LBraceArg => "{ (argument block)",
            RBrace => "}",
            Newline => "newline",
            Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Semantic value attached to a token.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    /// Interned name: identifiers, variables, labels, keywords in method-name
    /// position, and the operator of an [`OpAsgn`](TokenKind::OpAsgn).
    Id(Id),
    Int(i64),
    /// Integer literal that does not fit in `i64`, kept as its digits.
    BigInt { digits: String, radix: u8 },
    Float(f64),
    Str(Vec<u8>),
    /// Option bits of a finished regexp (see [`regexp_options`](crate::regexp_options)).
    RegexpOptions(u32),
    NthRef(u32),
    BackRef(u8),
}

impl TokenValue {
    pub fn id(&self) -> Option<Id> {
        match self {
            TokenValue::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            TokenValue::Str(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// One scanned token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// 1-based line the token starts on.
    pub line: u32,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, line: u32, span: Span) -> Self {
        Token {
            kind,
            value,
            line,
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_ids() {
        assert_eq!(TokenKind::Plus.operator_id(), Some(op::PLUS));
        assert_eq!(TokenKind::Aset.operator_id(), Some(op::ASET));
        assert_eq!(TokenKind::Bang.operator_id(), Some(op::NOT));
        assert_eq!(TokenKind::Comma.operator_id(), None);
    }

    #[test]
    fn test_keyword_classification() {
        assert!(TokenKind::ModifierRescue.is_keyword());
        assert!(TokenKind::KwDoLambda.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(TokenKind::WordSep.is_literal_piece());
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::Cmp.to_string(), "<=>");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
