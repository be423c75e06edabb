//! Reserved words.
//!
//! Lookup is length-bucketed: reserved words are 2-12 bytes long, so most
//! identifiers are rejected on length alone before any comparison.
//!
//! Five keywords have a modifier form (`x if c`). The modifier is chosen
//! when the keyword appears anywhere but the start of an expression.

use crate::{ScannerState, TokenKind};

/// A reserved word and its modifier form, when it has one.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Keyword {
    pub kind: TokenKind,
    pub modifier: Option<TokenKind>,
}

const fn kw(kind: TokenKind) -> Option<Keyword> {
    Some(Keyword {
        kind,
        modifier: None,
    })
}

const fn kw_mod(kind: TokenKind, modifier: TokenKind) -> Option<Keyword> {
    Some(Keyword {
        kind,
        modifier: Some(modifier),
    })
}

/// Look up a reserved word by spelling.
#[inline]
pub fn lookup(text: &[u8]) -> Option<Keyword> {
    use TokenKind::*;

    let len = text.len();
    if !(2..=12).contains(&len) {
        return None;
    }
    if !text[0].is_ascii_alphabetic() && text[0] != b'_' {
        return None;
    }

    match len {
        2 => match text {
            b"do" => kw(KwDo),
            b"if" => kw_mod(KwIf, ModifierIf),
            b"in" => kw(KwIn),
            b"or" => kw(KwOr),
            _ => None,
        },
        3 => match text {
            b"and" => kw(KwAnd),
            b"def" => kw(KwDef),
            b"end" => kw(KwEnd),
            b"for" => kw(KwFor),
            b"nil" => kw(KwNil),
            b"not" => kw(KwNot),
            b"END" => kw(KwPostExe),
            _ => None,
        },
        4 => match text {
            b"case" => kw(KwCase),
            b"else" => kw(KwElse),
            b"next" => kw(KwNext),
            b"redo" => kw(KwRedo),
            b"self" => kw(KwSelf),
            b"then" => kw(KwThen),
            b"true" => kw(KwTrue),
            b"when" => kw(KwWhen),
            _ => None,
        },
        5 => match text {
            b"alias" => kw(KwAlias),
            b"begin" => kw(KwBegin),
            b"break" => kw(KwBreak),
            b"class" => kw(KwClass),
            b"elsif" => kw(KwElsif),
            b"false" => kw(KwFalse),
            b"retry" => kw(KwRetry),
            b"super" => kw(KwSuper),
            b"undef" => kw(KwUndef),
            b"until" => kw_mod(KwUntil, ModifierUntil),
            b"while" => kw_mod(KwWhile, ModifierWhile),
            b"yield" => kw(KwYield),
            b"BEGIN" => kw(KwPreExe),
            _ => None,
        },
        6 => match text {
            b"ensure" => kw(KwEnsure),
            b"module" => kw(KwModule),
            b"rescue" => kw_mod(KwRescue, ModifierRescue),
            b"return" => kw(KwReturn),
            b"unless" => kw_mod(KwUnless, ModifierUnless),
            _ => None,
        },
        8 => match text {
            b"defined?" => kw(KwDefined),
            b"__LINE__" => kw(KwLine),
            b"__FILE__" => kw(KwFile),
            _ => None,
        },
        12 => match text {
            b"__ENCODING__" => kw(KwEncoding),
            _ => None,
        },
        _ => None,
    }
}

/// State entered after a keyword token; `None` for non-keywords.
pub fn keyword_state(kind: TokenKind) -> Option<ScannerState> {
    use ScannerState as S;
    use TokenKind::*;

    let state = match kind {
        KwEnd | KwSelf | KwNil | KwTrue | KwFalse | KwRedo | KwRetry | KwLine | KwFile
        | KwEncoding | KwPreExe | KwPostExe => S::End,
        KwDo | KwDoCond | KwDoBlock | KwDoLambda | KwThen | KwElse | KwEnsure | KwBegin => {
            S::Begin
        }
        KwCase | KwIf | KwUnless | KwElsif | KwModule | KwFor | KwUntil | KwWhile | KwWhen
        | KwAnd | KwOr | KwIn => S::Value,
        KwDef | KwAlias | KwUndef => S::FName,
        KwRescue | KwReturn | KwBreak | KwNext => S::Mid,
        KwClass => S::Class,
        KwYield | KwSuper | KwDefined | KwNot => S::Arg,
        ModifierIf | ModifierUnless | ModifierWhile | ModifierUntil | ModifierRescue => S::Begin,
        _ => return None,
    };
    Some(state)
}
