//! Rube Lexer - context-sensitive scanner for the Rube front end.
//!
//! The scanner cannot run ahead of the parser: whether `/` starts a regexp,
//! `-1` is an argument, or `{` opens a block or a hash depends on what came
//! before. It is pulled one token at a time by the grammar automaton, and
//! keeps a [`ScannerState`] that summarizes the left context.
//!
//! # Example
//!
//! ```
//! use rube_ir::SymbolTable;
//! use rube_lexer::{tokenize, NoLocals, TokenKind};
//!
//! let symbols = SymbolTable::new();
//! let tokens = tokenize("puts 1\n", &symbols, &NoLocals).unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::Identifier, TokenKind::Integer, TokenKind::Newline, TokenKind::Eof]
//! );
//! ```

mod keywords;
mod lex_error;
mod magic_comment;
mod scanner;
mod state;
mod string_term;
mod token;

pub use keywords::{lookup as lookup_keyword, Keyword};
pub use lex_error::{LexError, LexErrorKind, LexWarning, LexWarningKind};
pub use magic_comment::encoding_declaration;
pub use scanner::{tokenize, LexOptions, Lexer, LocalLookup, NoLocals};
pub use state::{next_state, BitStack, ScannerState, StateContext};
pub use string_term::regexp_options;
pub use token::{Token, TokenKind, TokenValue};
