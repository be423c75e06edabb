//! Rube Parse - everything the grammar automaton calls into.
//!
//! - [`Scopes`]: local-variable scopes, method scopes versus block scopes
//! - [`Builder`]: one node constructor per grammar production, with the
//!   semantic checks that go with it
//! - [`Parser`]: scanner, scopes, arena and diagnostics of one parse, behind
//!   the interface the automaton drives
//!
//! # Example
//!
//! ```
//! use rube_ir::{NodeKind, SymbolTable};
//! use rube_lexer::TokenKind;
//! use rube_lexer_core::StrLines;
//! use rube_parse::{ParseOptions, Parser};
//!
//! let symbols = SymbolTable::new();
//! let mut parser = Parser::new(StrLines::from("42\n"), &symbols, ParseOptions::default());
//! let token = parser.next_token().unwrap();
//! assert_eq!(token.kind, TokenKind::Integer);
//! let lit = parser.builder_mut().new_numeric(&token.value);
//!
//! let result = parser.finish(Some(lit));
//! assert!(result.is_ok());
//! assert!(matches!(result.arena.kind(result.root.unwrap()), NodeKind::Scope { .. }));
//! ```

pub mod builder;
mod parser;
pub mod scope;

pub use builder::Builder;
pub use parser::{
    lex_error_code, lex_error_to_diagnostic, lex_warning_to_diagnostic, ParseOptions, ParseResult,
    Parser,
};
pub use scope::{
    Declared, Resolution, RuntimeBinding, ScopeError, ScopeId, ScopeKind, ScopeLink, ScopeRecord,
    Scopes,
};
