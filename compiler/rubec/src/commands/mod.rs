//! CLI commands.

mod lex;

pub use lex::{format_token, lex_file, lex_source, LexFlags};
