//! `rubec lex`: dump the token stream and the scanner's diagnostics.
//!
//! Tokens are pulled through a [`Parser`] exactly as the grammar automaton
//! would, minus the reductions: no locals are ever declared, so `x -1`
//! always scans as a command call here.

use std::fs::File;
use std::io::{self, BufReader, Write};

use rube_diagnostic::emitter::{DiagnosticEmitter, TextEmitter};
use rube_ir::SymbolTable;
use rube_lexer::{Token, TokenKind, TokenValue};
use rube_lexer_core::{LineSource, ReaderLines};
use rube_parse::{ParseOptions, Parser};

/// Options of the `lex` command.
#[derive(Clone, Debug)]
pub struct LexFlags {
    /// Report verbose-only warnings.
    pub verbose: bool,
    /// Print byte spans.
    pub spans: bool,
}

impl Default for LexFlags {
    fn default() -> Self {
        LexFlags {
            verbose: true,
            spans: false,
        }
    }
}

/// One output line for `token`.
pub fn format_token(token: &Token, symbols: &SymbolTable, spans: bool) -> String {
    let mut out = format!("{}:{:?}", token.line, token.kind);
    let value = match &token.value {
        TokenValue::None => None,
        TokenValue::Id(id) => Some(symbols.display(*id)),
        TokenValue::Int(v) => Some(v.to_string()),
        TokenValue::BigInt { digits, radix } => Some(format!("{digits} (base {radix})")),
        TokenValue::Float(v) => Some(format!("{v:?}")),
        TokenValue::Str(bytes) => Some(format!("{:?}", String::from_utf8_lossy(bytes))),
        TokenValue::RegexpOptions(bits) => Some(format!("options=0x{bits:x}")),
        TokenValue::NthRef(n) => Some(format!("${n}")),
        TokenValue::BackRef(c) => Some(format!("${}", char::from(*c))),
    };
    if let Some(value) = value {
        out.push(' ');
        out.push_str(&value);
    }
    if spans {
        out.push_str(&format!(" @{}..{}", token.span.start, token.span.end));
    }
    out
}

/// Scan `source`, writing tokens to `out` and diagnostics to `err`.
///
/// Returns `Ok(false)` when any error was reported.
pub fn lex_source<S: LineSource>(
    source: S,
    file: &str,
    flags: &LexFlags,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<bool> {
    let symbols = SymbolTable::new();
    let options = ParseOptions {
        file_name: file.to_owned(),
        verbose: flags.verbose,
        ..ParseOptions::default()
    };
    let mut parser = Parser::new(source, &symbols, options);

    let mut count = 0usize;
    while let Ok(token) = parser.next_token() {
        writeln!(out, "{}", format_token(&token, &symbols, flags.spans))?;
        count += 1;
        if token.kind == TokenKind::Eof {
            break;
        }
    }
    tracing::debug!(file, tokens = count, "lex finished");

    let result = parser.finish(None);
    let errors = result.errors().count();
    let warnings = result.warnings().count();
    let mut emitter = TextEmitter::new(err, file);
    emitter.emit_all(&result.diagnostics)?;
    emitter.emit_summary(errors, warnings)?;
    Ok(result.is_ok())
}

/// `rubec lex <path>`; returns false on any failure.
pub fn lex_file(path: &str, flags: &LexFlags) -> bool {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            let msg = match e.kind() {
                io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            return false;
        }
    };
    let source = ReaderLines::new(BufReader::new(file));
    let stdout = io::stdout();
    let stderr = io::stderr();
    match lex_source(source, path, flags, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(ok) => ok,
        Err(e) => {
            eprintln!("error writing output: {e}");
            false
        }
    }
}
