#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rube_ir::{Encoding, Id, SymbolTable};
use rube_lexer_core::StrLines;

use super::*;
use crate::regexp_options::{EXTENDED, IGNORECASE, MULTILINE};
use crate::TokenKind::*;

fn lex(source: &str) -> Vec<Token> {
    let symbols = SymbolTable::new();
    tokenize(source, &symbols, &NoLocals).unwrap()
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

fn values(source: &str) -> Vec<TokenValue> {
    lex(source).into_iter().map(|t| t.value).collect()
}

fn lex_error(source: &str) -> LexError {
    let symbols = SymbolTable::new();
    tokenize(source, &symbols, &NoLocals).unwrap_err()
}

fn str_value(s: &str) -> TokenValue {
    TokenValue::Str(s.as_bytes().to_vec())
}

fn first_value(source: &str) -> TokenValue {
    lex(source).remove(0).value
}

// === Literals and interpolation ===

#[test]
fn test_interpolated_string() {
    let tokens = lex("\"a#{1+1}b\"");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StringBeg,
            StringContent,
            StringDBeg,
            Integer,
            Plus,
            Integer,
            StringDEnd,
            StringContent,
            StringEnd,
            Eof
        ]
    );
    assert_eq!(tokens[1].value, str_value("a"));
    assert_eq!(tokens[7].value, str_value("b"));
}

#[test]
fn test_braces_inside_interpolation() {
    assert_eq!(
        kinds("\"#{ {a: 1} }x\""),
        vec![
            StringBeg,
            StringDBeg,
            LBraceHash,
            Label,
            Integer,
            RBrace,
            StringDEnd,
            StringContent,
            StringEnd,
            Eof
        ]
    );
}

#[test]
fn test_dvar_resumes_literal() {
    assert_eq!(
        kinds("\"a#@b c\""),
        vec![StringBeg, StringContent, StringDVar, IVar, StringContent, StringEnd, Eof]
    );
}

#[test]
fn test_single_quotes_do_not_interpolate() {
    assert_eq!(values("'a#{b}\\n'")[1], str_value("a#{b}\\n"));
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        values(r#""a\tb\x41\101\u00e9\u{263a 41}\M-a\C-a\c?""#)[1],
        TokenValue::Str(
            [&b"a\tbAA"[..], "é".as_bytes(), "☺A".as_bytes(), &[0xe1u8, 0x01, 0x7f][..]].concat()
        )
    );
}

#[test]
fn test_bad_escapes() {
    assert_eq!(lex_error(r#""\xg""#).kind, LexErrorKind::InvalidHexEscape);
    assert_eq!(lex_error(r#""\u12""#).kind, LexErrorKind::InvalidUnicodeEscape);
    assert_eq!(
        lex_error(r#""\u{110000}""#).kind,
        LexErrorKind::UnicodeCodepointTooLarge
    );
    assert_eq!(
        lex_error(r#""\u{41""#).kind,
        LexErrorKind::UnterminatedUnicodeEscape
    );
    assert_eq!(lex_error(r#""\M-\M-a""#).kind, LexErrorKind::InvalidEscape);
}

#[test]
fn test_unterminated_string_reports_opening_line() {
    let err = lex_error("x = 1\n\"abc\n\n");
    assert_eq!(err.kind, LexErrorKind::Unterminated { what: "string" });
    assert_eq!(err.line, 2);
}

#[test]
fn test_percent_words() {
    let tokens = lex("%w(a b  c)");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            QWordsBeg,
            StringContent,
            WordSep,
            StringContent,
            WordSep,
            StringContent,
            WordSep,
            StringEnd,
            Eof
        ]
    );
    assert_eq!(tokens[5].value, str_value("c"));
}

#[test]
fn test_percent_literal_nesting() {
    let tokens = lex("%q(a (b) c)");
    assert_eq!(tokens[1].value, str_value("a (b) c"));
    assert_eq!(tokens[2].kind, StringEnd);
}

#[test]
fn test_unknown_percent_literal() {
    assert_eq!(lex_error("%z(a)").kind, LexErrorKind::UnknownPercentLiteral);
}

#[test]
fn test_regexp_options() {
    let tokens = lex("/ab/mix");
    assert_eq!(tokens[0].kind, RegexpBeg);
    assert_eq!(tokens[1].value, str_value("ab"));
    assert_eq!(tokens[2].kind, RegexpEnd);
    assert_eq!(
        tokens[2].value,
        TokenValue::RegexpOptions(MULTILINE | IGNORECASE | EXTENDED)
    );
    assert_eq!(
        lex_error("/a/q").kind,
        LexErrorKind::UnknownRegexpOption {
            options: "q".into()
        }
    );
}

#[test]
fn test_regexp_escapes_stay_raw() {
    assert_eq!(values(r"/a\d\/\x41/")[1], str_value(r"a\d\/\x41"));
}

#[test]
fn test_symbols() {
    assert_eq!(kinds(":foo"), vec![SymBeg, Identifier, Eof]);
    assert_eq!(
        kinds(":\"a#{b}\""),
        vec![SymBeg, StringContent, StringDBeg, Identifier, StringDEnd, StringEnd, Eof]
    );
}

#[test]
fn test_character_literals() {
    assert_eq!(first_value("?a"), str_value("a"));
    assert_eq!(first_value("?\\n"), str_value("\n"));
    assert_eq!(first_value("?é"), str_value("é"));
    assert_eq!(kinds("c ?a_b : d")[1], Question);
}

#[test]
fn test_question_before_space_warns() {
    let symbols = SymbolTable::new();
    let mut lexer = Lexer::new(StrLines::from("? x"), &symbols, LexOptions::default());
    assert_eq!(lexer.next_token(&NoLocals).unwrap().kind, Question);
    let warnings = lexer.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "invalid character syntax; use ?\\s");
}

// === Numbers ===

#[test]
fn test_integer_forms() {
    assert_eq!(first_value("0x1A"), TokenValue::Int(26));
    assert_eq!(first_value("1_000"), TokenValue::Int(1000));
    assert_eq!(first_value("0b101"), TokenValue::Int(5));
    assert_eq!(first_value("0o17"), TokenValue::Int(15));
    assert_eq!(first_value("017"), TokenValue::Int(15));
    assert_eq!(first_value("0d99"), TokenValue::Int(99));
    assert_eq!(first_value("0"), TokenValue::Int(0));
}

#[test]
fn test_float_forms() {
    assert_eq!(first_value("1.0e10"), TokenValue::Float(1.0e10));
    assert_eq!(first_value("2.5"), TokenValue::Float(2.5));
    assert_eq!(first_value("3e-2"), TokenValue::Float(3e-2));
    assert_eq!(first_value("0.5"), TokenValue::Float(0.5));
}

#[test]
fn test_big_integer_keeps_digits() {
    assert_eq!(
        first_value("99999999999999999999"),
        TokenValue::BigInt {
            digits: "99999999999999999999".into(),
            radix: 10
        }
    );
}

#[test]
fn test_number_errors() {
    assert_eq!(
        lex_error("1__0").kind,
        LexErrorKind::TrailingInNumber { ch: '_' }
    );
    assert_eq!(lex_error("1_").kind, LexErrorKind::TrailingInNumber { ch: '_' });
    assert_eq!(lex_error("1e").kind, LexErrorKind::TrailingInNumber { ch: 'e' });
    assert_eq!(lex_error("08").kind, LexErrorKind::InvalidOctalDigit);
    assert_eq!(lex_error("0x").kind, LexErrorKind::NumericWithoutDigits);
    assert_eq!(
        lex_error("1if").kind,
        LexErrorKind::TrailingIdentifierInNumber { ch: 'i' }
    );
    assert_eq!(lex_error(".5").kind, LexErrorKind::NoLeadingDigitFloat);
}

#[test]
fn test_range_and_method_call_after_integer() {
    assert_eq!(kinds("1..2"), vec![Integer, Dot2, Integer, Eof]);
    assert_eq!(kinds("3.times"), vec![Integer, Dot, Identifier, Eof]);
}

#[test]
fn test_negative_literal_at_expression_start() {
    assert_eq!(kinds("-1"), vec![UMinusNum, Integer, Eof]);
    assert_eq!(kinds("+1"), vec![Integer, Eof]);
}

proptest! {
    #[test]
    fn prop_decimal_integers(n in 0u64..=i64::MAX as u64) {
        let source = n.to_string();
        prop_assert_eq!(first_value(&source), TokenValue::Int(n as i64));
    }

    #[test]
    fn prop_underscore_groups(groups in proptest::collection::vec(1u32..1000, 1..4)) {
        let source = groups
            .iter()
            .enumerate()
            .map(|(i, g)| if i == 0 { g.to_string() } else { format!("{g:03}") })
            .collect::<Vec<_>>()
            .join("_");
        let expected: i64 = source.replace('_', "").parse().unwrap();
        prop_assert_eq!(first_value(&source), TokenValue::Int(expected));
    }
}

// === Heredocs ===

#[test]
fn test_heredoc_resumes_opening_line() {
    let tokens = lex("x = <<EOS + 'tail'\n  body\nEOS\ny\n");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Identifier,
            Assign,
            StringBeg,
            StringContent,
            StringEnd,
            Plus,
            StringBeg,
            StringContent,
            StringEnd,
            Newline,
            Identifier,
            Newline,
            Eof
        ]
    );
    assert_eq!(tokens[3].value, str_value("  body\n"));
    assert_eq!(tokens[7].value, str_value("tail"));
    assert_eq!(tokens[10].line, 4);
}

#[test]
fn test_heredoc_bodies_take_their_own_lines() {
    let tokens = lex("foo(<<A, <<B)\na\nA\nb\nB\n");
    let lines = |kind: TokenKind| -> Vec<u32> {
        tokens
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.line)
            .collect()
    };
    assert_eq!(lines(StringContent), vec![2, 4]);
    assert_eq!(lines(RParen), vec![1]);

    let bodies: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == StringContent)
        .map(|t| t.value.clone())
        .collect();
    assert_eq!(bodies, vec![str_value("a\n"), str_value("b\n")]);
}

#[test]
fn test_heredoc_terminator_must_start_line() {
    assert_eq!(
        values("<<EOS\nbody\n  EOS\nEOS\n")[1],
        str_value("body\n  EOS\n")
    );
    assert_eq!(values("<<-EOS\nbody\n  EOS\n")[1], str_value("body\n"));
}

#[test]
fn test_heredoc_quoted_identifier_is_raw() {
    assert_eq!(values("<<'EOS'\na #{x}\\n\nEOS\n")[1], str_value("a #{x}\\n\n"));
}

#[test]
fn test_heredoc_interpolation() {
    let tokens = lex("<<EOS\na#{b}c\nEOS\n");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StringBeg,
            StringContent,
            StringDBeg,
            Identifier,
            StringDEnd,
            StringContent,
            StringEnd,
            Newline,
            Eof
        ]
    );
    assert_eq!(tokens[5].value, str_value("c\n"));
}

#[test]
fn test_empty_heredoc() {
    assert_eq!(kinds("<<EOS\nEOS\n"), vec![StringBeg, StringEnd, Newline, Eof]);
}

#[test]
fn test_unterminated_heredoc() {
    let err = lex_error("x\n<<EOS\nbody\n");
    assert_eq!(err.kind, LexErrorKind::UnterminatedHeredoc { id: "EOS".into() });
    assert_eq!(err.line, 2);
}

#[test]
fn test_shift_is_not_heredoc() {
    assert_eq!(kinds("a << b"), vec![Identifier, LShift, Identifier, Eof]);
    assert_eq!(kinds("1 <<2"), vec![Integer, LShift, Integer, Eof]);
}

// === Encoding ===

fn encoding_after(source: &str) -> Encoding {
    let symbols = SymbolTable::new();
    let mut lexer = Lexer::new(StrLines::from(source), &symbols, LexOptions::default());
    while lexer.next_token(&NoLocals).unwrap().kind != Eof {}
    lexer.encoding()
}

#[test]
fn test_magic_comment_in_first_two_lines() {
    assert_eq!(encoding_after("\n# coding: shift_jis\nx\n"), Encoding::ShiftJis);
    assert_eq!(encoding_after("# -*- coding: euc-jp -*-\n"), Encoding::EucJp);
    assert_eq!(encoding_after("\n\n# coding: shift_jis\nx\n"), Encoding::Utf8);
    assert_eq!(encoding_after("x # coding: shift_jis\n"), Encoding::Utf8);
}

#[test]
fn test_unknown_encoding() {
    assert_eq!(
        lex_error("# coding: klingon\n").kind,
        LexErrorKind::UnknownEncoding {
            name: "klingon".into()
        }
    );
}

#[test]
fn test_unicode_escape_in_sjis_source() {
    assert_eq!(
        lex_error("# coding: sjis\n\"\\u3042\"\n").kind,
        LexErrorKind::MixedEncoding {
            encoding: "Shift_JIS"
        }
    );
}

// === Context sensitivity ===

#[test]
fn test_minus_after_local_vs_command() {
    let symbols = SymbolTable::new();
    let x = symbols.intern_str("x");
    let is_x = |id: Id| id == x;

    let local: Vec<_> = tokenize("x -1", &symbols, &is_x)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(local, vec![Identifier, Minus, Integer, Eof]);

    let mut lexer = Lexer::new(StrLines::from("x -1"), &symbols, LexOptions::default());
    let mut command = Vec::new();
    loop {
        let token = lexer.next_token(&NoLocals).unwrap();
        command.push(token.kind);
        if token.kind == Eof {
            break;
        }
    }
    assert_eq!(command, vec![Identifier, UMinusNum, Integer, Eof]);
    let warnings = lexer.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].message,
        "ambiguous first argument; put parentheses or even spaces"
    );
}

#[test]
fn test_ambiguity_warnings_need_verbose() {
    let symbols = SymbolTable::new();
    let options = LexOptions {
        verbose: false,
        ..LexOptions::default()
    };
    let mut lexer = Lexer::new(StrLines::from("x -1"), &symbols, options);
    while lexer.next_token(&NoLocals).unwrap().kind != Eof {}
    assert!(lexer.take_warnings().is_empty());
}

#[test]
fn test_keywords_and_modifiers() {
    assert_eq!(kinds("foo if bar"), vec![Identifier, ModifierIf, Identifier, Eof]);
    assert_eq!(kinds("if bar"), vec![KwIf, Identifier, Eof]);
    assert_eq!(kinds("return if x"), vec![KwReturn, ModifierIf, Identifier, Eof]);
    assert_eq!(kinds("x.class"), vec![Identifier, Dot, Identifier, Eof]);
    assert_eq!(
        kinds("a rescue nil"),
        vec![Identifier, ModifierRescue, KwNil, Eof]
    );
}

#[test]
fn test_keyword_as_method_name() {
    let symbols = SymbolTable::new();
    let tokens = tokenize("def end", &symbols, &NoLocals).unwrap();
    assert_eq!(tokens[1].kind, KwEnd);
    assert_eq!(tokens[1].value, TokenValue::Id(symbols.intern_str("end")));
}

#[test]
fn test_setter_method_name() {
    let symbols = SymbolTable::new();
    let tokens = tokenize("def name=(v)", &symbols, &NoLocals).unwrap();
    assert_eq!(tokens[1].kind, Identifier);
    assert_eq!(symbols.name(tokens[1].value.id().unwrap()), Some(&b"name="[..]));
    assert_eq!(tokens[2].kind, LParen);
}

#[test]
fn test_fid_suffixes() {
    let symbols = SymbolTable::new();
    let tokens = tokenize("empty? save! a!=b", &symbols, &NoLocals).unwrap();
    assert_eq!(tokens[0].kind, Fid);
    assert_eq!(tokens[1].kind, Fid);
    assert_eq!(
        tokens[2..].iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![Identifier, Neq, Identifier, Eof]
    );
}

#[test]
fn test_do_follows_condition_stack() {
    let symbols = SymbolTable::new();
    let mut lexer = Lexer::new(StrLines::from("x do"), &symbols, LexOptions::default());
    lexer.next_token(&NoLocals).unwrap();
    lexer.cond_push(true);
    assert_eq!(lexer.next_token(&NoLocals).unwrap().kind, KwDoCond);

    assert_eq!(kinds("foo do"), vec![Identifier, KwDo, Eof]);
}

#[test]
fn test_labels() {
    assert_eq!(
        kinds("foo(a: 1)"),
        vec![Identifier, LParen, Label, Integer, RParen, Eof]
    );
    assert_eq!(kinds("{a: 1}"), vec![LBraceHash, Label, Integer, RBrace, Eof]);
    assert_eq!(
        kinds("a ? b : c"),
        vec![Identifier, Question, Identifier, Colon, Identifier, Eof]
    );
    assert_eq!(kinds("A::B"), vec![Constant, Colon2, Constant, Eof]);
}

#[test]
fn test_brace_disambiguation() {
    assert_eq!(kinds("foo {"), vec![Identifier, LBraceBlock, Eof]);
    assert_eq!(kinds("x = {"), vec![Identifier, Assign, LBraceHash, Eof]);
    assert_eq!(
        kinds("->(x) { x }"),
        vec![Lambda, LParen, Identifier, RParen, LambdaBeg, Identifier, RBrace, Eof]
    );
    assert_eq!(
        kinds("-> do end"),
        vec![Lambda, KwDoLambda, KwEnd, Eof]
    );
}

#[test]
fn test_bracket_forms() {
    assert_eq!(kinds("[1]"), vec![LBrackArray, Integer, RBracket, Eof]);
    assert_eq!(kinds("a[1]"), vec![Identifier, LBracket, Integer, RBracket, Eof]);
    assert_eq!(kinds("def []=(k, v)")[1], Aset);
}

#[test]
fn test_paren_arg_ends_in_endarg() {
    let symbols = SymbolTable::new();
    let mut lexer = Lexer::new(StrLines::from("foo (1) {"), &symbols, LexOptions::default());
    let mut seen = Vec::new();
    loop {
        let token = lexer.next_token(&NoLocals).unwrap();
        seen.push(token.kind);
        if token.kind == RParen {
            assert_eq!(lexer.state(), ScannerState::EndArg);
        }
        if token.kind == Eof {
            break;
        }
    }
    assert_eq!(
        seen,
        vec![Identifier, LParenArg, Integer, RParen, LBraceArg, Eof]
    );
}

#[test]
fn test_variables() {
    assert_eq!(
        kinds("$1 $& $foo $-w @a @@b"),
        vec![NthRef, BackRef, GVar, GVar, IVar, CVar, Eof]
    );
    assert_eq!(
        lex_error("@1").kind,
        LexErrorKind::InvalidInstanceVariable { name: "@1".into() }
    );
    assert_eq!(
        lex_error("@@2").kind,
        LexErrorKind::InvalidClassVariable { name: "@@2".into() }
    );
}

// === Lines and layout ===

#[test]
fn test_leading_dot_continues_chain() {
    assert_eq!(
        kinds("foo\n  .bar\n"),
        vec![Identifier, Dot, Identifier, Newline, Eof]
    );
}

#[test]
fn test_newlines_after_operators_are_skipped() {
    assert_eq!(
        kinds("1 +\n2\n"),
        vec![Integer, Plus, Integer, Newline, Eof]
    );
}

#[test]
fn test_comments_and_continuations() {
    assert_eq!(
        kinds("a # note\nb \\\n  c\n"),
        vec![Identifier, Newline, Identifier, Identifier, Newline, Eof]
    );
}

#[test]
fn test_embedded_document_is_skipped() {
    assert_eq!(
        kinds("=begin\nstuff\n=end\nx\n"),
        vec![Identifier, Newline, Eof]
    );
    assert_eq!(
        lex_error("=begin\nstuff\n").kind,
        LexErrorKind::UnterminatedEmbeddedDocument
    );
}

#[test]
fn test_end_marker_stops_input() {
    let symbols = SymbolTable::new();
    let mut lexer = Lexer::new(
        StrLines::from("x\n__END__\n)))"),
        &symbols,
        LexOptions::default(),
    );
    let mut seen = Vec::new();
    loop {
        let token = lexer.next_token(&NoLocals).unwrap();
        seen.push(token.kind);
        if token.kind == Eof {
            break;
        }
    }
    assert_eq!(seen, vec![Identifier, Newline, Eof]);
    assert!(lexer.end_marker_seen());
}

#[test]
fn test_token_lines() {
    let tokens = lex("a\n\nb\n");
    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[1].line, 1);
    assert_eq!(tokens[2].line, 3);
}

#[test]
fn test_start_line_option() {
    let symbols = SymbolTable::new();
    let options = LexOptions {
        start_line: 10,
        ..LexOptions::default()
    };
    let mut lexer = Lexer::new(StrLines::from("\nx"), &symbols, options);
    assert_eq!(lexer.next_token(&NoLocals).unwrap().line, 11);
}

// === Errors ===

#[test]
fn test_errors_are_sticky() {
    let symbols = SymbolTable::new();
    let mut lexer = Lexer::new(StrLines::from("a @1 b"), &symbols, LexOptions::default());
    assert_eq!(lexer.next_token(&NoLocals).unwrap().kind, Identifier);
    let first = lexer.next_token(&NoLocals).unwrap_err();
    let second = lexer.next_token(&NoLocals).unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn test_invalid_characters() {
    assert_eq!(
        lex_error("a \u{1}").kind,
        LexErrorKind::InvalidChar { byte: 0x01 }
    );
    assert_eq!(
        lex_error("a \\ b").kind,
        LexErrorKind::InvalidChar { byte: b'\\' }
    );
}

#[test]
fn test_eof_repeats() {
    let symbols = SymbolTable::new();
    let mut lexer = Lexer::new(StrLines::from(""), &symbols, LexOptions::default());
    assert_eq!(lexer.next_token(&NoLocals).unwrap().kind, Eof);
    assert_eq!(lexer.next_token(&NoLocals).unwrap().kind, Eof);
}
