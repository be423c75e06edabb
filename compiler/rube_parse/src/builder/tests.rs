#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use rube_diagnostic::{Diagnostic, ErrorCode};
use rube_ir::{op, Encoding, Id, NodeId, NodeKind, Params, SymbolTable};

use super::Builder;

fn builder(symbols: &SymbolTable) -> Builder<'_> {
    let mut b = Builder::new(symbols, "t.rb", Encoding::Utf8, true);
    b.scopes_mut().open_top_scope(None);
    b
}

fn diags(b: &Builder<'_>) -> Vec<Diagnostic> {
    b.diagnostics().peek().cloned().collect()
}

fn count(b: &Builder<'_>, code: ErrorCode) -> usize {
    b.diagnostics().peek().filter(|d| d.code == code).count()
}

fn str_of(b: &Builder<'_>, node: NodeId) -> Vec<u8> {
    match b.kind(node) {
        NodeKind::Str(s) => b.arena().str(s).to_vec(),
        other => panic!("expected Str, got {other:?}"),
    }
}

// ===== Variables and scopes =====

/// `x = 1; collection.each { |x| x }`
#[test]
fn test_block_param_shadows_outer_local() {
    let symbols = SymbolTable::new();
    let [x, collection, each] = ["x", "collection", "each"].map(|n| symbols.intern_str(n));
    let mut b = builder(&symbols);

    let one = b.new_int(1);
    let asgn = b.assignable(x, None);
    b.node_assign(asgn, one);
    assert_eq!(
        b.kind(asgn),
        NodeKind::LAsgn {
            id: x,
            value: Some(one)
        }
    );
    let before = b.gettable(x);
    assert_eq!(b.kind(before), NodeKind::LVar(x));

    let recv = b.gettable(collection);
    assert_eq!(b.kind(recv), NodeKind::VCall(collection));
    let call = b.new_call(recv, each, None);

    b.open_block();
    b.declare_arg(x);
    let inner = b.gettable(x);
    assert_eq!(b.kind(inner), NodeKind::DVar(x));
    let params = b.new_args(Params {
        required: vec![x],
        ..Params::default()
    });
    let iter = b.new_iter(Some(params), Some(inner));
    let iter = b.method_add_block(call, iter);

    let NodeKind::Iter { call: got, scope } = b.kind(iter) else {
        panic!("expected Iter, got {:?}", b.kind(iter));
    };
    assert_eq!(got, call);
    let NodeKind::Scope { locals, body, .. } = b.kind(scope) else {
        panic!("expected Scope");
    };
    assert_eq!(b.arena().table(locals), &[x]);
    assert_eq!(body, Some(inner));

    assert_eq!(count(&b, ErrorCode::W1001), 1);
    let after = b.gettable(x);
    assert_eq!(b.kind(after), NodeKind::LVar(x));
}

/// `def m(a); b = a; collection.each { b }; end`
#[test]
fn test_method_locals_visible_in_block_not_after_end() {
    let symbols = SymbolTable::new();
    let [m, a, bv, collection, each] =
        ["m", "a", "b", "collection", "each"].map(|n| symbols.intern_str(n));
    let mut b = builder(&symbols);

    b.open_def();
    assert!(b.in_def());
    b.declare_arg(a);
    let read_a = b.gettable(a);
    assert_eq!(b.kind(read_a), NodeKind::LVar(a));
    let asgn = b.assignable(bv, None);
    b.node_assign(asgn, read_a);

    let recv = b.gettable(collection);
    let call = b.new_call(recv, each, None);
    b.open_block();
    let in_block = b.gettable(bv);
    assert_eq!(b.kind(in_block), NodeKind::LVar(bv));
    let iter = b.new_iter(None, Some(in_block));
    let iter = b.method_add_block(call, iter);

    let body = b.block_append(Some(asgn), Some(iter));
    let params = b.new_args(Params {
        required: vec![a],
        ..Params::default()
    });
    let defn = b.new_defn(m, Some(params), body);
    assert!(!b.in_def());

    let NodeKind::Defn { mid, scope } = b.kind(defn) else {
        panic!("expected Defn");
    };
    assert_eq!(mid, m);
    let NodeKind::Scope { locals, .. } = b.kind(scope) else {
        panic!("expected Scope");
    };
    assert_eq!(b.arena().table(locals), &[a, bv]);

    let after = b.gettable(bv);
    assert_eq!(b.kind(after), NodeKind::VCall(bv));
    assert!(diags(&b).is_empty());
}

#[test]
fn test_duplicate_parameter_reported_once() {
    let symbols = SymbolTable::new();
    let a = symbols.intern_str("a");
    let mut b = builder(&symbols);

    b.open_def();
    b.declare_arg(a);
    b.declare_arg(a);
    assert_eq!(count(&b, ErrorCode::E2001), 1);
    assert_eq!(diags(&b)[0].message, "duplicated argument name");
}

#[test]
fn test_same_error_from_two_methods_on_one_line() {
    let symbols = SymbolTable::new();
    let [x, y] = ["x", "y"].map(|n| symbols.intern_str(n));
    let mut b = builder(&symbols);

    // def x(x, x); end; def y(y, y); end
    for name in [x, y] {
        b.open_def();
        b.declare_arg(name);
        b.declare_arg(name);
        b.new_defn(name, None, None);
    }
    assert_eq!(count(&b, ErrorCode::E2001), 2);
    assert!(diags(&b).iter().all(|d| d.line == 1));
}

#[test]
fn test_underscore_params_may_repeat() {
    let symbols = SymbolTable::new();
    let underscore = symbols.intern_str("_");
    let mut b = builder(&symbols);

    b.open_block();
    b.declare_arg(underscore);
    b.declare_arg(underscore);
    assert!(diags(&b).is_empty());
}

#[test]
fn test_formal_argument_must_be_local() {
    let symbols = SymbolTable::new();
    let ivar = symbols.intern_str("@a");
    let mut b = builder(&symbols);

    b.open_def();
    b.declare_arg(ivar);
    assert_eq!(count(&b, ErrorCode::E2002), 1);
}

#[test]
fn test_pseudo_variables() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);
    b.set_line(7);

    let line = b.gettable(symbols.intern_str("__LINE__"));
    assert_eq!(b.kind(line), NodeKind::Int(7));
    let file = b.gettable(symbols.intern_str("__FILE__"));
    assert_eq!(str_of(&b, file), b"t.rb");
    let enc = b.gettable(symbols.intern_str("__ENCODING__"));
    assert_eq!(b.kind(enc), NodeKind::EncodingLit(Encoding::Utf8));
    let this = b.gettable(symbols.intern_str("self"));
    assert_eq!(b.kind(this), NodeKind::SelfRef);
}

#[test]
fn test_pseudo_variable_assignment_is_an_error() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let node = b.assignable(symbols.intern_str("self"), None);
    assert_eq!(b.kind(node), NodeKind::Error);
    let node = b.assignable(symbols.intern_str("nil"), None);
    assert_eq!(b.kind(node), NodeKind::Error);

    let messages: Vec<_> = diags(&b).into_iter().map(|d| (d.code, d.message)).collect();
    assert_eq!(
        messages,
        vec![
            (ErrorCode::E2004, "Can't change the value of self".to_owned()),
            (ErrorCode::E2004, "Can't assign to nil".to_owned()),
        ]
    );
}

#[test]
fn test_dynamic_constant_assignment() {
    let symbols = SymbolTable::new();
    let foo = symbols.intern_str("Foo");
    let mut b = builder(&symbols);

    let top = b.assignable(foo, None);
    assert!(matches!(b.kind(top), NodeKind::CDecl { id, .. } if id == foo));

    b.open_def();
    let inside = b.assignable(foo, None);
    assert_eq!(b.kind(inside), NodeKind::Error);
    assert_eq!(count(&b, ErrorCode::E2003), 1);
}

#[test]
fn test_backref_assignment_is_an_error() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);
    let nth = b.new_nth_ref(1);
    b.backref_assign(nth);
    assert_eq!(diags(&b)[0].message, "Can't set variable $1");
}

#[test]
fn test_or_assign() {
    let symbols = SymbolTable::new();
    let x = symbols.intern_str("x");
    let mut b = builder(&symbols);

    let lhs = b.assignable(x, None);
    let one = b.new_int(1);
    let node = b.new_op_assign(lhs, op::OROP, one);
    let NodeKind::OpAsgnOr { head, value } = b.kind(node) else {
        panic!("expected OpAsgnOr, got {:?}", b.kind(node));
    };
    assert_eq!(b.kind(head), NodeKind::LVar(x));
    assert_eq!(value, lhs);
    assert_eq!(
        b.kind(lhs),
        NodeKind::LAsgn {
            id: x,
            value: Some(one)
        }
    );
}

#[test]
fn test_plus_assign_calls_operator() {
    let symbols = SymbolTable::new();
    let x = symbols.intern_str("x");
    let mut b = builder(&symbols);

    let lhs = b.assignable(x, None);
    let one = b.new_int(1);
    b.new_op_assign(lhs, op::PLUS, one);
    let NodeKind::LAsgn {
        value: Some(value), ..
    } = b.kind(lhs)
    else {
        panic!("expected LAsgn");
    };
    let NodeKind::Call { recv, mid, .. } = b.kind(value) else {
        panic!("expected Call");
    };
    assert_eq!(mid, op::PLUS);
    assert_eq!(b.kind(recv), NodeKind::LVar(x));
}

#[test]
fn test_attr_assign_on_self_drops_receiver() {
    let symbols = SymbolTable::new();
    let foo = symbols.intern_str("foo");
    let mut b = builder(&symbols);

    let this = b.gettable(symbols.intern_str("self"));
    let target = b.new_attr_assign(this, foo);
    let one = b.new_int(1);
    b.node_assign(target, one);
    let NodeKind::AttrAsgn { recv, mid, args } = b.kind(target) else {
        panic!("expected AttrAsgn");
    };
    assert_eq!(recv, None);
    assert_eq!(mid, symbols.attrset(foo));
    let NodeKind::Array(list) = b.kind(args.unwrap()) else {
        panic!("expected Array");
    };
    assert_eq!(b.arena().list(list), &[one]);
}

// ===== Literals =====

#[test]
fn test_literal_concat_merges_text() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let a = b.new_str(*b"a");
    let bb = b.new_str(*b"b");
    let joined = b.literal_concat(Some(a), Some(bb)).unwrap();
    assert_eq!(str_of(&b, joined), b"ab");
}

/// `"a#{x}c"`
#[test]
fn test_literal_concat_interpolation() {
    let symbols = SymbolTable::new();
    let x = symbols.intern_str("x");
    let mut b = builder(&symbols);

    let a = b.new_str(*b"a");
    let read = b.gettable(x);
    let ev = b.new_evstr(Some(read));
    let c = b.new_str(*b"c");
    let head = b.literal_concat(Some(a), Some(ev));
    let node = b.literal_concat(head, Some(c)).unwrap();

    let NodeKind::DStr { head, parts } = b.kind(node) else {
        panic!("expected DStr, got {:?}", b.kind(node));
    };
    assert_eq!(b.arena().str(head), b"a");
    assert_eq!(b.arena().list(parts), &[ev, c]);
    assert_eq!(b.kind(ev), NodeKind::EvStr(Some(read)));
}

#[test]
fn test_evstr_of_literal_passes_through() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);
    let s = b.new_str(*b"lit");
    assert_eq!(b.new_evstr(Some(s)), s);
}

#[test]
fn test_dsym_interns_static_content() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let s = b.new_str(*b"name");
    let sym = b.new_dsym(Some(s));
    assert_eq!(b.kind(sym), NodeKind::Sym(symbols.intern_str("name")));

    let empty = b.new_str(Vec::new());
    let sym = b.new_dsym(Some(empty));
    assert_eq!(b.kind(sym), NodeKind::Error);
    assert_eq!(diags(&b)[0].message, "empty symbol literal");
}

#[test]
fn test_negate_lit() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let five = b.new_int(5);
    b.negate_lit(five);
    assert_eq!(b.kind(five), NodeKind::Int(-5));

    let big = b.new_bignum("9223372036854775808", 10);
    b.negate_lit(big);
    assert_eq!(b.kind(big), NodeKind::Int(i64::MIN));

    let min = b.new_int(i64::MIN);
    b.negate_lit(min);
    let NodeKind::BigInt {
        digits, negative, ..
    } = b.kind(min)
    else {
        panic!("expected BigInt");
    };
    assert!(!negative);
    assert_eq!(b.arena().str(digits), b"9223372036854775808");

    let f = b.new_float(1.5);
    b.negate_lit(f);
    assert_eq!(b.kind(f), NodeKind::Float((-1.5f64).to_bits()));
}

#[test]
fn test_empty_words_is_zarray() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);
    let words = b.new_words(&[]);
    assert_eq!(b.kind(words), NodeKind::ZArray);
}

// ===== Collections =====

#[test]
fn test_arg_append_after_splat() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let one = b.new_int(1);
    let args = b.new_array(one);
    let two = b.new_int(2);
    let splat_arg = b.new_array(two);
    let cat = b.arg_concat(args, Some(splat_arg));
    let three = b.new_int(3);
    let pushed = b.arg_append(cat, three);
    assert_eq!(
        b.kind(pushed),
        NodeKind::ArgsPush {
            head: cat,
            value: three
        }
    );
}

// ===== Value and void checks =====

#[test]
fn test_void_value_expression() {
    let symbols = SymbolTable::new();
    let x = symbols.intern_str("x");
    let mut b = builder(&symbols);

    let ret = b.new_return(None);
    let asgn = b.assignable(x, None);
    b.node_assign(asgn, ret);
    assert_eq!(count(&b, ErrorCode::E2005), 1);
    assert_eq!(diags(&b)[0].message, "void value expression");
}

#[test]
fn test_value_expr_follows_if_branches() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let t = b.new_int(1);
    let brk = b.new_break(None);
    let cond = b.gettable(symbols.intern_str("c"));
    let node = b.new_if(cond, Some(t), Some(brk));
    assert!(!b.value_expr(node));

    let one = b.new_int(1);
    let two = b.new_int(2);
    let node = b.new_if(cond, Some(one), Some(two));
    assert!(b.value_expr(node));
}

#[test]
fn test_void_context_warning() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let one = b.new_int(1);
    let call = b.new_fcall(symbols.intern_str("puts"), None);
    let two = b.new_int(2);
    let body = b.block_append(Some(one), Some(call));
    let body = b.block_append(body, Some(two));
    b.void_stmts(body);

    let warnings = diags(&b);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, ErrorCode::W1002);
    assert_eq!(
        warnings[0].message,
        "possibly useless use of a literal in void context"
    );
}

#[test]
fn test_statement_not_reached() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let ret = b.new_return(None);
    let one = b.new_int(1);
    b.block_append(Some(ret), Some(one));
    assert_eq!(count(&b, ErrorCode::W1006), 1);
}

// ===== Conditions =====

#[test]
fn test_integer_range_in_condition_is_flip_flop() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let one = b.new_int(1);
    let five = b.new_int(5);
    let range = b.new_dot2(Some(one), Some(five));
    let node = b.new_if(range, None, None);
    let NodeKind::If { cond, .. } = b.kind(node) else {
        panic!("expected If");
    };
    assert_eq!(cond, range);
    let NodeKind::Flip2 { beg, end } = b.kind(range) else {
        panic!("expected Flip2, got {:?}", b.kind(range));
    };
    for side in [beg, end] {
        let NodeKind::Call { mid, args, .. } = b.kind(side) else {
            panic!("expected Call");
        };
        assert_eq!(mid, op::EQ);
        let NodeKind::Array(list) = b.kind(args.unwrap()) else {
            panic!("expected Array");
        };
        let arg = b.arena().list(list)[0];
        assert_eq!(b.kind(arg), NodeKind::GVar(symbols.intern_str("$.")));
    }
    assert_eq!(count(&b, ErrorCode::W1003), 2);
}

#[test]
fn test_regexp_in_condition_matches_last_line() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let source = b.new_str(*b"ab");
    let re = b.new_regexp(Some(source), 0);
    let node = b.new_if(re, None, None);
    let NodeKind::If { cond, .. } = b.kind(node) else {
        panic!("expected If");
    };
    assert_eq!(b.kind(cond), NodeKind::Match(re));
    assert_eq!(diags(&b)[0].message, "regex literal in condition");
}

#[test]
fn test_static_assignment_in_condition() {
    let symbols = SymbolTable::new();
    let x = symbols.intern_str("x");
    let mut b = builder(&symbols);

    let asgn = b.assignable(x, None);
    let one = b.new_int(1);
    b.node_assign(asgn, one);
    b.new_while(asgn, None, false);
    assert_eq!(diags(&b)[0].message, "found = in conditional, should be ==");
}

#[test]
fn test_match_op_with_regexp_literal() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let source = b.new_str(*b"a");
    let re = b.new_regexp(Some(source), 0);
    let s = b.gettable(symbols.intern_str("s"));
    let node = b.match_op(re, s);
    assert_eq!(
        b.kind(node),
        NodeKind::Match2 {
            regexp: re,
            value: s
        }
    );
    let node = b.match_op(s, re);
    assert_eq!(
        b.kind(node),
        NodeKind::Match3 {
            regexp: re,
            value: s
        }
    );
}

// ===== Control flow =====

#[test]
fn test_and_chain_nests_right() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);
    let [x, y, z]: [NodeId; 3] = ["x", "y", "z"].map(|n| b.gettable(symbols.intern_str(n)));

    let xy = b.new_and(x, y);
    let node = b.new_and(xy, z);
    assert_eq!(node, xy);
    let NodeKind::And { left, right } = b.kind(node) else {
        panic!("expected And");
    };
    assert_eq!(left, x);
    assert_eq!(b.kind(right), NodeKind::And { left: y, right: z });
}

#[test]
fn test_begin_end_while_runs_body_first() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let body = b.new_int(1);
    let begin = b.new_begin(Some(body));
    let cond = b.gettable(symbols.intern_str("c"));
    let node = b.new_while(cond, Some(begin), true);
    assert!(matches!(
        b.kind(node),
        NodeKind::While { body: Some(inner), do_while: true, .. } if inner == body
    ));
}

#[test]
fn test_return_unwraps_single_value() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let one = b.new_int(1);
    let args = b.new_array(one);
    let ret = b.new_return(Some(args));
    assert_eq!(b.kind(ret), NodeKind::Return(Some(one)));
}

#[test]
fn test_block_argument_to_yield() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let blk = b.gettable(symbols.intern_str("blk"));
    let pass = b.block_pass(None, blk);
    b.new_yield(Some(pass));
    assert_eq!(count(&b, ErrorCode::E2011), 1);
}

#[test]
fn test_block_pass_and_literal_block() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let blk = b.gettable(symbols.intern_str("blk"));
    let pass = b.block_pass(None, blk);
    let call = b.new_fcall(symbols.intern_str("each"), Some(pass));
    let call = b.method_with_block_pass(call);
    assert!(matches!(b.kind(call), NodeKind::BlockPass { .. }));

    b.open_block();
    let iter = b.new_iter(None, None);
    b.method_add_block(call, iter);
    assert_eq!(count(&b, ErrorCode::E2006), 1);
}

#[test]
fn test_else_without_rescue() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let body = b.new_int(1);
    let other = b.new_int(2);
    let node = b.new_rescue(Some(body), None, Some(other)).unwrap();
    let NodeKind::Block(list) = b.kind(node) else {
        panic!("expected Block");
    };
    assert_eq!(b.arena().list(list), &[body, other]);
    assert_eq!(count(&b, ErrorCode::W1005), 1);
}

#[test]
fn test_preexe_is_hoisted() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    let body = b.new_int(1);
    let node = b.new_preexe(Some(body));
    assert_eq!(b.kind(node), NodeKind::Begin(None));
    assert_eq!(b.take_preexe(), vec![body]);

    b.open_def();
    b.new_preexe(None);
    assert_eq!(count(&b, ErrorCode::E2010), 1);
}

// ===== Definitions =====

#[test]
fn test_singleton_method_on_literal() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    b.open_defs();
    let recv = b.new_int(1);
    b.new_defs(recv, symbols.intern_str("m"), None, None);
    assert_eq!(count(&b, ErrorCode::E2007), 1);
    assert!(!b.in_def());
}

#[test]
fn test_class_in_method_body() {
    let symbols = SymbolTable::new();
    let name = symbols.intern_str("Foo");
    let mut b = builder(&symbols);

    b.open_def();
    b.open_class();
    let cpath = b.new_cpath(None, name, false);
    b.new_class(cpath, None, None);
    assert_eq!(count(&b, ErrorCode::E2012), 1);
}

#[test]
fn test_sclass_body_is_not_in_method() {
    let symbols = SymbolTable::new();
    let mut b = builder(&symbols);

    b.open_def();
    let this = b.gettable(symbols.intern_str("self"));
    b.open_sclass();
    assert!(!b.in_def());
    b.new_sclass(this, None);
    assert!(b.in_def());
}

#[test]
fn test_cpath_forms() {
    let symbols = SymbolTable::new();
    let [outer, inner] = ["Outer", "Inner"].map(|n| symbols.intern_str(n));
    let mut b = builder(&symbols);

    let bare = b.new_cpath(None, inner, false);
    assert_eq!(b.kind(bare), NodeKind::Const(inner));
    let top = b.new_cpath(None, inner, true);
    assert_eq!(b.kind(top), NodeKind::Colon3(inner));
    let scope = b.gettable(outer);
    let nested = b.new_cpath(Some(scope), inner, false);
    assert_eq!(b.kind(nested), NodeKind::Colon2 { scope, name: inner });

    let bad = b.new_cpath(None, symbols.intern_str("lower"), false);
    assert_eq!(b.kind(bad), NodeKind::Error);
    assert_eq!(count(&b, ErrorCode::E2008), 1);
}

#[test]
fn test_valias_of_number_variable() {
    let symbols = SymbolTable::new();
    let new_name: Id = symbols.intern_str("$new");
    let mut b = builder(&symbols);

    let target = b.gettable(new_name);
    let amp = b.new_back_ref(b'&');
    let node = b.new_valias(target, amp);
    assert_eq!(
        b.kind(node),
        NodeKind::VAlias {
            new_name,
            old_name: symbols.intern_str("$&")
        }
    );

    let nth = b.new_nth_ref(1);
    b.new_valias(target, nth);
    assert_eq!(count(&b, ErrorCode::E2009), 1);
}

#[test]
fn test_optional_parameter_in_block_is_dynamic() {
    let symbols = SymbolTable::new();
    let y = symbols.intern_str("y");
    let mut b = builder(&symbols);

    b.open_block();
    let default = b.new_int(2);
    let opt = b.new_opt_arg(y, default);
    assert_eq!(
        b.kind(opt),
        NodeKind::DAsgn {
            id: y,
            value: Some(default)
        }
    );
    assert!(b.scopes().is_current(y));
}
