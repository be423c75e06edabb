#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use rube_ir::SymbolTable;

use super::*;

fn ids<const N: usize>(symbols: &SymbolTable, names: [&str; N]) -> [Id; N] {
    names.map(|name| symbols.intern_str(name))
}

#[test]
fn test_method_scope_is_opaque() {
    let symbols = SymbolTable::new();
    let [x, y] = ids(&symbols, ["x", "y"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.declare_local(x);

    scopes.open_method_scope();
    assert_eq!(scopes.resolve(x), Resolution::Unknown);
    scopes.declare_local(y);
    assert_eq!(scopes.resolve(y), Resolution::Local);
    assert_eq!(scopes.close_method_scope(), vec![y]);

    assert_eq!(scopes.resolve(x), Resolution::Local);
    assert_eq!(scopes.resolve(y), Resolution::Unknown);
}

#[test]
fn test_block_scope_inherits() {
    let symbols = SymbolTable::new();
    let [x, y, z] = ids(&symbols, ["x", "y", "z"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.declare_local(x);

    let outer = scopes.open_block_scope(true);
    scopes.declare_local(y);
    scopes.open_block_scope(true);
    scopes.declare_local(z);
    assert!(scopes.in_block());
    assert_eq!(scopes.resolve(x), Resolution::Local);
    assert_eq!(scopes.resolve(y), Resolution::Dynamic);
    assert_eq!(scopes.resolve(z), Resolution::Dynamic);
    assert_eq!(
        scopes.record(scopes.current_id().unwrap()).unwrap().link,
        ScopeLink::ChildOf(outer)
    );

    assert_eq!(scopes.close_block_scope(), vec![z]);
    assert_eq!(scopes.resolve(z), Resolution::Unknown);
    assert_eq!(scopes.close_block_scope(), vec![y]);
    assert!(!scopes.in_block());
}

#[test]
fn test_fresh_block_scope_stops_lookup() {
    let symbols = SymbolTable::new();
    let [x] = ids(&symbols, ["x"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.declare_local(x);
    scopes.open_block_scope(false);
    assert!(!scopes.is_local(x));
}

#[test]
fn test_shadowing_outer_local_is_not_an_error() {
    let symbols = SymbolTable::new();
    let [x] = ids(&symbols, ["x"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.declare_local(x);
    scopes.open_block_scope(true);
    assert_eq!(scopes.declare_arg(x), Ok(Declared::Shadowing));
    assert!(scopes.is_current(x));
}

#[test]
fn test_duplicate_block_parameter() {
    let symbols = SymbolTable::new();
    let [a] = ids(&symbols, ["a"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.open_block_scope(true);
    assert_eq!(scopes.declare_arg(a), Ok(Declared::Fresh));
    assert_eq!(scopes.declare_arg(a), Err(ScopeError::DuplicatedArgument));
    assert_eq!(scopes.current_locals(), vec![a]);
}

#[test]
fn test_duplicate_method_parameter() {
    let symbols = SymbolTable::new();
    let [a, b] = ids(&symbols, ["a", "b"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.declare_local(a);
    scopes.open_method_scope();
    // The outer `a` is invisible, so this is neither duplicate nor shadow.
    assert_eq!(scopes.declare_arg(a), Ok(Declared::Fresh));
    assert_eq!(scopes.declare_arg(b), Ok(Declared::Fresh));
    assert_eq!(scopes.declare_arg(b), Err(ScopeError::DuplicatedArgument));
}

#[test]
fn test_wildcard_may_repeat() {
    let symbols = SymbolTable::new();
    let [underscore] = ids(&symbols, ["_"]);
    let mut scopes = Scopes::new().with_wildcard(underscore);
    scopes.open_top_scope(None);
    scopes.open_block_scope(true);
    assert_eq!(scopes.declare_arg(underscore), Ok(Declared::Fresh));
    assert_eq!(scopes.declare_arg(underscore), Ok(Declared::Fresh));
}

#[test]
fn test_formal_argument_kinds() {
    let symbols = SymbolTable::new();
    let [konst, ivar, gvar, cvar, local] = ids(&symbols, ["Foo", "@foo", "$foo", "@@foo", "foo"]);
    assert_eq!(Scopes::formal_argument(konst), Err(ScopeError::FormalConstant));
    assert_eq!(Scopes::formal_argument(ivar), Err(ScopeError::FormalInstance));
    assert_eq!(Scopes::formal_argument(gvar), Err(ScopeError::FormalGlobal));
    assert_eq!(Scopes::formal_argument(cvar), Err(ScopeError::FormalClass));
    assert_eq!(Scopes::formal_argument(local), Ok(()));

    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.open_method_scope();
    assert_eq!(scopes.declare_arg(konst), Err(ScopeError::FormalConstant));
    assert!(scopes.current_locals().is_empty());
}

#[test]
fn test_locals_list_args_first() {
    let symbols = SymbolTable::new();
    let [a, b, c] = ids(&symbols, ["a", "b", "c"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    scopes.open_method_scope();
    scopes.declare_local(c);
    scopes.declare_arg(a).unwrap();
    scopes.declare_local(b);
    scopes.declare_local(c);
    assert_eq!(scopes.close_method_scope(), vec![a, c, b]);
}

#[test]
fn test_runtime_binding() {
    let symbols = SymbolTable::new();
    let [known, fresh, other] = ids(&symbols, ["known", "fresh", "other"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(Some(RuntimeBinding::new([known])));
    assert_eq!(scopes.resolve(known), Resolution::Dynamic);
    assert_eq!(scopes.resolve(other), Resolution::Unknown);

    scopes.declare_local(fresh);
    assert_eq!(scopes.resolve(fresh), Resolution::Dynamic);

    scopes.open_block_scope(true);
    assert!(scopes.is_local(known));

    // A method body does not see the binding.
    scopes.open_method_scope();
    assert!(!scopes.is_local(known));
}

#[test]
fn test_close_on_empty_stack() {
    let mut scopes = Scopes::new();
    assert!(scopes.close_method_scope().is_empty());
    assert_eq!(scopes.depth(), 0);
    assert!(scopes.current_locals().is_empty());
}

#[test]
fn test_scopes_as_local_lookup() {
    let symbols = SymbolTable::new();
    let [x] = ids(&symbols, ["x"]);
    let mut scopes = Scopes::new();
    scopes.open_top_scope(None);
    let lookup: &dyn LocalLookup = &scopes;
    assert!(!lookup.is_local(x));
    scopes.declare_local(x);
    let lookup: &dyn LocalLookup = &scopes;
    assert!(lookup.is_local(x));
}

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn declared_locals_close_in_first_declaration_order(
            names in prop::collection::vec("[a-z][a-z0-9_]{0,4}", 0..24),
        ) {
            let symbols = SymbolTable::new();
            let declared: Vec<Id> = names.iter().map(|n| symbols.intern_str(n)).collect();
            let mut expected = Vec::new();
            for &id in &declared {
                if !expected.contains(&id) {
                    expected.push(id);
                }
            }

            let mut scopes = Scopes::new();
            scopes.open_top_scope(None);
            scopes.open_method_scope();
            for &id in &declared {
                scopes.declare_local(id);
            }

            scopes.open_block_scope(true);
            for &id in &expected {
                prop_assert_eq!(scopes.resolve(id), Resolution::Local);
            }
            prop_assert!(scopes.close_block_scope().is_empty());

            prop_assert_eq!(scopes.close_method_scope(), expected.clone());
            for &id in &expected {
                prop_assert_eq!(scopes.resolve(id), Resolution::Unknown);
            }
        }
    }
}
