use super::*;
use eidos_value::EvalErrorKind;
use pretty_assertions::assert_eq;

fn table() -> (SharedInterner, SymbolTable) {
    let interner = SharedInterner::new();
    let constants = intrinsic_scope(&interner, &Constants::new());
    let table = SymbolTable::new(interner.clone(), constants);
    (interner, table)
}

fn int_of(value: &Value) -> Option<i64> {
    value.as_ints().and_then(|v| v.first().copied())
}

#[test]
fn intrinsics_are_visible() {
    let (interner, table) = table();
    let t = table.lookup(interner.intern("T")).ok();
    assert_eq!(t.and_then(|v| v.as_logicals().map(<[bool]>::to_vec)), Some(vec![true]));
    assert!(table.is_constant(interner.intern("PI")));
    assert!(!table.is_local(interner.intern("PI")));
}

#[test]
fn define_then_lookup() {
    let (interner, mut table) = table();
    let x = interner.intern("x");
    assert!(table.define(x, Value::int_scalar(3)).is_ok());
    assert_eq!(table.lookup(x).ok().as_ref().and_then(int_of), Some(3));
    assert!(table.is_local(x));
    assert!(table.contains(x));
}

#[test]
fn undefined_lookup_is_distinguishable() {
    let (interner, table) = table();
    let err = table.lookup_or_special_raise(interner.intern("nope"));
    assert_eq!(
        err.err(),
        Some(UndefinedSymbol {
            name: "nope".into()
        })
    );
    let err = table.lookup(interner.intern("nope")).err().map(|e| e.message);
    assert_eq!(err.as_deref(), Some("undefined identifier nope"));
}

#[test]
fn constants_cannot_be_redefined() {
    let (interner, mut table) = table();
    let err = table
        .define(interner.intern("T"), Value::int_scalar(1))
        .err()
        .map(|e| e.kind);
    assert_eq!(
        err,
        Some(EvalErrorKind::ConstantRedefinition { name: "T".into() })
    );
}

#[test]
fn define_constant_rejects_existing_names() {
    let (interner, mut table) = table();
    let x = interner.intern("x");
    assert!(table.define(x, Value::int_scalar(1)).is_ok());
    let err = table.define_constant(x, Value::int_scalar(2)).err().map(|e| e.kind);
    assert_eq!(err, Some(EvalErrorKind::AlreadyDefined { name: "x".into() }));
}

#[test]
fn user_constants_are_shared_with_function_scopes() {
    let (interner, mut table) = table();
    let k = interner.intern("K");
    let x = interner.intern("x");
    assert!(table.define_constant(k, Value::int_scalar(9)).is_ok());
    assert!(table.define(x, Value::int_scalar(1)).is_ok());

    let inner = table.function_scope();
    assert_eq!(inner.lookup(k).ok().as_ref().and_then(int_of), Some(9));
    assert!(inner.lookup(x).is_err());
}

#[test]
fn removing_constants_needs_the_flag() {
    let (interner, mut table) = table();
    let k = interner.intern("K");
    assert!(table.define_constant(k, Value::int_scalar(9)).is_ok());
    assert!(matches!(
        table.remove(k, false).err().map(|e| e.kind),
        Some(EvalErrorKind::ConstantRemoval {
            intrinsic: false,
            ..
        })
    ));
    assert_eq!(table.remove(k, true).ok(), Some(true));
    assert!(!table.contains(k));
}

#[test]
fn intrinsic_constants_are_never_removed() {
    let (interner, mut table) = table();
    assert!(matches!(
        table.remove(interner.intern("PI"), true).err().map(|e| e.kind),
        Some(EvalErrorKind::ConstantRemoval {
            intrinsic: true,
            ..
        })
    ));
}

#[test]
fn removing_unknown_names_is_quiet() {
    let (interner, mut table) = table();
    assert_eq!(table.remove(interner.intern("ghost"), false).ok(), Some(false));
}

#[test]
fn iterators_block_assignment_until_released() {
    let (interner, mut table) = table();
    let i = interner.intern("i");
    assert!(table.mark_iterator(i).is_ok());
    table.set_iterator_value(i, Value::int_scalar(0));
    assert!(table.is_iterator(i));
    let err = table.define(i, Value::int_scalar(5)).err().map(|e| e.kind);
    assert_eq!(
        err,
        Some(EvalErrorKind::IteratorReassignment { name: "i".into() })
    );
    assert!(table.mark_iterator(i).is_err());

    table.release_iterator(i);
    assert!(table.define(i, Value::int_scalar(5)).is_ok());
}

#[test]
fn clear_variables_keeps_constants() {
    let (interner, mut table) = table();
    let x = interner.intern("x");
    assert!(table.define(x, Value::int_scalar(1)).is_ok());
    table.clear_variables();
    assert!(!table.contains(x));
    assert!(table.contains(interner.intern("E")));
}

#[test]
fn symbol_names_are_sorted() {
    let (interner, mut table) = table();
    assert!(table.define(interner.intern("b"), Value::int_scalar(1)).is_ok());
    assert!(table.define(interner.intern("a"), Value::int_scalar(1)).is_ok());
    assert_eq!(
        table.symbol_names(),
        vec!["E", "F", "INF", "NAN", "NULL", "PI", "T", "a", "b"]
    );
}

#[test]
fn in_place_mutation_of_locals() {
    let (interner, mut table) = table();
    let x = interner.intern("x");
    assert!(table.define(x, Value::int(vec![1, 2])).is_ok());
    let len = table.with_local_mut(x, |v| v.len());
    assert_eq!(len, Some(2));
    assert_eq!(table.with_local_mut(interner.intern("T"), |v| v.len()), None);
}
