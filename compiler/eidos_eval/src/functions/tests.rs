use super::*;
use crate::print_handler::OutputStreams;
use crate::runtime::Runtime;
use eidos_ir::{AstBuilder, BinaryOp, ValueMask};
use eidos_value::{EvalErrorKind, SignatureBuilder, Value};
use pretty_assertions::assert_eq;

/// Run the statements `build` creates; returns the block value and the
/// captured output.
fn run(build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> (EvalResult, String) {
    let runtime = Runtime::new().with_streams(OutputStreams::buffered());
    let mut b = AstBuilder::new(runtime.interner());
    let statements = build(&mut b);
    let script = Script::new(b.finish(&statements));
    let result = runtime.interpreter(script).evaluate_block();
    (result, runtime.streams().output.get_output())
}

fn value(build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> Value {
    run(build).0.unwrap_or_else(|e| panic!("{e}"))
}

fn error(build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> Option<EvalErrorKind> {
    run(build).0.err().map(|e| e.kind)
}

fn output(build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> String {
    let (result, out) = run(build);
    if let Err(e) = result {
        panic!("{e}");
    }
    out
}

// Registry

#[test]
fn builtins_cannot_be_replaced() {
    let registry = FunctionRegistry::with_builtins(SharedInterner::new());
    let signature = SignatureBuilder::function("c", ValueMask::ANY)
        .finish()
        .unwrap_or_else(|e| panic!("{e}"));
    let err = registry
        .register_native(signature, |interpreter, _| Ok(interpreter.constants().null.clone()))
        .err()
        .map(|e| e.kind);
    assert_eq!(err, Some(EvalErrorKind::BuiltinReplacement { name: "c".into() }));
}

#[test]
fn names_are_sorted() {
    let registry = FunctionRegistry::with_builtins(SharedInterner::new());
    let names = registry.names();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"seqAlong"));
    assert!(registry.get_by_str("nope").is_none());
}

// Vectors

#[test]
fn c_skips_null_and_promotes() {
    let result = value(|b| {
        let one = b.int(1);
        let null = b.ident("NULL");
        let half = b.float(0.5);
        vec![b.call("c", &[one, null, half])]
    });
    assert_eq!(result.as_floats(), Some(&[1.0, 0.5][..]));
}

#[test]
fn c_with_no_arguments_is_null() {
    let result = value(|b| vec![b.call("c", &[])]);
    assert!(result.is_null());
}

#[test]
fn size_counts_elements() {
    let result = value(|b| {
        let (a, z) = (b.int(1), b.int(5));
        let range = b.range(a, z);
        vec![b.call("length", &[range])]
    });
    assert_eq!(result.as_ints(), Some(&[5][..]));
}

#[test]
fn matrix_fills_by_column_or_by_row() {
    let by_column = value(|b| {
        let (a, z) = (b.int(1), b.int(6));
        let data = b.range(a, z);
        let two = b.int(2);
        let nrow = b.named("nrow", two);
        vec![b.call("matrix", &[data, nrow])]
    });
    assert_eq!(by_column.as_ints(), Some(&[1, 2, 3, 4, 5, 6][..]));
    assert_eq!(by_column.dims().map(|d| d.extents().to_vec()), Some(vec![2, 3]));

    let by_row = value(|b| {
        let (a, z) = (b.int(1), b.int(6));
        let data = b.range(a, z);
        let two = b.int(2);
        let nrow = b.named("nrow", two);
        let t = b.ident("T");
        let byrow = b.named("byrow", t);
        vec![b.call("matrix", &[data, nrow, byrow])]
    });
    assert_eq!(by_row.as_ints(), Some(&[1, 4, 2, 5, 3, 6][..]));
}

#[test]
fn matrix_without_extents_is_a_column() {
    let result = value(|b| {
        let (a, z) = (b.int(1), b.int(3));
        let data = b.range(a, z);
        vec![b.call("matrix", &[data])]
    });
    assert_eq!(result.dims().map(|d| d.extents().to_vec()), Some(vec![3, 1]));
}

#[test]
fn matrix_rejects_a_non_multiple_row_count() {
    let err = error(|b| {
        let (a, z) = (b.int(1), b.int(5));
        let data = b.range(a, z);
        let two = b.int(2);
        vec![b.call("matrix", &[data, two])]
    });
    assert!(matches!(err, Some(EvalErrorKind::Custom { .. })));
}

#[test]
fn array_and_dim() {
    let result = value(|b| {
        let (a, z) = (b.int(1), b.int(8));
        let data = b.range(a, z);
        let (two, three) = (b.int(2), b.int(3));
        let extents = b.call("rep", &[two, three]);
        let array = b.call("array", &[data, extents]);
        vec![b.call("dim", &[array])]
    });
    assert_eq!(result.as_ints(), Some(&[2, 2, 2][..]));

    let plain = value(|b| {
        let one = b.int(1);
        vec![b.call("dim", &[one])]
    });
    assert!(plain.is_null());
}

#[test]
fn array_needs_two_dimensions() {
    let err = error(|b| {
        let one = b.int(1);
        let dim = b.int(1);
        vec![b.call("array", &[one, dim])]
    });
    assert!(err.is_some());
}

#[test]
fn rep_repeats_the_whole_vector() {
    let result = value(|b| {
        let (one, two) = (b.int(1), b.int(2));
        let x = b.call("c", &[one, two]);
        let count = b.int(3);
        vec![b.call("rep", &[x, count])]
    });
    assert_eq!(result.as_ints(), Some(&[1, 2, 1, 2, 1, 2][..]));
}

#[test]
fn rep_each_repeats_elements_in_place() {
    let uniform = value(|b| {
        let (one, two) = (b.int(1), b.int(2));
        let x = b.call("c", &[one, two]);
        let count = b.int(2);
        vec![b.call("repEach", &[x, count])]
    });
    assert_eq!(uniform.as_ints(), Some(&[1, 1, 2, 2][..]));

    let per_element = value(|b| {
        let (a, z) = (b.string("a"), b.string("z"));
        let x = b.call("c", &[a, z]);
        let (three, zero) = (b.int(3), b.int(0));
        let counts = b.call("c", &[three, zero]);
        vec![b.call("repEach", &[x, counts])]
    });
    assert_eq!(
        per_element.as_strings().map(<[String]>::to_vec),
        Some(vec!["a".to_string(), "a".to_string(), "a".to_string()])
    );

    let err = error(|b| {
        let (one, two, three) = (b.int(1), b.int(2), b.int(3));
        let x = b.call("c", &[one, two, three]);
        let (c1, c2) = (b.int(1), b.int(1));
        let counts = b.call("c", &[c1, c2]);
        vec![b.call("repEach", &[x, counts])]
    });
    assert!(matches!(err, Some(EvalErrorKind::Custom { .. })), "{err:?}");
}

#[test]
fn seq_len_and_seq_along_count_from_zero() {
    let len = value(|b| {
        let three = b.int(3);
        vec![b.call("seqLen", &[three])]
    });
    assert_eq!(len.as_ints(), Some(&[0, 1, 2][..]));

    let along = value(|b| {
        let s = b.string("a");
        let t = b.string("b");
        let x = b.call("c", &[s, t]);
        vec![b.call("seqAlong", &[x])]
    });
    assert_eq!(along.as_ints(), Some(&[0, 1][..]));

    let err = error(|b| {
        let minus = b.int(-1);
        vec![b.call("seqLen", &[minus])]
    });
    assert!(err.is_some());
}

#[test]
fn sum_counts_true_and_checks_overflow() {
    let count = value(|b| {
        let (t, f) = (b.ident("T"), b.ident("F"));
        let t2 = b.ident("T");
        let x = b.call("c", &[t, f, t2]);
        vec![b.call("sum", &[x])]
    });
    assert_eq!(count.as_ints(), Some(&[2][..]));

    let err = error(|b| {
        let max = b.int(i64::MAX);
        let one = b.int(1);
        let x = b.call("c", &[max, one]);
        vec![b.call("sum", &[x])]
    });
    assert_eq!(
        err,
        Some(EvalErrorKind::IntegerOverflow {
            operation: "function sum()".into()
        })
    );
}

// Conversion

#[test]
fn typed_constructors_fill_with_zero_values() {
    let result = value(|b| {
        let two = b.int(2);
        vec![b.call("string", &[two])]
    });
    assert_eq!(
        result.as_strings().map(<[String]>::to_vec),
        Some(vec![String::new(), String::new()])
    );
    let empty = value(|b| vec![b.call("logical", &[])]);
    assert_eq!(empty.as_logicals(), Some(&[][..]));
}

#[test]
fn as_integer_truncates_and_parses() {
    let result = value(|b| {
        let x = b.float(-2.7);
        vec![b.call("asInteger", &[x])]
    });
    assert_eq!(result.as_ints(), Some(&[-2][..]));

    let parsed = value(|b| {
        let s = b.string(" 42 ");
        vec![b.call("asInteger", &[s])]
    });
    assert_eq!(parsed.as_ints(), Some(&[42][..]));

    let err = error(|b| {
        let inf = b.ident("INF");
        vec![b.call("asInteger", &[inf])]
    });
    assert!(err.is_some());
}

#[test]
fn as_logical_reads_string_spellings() {
    let result = value(|b| {
        let (t, f) = (b.string("true"), b.string("F"));
        let x = b.call("c", &[t, f]);
        vec![b.call("asLogical", &[x])]
    });
    assert_eq!(result.as_logicals(), Some(&[true, false][..]));

    let err = error(|b| {
        let s = b.string("yes");
        vec![b.call("asLogical", &[s])]
    });
    assert!(err.is_some());
}

#[test]
fn conversions_keep_dimensions() {
    let result = value(|b| {
        let (a, z) = (b.int(1), b.int(4));
        let data = b.range(a, z);
        let two = b.int(2);
        let m = b.call("matrix", &[data, two]);
        vec![b.call("asFloat", &[m])]
    });
    assert_eq!(result.as_floats(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
    assert_eq!(result.dims().map(|d| d.extents().to_vec()), Some(vec![2, 2]));
}

#[test]
fn as_string_of_null_is_an_empty_string_vector() {
    let result = value(|b| {
        let null = b.ident("NULL");
        vec![b.call("asString", &[null])]
    });
    assert_eq!(result.as_strings().map(<[String]>::len), Some(0));
}

// System

#[test]
fn print_writes_the_value_and_returns_void() {
    let (result, out) = run(|b| {
        let (a, z) = (b.int(1), b.int(3));
        let x = b.range(a, z);
        vec![b.call("print", &[x])]
    });
    assert!(result.is_ok_and(|v| v.is_void()));
    assert_eq!(out, "1 2 3\n");
}

#[test]
fn cat_joins_without_quotes_or_newline() {
    let out = output(|b| {
        let (s, t) = (b.string("a"), b.string("b"));
        let x = b.call("c", &[s, t]);
        let sep = b.string("-");
        vec![b.call("cat", &[x, sep])]
    });
    assert_eq!(out, "a-b");
}

#[test]
fn identical_compares_structure() {
    let same = value(|b| {
        let (x, y) = (b.ident("NAN"), b.ident("NAN"));
        vec![b.call("identical", &[x, y])]
    });
    assert_eq!(same.as_logicals(), Some(&[true][..]));

    let different = value(|b| {
        let (x, y) = (b.int(1), b.float(1.0));
        vec![b.call("identical", &[x, y])]
    });
    assert_eq!(different.as_logicals(), Some(&[false][..]));
}

#[test]
fn type_names_the_kind() {
    let result = value(|b| {
        let null = b.ident("NULL");
        vec![b.call("type", &[null])]
    });
    assert_eq!(result.as_strings().map(<[String]>::to_vec), Some(vec!["NULL".to_string()]));
}

#[test]
fn exists_sees_variables_and_constants() {
    let result = value(|b| {
        let one = b.int(1);
        let assign = b.assign_to("x", one);
        let (x, pi, nope) = (b.string("x"), b.string("PI"), b.string("nope"));
        let ex = b.call("exists", &[x]);
        let ep = b.call("exists", &[pi]);
        let en = b.call("exists", &[nope]);
        let all = b.call("c", &[ex, ep, en]);
        vec![assign, all]
    });
    assert_eq!(result.as_logicals(), Some(&[true, true, false][..]));
}

#[test]
fn looking_up_computed_names_does_not_intern_them() {
    let runtime = Runtime::new();
    let mut b = AstBuilder::new(runtime.interner());
    let (head, tail) = (b.string("zz"), b.string("top"));
    let computed = b.binary(BinaryOp::Add, head, tail);
    let lookup = b.call("exists", &[computed]);
    let (head, tail) = (b.string("qq"), b.string("bottom"));
    let computed = b.binary(BinaryOp::Add, head, tail);
    let removal = b.call("rm", &[computed]);
    let script = Script::new(b.finish(&[removal, lookup]));

    let before = runtime.interner().len();
    let found = runtime
        .interpreter(script)
        .evaluate_block()
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(found.as_logicals(), Some(&[false][..]));
    assert_eq!(runtime.interner().len(), before);
    assert_eq!(runtime.interner().get("zztop"), None);
}

#[test]
fn rm_without_names_keeps_constants() {
    let result = value(|b| {
        let one = b.int(1);
        let assign = b.assign_to("x", one);
        let (k, two) = (b.string("K"), b.int(2));
        let define = b.call("defineConstant", &[k, two]);
        let rm = b.call("rm", &[]);
        let (x, k) = (b.string("x"), b.string("K"));
        let ex = b.call("exists", &[x]);
        let ek = b.call("exists", &[k]);
        let both = b.call("c", &[ex, ek]);
        vec![assign, define, rm, both]
    });
    assert_eq!(result.as_logicals(), Some(&[false, true][..]));
}

#[test]
fn rm_refuses_constants_unless_asked() {
    let err = error(|b| {
        let (k, two) = (b.string("K"), b.int(2));
        let define = b.call("defineConstant", &[k, two]);
        let name = b.string("K");
        vec![define, b.call("rm", &[name])]
    });
    assert!(matches!(err, Some(EvalErrorKind::ConstantRemoval { .. })));

    let result = value(|b| {
        let (k, two) = (b.string("K"), b.int(2));
        let define = b.call("defineConstant", &[k, two]);
        let name = b.string("K");
        let t = b.ident("T");
        let rm = b.call("rm", &[name, t]);
        let k = b.string("K");
        vec![define, rm, b.call("exists", &[k])]
    });
    assert_eq!(result.as_logicals(), Some(&[false][..]));
}

#[test]
fn stop_raises_with_its_message() {
    let err = error(|b| {
        let message = b.string("bad input");
        vec![b.call("stop", &[message])]
    });
    assert_eq!(
        err,
        Some(EvalErrorKind::Stop {
            message: "bad input".into()
        })
    );
}

#[test]
fn invisible_hides_a_value() {
    let result = value(|b| {
        let one = b.int(1);
        vec![b.call("invisible", &[one])]
    });
    assert!(result.is_invisible());
    assert_eq!(result.as_ints(), Some(&[1][..]));
}

#[test]
fn function_signature_prints_one_or_reports_absence() {
    let out = output(|b| {
        let name = b.string("seqLen");
        let missing = b.string("nope");
        let first = b.call("functionSignature", &[name]);
        let second = b.call("functionSignature", &[missing]);
        vec![first, second]
    });
    assert_eq!(
        out,
        "(integer)seqLen(integer$ length)\nNo function signature found for \"nope\".\n"
    );
}

#[test]
fn function_signature_marks_user_functions() {
    let out = output(|b| {
        let x = b.ident("x");
        let one = b.int(1);
        let sum = b.binary(BinaryOp::Add, x, one);
        let ret = b.return_value(Some(sum));
        let body = b.block(&[ret]);
        let param = b.param(eidos_ir::TypeSpec::new(ValueMask::INT), "x", None);
        let decl = b.function(
            eidos_ir::TypeSpec::new(ValueMask::INT),
            "inc",
            &[param],
            body,
        );
        let name = b.string("inc");
        vec![decl, b.call("functionSignature", &[name])]
    });
    assert_eq!(out, "(integer)inc(integer x) <user-defined>\n");
}
