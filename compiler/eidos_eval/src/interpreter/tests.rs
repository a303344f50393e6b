use super::*;
use crate::debug_points::DebugPoints;
use crate::print_handler::OutputStreams;
use eidos_ir::{AstBuilder, BinaryOp, TypeSpec, ValueMask};
use eidos_value::EvalErrorKind;
use pretty_assertions::assert_eq;

fn buffered() -> Runtime {
    Runtime::new().with_streams(OutputStreams::buffered())
}

fn script(runtime: &Runtime, build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> Rc<Script> {
    let mut b = AstBuilder::new(runtime.interner());
    let statements = build(&mut b);
    Script::new(b.finish(&statements))
}

fn run(build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> (EvalResult, String) {
    let runtime = buffered();
    let result = runtime.interpreter(script(&runtime, build)).evaluate_block();
    (result, runtime.streams().output.get_output())
}

fn value(build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> Value {
    run(build).0.unwrap_or_else(|e| panic!("{e}"))
}

fn error(build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> Option<EvalErrorKind> {
    run(build).0.err().map(|e| e.kind)
}

fn ty(mask: ValueMask) -> TypeSpec {
    TypeSpec::new(mask)
}

/// `name = name op k`
fn update(b: &mut AstBuilder<'_>, name: &str, op: BinaryOp, k: NodeId) -> NodeId {
    let current = b.ident(name);
    let next = b.binary(op, current, k);
    b.assign_to(name, next)
}

// Statements and blocks

#[test]
fn assignment_then_return() {
    let result = value(|b| {
        let three = b.int(3);
        let x_def = b.assign_to("x", three);
        let x = b.ident("x");
        let four = b.int(4);
        let sum = b.binary(BinaryOp::Add, x, four);
        let y_def = b.assign_to("y", sum);
        let y = b.ident("y");
        let ret = b.return_value(Some(y));
        vec![x_def, y_def, ret]
    });
    assert_eq!(result.as_ints(), Some(&[7][..]));
}

#[test]
fn assignment_yields_invisible_null() {
    let result = value(|b| {
        let one = b.int(1);
        vec![b.assign_to("x", one)]
    });
    assert!(result.is_null());
    assert!(result.is_invisible());
}

#[test]
fn empty_block_and_if_without_else_are_invisible_null() {
    let block = value(|b| vec![b.block(&[])]);
    assert!(block.is_null() && block.is_invisible());

    let skipped = value(|b| {
        let f = b.ident("F");
        let one = b.int(1);
        vec![b.if_then(f, one)]
    });
    assert!(skipped.is_null() && skipped.is_invisible());
}

#[test]
fn if_else_picks_a_branch() {
    let result = value(|b| {
        let zero = b.int(0);
        let (one, two) = (b.int(1), b.int(2));
        vec![b.if_else(zero, one, two)]
    });
    assert_eq!(result.as_ints(), Some(&[2][..]));
}

#[test]
fn conditions_must_be_singletons() {
    let err = error(|b| {
        let (t, f) = (b.ident("T"), b.ident("F"));
        let cond = b.call("c", &[t, f]);
        let one = b.int(1);
        vec![b.if_then(cond, one)]
    });
    assert_eq!(
        err,
        Some(EvalErrorKind::ConditionSize {
            statement: "if statement"
        })
    );
}

#[test]
fn ternary_conditional() {
    let result = value(|b| {
        let (one, two) = (b.int(1), b.int(2));
        let cond = b.binary(BinaryOp::Lt, one, two);
        let (yes, no) = (b.string("yes"), b.string("no"));
        vec![b.conditional(cond, yes, no)]
    });
    assert_eq!(result.as_strings().map(<[String]>::to_vec), Some(vec!["yes".to_string()]));
}

#[test]
fn and_or_are_vectorized() {
    let result = value(|b| {
        let (t, f) = (b.ident("T"), b.ident("F"));
        let x = b.call("c", &[t, f]);
        let t2 = b.ident("T");
        vec![b.and(&[x, t2])]
    });
    assert_eq!(result.as_logicals(), Some(&[true, false][..]));

    let result = value(|b| {
        let zero = b.int(0);
        let (one, zero2, two) = (b.int(1), b.int(0), b.int(2));
        let x = b.call("c", &[zero, one]);
        let y = b.call("c", &[zero2, two]);
        vec![b.or(&[x, y])]
    });
    assert_eq!(result.as_logicals(), Some(&[false, true][..]));
}

#[test]
fn constants_cannot_be_assigned() {
    let err = error(|b| {
        let one = b.int(1);
        vec![b.assign_to("T", one)]
    });
    assert_eq!(err, Some(EvalErrorKind::ConstantRedefinition { name: "T".into() }));
}

// Loops

#[test]
fn while_loop_honours_next_and_break() {
    let result = value(|b| {
        let zero = b.int(0);
        let init_sum = b.assign_to("sum", zero);
        let zero = b.int(0);
        let init_i = b.assign_to("i", zero);

        let one = b.int(1);
        let step = update(b, "i", BinaryOp::Add, one);
        let (i, five) = (b.ident("i"), b.int(5));
        let done = b.binary(BinaryOp::Gt, i, five);
        let brk = b.break_loop();
        let stop = b.if_then(done, brk);
        let (i, two) = (b.ident("i"), b.int(2));
        let skip_two = b.binary(BinaryOp::Eq, i, two);
        let nxt = b.next();
        let skip = b.if_then(skip_two, nxt);
        let i = b.ident("i");
        let add = update(b, "sum", BinaryOp::Add, i);
        let body = b.block(&[step, stop, skip, add]);
        let t = b.ident("T");
        let lp = b.while_loop(t, body);
        let sum = b.ident("sum");
        vec![init_sum, init_i, lp, sum]
    });
    assert_eq!(result.as_ints(), Some(&[1 + 3 + 4 + 5][..]));
}

#[test]
fn do_while_runs_its_body_once() {
    let result = value(|b| {
        let zero = b.int(0);
        let init = b.assign_to("x", zero);
        let one = b.int(1);
        let body = update(b, "x", BinaryOp::Add, one);
        let f = b.ident("F");
        let lp = b.do_while(body, f);
        let x = b.ident("x");
        vec![init, lp, x]
    });
    assert_eq!(result.as_ints(), Some(&[1][..]));
}

#[test]
fn for_walks_a_range() {
    let result = value(|b| {
        let zero = b.int(0);
        let init = b.assign_to("s", zero);
        let (a, z) = (b.int(1), b.int(4));
        let seq = b.range(a, z);
        let i = b.ident("i");
        let body = update(b, "s", BinaryOp::Add, i);
        let lp = b.for_in("i", seq, body);
        let s = b.ident("s");
        vec![init, lp, s]
    });
    assert_eq!(result.as_ints(), Some(&[10][..]));
}

#[test]
fn for_walks_elements_of_any_vector() {
    let (result, out) = run(|b| {
        let (x, y) = (b.string("x"), b.string("y"));
        let seq = b.call("c", &[x, y]);
        let s = b.ident("s");
        let body = b.call("cat", &[s]);
        vec![b.for_in("s", seq, body)]
    });
    assert!(result.is_ok());
    assert_eq!(out, "xy");
}

#[test]
fn for_over_seq_len_zero_never_runs() {
    let (result, out) = run(|b| {
        let zero = b.int(0);
        let seq = b.call("seqLen", &[zero]);
        let i = b.ident("i");
        let body = b.call("print", &[i]);
        vec![b.for_in("i", seq, body)]
    });
    assert!(result.is_ok());
    assert_eq!(out, "");
}

#[test]
fn for_over_a_bad_seq_len_reports_the_call() {
    let err = error(|b| {
        let minus = b.int(-2);
        let seq = b.call("seqLen", &[minus]);
        let body = b.block(&[]);
        vec![b.for_in("i", seq, body)]
    });
    assert!(matches!(err, Some(EvalErrorKind::Custom { .. })));
}

#[test]
fn for_clause_lengths_are_checked_before_the_body() {
    let (result, out) = run(|b| {
        let (a, z) = (b.int(1), b.int(2));
        let first = b.range(a, z);
        let (a, z) = (b.int(1), b.int(3));
        let second = b.range(a, z);
        let a = b.ident("a");
        let body = b.call("print", &[a]);
        vec![b.for_clauses(&[("a", first), ("b", second)], body)]
    });
    assert_eq!(result.err().map(|e| e.kind), Some(EvalErrorKind::ForIterationMismatch));
    assert_eq!(out, "");
}

#[test]
fn loop_variables_cannot_be_reassigned() {
    let err = error(|b| {
        let (a, z) = (b.int(1), b.int(2));
        let seq = b.range(a, z);
        let five = b.int(5);
        let body = b.assign_to("i", five);
        vec![b.for_in("i", seq, body)]
    });
    assert_eq!(err, Some(EvalErrorKind::IteratorReassignment { name: "i".into() }));
}

#[test]
fn loop_variable_is_released_after_the_loop() {
    let result = value(|b| {
        let (a, z) = (b.int(1), b.int(2));
        let seq = b.range(a, z);
        let body = b.block(&[]);
        let lp = b.for_in("i", seq, body);
        let nine = b.int(9);
        let reuse = b.assign_to("i", nine);
        let i = b.ident("i");
        vec![lp, reuse, i]
    });
    assert_eq!(result.as_ints(), Some(&[9][..]));
}

#[test]
fn next_outside_a_loop_is_an_error() {
    let err = error(|b| vec![b.next()]);
    assert_eq!(err, Some(EvalErrorKind::StrayControl { statement: "next" }));
}

// Ranges

#[test]
fn ranges_ascend_descend_and_step_floats() {
    let down = value(|b| {
        let (a, z) = (b.int(5), b.int(3));
        vec![b.range(a, z)]
    });
    assert_eq!(down.as_ints(), Some(&[5, 4, 3][..]));

    let floats = value(|b| {
        let (a, z) = (b.float(1.5), b.int(3));
        vec![b.range(a, z)]
    });
    assert_eq!(floats.as_floats(), Some(&[1.5, 2.5][..]));
}

#[test]
fn range_operands_must_be_numeric_singletons() {
    let err = error(|b| {
        let (a, z) = (b.string("a"), b.int(3));
        vec![b.range(a, z)]
    });
    assert_eq!(
        err,
        Some(EvalErrorKind::UnsupportedOperand {
            op: ":".into(),
            type_name: "string"
        })
    );
}

// Subscripts

#[test]
fn subscript_reads_by_index_and_mask() {
    let picked = value(|b| {
        let (a, z) = (b.int(10), b.int(14));
        let x = b.range(a, z);
        let (i, j) = (b.int(0), b.int(2));
        let idx = b.call("c", &[i, j]);
        vec![b.subset(x, &[idx])]
    });
    assert_eq!(picked.as_ints(), Some(&[10, 12][..]));

    let masked = value(|b| {
        let (a, z) = (b.int(1), b.int(3));
        let x = b.range(a, z);
        let (t, f, t2) = (b.ident("T"), b.ident("F"), b.ident("T"));
        let mask = b.call("c", &[t, f, t2]);
        vec![b.subset(x, &[mask])]
    });
    assert_eq!(masked.as_ints(), Some(&[1, 3][..]));
}

#[test]
fn subscript_out_of_range_is_an_error() {
    let err = error(|b| {
        let one = b.int(1);
        let three = b.int(3);
        vec![b.subset(one, &[three])]
    });
    assert_eq!(err, Some(EvalErrorKind::IndexOutOfRange { index: 3 }));
}

#[test]
fn matrix_row_subscript() {
    let row = value(|b| {
        let (a, z) = (b.int(1), b.int(6));
        let data = b.range(a, z);
        let two = b.int(2);
        let m = b.call("matrix", &[data, two]);
        let one = b.int(1);
        let col = b.omitted();
        vec![b.subset(m, &[one, col])]
    });
    assert_eq!(row.as_ints(), Some(&[2, 4, 6][..]));
    assert_eq!(row.dims().map(|d| d.extents().to_vec()), Some(vec![1, 3]));
}

#[test]
fn matrix_row_assignment_keeps_dimensions() {
    let m = value(|b| {
        let f = b.ident("F");
        let four = b.int(4);
        let data = b.call("rep", &[f, four]);
        let (two, two2) = (b.int(2), b.int(2));
        let matrix = b.call("matrix", &[data, two, two2]);
        let define = b.assign_to("m", matrix);
        let target = b.ident("m");
        let zero = b.int(0);
        let col = b.omitted();
        let cell = b.subset(target, &[zero, col]);
        let t = b.ident("T");
        let set = b.assign(cell, t);
        let m = b.ident("m");
        vec![define, set, m]
    });
    assert_eq!(m.as_logicals(), Some(&[true, false, true, false][..]));
    assert_eq!(m.dims().map(|d| d.extents().to_vec()), Some(vec![2, 2]));
}

#[test]
fn empty_logical_selection_assigns_nothing() {
    let x = value(|b| {
        let (a, z) = (b.int(1), b.int(3));
        let seq = b.range(a, z);
        let define = b.assign_to("x", seq);
        let target = b.ident("x");
        let none = b.call("logical", &[]);
        let cell = b.subset(target, &[none]);
        let nine = b.int(9);
        let set = b.assign(cell, nine);
        let x = b.ident("x");
        vec![define, set, x]
    });
    assert_eq!(x.as_ints(), Some(&[1, 2, 3][..]));
}

#[test]
fn subscript_assignment_promotes_the_target() {
    let x = value(|b| {
        let (a, z) = (b.int(1), b.int(3));
        let seq = b.range(a, z);
        let define = b.assign_to("x", seq);
        let target = b.ident("x");
        let one = b.int(1);
        let cell = b.subset(target, &[one]);
        let half = b.float(0.5);
        let set = b.assign(cell, half);
        let x = b.ident("x");
        vec![define, set, x]
    });
    assert_eq!(x.as_floats(), Some(&[1.0, 0.5, 3.0][..]));
}

// Assignment fast paths

#[test]
fn compound_assignment_matches_the_general_path() {
    let x = value(|b| {
        let (a, z) = (b.int(1), b.int(3));
        let seq = b.range(a, z);
        let define = b.assign_to("x", seq);
        let two = b.number("2");
        let mul = update(b, "x", BinaryOp::Mul, two);
        let half = b.number("0.5");
        let add = update(b, "x", BinaryOp::Add, half);
        let x = b.ident("x");
        vec![define, mul, add, x]
    });
    assert_eq!(x.as_floats(), Some(&[2.5, 4.5, 6.5][..]));
}

#[test]
fn compound_assignment_overflow_raises() {
    let err = error(|b| {
        let max = b.int(i64::MAX);
        let define = b.assign_to("x", max);
        let one = b.number("1");
        vec![define, update(b, "x", BinaryOp::Add, one)]
    });
    assert_eq!(
        err,
        Some(EvalErrorKind::IntegerOverflow {
            operation: "operator '+'".into()
        })
    );
}

#[test]
fn append_assignment_extends_and_promotes() {
    let x = value(|b| {
        let (a, z) = (b.int(1), b.int(2));
        let seq = b.range(a, z);
        let define = b.assign_to("x", seq);
        let x = b.ident("x");
        let three = b.int(3);
        let append = b.call("c", &[x, three]);
        let grow = b.assign_to("x", append);
        let x = b.ident("x");
        let half = b.float(0.5);
        let append = b.call("c", &[x, half]);
        let promote = b.assign_to("x", append);
        let x = b.ident("x");
        vec![define, grow, promote, x]
    });
    assert_eq!(x.as_floats(), Some(&[1.0, 2.0, 3.0, 0.5][..]));
}

#[test]
fn shared_values_are_not_mutated_through_aliases() {
    let y = value(|b| {
        let (a, z) = (b.int(1), b.int(3));
        let seq = b.range(a, z);
        let define = b.assign_to("x", seq);
        let x = b.ident("x");
        let alias = b.assign_to("y", x);
        let one = b.number("1");
        let bump = update(b, "x", BinaryOp::Add, one);
        let y = b.ident("y");
        vec![define, alias, bump, y]
    });
    assert_eq!(y.as_ints(), Some(&[1, 2, 3][..]));
}

// User-defined functions

/// `function (integer)fact(integer n) { if (n <= 1) return 1; return n * fact(n - 1); }`
fn declare_factorial(b: &mut AstBuilder<'_>) -> NodeId {
    let n = b.ident("n");
    let one = b.int(1);
    let base = b.binary(BinaryOp::LtEq, n, one);
    let one = b.int(1);
    let ret_one = b.return_value(Some(one));
    let check = b.if_then(base, ret_one);
    let (n, n2) = (b.ident("n"), b.ident("n"));
    let one = b.int(1);
    let smaller = b.binary(BinaryOp::Sub, n2, one);
    let rec = b.call("fact", &[smaller]);
    let product = b.binary(BinaryOp::Mul, n, rec);
    let ret = b.return_value(Some(product));
    let body = b.block(&[check, ret]);
    let param = b.param(ty(ValueMask::INT | ValueMask::SINGLETON), "n", None);
    b.function(ty(ValueMask::INT), "fact", &[param], body)
}

#[test]
fn recursive_user_function() {
    let result = value(|b| {
        let decl = declare_factorial(b);
        let five = b.int(5);
        vec![decl, b.call("fact", &[five])]
    });
    assert_eq!(result.as_ints(), Some(&[120][..]));
}

#[test]
fn declaration_yields_void() {
    let result = value(|b| vec![declare_factorial(b)]);
    assert!(result.is_void());
}

#[test]
fn optional_parameters_take_their_defaults() {
    let result = value(|b| {
        let (x, y) = (b.ident("x"), b.ident("y"));
        let sum = b.binary(BinaryOp::Add, x, y);
        let ret = b.return_value(Some(sum));
        let body = b.block(&[ret]);
        let px = b.param(ty(ValueMask::INT), "x", None);
        let ten = b.int(10);
        let py = b.param(ty(ValueMask::INT), "y", Some(ten));
        let decl = b.function(ty(ValueMask::INT), "add", &[px, py], body);
        let one = b.int(1);
        vec![decl, b.call("add", &[one])]
    });
    assert_eq!(result.as_ints(), Some(&[11][..]));
}

#[test]
fn computed_defaults_are_rejected() {
    let err = error(|b| {
        let body = b.block(&[]);
        let (one, two) = (b.int(1), b.int(2));
        let sum = b.binary(BinaryOp::Add, one, two);
        let p = b.param(ty(ValueMask::INT), "x", Some(sum));
        vec![b.function(TypeSpec::void(), "f", &[p], body)]
    });
    assert_eq!(err, Some(EvalErrorKind::InvalidDefault { name: "x".into() }));
}

#[test]
fn falling_off_the_body_yields_void() {
    let result = value(|b| {
        let one = b.int(1);
        let set = b.assign_to("x", one);
        let body = b.block(&[set]);
        let decl = b.function(TypeSpec::void(), "f", &[], body);
        vec![decl, b.call("f", &[])]
    });
    assert!(result.is_void());
}

#[test]
fn return_values_are_type_checked() {
    let err = error(|b| {
        let one = b.int(1);
        let ret = b.return_value(Some(one));
        let body = b.block(&[ret]);
        let decl = b.function(ty(ValueMask::STRING), "f", &[], body);
        vec![decl, b.call("f", &[])]
    });
    assert_eq!(
        err,
        Some(EvalErrorKind::ReturnType {
            type_name: "integer",
            callee: "function f()".into()
        })
    );
}

#[test]
fn functions_see_constants_but_not_globals() {
    let err = error(|b| {
        let one = b.int(1);
        let global = b.assign_to("g", one);
        let g = b.ident("g");
        let ret = b.return_value(Some(g));
        let body = b.block(&[ret]);
        let decl = b.function(TypeSpec::any(), "peek", &[], body);
        vec![global, decl, b.call("peek", &[])]
    });
    assert_eq!(err, Some(EvalErrorKind::UndefinedIdentifier { name: "g".into() }));

    let result = value(|b| {
        let (k, one) = (b.string("K"), b.int(1));
        let define = b.call("defineConstant", &[k, one]);
        let k = b.ident("K");
        let ret = b.return_value(Some(k));
        let body = b.block(&[ret]);
        let decl = b.function(TypeSpec::any(), "peek", &[], body);
        vec![define, decl, b.call("peek", &[])]
    });
    assert_eq!(result.as_ints(), Some(&[1][..]));
}

#[test]
fn function_locals_do_not_leak() {
    let result = value(|b| {
        let one = b.int(1);
        let global = b.assign_to("x", one);
        let five = b.int(5);
        let set = b.assign_to("x", five);
        let body = b.block(&[set]);
        let decl = b.function(TypeSpec::void(), "f", &[], body);
        let call = b.call("f", &[]);
        let x = b.ident("x");
        vec![global, decl, call, x]
    });
    assert_eq!(result.as_ints(), Some(&[1][..]));
}

#[test]
fn builtins_cannot_be_redeclared() {
    let err = error(|b| {
        let body = b.block(&[]);
        vec![b.function(TypeSpec::void(), "print", &[], body)]
    });
    assert_eq!(err, Some(EvalErrorKind::BuiltinReplacement { name: "print".into() }));
}

#[test]
fn runaway_recursion_hits_the_call_depth_limit() {
    let runtime = buffered();
    let script = script(&runtime, |b| {
        let again = b.call("loop", &[]);
        let ret = b.return_value(Some(again));
        let body = b.block(&[ret]);
        let decl = b.function(TypeSpec::any(), "loop", &[], body);
        vec![decl, b.call("loop", &[])]
    });
    let err = InterpreterBuilder::new(&runtime, script)
        .max_call_depth(Some(16))
        .build()
        .evaluate_block()
        .err();
    assert_eq!(
        err.as_ref().map(|e| e.kind.clone()),
        Some(EvalErrorKind::StackOverflow { depth: 16 })
    );
    let frames = err
        .and_then(|e| e.backtrace)
        .map(|trace| trace.frames().len());
    assert_eq!(frames, Some(16));
}

#[test]
fn errors_in_functions_carry_a_backtrace() {
    let err = run(|b| {
        let message = b.string("inner");
        let stop = b.call("stop", &[message]);
        let body = b.block(&[stop]);
        let decl = b.function(TypeSpec::void(), "fail", &[], body);
        vec![decl, b.call("fail", &[])]
    })
    .0
    .err();
    let names: Option<Vec<String>> = err
        .and_then(|e| e.backtrace)
        .map(|trace| trace.frames().iter().map(|f| f.name.clone()).collect());
    assert_eq!(names, Some(vec!["fail".to_string()]));
}

#[test]
fn calling_a_variable_notes_the_binding() {
    let err = run(|b| {
        let one = b.int(1);
        let define = b.assign_to("x", one);
        let two = b.int(2);
        vec![define, b.call("x", &[two])]
    })
    .0
    .err();
    let err = err.unwrap_or_else(|| panic!("calling a variable succeeded"));
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedFunction { name: "x".into() }
    );
    assert_eq!(err.notes.len(), 1);
    assert_eq!(err.notes[0].message, "x is a variable, not a function");
    assert!(err.notes[0].span.is_some());
}

#[test]
fn unknown_function_has_no_note() {
    let err = run(|b| vec![b.call("nowhere", &[])]).0.err();
    assert_eq!(err.map(|e| e.notes.len()), Some(0));
}

// Positions, echo and tracing

#[test]
fn errors_are_blamed_on_the_innermost_node() {
    let runtime = buffered();
    let mut b = AstBuilder::new(runtime.interner());
    let t = b.ident("T");
    let one = b.int(1);
    let bad = b.binary(BinaryOp::Add, t, one);
    let stmt = b.assign_to("x", bad);
    let script = Script::new(b.finish(&[stmt]));
    let expected = script.node(bad).span;
    let err = runtime.interpreter(script).evaluate_block().err();
    assert_eq!(err.and_then(|e| e.span), Some(expected));
}

/// Declares `(integer)broken()`, whose body reads an undefined name, from
/// an internal script.
fn declare_internal_broken(runtime: &Runtime) {
    let mut b = AstBuilder::new(runtime.interner());
    let missing = b.ident("missing");
    let ret = b.return_value(Some(missing));
    let body = b.block(&[ret]);
    let decl = b.function(ty(ValueMask::INT), "broken", &[], body);
    let library = Script::internal(b.finish(&[decl]));
    runtime
        .interpreter(library)
        .evaluate_block()
        .unwrap_or_else(|e| panic!("{e}"));
}

#[test]
fn internal_script_errors_are_blamed_on_the_user_call_site() {
    let runtime = buffered();
    declare_internal_broken(&runtime);

    // function (integer)outer() { return broken(); } outer();
    let mut b = AstBuilder::new(runtime.interner());
    let inner_call = b.call("broken", &[]);
    let ret = b.return_value(Some(inner_call));
    let body = b.block(&[ret]);
    let decl = b.function(ty(ValueMask::INT), "outer", &[], body);
    let outer_call = b.call("outer", &[]);
    let script = Script::new(b.finish(&[decl, outer_call]));
    let expected = script.node(inner_call).span;

    let mut interpreter = runtime.interpreter(script);
    let err = interpreter
        .evaluate_block()
        .err()
        .unwrap_or_else(|| panic!("broken() succeeded"));
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedIdentifier {
            name: "missing".into()
        }
    );
    assert_eq!(err.span, Some(expected));
    let frames: Vec<String> = err
        .backtrace
        .as_ref()
        .map(|bt| bt.frames().iter().map(|f| f.name.clone()).collect())
        .unwrap_or_default();
    assert_eq!(frames, vec!["broken".to_string(), "outer".to_string()]);
    assert_eq!(interpreter.call_depth(), 0);
    assert_eq!(runtime.error_context().current(), None);
}

#[test]
fn failed_calls_do_not_leave_their_blame_behind() {
    let runtime = buffered();
    declare_internal_broken(&runtime);
    let script = script(&runtime, |b| vec![b.call("broken", &[])]);
    let placed = runtime.interpreter(script).evaluate_block().err();
    assert!(placed.and_then(|e| e.span).is_some());

    // With the user call unwound, an internal script run on its own has
    // no user position to report.
    let mut b = AstBuilder::new(runtime.interner());
    let stray = b.ident("missing");
    let stray = Script::internal(b.finish(&[stray]));
    let err = runtime.interpreter(stray).evaluate_block().err();
    assert_eq!(err.map(|e| e.span), Some(None));
}

#[test]
fn interpreter_block_echoes_visible_results() {
    let runtime = buffered();
    let script = script(&runtime, |b| {
        let one = b.int(1);
        let set = b.assign_to("x", one);
        let x = b.ident("x");
        let two = b.int(2);
        let hidden = b.call("invisible", &[two]);
        let three = b.int(3);
        let printed = b.call("print", &[three]);
        vec![set, x, hidden, printed]
    });
    let result = runtime
        .interpreter(script)
        .evaluate_interpreter_block(true)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(result.is_void());
    assert_eq!(runtime.streams().output.get_output(), "1\n3\n");
}

#[test]
fn debug_points_trace_statements_on_their_lines() {
    let runtime = buffered().with_debug_points(DebugPoints::new([2]));
    let script = script(&runtime, |b| {
        let first = b.empty();
        b.at_line(2);
        let (one, two) = (b.int(1), b.int(2));
        let sum = b.binary(BinaryOp::Add, one, two);
        b.at_line(1);
        vec![first, sum]
    });
    let result = runtime.interpreter(script).evaluate_block();
    assert!(result.is_ok());
    assert_eq!(
        runtime.streams().diagnostics.get_output(),
        "#DEBUG (line 2): binary operator\n#DEBUG (line 2): => 3\n"
    );
}

#[test]
fn globals_survive_across_scripts() {
    let runtime = buffered();
    let first = script(&runtime, |b| {
        let seven = b.int(7);
        vec![b.assign_to("kept", seven)]
    });
    let mut interpreter = runtime.interpreter(first);
    assert!(interpreter.evaluate_block().is_ok());
    let symbols = interpreter.into_symbols();

    let second = script(&runtime, |b| vec![b.ident("kept")]);
    let result = InterpreterBuilder::new(&runtime, second)
        .symbols(symbols)
        .build()
        .evaluate_block()
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(result.as_ints(), Some(&[7][..]));
}
