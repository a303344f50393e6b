//! Functions the embedding provides through a `FunctionDelegate`.

use std::cell::RefCell;
use std::rc::Rc;

use eidos_eval::{
    BoundArgs, EvalErrorKind, EvalResult, FunctionDelegate, Interpreter, OutputStreams, Runtime,
    Script, Value,
};
use eidos_ir::{AstBuilder, NodeId, TypeSpec, ValueMask};
use eidos_value::{EvalError, SignatureBuilder};
use pretty_assertions::assert_eq;

/// Records every call and answers a few host functions.
#[derive(Default)]
struct Host {
    calls: RefCell<Vec<String>>,
}

impl FunctionDelegate for Host {
    fn call(
        &self,
        name: &str,
        args: &BoundArgs,
        interpreter: &mut Interpreter<'_>,
    ) -> EvalResult {
        self.calls.borrow_mut().push(name.to_string());
        match name {
            "host_sum" => {
                let x = args.get(0);
                let total = (0..x.len()).map(|i| x.int_at(i)).sum::<Result<i64, _>>()?;
                Ok(Value::int_scalar(total))
            }
            "host_label" => Ok(Value::string_scalar("not a number")),
            "host_depth" => {
                let depth = i64::try_from(interpreter.call_depth()).unwrap_or(i64::MAX);
                Ok(Value::int_scalar(depth))
            }
            "host_define" => {
                let name = interpreter.runtime().interner().intern("fromHost");
                interpreter.symbols_mut().define(name, Value::int_scalar(42))?;
                Ok(interpreter.runtime().constants().void.clone())
            }
            _ => Err(EvalError::new(format!("host has no function {name}"))),
        }
    }
}

fn register_host_functions(runtime: &Runtime) {
    let int_result = ValueMask::INT | ValueMask::SINGLETON;
    let signatures = [
        SignatureBuilder::function("hostSum", int_result)
            .param(ValueMask::INT, "x")
            .delegate("host_sum"),
        SignatureBuilder::function("hostLabel", int_result).delegate("host_label"),
        SignatureBuilder::function("hostDefine", ValueMask::NULL).delegate("host_define"),
        SignatureBuilder::function("hostDepth", int_result).delegate("host_depth"),
    ];
    for builder in signatures {
        let signature = builder.finish().unwrap_or_else(|e| panic!("{e}"));
        runtime
            .registry()
            .register_delegated(signature)
            .unwrap_or_else(|e| panic!("{e}"));
    }
}

fn hosted() -> (Runtime, Rc<Host>) {
    let host = Rc::new(Host::default());
    let runtime = Runtime::new()
        .with_streams(OutputStreams::buffered())
        .with_delegate(Rc::clone(&host) as Rc<dyn FunctionDelegate>);
    register_host_functions(&runtime);
    (runtime, host)
}

fn run(runtime: &Runtime, build: impl FnOnce(&mut AstBuilder<'_>) -> Vec<NodeId>) -> EvalResult {
    let mut b = AstBuilder::new(runtime.interner());
    let statements = build(&mut b);
    runtime
        .interpreter(Script::new(b.finish(&statements)))
        .evaluate_block()
}

#[test]
fn delegated_call_reaches_the_host_under_its_delegate_name() {
    let (runtime, host) = hosted();
    let result = run(&runtime, |b| {
        let one = b.int(1);
        let four = b.int(4);
        let range = b.range(one, four);
        vec![b.call("hostSum", &[range])]
    })
    .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(result.as_ints(), Some(&[10][..]));
    assert_eq!(*host.calls.borrow(), vec!["host_sum".to_string()]);
}

#[test]
fn arguments_are_checked_before_the_host_runs() {
    let (runtime, host) = hosted();
    let err = run(&runtime, |b| {
        let text = b.string("x");
        vec![b.call("hostSum", &[text])]
    })
    .err()
    .map(|e| e.kind);
    assert!(
        matches!(err, Some(EvalErrorKind::ArgumentType { position: 1, .. })),
        "{err:?}"
    );
    assert!(host.calls.borrow().is_empty());
}

#[test]
fn host_results_are_checked_against_the_return_type() {
    let (runtime, _) = hosted();
    let err = run(&runtime, |b| vec![b.call("hostLabel", &[])])
        .err()
        .map(|e| e.kind);
    assert_eq!(
        err,
        Some(EvalErrorKind::ReturnType {
            type_name: "string",
            callee: "function hostLabel()".into(),
        })
    );
}

#[test]
fn host_can_work_on_the_calling_interpreter() {
    let (runtime, _) = hosted();
    let result = run(&runtime, |b| {
        let define = b.call("hostDefine", &[]);
        let read = b.ident("fromHost");
        vec![define, read]
    })
    .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(result.as_ints(), Some(&[42][..]));
}

#[test]
fn delegated_functions_cannot_be_redeclared() {
    let (runtime, _) = hosted();
    let err = run(&runtime, |b| {
        let body = b.block(&[]);
        vec![b.function(TypeSpec::void(), "hostSum", &[], body)]
    })
    .err()
    .map(|e| e.kind);
    assert_eq!(
        err,
        Some(EvalErrorKind::BuiltinReplacement {
            name: "hostSum".into()
        })
    );
}

#[test]
fn delegated_call_without_a_host_is_an_error() {
    let runtime = Runtime::new();
    register_host_functions(&runtime);
    let err = run(&runtime, |b| vec![b.call("hostLabel", &[])])
        .err()
        .map(|e| e.kind);
    assert!(matches!(err, Some(EvalErrorKind::Custom { .. })), "{err:?}");
}

#[test]
fn delegated_signatures_print_like_builtins() {
    let (runtime, _) = hosted();
    run(&runtime, |b| {
        let name = b.string("hostSum");
        vec![b.call("functionSignature", &[name])]
    })
    .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        runtime.streams().output.get_output(),
        "(integer$)hostSum(integer x)\n"
    );
}

#[test]
fn host_sees_the_call_depth_of_its_caller() {
    let (runtime, _) = hosted();
    let result = run(&runtime, |b| {
        let inner = b.call("hostDepth", &[]);
        let ret = b.return_value(Some(inner));
        let body = b.block(&[ret]);
        let decl = b.function(TypeSpec::new(ValueMask::INT), "nested", &[], body);
        let top = b.call("hostDepth", &[]);
        let nested = b.call("nested", &[]);
        let both = b.call("c", &[top, nested]);
        vec![decl, both]
    })
    .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(result.as_ints(), Some(&[0, 1][..]));
}
