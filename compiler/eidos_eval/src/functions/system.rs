//! Output, identity and symbol-table built-ins.

use eidos_value::errors::stop_called;
use eidos_value::{EvalResult, Value};

use super::Callee;
use crate::binder::BoundArgs;
use crate::interpreter::Interpreter;

/// `(void)print(* x)`: the value as the interpreter echoes it, plus a
/// newline.
pub(super) fn print(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let runtime = interpreter.runtime();
    runtime.streams().output.println(&args.get(0).to_string());
    Ok(runtime.constants().void.clone())
}

/// `(void)cat(* x, [string$ sep = " "])`: elements joined by `sep`, no
/// trailing newline.
pub(super) fn cat(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let runtime = interpreter.runtime();
    let sep = args.get(1).string_at(0)?;
    runtime.streams().output.print(&args.get(0).cat_string(&sep));
    Ok(runtime.constants().void.clone())
}

pub(super) fn identical(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let same = args.get(0).identical(args.get(1));
    Ok(interpreter.constants().logical(same))
}

pub(super) fn is_null(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(interpreter.constants().logical(args.get(0).is_null()))
}

/// `(string$)type(* x)`
pub(super) fn type_of(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(Value::string_scalar(args.get(0).value_type().name()))
}

/// `(logical$)exists(string$ symbol)`: true for variables, constants and
/// the intrinsic constants alike.
pub(super) fn exists(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let symbol = args.get(0).string_at(0)?;
    // A string that was never interned cannot name a binding.
    let found = interpreter
        .runtime()
        .interner()
        .get(&symbol)
        .is_some_and(|name| interpreter.symbols().lookup_or_special_raise(name).is_ok());
    Ok(interpreter.constants().logical(found))
}

/// `(void)rm([Ns variableNames = NULL], [logical$ removeConstants = F])`
///
/// With no names every variable goes; constants stay. Named constants are
/// removed only with `removeConstants = T`, and intrinsic constants never.
pub(super) fn rm(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let names = args.get(0);
    let remove_constants = args.get(1).logical_at(0)?;
    if names.is_null() {
        interpreter.symbols_mut().clear_variables();
    } else {
        for i in 0..names.len() {
            let Some(name) = interpreter.runtime().interner().get(&names.string_at(i)?) else {
                continue;
            };
            interpreter.symbols_mut().remove(name, remove_constants)?;
        }
    }
    Ok(interpreter.constants().void.clone())
}

/// `(void)defineConstant(string$ symbol, * x)`
pub(super) fn define_constant(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let symbol = args.get(0).string_at(0)?;
    let name = interpreter.runtime().interner().intern(&symbol);
    let value = args.get(1).clone().into_visible();
    interpreter.symbols_mut().define_constant(name, value)?;
    Ok(interpreter.constants().void.clone())
}

/// `(void)stop([Ns$ message = NULL])`
pub(super) fn stop(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let message = args.get(0);
    let text = if message.is_null() {
        String::new()
    } else {
        message.string_at(0)?
    };
    Err(stop_called(&text))
}

/// `(*)invisible(* x)`: `x`, not echoed at top level.
pub(super) fn invisible(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(args.get(0).clone().into_invisible())
}

/// `(void)functionSignature([Ns$ functionName = NULL])`
///
/// Prints the signature of one function, or of every function whose name
/// does not start with `_`.
pub(super) fn function_signature(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let runtime = interpreter.runtime();
    let registry = runtime.registry();
    let output = &runtime.streams().output;
    let requested = args.get(0);

    let names = if requested.is_null() {
        registry
            .names()
            .into_iter()
            .filter(|name| !name.starts_with('_'))
            .map(str::to_string)
            .collect()
    } else {
        vec![requested.string_at(0)?]
    };

    for name in names {
        match registry.get_by_str(&name) {
            Some(entry) => {
                let suffix = if matches!(entry.callee, Callee::User(_)) {
                    " <user-defined>"
                } else {
                    ""
                };
                output.println(&format!("{}{suffix}", entry.signature));
            }
            None => output.println(&format!("No function signature found for \"{name}\".")),
        }
    }
    Ok(runtime.constants().void.clone())
}
