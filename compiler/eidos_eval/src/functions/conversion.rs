//! Typed constructors and `as*()` conversions.
//!
//! Conversions keep the argument's dimensions. Unlike implicit promotion
//! they may narrow: `asInteger(2.7)` is 2, `asLogical("F")` is F.

use eidos_value::errors::invalid_conversion;
use eidos_value::{EvalError, EvalResult, Value, ValueType, Vector};

use crate::binder::BoundArgs;
use crate::interpreter::Interpreter;

fn length(args: &BoundArgs, function: &str) -> Result<usize, EvalError> {
    let n = args.get(0).int_at(0)?;
    usize::try_from(n).map_err(|_| {
        EvalError::new(format!(
            "function {function}() requires length to be greater than or equal to 0 ({n} supplied)"
        ))
    })
}

/// `(logical)logical([integer$ length = 0])`: `length` F values.
pub(super) fn logical(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(Value::logical(vec![false; length(args, "logical")?]))
}

pub(super) fn integer(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(Value::int(vec![0; length(args, "integer")?]))
}

pub(super) fn float(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(Value::float(vec![0.0; length(args, "float")?]))
}

pub(super) fn string(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(Value::string(vec![String::new(); length(args, "string")?]))
}

/// Convert every element of `x` with `element`, keeping dimensions.
/// NULL converts to an empty vector of the target kind.
fn convert<T>(
    x: &Value,
    to: ValueType,
    element: impl Fn(&Value, usize) -> Result<T, EvalError>,
    wrap: impl FnOnce(Vec<T>) -> Vector,
) -> EvalResult {
    match x.value_type() {
        ValueType::Null => Ok(Value::new(Vector::empty_of(to, None))),
        ValueType::Logical | ValueType::Int | ValueType::Float | ValueType::String => {
            let values = (0..x.len())
                .map(|i| element(x, i))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::with_dims(wrap(values), x.dims().cloned()))
        }
        other => Err(invalid_conversion(other.name(), to.name())),
    }
}

fn parse_failure(text: &str, to: ValueType) -> EvalError {
    EvalError::new(format!("string \"{text}\" cannot be converted to type {}", to.name()))
}

pub(super) fn as_logical(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    convert(
        args.get(0),
        ValueType::Logical,
        |x, i| match x.as_strings() {
            Some(strings) => match strings[i].as_str() {
                "T" | "true" | "TRUE" => Ok(true),
                "F" | "false" | "FALSE" => Ok(false),
                other => Err(parse_failure(other, ValueType::Logical)),
            },
            None => x.truth_at(i),
        },
        Vector::Logical,
    )
}

/// A float truncated toward zero, when it fits in an integer.
fn truncate(value: f64) -> Result<i64, EvalError> {
    let t = value.trunc();
    // 2^63 is the first float past i64::MAX.
    if !t.is_finite() || !(-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&t) {
        return Err(EvalError::new(format!(
            "float value {value} cannot be converted to type integer"
        )));
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "t is a whole number inside the i64 range"
    )]
    Ok(t as i64)
}

pub(super) fn as_integer(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    convert(
        args.get(0),
        ValueType::Int,
        |x, i| match x.vector() {
            Vector::Float(values) => truncate(values[i]),
            Vector::String(values) => {
                let text = values[i].trim();
                text.parse::<i64>().or_else(|_| {
                    text.parse::<f64>()
                        .map_err(|_| parse_failure(text, ValueType::Int))
                        .and_then(truncate)
                })
            }
            _ => x.int_at(i),
        },
        Vector::Int,
    )
}

pub(super) fn as_float(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    convert(
        args.get(0),
        ValueType::Float,
        |x, i| match x.as_strings() {
            Some(strings) => {
                let text = strings[i].trim();
                text.parse::<f64>()
                    .map_err(|_| parse_failure(text, ValueType::Float))
            }
            None => x.float_at(i),
        },
        Vector::Float,
    )
}

pub(super) fn as_string(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    convert(args.get(0), ValueType::String, Value::string_at, Vector::String)
}
