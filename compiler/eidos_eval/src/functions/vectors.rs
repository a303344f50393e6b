//! Vector construction, shape and reduction built-ins.

use eidos_value::errors::integer_overflow;
use eidos_value::{Dimensions, EvalError, EvalResult, Value, Vector};

use crate::binder::BoundArgs;
use crate::interpreter::Interpreter;

/// A non-negative count argument as `usize`.
fn count_arg(value: &Value, function: &str, param: &str) -> Result<usize, EvalError> {
    let n = value.int_at(0)?;
    usize::try_from(n).map_err(|_| {
        EvalError::new(format!(
            "function {function}() requires {param} to be greater than or equal to 0 ({n} supplied)"
        ))
    })
}

fn length_value(len: usize) -> Value {
    Value::int_scalar(i64::try_from(len).unwrap_or(i64::MAX))
}

fn counting(len: usize) -> Value {
    Value::int((0..len).map(|i| i64::try_from(i).unwrap_or(i64::MAX)).collect())
}

/// `(*)c(...)`
pub(super) fn c(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Value::concat(args.rest())
}

/// `(integer$)size(* x)`, also registered as `length()`.
pub(super) fn size(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(length_value(args.get(0).len()))
}

/// `(*)matrix(* data, [Ni$ nrow = NULL], [Ni$ ncol = NULL], [logical$ byrow = F])`
pub(super) fn matrix(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let data = args.get(0);
    let count = data.len();
    let extent = |value: &Value| -> Result<Option<usize>, EvalError> {
        if value.is_null() {
            return Ok(None);
        }
        let n = value.int_at(0)?;
        match usize::try_from(n) {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(EvalError::new(
                "dimension <= 0 requested, which is not allowed.",
            )),
        }
    };
    let nrow = extent(args.get(1))?;
    let ncol = extent(args.get(2))?;
    let byrow = args.get(3).logical_at(0)?;

    if count == 0 {
        return Err(EvalError::new(
            "matrix() cannot create a matrix with zero elements; matrix dimensions equal to \
             zero are not allowed.",
        ));
    }
    let (rows, cols) = match (nrow, ncol) {
        (None, None) => (count, 1),
        (None, Some(cols)) if count % cols == 0 => (count / cols, cols),
        (None, Some(_)) => {
            return Err(EvalError::new(
                "function matrix() data size is not a multiple of the supplied column count.",
            ))
        }
        (Some(rows), None) if count % rows == 0 => (rows, count / rows),
        (Some(_), None) => {
            return Err(EvalError::new(
                "function matrix() data size is not a multiple of the supplied row count.",
            ))
        }
        (Some(rows), Some(cols)) if rows.checked_mul(cols) == Some(count) => (rows, cols),
        (Some(_), Some(_)) => {
            return Err(EvalError::new(
                "function matrix() requires a data vector with a length equal to the product \
                 of the proposed number of rows and columns.",
            ))
        }
    };

    let vector = if byrow && count > 1 {
        let order: Vec<usize> = (0..count)
            .map(|i| (i / rows) + (i % rows) * cols)
            .collect();
        data.vector().gather(&order)
    } else {
        data.vector().clone()
    };
    Ok(Value::with_dims(vector, Some(Dimensions::matrix(rows, cols))))
}

/// `(*)array(* data, integer dim)`
pub(super) fn array(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let data = args.get(0);
    let dim = args.get(1);
    if dim.len() < 2 {
        return Err(EvalError::new(
            "function array() requires at least two dimensions",
        ));
    }
    let extents = (0..dim.len())
        .map(|i| {
            let n = dim.int_at(i)?;
            usize::try_from(n)
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| EvalError::new("function array() requires dimensions greater than 0"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let dims = Dimensions::new(&extents);
    if dims.as_ref().and_then(Dimensions::product) != Some(data.len()) {
        return Err(EvalError::new(
            "function array() requires the size of data to equal the product of the dimensions",
        ));
    }
    Ok(Value::with_dims(data.vector().clone(), dims))
}

/// `(Ni)dim(* x)`: the extents, or NULL for a plain vector.
pub(super) fn dim(interpreter: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(match args.get(0).dims() {
        Some(dims) => Value::int(
            dims.extents()
                .iter()
                .map(|&e| i64::try_from(e).unwrap_or(i64::MAX))
                .collect(),
        ),
        None => interpreter.constants().null.clone(),
    })
}

/// `(*)rep(* x, integer$ count)`
pub(super) fn rep(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let x = args.get(0);
    let count = count_arg(args.get(1), "rep", "count")?;
    Ok(Value::new(x.vector().repeat_whole(count)))
}

/// `(*)repEach(* x, integer count)`: each element repeated `count` times,
/// or `count[i]` times when `count` matches `x` in length.
pub(super) fn rep_each(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    let x = args.get(0);
    let count = args.get(1);
    if count.len() != 1 && count.len() != x.len() {
        return Err(EvalError::new(
            "function repEach() requires that parameter count's size() either (1) be equal \
             to 1, or (2) be equal to the size() of its first argument.",
        ));
    }
    let counts = (0..count.len())
        .map(|i| {
            let n = count.int_at(i)?;
            usize::try_from(n).map_err(|_| {
                EvalError::new(format!(
                    "function repEach() requires count to be greater than or equal to 0 \
                     ({n} supplied)"
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::new(x.vector().repeat_each(&counts)))
}

/// `(integer)seqLen(integer$ length)`: `0, 1, ..., length - 1`.
pub(super) fn seq_len(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(counting(count_arg(args.get(0), "seqLen", "length")?))
}

/// `(integer)seqAlong(* x)`: the indices of `x`.
pub(super) fn seq_along(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    Ok(counting(args.get(0).len()))
}

/// `(numeric$)sum(lif x)`
///
/// Logical and integer sums are integer and checked for overflow.
pub(super) fn sum(_: &mut Interpreter<'_>, args: &BoundArgs) -> EvalResult {
    match args.get(0).vector() {
        Vector::Logical(values) => Ok(length_value(values.iter().filter(|&&b| b).count())),
        Vector::Int(values) => values
            .iter()
            .try_fold(0i64, |acc, &v| acc.checked_add(v))
            .map(Value::int_scalar)
            .ok_or_else(|| integer_overflow("function sum()")),
        Vector::Float(values) => Ok(Value::float_scalar(values.iter().sum())),
        other => Err(EvalError::new(format!(
            "function sum() cannot sum type {}",
            other.value_type().name()
        ))),
    }
}
