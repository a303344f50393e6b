//! Binary operator implementations for the evaluator.
//!
//! Operators are vectorized: two operands of equal length combine element
//! by element, and a singleton combines with every element of the other
//! side. Dispatch is direct pattern matching over operand kinds; the kind
//! set is closed, so there is no operator trait.

use std::cmp::Ordering;

use eidos_ir::BinaryOp;
use eidos_value::errors::{
    integer_overflow, invalid_conversion, non_conformable, null_comparison, operand_combination,
    size_mismatch, unsupported_operand,
};
use eidos_value::{Constants, Dimensions, EvalError, EvalResult, Value, ValueType, Vector};

// Shape helpers

/// Result length of an element-wise operation on operands of length `a`
/// and `b`.
pub(crate) fn broadcast_len(op: &str, a: usize, b: usize) -> Result<usize, EvalError> {
    if a == b {
        Ok(a)
    } else if a == 1 {
        Ok(b)
    } else if b == 1 {
        Ok(a)
    } else {
        Err(size_mismatch(op))
    }
}

/// Index into an operand of length `len` for result element `i`.
#[inline]
pub(crate) fn pick(len: usize, i: usize) -> usize {
    if len == 1 {
        0
    } else {
        i
    }
}

/// Dimensions of a `len`-element result of `op`.
///
/// Two dimensioned operands must match exactly; a lone dimensioned operand
/// lends its dimensions when they fit the result.
pub(crate) fn result_dims(
    op: &str,
    a: Option<&Dimensions>,
    b: Option<&Dimensions>,
    len: usize,
) -> Result<Option<Dimensions>, EvalError> {
    let dims = match (a, b) {
        (Some(x), Some(y)) if x != y => return Err(non_conformable(op)),
        (Some(x), _) | (None, Some(x)) => x,
        (None, None) => return Ok(None),
    };
    if dims.product() != Some(len) {
        return Err(non_conformable(op));
    }
    Ok(Some(dims.clone()))
}

/// A logical result, using the shared `T`/`F` for plain singletons.
pub(crate) fn logical_result(
    constants: &Constants,
    values: Vec<bool>,
    dims: Option<Dimensions>,
) -> Value {
    match (values.as_slice(), &dims) {
        ([single], None) => constants.logical(*single),
        _ => Value::with_dims(Vector::Logical(values), dims),
    }
}

fn checked_int(a: i64, b: i64, op: BinaryOp) -> Option<i64> {
    match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        _ => None,
    }
}

fn float_arith(a: f64, b: f64, op: BinaryOp) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        // Comparisons never reach arithmetic.
        _ => f64::NAN,
    }
}

#[cold]
fn overflow(op: BinaryOp) -> EvalError {
    integer_overflow(&format!("operator '{}'", op.as_symbol()))
}

// Direct dispatch

/// Evaluate `lhs op rhs`.
pub fn evaluate_binary(
    constants: &Constants,
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
) -> EvalResult {
    if op.is_comparison() {
        compare(constants, op, lhs, rhs)
    } else {
        arithmetic(op, lhs, rhs)
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    let symbol = op.as_symbol();
    let (lt, rt) = (lhs.value_type(), rhs.value_type());

    let concatenating = op == BinaryOp::Add && (lt == ValueType::String || rt == ValueType::String);
    if concatenating {
        for ty in [lt, rt] {
            if matches!(ty, ValueType::Void | ValueType::Object) {
                return Err(unsupported_operand(symbol, ty.name()));
            }
        }
        // NULL joins a string as its own name.
        let null_text = Value::string_scalar("NULL");
        let lhs = if lt == ValueType::Null { &null_text } else { lhs };
        let rhs = if rt == ValueType::Null { &null_text } else { rhs };
        return concatenate(symbol, lhs, rhs);
    }

    let numeric = |ty: ValueType| matches!(ty, ValueType::Int | ValueType::Float);
    if op == BinaryOp::Add && lt != ValueType::Void && rt != ValueType::Void {
        if !numeric(lt) || !numeric(rt) {
            return Err(operand_combination(symbol, lt.name(), rt.name()));
        }
    } else {
        for ty in [lt, rt] {
            if !numeric(ty) {
                return Err(unsupported_operand(symbol, ty.name()));
            }
        }
    }

    let len = broadcast_len(symbol, lhs.len(), rhs.len())?;
    let dims = result_dims(symbol, lhs.dims(), rhs.dims(), len)?;
    let (ln, rn) = (lhs.len(), rhs.len());

    let vector = if let (Some(a), Some(b), true) = (
        lhs.as_ints(),
        rhs.as_ints(),
        matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul),
    ) {
        let out = (0..len)
            .map(|i| checked_int(a[pick(ln, i)], b[pick(rn, i)], op).ok_or_else(|| overflow(op)))
            .collect::<Result<Vec<_>, _>>()?;
        Vector::Int(out)
    } else {
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let a = lhs.float_at(pick(ln, i))?;
            let b = rhs.float_at(pick(rn, i))?;
            out.push(float_arith(a, b, op));
        }
        Vector::Float(out)
    };
    Ok(Value::with_dims(vector, dims))
}

/// String `+`: every operand is promoted to string and joined pairwise.
fn concatenate(symbol: &str, lhs: &Value, rhs: &Value) -> EvalResult {
    let len = broadcast_len(symbol, lhs.len(), rhs.len())?;
    let dims = result_dims(symbol, lhs.dims(), rhs.dims(), len)?;
    let (ln, rn) = (lhs.len(), rhs.len());
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let mut s = lhs.string_at(pick(ln, i))?;
        s.push_str(&rhs.string_at(pick(rn, i))?);
        out.push(s);
    }
    Ok(Value::with_dims(Vector::String(out), dims))
}

fn ordering_matches(ordering: Option<Ordering>, op: BinaryOp) -> bool {
    match op {
        BinaryOp::Eq => ordering == Some(Ordering::Equal),
        BinaryOp::NotEq => ordering != Some(Ordering::Equal),
        BinaryOp::Lt => ordering == Some(Ordering::Less),
        BinaryOp::LtEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => ordering == Some(Ordering::Greater),
        BinaryOp::GtEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => false,
    }
}

fn compare(constants: &Constants, op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    let symbol = op.as_symbol();
    let (lt, rt) = (lhs.value_type(), rhs.value_type());

    for ty in [lt, rt] {
        if ty == ValueType::Void {
            return Err(unsupported_operand(symbol, ty.name()));
        }
    }
    if lt == ValueType::Null || rt == ValueType::Null {
        let ordering_an_object = !matches!(op, BinaryOp::Eq | BinaryOp::NotEq)
            && (lt == ValueType::Object || rt == ValueType::Object);
        if ordering_an_object {
            return Err(unsupported_operand(symbol, ValueType::Object.name()));
        }
        return Err(null_comparison(symbol));
    }

    let len = broadcast_len(symbol, lhs.len(), rhs.len())?;
    let dims = result_dims(symbol, lhs.dims(), rhs.dims(), len)?;
    let (ln, rn) = (lhs.len(), rhs.len());

    let values = match (lhs.vector(), rhs.vector()) {
        (Vector::Object(a), Vector::Object(b)) => {
            if !matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
                return Err(unsupported_operand(symbol, ValueType::Object.name()));
            }
            let want_same = op == BinaryOp::Eq;
            (0..len)
                .map(|i| {
                    let same = eidos_value::same_object(
                        &a.elements[pick(ln, i)],
                        &b.elements[pick(rn, i)],
                    );
                    same == want_same
                })
                .collect()
        }
        (Vector::Object(_), _) | (_, Vector::Object(_)) => {
            let other = if lt == ValueType::Object { rt } else { lt };
            return Err(invalid_conversion(other.name(), ValueType::Object.name()));
        }
        _ => {
            let mut out = Vec::with_capacity(len);
            let promoted = lt.max(rt);
            for i in 0..len {
                let (a, b) = (pick(ln, i), pick(rn, i));
                let ordering = match promoted {
                    ValueType::String => Some(lhs.string_at(a)?.cmp(&rhs.string_at(b)?)),
                    ValueType::Float => lhs.float_at(a)?.partial_cmp(&rhs.float_at(b)?),
                    _ => Some(lhs.int_at(a)?.cmp(&rhs.int_at(b)?)),
                };
                out.push(ordering_matches(ordering, op));
            }
            out
        }
    };
    Ok(logical_result(constants, values, dims))
}

// In-place compound assignment

/// Apply `x = x op k` directly to `x`'s storage.
///
/// Handles integer `x` with an integer singleton `k` under `+ - *`, and
/// float `x` with a numeric singleton `k` under any arithmetic operator:
/// the cases where the result keeps `x`'s kind, length and dimensions.
/// Returns `Ok(false)`, leaving `x` untouched, for anything else. On
/// overflow `x` is also left untouched.
pub(crate) fn compound_in_place(op: BinaryOp, x: &mut Value, k: &Value) -> Result<bool, EvalError> {
    if op.is_comparison() || !k.is_singleton() {
        return Ok(false);
    }
    match (x.value_type(), k.value_type()) {
        (ValueType::Int, ValueType::Int)
            if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul) =>
        {
            let k = k.int_at(0)?;
            let values = x.as_ints().unwrap_or_default();
            if values.iter().any(|&v| checked_int(v, k, op).is_none()) {
                return Err(overflow(op));
            }
            if let Vector::Int(values) = &mut x.make_mut().vector {
                for v in values.iter_mut() {
                    *v = checked_int(*v, k, op).unwrap_or(*v);
                }
            }
            Ok(true)
        }
        (ValueType::Float, ValueType::Int | ValueType::Float) => {
            let k = k.float_at(0)?;
            if let Vector::Float(values) = &mut x.make_mut().vector {
                for v in values.iter_mut() {
                    *v = float_arith(*v, k, op);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}
