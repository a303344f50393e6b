//! Unary operator implementations for the evaluator.

use eidos_ir::UnaryOp;
use eidos_value::errors::{integer_overflow, unsupported_operand};
use eidos_value::{Constants, EvalResult, Value, Vector};

use crate::operators::logical_result;

/// Evaluate `op value`. Dimensions carry over to the result.
pub fn evaluate_unary(constants: &Constants, op: UnaryOp, value: &Value) -> EvalResult {
    let dims = value.dims().cloned();
    match (op, value.vector()) {
        (UnaryOp::Plus, Vector::Int(_) | Vector::Float(_)) => Ok(value.clone().into_visible()),
        (UnaryOp::Neg, Vector::Int(values)) => {
            let negated = values
                .iter()
                .map(|v| v.checked_neg().ok_or_else(|| integer_overflow("unary '-'")))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::with_dims(Vector::Int(negated), dims))
        }
        (UnaryOp::Neg, Vector::Float(values)) => Ok(Value::with_dims(
            Vector::Float(values.iter().map(|v| -v).collect()),
            dims,
        )),
        (UnaryOp::Not, Vector::Null) => Ok(constants.logical_empty.clone()),
        (
            UnaryOp::Not,
            Vector::Logical(_) | Vector::Int(_) | Vector::Float(_) | Vector::String(_),
        ) => {
            let values = (0..value.len())
                .map(|i| value.truth_at(i).map(|b| !b))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(logical_result(constants, values, dims))
        }
        _ => Err(unsupported_operand(op.as_symbol(), value.value_type().name())),
    }
}
