//! Literals, member access and the n-ary logical operators.

use std::rc::Rc;

use eidos_ir::{Name, NodeId, NodeRange};
use eidos_value::errors::{invalid_number, object_required, unsupported_operand};
use eidos_value::{Dimensions, EvalError, EvalResult, Value, ValueType, Vector};

use super::Interpreter;
use crate::operators::{broadcast_len, logical_result, pick, result_dims};

/// Parse numeric literal text.
///
/// A `.` or `-` makes a float. An exponent without either must come out
/// as an exact integer. Plain digits are an integer.
pub(crate) fn parse_number(text: &str) -> EvalResult {
    if text.contains(['.', '-']) {
        return text
            .parse::<f64>()
            .map(Value::float_scalar)
            .map_err(|_| invalid_number(text));
    }
    if text.contains(['e', 'E']) {
        let x = text.parse::<f64>().map_err(|_| invalid_number(text))?;
        // 2^63 is the first float past i64::MAX.
        if x.fract() != 0.0 || !(0.0..9_223_372_036_854_775_808.0).contains(&x) {
            return Err(invalid_number(text));
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "x is a whole number inside the i64 range"
        )]
        let n = x as i64;
        return Ok(Value::int_scalar(n));
    }
    text.parse::<i64>()
        .map(Value::int_scalar)
        .map_err(|_| invalid_number(text))
}

impl Interpreter<'_> {
    pub(super) fn eval_number(&mut self, id: NodeId, text: Name) -> EvalResult {
        if let Some(value) = self.script.cached_literal(id) {
            return Ok(value);
        }
        let value = parse_number(self.name_str(text))?;
        self.script.cache_literal(id, &value);
        Ok(value)
    }

    pub(super) fn eval_string(&mut self, id: NodeId, text: Name) -> Value {
        if let Some(value) = self.script.cached_literal(id) {
            return value;
        }
        let value = Value::string_scalar(self.name_str(text));
        self.script.cache_literal(id, &value);
        value
    }

    pub(super) fn eval_member(&mut self, target: NodeId, name: Name) -> EvalResult {
        let receiver = self.eval(target)?;
        self.member_value(&receiver, self.name_str(name))
    }

    /// `receiver.property`: the property of every element, concatenated.
    pub(super) fn member_value(&self, receiver: &Value, property: &str) -> EvalResult {
        let Vector::Object(objects) = receiver.vector() else {
            return Err(object_required(".", receiver.value_type().name()));
        };
        let Some(class) = &objects.class else {
            return Ok(self.constants().null.clone());
        };
        class.property(property)?;

        match objects.elements.as_slice() {
            [] => Ok(self.constants().null.clone()),
            [single] => single.get_property(property),
            elements => {
                let values = elements
                    .iter()
                    .map(|element| element.get_property(property))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::concat(&values)
            }
        }
    }

    /// `a & b & ...` (`is_and`) or `a | b | ...`.
    ///
    /// Every operand is evaluated exactly once, left to right, and must be
    /// conformable with the running result even when the result is already
    /// decided.
    pub(super) fn eval_logical(&mut self, operands: NodeRange, is_and: bool) -> EvalResult {
        let symbol = if is_and { "&" } else { "|" };
        let script = Rc::clone(&self.script);
        let mut acc: Option<(Vec<bool>, Option<Dimensions>)> = None;

        for &node in script.list(operands) {
            let value = self.eval(node)?;
            let truths = truth_values(&value, symbol)?;
            let Some((current, dims)) = acc.take() else {
                acc = Some((truths, value.dims().cloned()));
                continue;
            };

            let len = broadcast_len(symbol, current.len(), truths.len())?;
            let dims = result_dims(symbol, dims.as_ref(), value.dims(), len)?;
            let (cn, tn) = (current.len(), truths.len());
            let combined = (0..len)
                .map(|i| {
                    let (a, b) = (current[pick(cn, i)], truths[pick(tn, i)]);
                    if is_and {
                        a && b
                    } else {
                        a || b
                    }
                })
                .collect();
            acc = Some((combined, dims));
        }

        let (values, dims) = acc.unwrap_or_default();
        Ok(logical_result(self.constants(), values, dims))
    }
}

/// Operand of `&` or `|` coerced to logical, element by element.
fn truth_values(value: &Value, symbol: &str) -> Result<Vec<bool>, EvalError> {
    match value.value_type() {
        ValueType::Void | ValueType::Null | ValueType::Object => {
            Err(unsupported_operand(symbol, value.value_type().name()))
        }
        _ => (0..value.len()).map(|i| value.truth_at(i)).collect(),
    }
}
