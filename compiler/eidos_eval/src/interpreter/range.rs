//! The `:` operator.

use eidos_ir::{NodeId, NodeKind};
use eidos_value::errors::{
    range_non_finite, range_operand_size, range_too_long, range_underflow, unsupported_operand,
};
use eidos_value::{EvalError, EvalResult, Value, ValueType};

use super::Interpreter;

/// Most elements a range may have.
pub(super) const MAX_RANGE_LEN: usize = 100_000_000;

/// An integer range `start:end`, ascending or descending, by position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) struct IntRange {
    start: i64,
    descending: bool,
    len: usize,
}

impl IntRange {
    pub(super) fn new(start: i64, end: i64) -> Result<Self, EvalError> {
        let distance = (i128::from(end) - i128::from(start)).unsigned_abs();
        let len = usize::try_from(distance)
            .ok()
            .filter(|&d| d < MAX_RANGE_LEN)
            .ok_or_else(|| range_too_long(MAX_RANGE_LEN))?
            + 1;
        Ok(IntRange {
            start,
            descending: end < start,
            len,
        })
    }

    /// `0, 1, ..., count - 1`; empty for zero.
    pub(super) fn counting(count: usize) -> Self {
        IntRange {
            start: 0,
            descending: false,
            len: count,
        }
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.len
    }

    /// Element `index`, for `index < len`.
    #[inline]
    pub(super) fn at(&self, index: usize) -> i64 {
        let offset = i64::try_from(index).unwrap_or(i64::MAX);
        if self.descending {
            self.start - offset
        } else {
            self.start + offset
        }
    }

    fn to_vec(self) -> Vec<i64> {
        (0..self.len).map(|i| self.at(i)).collect()
    }
}

/// Check `:` operands: numeric first, then singleton.
pub(super) fn check_operands(start: &Value, end: &Value) -> Result<(), EvalError> {
    for operand in [start, end] {
        let ty = operand.value_type();
        if !matches!(ty, ValueType::Int | ValueType::Float) {
            return Err(unsupported_operand(":", ty.name()));
        }
    }
    if !start.is_singleton() || !end.is_singleton() {
        return Err(range_operand_size());
    }
    Ok(())
}

/// Integer endpoints, when both operands are integer singletons.
pub(super) fn int_endpoints(start: &Value, end: &Value) -> Option<(i64, i64)> {
    match (start.as_ints(), end.as_ints()) {
        (Some(&[a]), Some(&[b])) => Some((a, b)),
        _ => None,
    }
}

/// `start:end` for evaluated operands.
pub(super) fn make_range(start: &Value, end: &Value) -> EvalResult {
    check_operands(start, end)?;
    if let Some((a, b)) = int_endpoints(start, end) {
        return Ok(Value::int(IntRange::new(a, b)?.to_vec()));
    }

    let first = start.float_at(0)?;
    let last = end.float_at(0)?;
    if !first.is_finite() || !last.is_finite() {
        return Err(range_non_finite());
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "the limit is exactly representable"
    )]
    let limit = MAX_RANGE_LEN as f64;
    if (last - first).abs() >= limit {
        return Err(range_too_long(MAX_RANGE_LEN));
    }

    let ascending = first <= last;
    let step = if ascending { 1.0 } else { -1.0 };
    let mut values = Vec::new();
    let mut x = first;
    while (ascending && x <= last) || (!ascending && x >= last) {
        values.push(x);
        let next = x + step;
        if next == x {
            return Err(range_underflow());
        }
        x = next;
    }
    Ok(Value::float(values))
}

impl Interpreter<'_> {
    pub(super) fn eval_range(&mut self, id: NodeId, start: NodeId, end: NodeId) -> EvalResult {
        if let Some(cached) = self.script.cached_literal(id) {
            return Ok(cached);
        }
        let first = self.eval(start)?;
        let last = self.eval(end)?;
        let range = make_range(&first, &last)?;

        let literal = |node| matches!(self.script.kind(node), NodeKind::Number(_));
        if literal(start) && literal(end) {
            self.script.cache_literal(id, &range);
        }
        Ok(range)
    }
}
