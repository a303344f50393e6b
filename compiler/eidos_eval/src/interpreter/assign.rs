//! Assignment.
//!
//! `x = value`, `x[i] = value`, `x[i, j] = value`, `obj.prop = value` and
//! nestings of these. Two statement shapes that dominate loops are
//! recognized and done in place on the stored value:
//!
//! - `x = x op k` with a numeric literal `k`
//! - `x = c(x, y)`
//!
//! Both fall back to the general path whenever the in-place result would
//! differ from it.

use std::rc::Rc;

use eidos_ir::{BinaryOp, Name, NodeId, NodeKind, NodeRange};
use eidos_value::errors::{
    assignment_size, assignment_type_mismatch, not_an_lvalue, object_class_mismatch,
    object_required, property_type, read_only_property, unsupported_operand,
};
use eidos_value::{EvalError, EvalResult, Value, ValueType, Vector};

use super::subscript::{select, Selector};
use super::Interpreter;
use crate::operators::{compound_in_place, evaluate_binary, pick};

impl Interpreter<'_> {
    /// Evaluate `target = value`. The statement's own value is an invisible
    /// NULL.
    pub(super) fn eval_assign(&mut self, target: NodeId, value: NodeId) -> EvalResult {
        if let NodeKind::Identifier(name) = *self.script.kind(target) {
            if self.is_plain_local(name) && self.assign_in_place(name, value)? {
                return Ok(self.constants().invisible_null.clone());
            }
        }
        let rvalue = self.eval(value)?;
        self.assign_into(target, rvalue)?;
        Ok(self.constants().invisible_null.clone())
    }

    /// A local variable that is neither a constant nor a running loop
    /// variable.
    fn is_plain_local(&self, name: Name) -> bool {
        self.symbols.is_local(name) && !self.symbols.is_iterator(name)
    }

    /// Try the in-place shapes. `Ok(true)` when `name` has been updated;
    /// `Ok(false)` when nothing was evaluated and the general path must run.
    fn assign_in_place(&mut self, name: Name, value: NodeId) -> Result<bool, EvalError> {
        let script = Rc::clone(&self.script);
        match *script.kind(value) {
            NodeKind::Binary { op, lhs, rhs }
                if !op.is_comparison()
                    && *script.kind(lhs) == NodeKind::Identifier(name)
                    && matches!(script.kind(rhs), NodeKind::Number(_)) =>
            {
                let k = self.eval(rhs)?;
                self.compound_literal(name, op, &k)
                    .map_err(|err| self.blame(err, value))?;
                Ok(true)
            }
            NodeKind::Call { callee, args } if self.is_append(name, callee, args) => {
                let [_, appended] = *script.list(args) else {
                    return Ok(false);
                };
                let y = self.eval(appended)?;
                self.append(name, y).map_err(|err| self.blame(err, value))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// `x = x op k` with `k` already evaluated.
    fn compound_literal(&mut self, name: Name, op: BinaryOp, k: &Value) -> Result<(), EvalError> {
        let done = self
            .symbols
            .with_local_mut(name, |x| compound_in_place(op, x, k))
            .transpose()?;
        if done == Some(true) {
            return Ok(());
        }
        let x = self.symbols.lookup(name)?;
        let result = evaluate_binary(self.constants(), op, &x, k)?;
        self.symbols.define(name, result.into_visible())
    }

    /// Whether `c(name, y)` names the built-in `c` with two unnamed
    /// arguments, the first being `name` itself.
    fn is_append(&self, name: Name, callee: NodeId, args: NodeRange) -> bool {
        let c = self.runtime.names.c;
        if *self.script.kind(callee) != NodeKind::Identifier(c)
            || !self.runtime.registry().is_builtin(c)
        {
            return false;
        }
        match *self.script.list(args) {
            [first, second] => {
                *self.script.kind(first) == NodeKind::Identifier(name)
                    && !matches!(self.script.kind(second), NodeKind::NamedArg { .. })
            }
            _ => false,
        }
    }

    /// `x = c(x, y)` with `y` already evaluated.
    fn append(&mut self, name: Name, y: Value) -> Result<(), EvalError> {
        let appended = self.symbols.with_local_mut(name, |x| {
            let same_kind = x.value_type() == y.value_type()
                && !matches!(x.value_type(), ValueType::Null | ValueType::Void);
            if same_kind {
                // `extend_from` fails before touching the buffer, so `x`
                // keeps its shape on error.
                let data = x.make_mut();
                data.vector.extend_from(y.vector())?;
                data.dims = None;
                Ok(())
            } else {
                Value::concat(&[x.clone(), y.clone()]).map(|joined| *x = joined)
            }
        });
        match appended {
            Some(result) => result,
            // The variable went away while `y` was evaluated.
            None => {
                let x = self.symbols.lookup(name)?;
                let joined = Value::concat(&[x, y])?;
                self.symbols.define(name, joined)
            }
        }
    }

    /// Store `value` through the lvalue expression `target`.
    fn assign_into(&mut self, target: NodeId, value: Value) -> Result<(), EvalError> {
        let result = match *self.script.kind(target) {
            NodeKind::Identifier(name) => self.symbols.define(name, value.into_visible()),
            NodeKind::Subset {
                target: base,
                indices,
            } => self.assign_subset(base, indices, &value),
            NodeKind::Member {
                target: receiver,
                name,
            } => {
                let objects = self.eval(receiver)?;
                self.set_member(&objects, self.name_str(name), &value)
            }
            _ => Err(not_an_lvalue()),
        };
        result.map_err(|err| self.blame(err, target))
    }

    /// `base[indices] = value`.
    fn assign_subset(
        &mut self,
        base: NodeId,
        indices: NodeRange,
        value: &Value,
    ) -> Result<(), EvalError> {
        let selectors = self.eval_selectors(indices)?;
        match *self.script.kind(base) {
            NodeKind::Identifier(name)
                if self.symbols.is_constant(name) || self.symbols.is_iterator(name) =>
            {
                // Let `define` raise the binding error.
                let null = self.constants().null.clone();
                self.symbols.define(name, null)
            }
            NodeKind::Identifier(name) if self.symbols.is_local(name) => self
                .symbols
                .with_local_mut(name, |x| assign_elements(x, &selectors, value))
                .unwrap_or(Ok(())),
            NodeKind::Identifier(name) => self.symbols.lookup(name).map(drop),
            // `p.age[0] = v` would write through a temporary property vector.
            NodeKind::Member { .. } => Err(not_an_lvalue()),
            _ => {
                let mut current = self.eval(base)?;
                assign_elements(&mut current, &selectors, value)?;
                self.assign_into(base, current)
            }
        }
    }

    /// `objects.property = value`, element by element.
    fn set_member(&self, objects: &Value, property: &str, value: &Value) -> Result<(), EvalError> {
        let Vector::Object(receiver) = objects.vector() else {
            return Err(object_required(".", objects.value_type().name()));
        };
        let Some(class) = &receiver.class else {
            return Ok(());
        };
        let signature = class.property(property)?;
        if signature.read_only {
            return Err(read_only_property(property, class.name()));
        }

        let ty = value.value_type();
        if !signature.mask.kinds().intersects(ty.mask_bit()) {
            return Err(property_type(property, ty.name()));
        }
        if let (Some(expected), Some(got)) = (&signature.class, value.object_class()) {
            if got.name() != expected {
                return Err(object_class_mismatch(expected, got.name()));
            }
        }

        let elements = &receiver.elements;
        if value.is_singleton() {
            for element in elements {
                element.set_property(property, value)?;
            }
        } else if value.len() == elements.len() {
            for (i, element) in elements.iter().enumerate() {
                element.set_property(property, &value.element(i)?)?;
            }
        } else {
            return Err(assignment_size());
        }
        Ok(())
    }
}

/// Write `value` into the elements of `x` picked by `selectors`.
///
/// `value` is a singleton, which is copied into every picked element, or
/// has one element per pick. Picking nothing is a no-op. When `value`'s
/// kind is higher than `x`'s, `x` is promoted first; a lower kind is
/// converted up to `x`'s.
fn assign_elements(x: &mut Value, selectors: &[Selector], value: &Value) -> Result<(), EvalError> {
    if x.is_void() {
        return Err(unsupported_operand("[]", x.value_type().name()));
    }
    let (xt, vt) = (x.value_type(), value.value_type());
    let promote = if xt == vt {
        if let (Some(have), Some(got)) = (x.object_class(), value.object_class()) {
            if have.name() != got.name() {
                return Err(object_class_mismatch(have.name(), got.name()));
            }
        }
        false
    } else if xt.is_promotable() && vt.is_promotable() {
        vt > xt
    } else {
        return Err(assignment_type_mismatch(xt.name(), vt.name()));
    };

    let selection = select(x, selectors)?;
    let picks = selection.offsets.len();
    if picks == 0 {
        return Ok(());
    }
    if value.len() != 1 && value.len() != picks {
        return Err(assignment_size());
    }

    let source = if promote {
        let data = x.make_mut();
        data.vector = data.vector.convert(vt)?;
        value.vector().clone()
    } else if xt == vt {
        value.vector().clone()
    } else {
        value.vector().convert(xt)?
    };

    let vector = &mut x.make_mut().vector;
    let len = source.len();
    for (k, &offset) in selection.offsets.iter().enumerate() {
        vector.set_from(offset, &source, pick(len, k));
    }
    Ok(())
}
