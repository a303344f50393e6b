//! Runtime values.
//!
//! A [`Value`] is a cheap-to-clone handle to a homogeneous vector with
//! optional dimensions. Values are immutable by convention: code that
//! needs to write goes through [`Value::make_mut`], which clones the
//! storage only when the handle is shared.

mod constants;
mod dims;
mod display;
mod object;
mod vector;

use std::rc::Rc;

use eidos_ir::ValueMask;

pub use constants::Constants;
pub use dims::Dimensions;
pub use display::{format_float, format_logical};
pub use object::{same_object, ObjectClass, ObjectElement, ObjectRef, PropertySignature};
pub use vector::{ObjectVector, Vector};

use crate::errors::{index_out_of_range, invalid_conversion, EvalError};

/// Kind of a value.
///
/// The derived order of `Logical < Int < Float < String` is the promotion
/// order used by arithmetic, comparison and concatenation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    Void,
    Null,
    Logical,
    Int,
    Float,
    String,
    Object,
}

impl ValueType {
    /// User-facing type name, as printed by `type()` and in errors.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Void => "void",
            ValueType::Null => "NULL",
            ValueType::Logical => "logical",
            ValueType::Int => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Object => "object",
        }
    }

    /// The mask bit admitting this kind; void matches no bit.
    pub fn mask_bit(self) -> ValueMask {
        match self {
            ValueType::Void => ValueMask::empty(),
            ValueType::Null => ValueMask::NULL,
            ValueType::Logical => ValueMask::LOGICAL,
            ValueType::Int => ValueMask::INT,
            ValueType::Float => ValueMask::FLOAT,
            ValueType::String => ValueMask::STRING,
            ValueType::Object => ValueMask::OBJECT,
        }
    }

    /// Whether this kind takes part in logical -> integer -> float -> string
    /// promotion.
    pub fn is_promotable(self) -> bool {
        matches!(
            self,
            ValueType::Logical | ValueType::Int | ValueType::Float | ValueType::String
        )
    }
}

/// The shared payload behind a [`Value`].
#[derive(Clone, Debug)]
pub struct ValueData {
    pub vector: Vector,
    /// `None` for a plain vector; otherwise the product equals the length.
    pub dims: Option<Dimensions>,
    /// Results such as assignment are not echoed at top level.
    pub invisible: bool,
}

/// Reference-counted value handle.
#[derive(Clone, Debug)]
pub struct Value(Rc<ValueData>);

impl Value {
    pub fn new(vector: Vector) -> Self {
        Value(Rc::new(ValueData {
            vector,
            dims: None,
            invisible: false,
        }))
    }

    /// A value with dimensions. Callers guarantee the extents multiply out
    /// to the vector's length.
    pub fn with_dims(vector: Vector, dims: Option<Dimensions>) -> Self {
        debug_assert!(dims
            .as_ref()
            .map_or(true, |d| d.product() == Some(vector.len())));
        Value(Rc::new(ValueData {
            vector,
            dims,
            invisible: false,
        }))
    }

    pub fn logical(values: Vec<bool>) -> Self {
        Value::new(Vector::Logical(values))
    }

    pub fn int(values: Vec<i64>) -> Self {
        Value::new(Vector::Int(values))
    }

    pub fn float(values: Vec<f64>) -> Self {
        Value::new(Vector::Float(values))
    }

    pub fn string(values: Vec<String>) -> Self {
        Value::new(Vector::String(values))
    }

    pub fn object(class: Option<Rc<ObjectClass>>, elements: Vec<ObjectRef>) -> Self {
        Value::new(Vector::Object(ObjectVector { class, elements }))
    }

    /// A single object element, typed by its own class.
    pub fn object_scalar(element: ObjectRef) -> Self {
        let class = Rc::clone(element.class());
        Value::object(Some(class), vec![element])
    }

    pub fn int_scalar(value: i64) -> Self {
        Value::int(vec![value])
    }

    pub fn float_scalar(value: f64) -> Self {
        Value::float(vec![value])
    }

    pub fn string_scalar(value: impl Into<String>) -> Self {
        Value::string(vec![value.into()])
    }

    #[inline]
    pub fn vector(&self) -> &Vector {
        &self.0.vector
    }

    #[inline]
    pub fn dims(&self) -> Option<&Dimensions> {
        self.0.dims.as_ref()
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.0.vector.value_type()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.vector.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.vector.is_empty()
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.len() == 1
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.0.vector, Vector::Null)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self.0.vector, Vector::Void)
    }

    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.0.invisible
    }

    /// Whether this handle is the only one referring to its storage.
    #[inline]
    pub fn is_unique(&self) -> bool {
        Rc::strong_count(&self.0) == 1
    }

    /// Whether two handles share storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Mutable access to the payload, cloning it first if shared.
    #[inline]
    pub fn make_mut(&mut self) -> &mut ValueData {
        Rc::make_mut(&mut self.0)
    }

    /// This value with the invisible flag set.
    #[must_use]
    pub fn into_invisible(mut self) -> Value {
        if !self.0.invisible {
            self.make_mut().invisible = true;
        }
        self
    }

    /// This value with the invisible flag cleared.
    #[must_use]
    pub fn into_visible(mut self) -> Value {
        if self.0.invisible {
            self.make_mut().invisible = false;
        }
        self
    }

    /// Element class of an object value.
    pub fn object_class(&self) -> Option<&Rc<ObjectClass>> {
        match &self.0.vector {
            Vector::Object(v) => v.class.as_ref(),
            _ => None,
        }
    }

    pub fn as_logicals(&self) -> Option<&[bool]> {
        match &self.0.vector {
            Vector::Logical(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match &self.0.vector {
            Vector::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match &self.0.vector {
            Vector::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.0.vector {
            Vector::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&[ObjectRef]> {
        match &self.0.vector {
            Vector::Object(v) => Some(&v.elements),
            _ => None,
        }
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), EvalError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(index_out_of_range(i64::try_from(index).unwrap_or(i64::MAX)))
        }
    }

    #[cold]
    fn conversion_error(&self, to: ValueType) -> EvalError {
        invalid_conversion(self.value_type().name(), to.name())
    }

    /// Element `index` as a logical; only logical values qualify.
    pub fn logical_at(&self, index: usize) -> Result<bool, EvalError> {
        self.check_index(index)?;
        match &self.0.vector {
            Vector::Logical(v) => Ok(v[index]),
            _ => Err(self.conversion_error(ValueType::Logical)),
        }
    }

    /// Element `index` widened to integer.
    pub fn int_at(&self, index: usize) -> Result<i64, EvalError> {
        self.check_index(index)?;
        match &self.0.vector {
            Vector::Logical(v) => Ok(i64::from(v[index])),
            Vector::Int(v) => Ok(v[index]),
            _ => Err(self.conversion_error(ValueType::Int)),
        }
    }

    /// Element `index` widened to float.
    #[expect(
        clippy::cast_precision_loss,
        reason = "integer to float widening is the language's promotion rule"
    )]
    pub fn float_at(&self, index: usize) -> Result<f64, EvalError> {
        self.check_index(index)?;
        match &self.0.vector {
            Vector::Logical(v) => Ok(if v[index] { 1.0 } else { 0.0 }),
            Vector::Int(v) => Ok(v[index] as f64),
            Vector::Float(v) => Ok(v[index]),
            _ => Err(self.conversion_error(ValueType::Float)),
        }
    }

    /// Element `index` widened to string.
    pub fn string_at(&self, index: usize) -> Result<String, EvalError> {
        self.check_index(index)?;
        match &self.0.vector {
            Vector::Logical(v) => Ok(format_logical(v[index]).to_string()),
            Vector::Int(v) => Ok(v[index].to_string()),
            Vector::Float(v) => Ok(format_float(v[index])),
            Vector::String(v) => Ok(v[index].clone()),
            _ => Err(self.conversion_error(ValueType::String)),
        }
    }

    pub fn object_at(&self, index: usize) -> Result<ObjectRef, EvalError> {
        self.check_index(index)?;
        match &self.0.vector {
            Vector::Object(v) => Ok(Rc::clone(&v.elements[index])),
            _ => Err(self.conversion_error(ValueType::Object)),
        }
    }

    /// Element `index` coerced to logical for conditions and `& | !`.
    ///
    /// Numbers are true when non-zero; strings when non-empty. NAN has no
    /// truth value.
    pub fn truth_at(&self, index: usize) -> Result<bool, EvalError> {
        self.check_index(index)?;
        match &self.0.vector {
            Vector::Logical(v) => Ok(v[index]),
            Vector::Int(v) => Ok(v[index] != 0),
            Vector::Float(v) => {
                let x = v[index];
                if x.is_nan() {
                    Err(EvalError::new("cannot convert NAN to logical"))
                } else {
                    Ok(x != 0.0)
                }
            }
            Vector::String(v) => Ok(!v[index].is_empty()),
            _ => Err(self.conversion_error(ValueType::Logical)),
        }
    }

    /// Element `index` as a singleton of the same kind.
    pub fn element(&self, index: usize) -> Result<Value, EvalError> {
        self.check_index(index)?;
        Ok(Value::new(self.0.vector.gather(&[index])))
    }

    /// Structural identity as `identical()` defines it: same kind, same
    /// dimensions, equal elements (NAN equals NAN, objects by identity).
    pub fn identical(&self, other: &Value) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        match (self.vector(), other.vector()) {
            (Vector::Void, Vector::Void) | (Vector::Null, Vector::Null) => true,
            (Vector::Logical(a), Vector::Logical(b)) => a == b,
            (Vector::Int(a), Vector::Int(b)) => a == b,
            (Vector::Float(a), Vector::Float(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
            }
            (Vector::String(a), Vector::String(b)) => a == b,
            (Vector::Object(a), Vector::Object(b)) => {
                a.elements.len() == b.elements.len()
                    && a
                        .elements
                        .iter()
                        .zip(&b.elements)
                        .all(|(x, y)| same_object(x, y))
            }
            _ => false,
        }
    }

    /// Concatenate values as `c()` does.
    ///
    /// NULL and void inputs are skipped. The result kind is the highest
    /// promotion kind present; objects only combine with objects of the
    /// same class. Dimensions are dropped.
    pub fn concat(values: &[Value]) -> Result<Value, EvalError> {
        let mut highest: Option<ValueType> = None;
        let mut class: Option<Rc<ObjectClass>> = None;
        let mut total = 0usize;

        for value in values {
            let ty = value.value_type();
            if matches!(ty, ValueType::Null | ValueType::Void) {
                continue;
            }
            total += value.len();
            highest = Some(match highest {
                None => ty,
                Some(prev) if prev == ty => prev,
                Some(prev) if prev.is_promotable() && ty.is_promotable() => prev.max(ty),
                Some(prev) => {
                    let (from, to) = if prev == ValueType::Object {
                        (ty, prev)
                    } else {
                        (prev, ty)
                    };
                    return Err(invalid_conversion(from.name(), to.name()));
                }
            });
            if class.is_none() {
                class = value.object_class().cloned();
            }
        }

        let Some(target) = highest else {
            return Ok(Value::new(Vector::Null));
        };

        let mut out = Vector::empty_of(target, class);
        reserve(&mut out, total);
        for value in values {
            if value.is_null() || value.is_void() {
                continue;
            }
            if value.value_type() == target {
                out.extend_from(value.vector())?;
            } else {
                out.extend_from(&value.vector().convert(target)?)?;
            }
        }
        Ok(Value::new(out))
    }
}

fn reserve(vector: &mut Vector, additional: usize) {
    match vector {
        Vector::Logical(v) => v.reserve(additional),
        Vector::Int(v) => v.reserve(additional),
        Vector::Float(v) => v.reserve(additional),
        Vector::String(v) => v.reserve(additional),
        Vector::Object(v) => v.elements.reserve(additional),
        Vector::Void | Vector::Null => {}
    }
}

impl From<Vector> for Value {
    fn from(vector: Vector) -> Self {
        Value::new(vector)
    }
}
