//! Homogeneous element storage.

use std::rc::Rc;

use super::display::{format_float, format_logical};
use super::object::{ObjectClass, ObjectRef};
use super::ValueType;
use crate::errors::{invalid_conversion, object_class_mismatch, EvalError};

/// Elements of an object vector plus their shared element class.
///
/// `class` is `None` only for an empty vector created without a class.
#[derive(Clone, Debug)]
pub struct ObjectVector {
    pub class: Option<Rc<ObjectClass>>,
    pub elements: Vec<ObjectRef>,
}

impl ObjectVector {
    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref().map(ObjectClass::name)
    }
}

/// Storage for one value; every element has the same kind.
#[derive(Clone, Debug)]
pub enum Vector {
    Void,
    Null,
    Logical(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
    Object(ObjectVector),
}

impl Vector {
    pub fn value_type(&self) -> ValueType {
        match self {
            Vector::Void => ValueType::Void,
            Vector::Null => ValueType::Null,
            Vector::Logical(_) => ValueType::Logical,
            Vector::Int(_) => ValueType::Int,
            Vector::Float(_) => ValueType::Float,
            Vector::String(_) => ValueType::String,
            Vector::Object(_) => ValueType::Object,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vector::Void | Vector::Null => 0,
            Vector::Logical(v) => v.len(),
            Vector::Int(v) => v.len(),
            Vector::Float(v) => v.len(),
            Vector::String(v) => v.len(),
            Vector::Object(v) => v.elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An empty vector of the given kind.
    pub fn empty_of(ty: ValueType, class: Option<Rc<ObjectClass>>) -> Vector {
        match ty {
            ValueType::Void => Vector::Void,
            ValueType::Null => Vector::Null,
            ValueType::Logical => Vector::Logical(Vec::new()),
            ValueType::Int => Vector::Int(Vec::new()),
            ValueType::Float => Vector::Float(Vec::new()),
            ValueType::String => Vector::String(Vec::new()),
            ValueType::Object => Vector::Object(ObjectVector {
                class,
                elements: Vec::new(),
            }),
        }
    }

    /// The elements at `indices`, in order. Indices must be in bounds.
    pub fn gather(&self, indices: &[usize]) -> Vector {
        fn pick<T: Clone>(src: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| src[i].clone()).collect()
        }
        match self {
            Vector::Void => Vector::Void,
            Vector::Null => Vector::Null,
            Vector::Logical(v) => Vector::Logical(pick(v, indices)),
            Vector::Int(v) => Vector::Int(pick(v, indices)),
            Vector::Float(v) => Vector::Float(pick(v, indices)),
            Vector::String(v) => Vector::String(pick(v, indices)),
            Vector::Object(v) => Vector::Object(ObjectVector {
                class: v.class.clone(),
                elements: pick(&v.elements, indices),
            }),
        }
    }

    /// Widen to `to` along logical -> integer -> float -> string.
    ///
    /// Narrowing, and any conversion into or out of object or NULL, raises.
    pub fn convert(&self, to: ValueType) -> Result<Vector, EvalError> {
        let from = self.value_type();
        if from == to {
            return Ok(self.clone());
        }
        let converted = match (self, to) {
            (Vector::Logical(v), ValueType::Int) => {
                Vector::Int(v.iter().map(|&b| i64::from(b)).collect())
            }
            (Vector::Logical(v), ValueType::Float) => {
                Vector::Float(v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect())
            }
            (Vector::Logical(v), ValueType::String) => {
                Vector::String(v.iter().map(|&b| format_logical(b).to_string()).collect())
            }
            #[expect(
                clippy::cast_precision_loss,
                reason = "integer to float widening is the language's promotion rule"
            )]
            (Vector::Int(v), ValueType::Float) => {
                Vector::Float(v.iter().map(|&i| i as f64).collect())
            }
            (Vector::Int(v), ValueType::String) => {
                Vector::String(v.iter().map(ToString::to_string).collect())
            }
            (Vector::Float(v), ValueType::String) => {
                Vector::String(v.iter().map(|&x| format_float(x)).collect())
            }
            _ => return Err(invalid_conversion(from.name(), to.name())),
        };
        Ok(converted)
    }

    /// Copy element `src_index` of `src` over element `dst`.
    ///
    /// Both vectors must already have the same kind.
    pub fn set_from(&mut self, dst: usize, src: &Vector, src_index: usize) {
        match (self, src) {
            (Vector::Logical(d), Vector::Logical(s)) => d[dst] = s[src_index],
            (Vector::Int(d), Vector::Int(s)) => d[dst] = s[src_index],
            (Vector::Float(d), Vector::Float(s)) => d[dst] = s[src_index],
            (Vector::String(d), Vector::String(s)) => d[dst].clone_from(&s[src_index]),
            (Vector::Object(d), Vector::Object(s)) => {
                d.elements[dst] = Rc::clone(&s.elements[src_index]);
            }
            _ => {}
        }
    }

    /// Append every element of `other`, which must have the same kind.
    ///
    /// Object vectors must agree on their element class; an untyped empty
    /// side adopts the other's class.
    pub fn extend_from(&mut self, other: &Vector) -> Result<(), EvalError> {
        match (self, other) {
            (_, Vector::Null) => {}
            (Vector::Logical(d), Vector::Logical(s)) => d.extend_from_slice(s),
            (Vector::Int(d), Vector::Int(s)) => d.extend_from_slice(s),
            (Vector::Float(d), Vector::Float(s)) => d.extend_from_slice(s),
            (Vector::String(d), Vector::String(s)) => d.extend(s.iter().cloned()),
            (Vector::Object(d), Vector::Object(s)) => {
                match (&d.class, &s.class) {
                    (Some(a), Some(b)) if a.name() != b.name() => {
                        return Err(object_class_mismatch(a.name(), b.name()));
                    }
                    (None, Some(b)) => d.class = Some(Rc::clone(b)),
                    _ => {}
                }
                d.elements.extend(s.elements.iter().cloned());
            }
            (d, s) => {
                return Err(invalid_conversion(
                    s.value_type().name(),
                    d.value_type().name(),
                ))
            }
        }
        Ok(())
    }

    /// The whole vector repeated `times` times.
    pub fn repeat_whole(&self, times: usize) -> Vector {
        let len = self.len();
        let indices: Vec<usize> = (0..times).flat_map(|_| 0..len).collect();
        self.gather(&indices)
    }

    /// Element `i` repeated `counts[i]` times in place, or every element
    /// `counts[0]` times when `counts` is a singleton.
    pub fn repeat_each(&self, counts: &[usize]) -> Vector {
        let count = |i: usize| {
            let at = if counts.len() == 1 { 0 } else { i };
            counts.get(at).copied().unwrap_or(0)
        };
        let indices: Vec<usize> = (0..self.len())
            .flat_map(|i| std::iter::repeat(i).take(count(i)))
            .collect();
        self.gather(&indices)
    }
}
