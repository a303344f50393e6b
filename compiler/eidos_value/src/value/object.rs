//! Host objects.
//!
//! The evaluator knows nothing about the embedding's object graph. Host
//! elements implement [`ObjectElement`] and describe their surface with an
//! [`ObjectClass`]: property signatures plus a method table. Member access
//! and method calls on an object vector are vectorized over its elements.

use std::fmt;
use std::rc::Rc;

use eidos_ir::ValueMask;
use rustc_hash::FxHashMap;

use crate::errors::{read_only_property, undefined_method, undefined_property, EvalError};
use crate::signature::Signature;
use crate::value::Value;
use crate::EvalResult;

/// One element of an object vector, implemented by the host.
///
/// Mutation goes through `&self`; hosts use interior mutability.
pub trait ObjectElement: fmt::Debug {
    fn class(&self) -> &Rc<ObjectClass>;

    /// Read a property declared on the class.
    fn get_property(&self, name: &str) -> EvalResult;

    /// Write a property. Read-only checks happen before this is called.
    fn set_property(&self, name: &str, _value: &Value) -> Result<(), EvalError> {
        Err(read_only_property(name, self.class().name()))
    }

    /// Call a method declared in the class method table, with arguments
    /// already bound and checked against its signature.
    fn call_method(&self, name: &str, _args: &[Value]) -> EvalResult {
        Err(undefined_method(name, self.class().name()))
    }
}

/// Shared handle to a host element.
pub type ObjectRef = Rc<dyn ObjectElement>;

/// Identity comparison of two elements.
#[inline]
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Declared type of one property, per element.
#[derive(Clone, Debug)]
pub struct PropertySignature {
    pub name: String,
    pub mask: ValueMask,
    pub class: Option<String>,
    pub read_only: bool,
}

impl PropertySignature {
    pub fn read_only(name: &str, mask: ValueMask) -> Self {
        PropertySignature {
            name: name.to_string(),
            mask,
            class: None,
            read_only: true,
        }
    }

    pub fn read_write(name: &str, mask: ValueMask) -> Self {
        PropertySignature {
            read_only: false,
            ..Self::read_only(name, mask)
        }
    }
}

/// Element class of an object vector.
#[derive(Debug)]
pub struct ObjectClass {
    name: String,
    properties: FxHashMap<String, PropertySignature>,
    methods: FxHashMap<String, Rc<Signature>>,
}

impl ObjectClass {
    pub fn new(name: &str) -> Self {
        ObjectClass {
            name: name.to_string(),
            properties: FxHashMap::default(),
            methods: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertySignature) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    #[must_use]
    pub fn with_method(mut self, signature: Signature) -> Self {
        self.methods
            .insert(signature.name().to_string(), Rc::new(signature));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property signature, or the "not defined" error.
    pub fn property(&self, name: &str) -> Result<&PropertySignature, EvalError> {
        self.properties
            .get(name)
            .ok_or_else(|| undefined_property(name, &self.name))
    }

    /// Method signature, or the "not defined" error.
    pub fn method(&self, name: &str) -> Result<&Rc<Signature>, EvalError> {
        self.methods
            .get(name)
            .ok_or_else(|| undefined_method(name, &self.name))
    }
}

impl PartialEq for ObjectClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
